//! Integration tests for the reconciliation, batch and aggregation engines
//!
//! Randomized sequences use a seeded StdRng so failures are reproducible.
//!
//! Run with: cargo test --test engine_tests

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use tally_core::services::{
    add_or_update, aggregate_by_month, aggregate_by_project, apply_batch, assign_to_report,
    batch_delete, classify, decode_csv, export_csv, filter, materialize, reassign_date, search,
    sort_records, totals, ConflictMode, EnglishMonths, ImportKind, ImportTarget, Outcome,
    RangeBounds, SortDirection, SortField, ViewMode,
};
use tally_core::{Collection, Period, Record};

// ============================================================================
// Test Helpers
// ============================================================================

const PROJECTS: [&str; 5] = ["Alpha", "alpha", "Beta", "Foo, Inc", "Zeta"];
const REPORTS: [&str; 3] = ["Q1", "Q2", "Yearly"];

fn period(year: i32, month: u32) -> Period {
    Period::new(year, month).unwrap()
}

fn random_record(rng: &mut StdRng) -> Record {
    let project = PROJECTS[rng.gen_range(0..PROJECTS.len())];
    let edit = rng.gen_range(0..50);
    let review = rng.gen_range(0..50);
    if rng.gen_bool(0.6) {
        Record::dated(project, edit, review, period(rng.gen_range(2023..=2024), rng.gen_range(0..12)))
    } else {
        Record::report(project, edit, review, REPORTS[rng.gen_range(0..REPORTS.len())])
    }
}

fn random_mode(rng: &mut StdRng) -> ConflictMode {
    match rng.gen_range(0..3) {
        0 => ConflictMode::Merge,
        1 => ConflictMode::Overwrite,
        _ => ConflictMode::Skip,
    }
}

fn random_indices(rng: &mut StdRng, len: usize) -> Vec<usize> {
    // Include some repeated and out-of-range indices
    let count = rng.gen_range(0..4);
    (0..count).map(|_| rng.gen_range(0..len + 2)).collect()
}

fn sample_collection() -> Collection {
    Collection::from_records(vec![
        Record::dated("A", 5, 2, period(2024, 0)),
        Record::dated("B", 1, 1, period(2024, 4)),
        Record::dated("C", 7, 3, period(2024, 5)),
        Record::dated("D", 2, 0, period(2024, 6)),
        Record::report("E", 9, 9, "Q1"),
    ])
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_quoted_csv_import_end_to_end() {
    let decoded = decode_csv("Project,Edit,Review,Month,Year\n\"Foo, Inc\",10,5,3,2024\n").unwrap();
    assert_eq!(decoded.rows.len(), 1);
    assert_eq!(decoded.rows[0].project, "Foo, Inc");
    assert_eq!(decoded.rows[0].period, Some(period(2024, 2)));

    let classification = classify(&decoded).unwrap();
    assert_eq!(classification.kind, ImportKind::Dated);

    let records = materialize(&decoded, &ImportTarget::OwnDates).unwrap();
    let mut collection = Collection::new();
    let summary = apply_batch(&mut collection, records, ConflictMode::Merge);
    assert_eq!(summary.inserted, 1);

    let series = aggregate_by_project(&collection);
    assert_eq!(series.labels, vec!["Foo, Inc"]);
    assert_eq!(series.edit, vec![10]);
    assert_eq!(series.review, vec![5]);

    let by_month = aggregate_by_month(&collection, &EnglishMonths);
    assert_eq!(by_month.labels, vec!["March 2024"]);
}

#[test]
fn test_merge_adds_into_existing_record() {
    let mut collection = Collection::from_records(vec![Record::dated("A", 5, 2, period(2024, 0))]);
    let outcome = add_or_update(&mut collection, Record::dated("A", 3, 1, period(2024, 0)), ConflictMode::Merge);

    assert_eq!(outcome, Outcome::Merged);
    assert_eq!(collection.len(), 1);
    assert_eq!(collection.records()[0].edit_total, 8);
    assert_eq!(collection.records()[0].review_total, 3);
}

#[test]
fn test_single_month_filter_selects_that_month() {
    let collection = sample_collection();
    let visible = filter(&collection, &ViewMode::SingleMonth(period(2024, 5)));
    let projects: Vec<&str> = visible.iter().map(|r| r.project.as_str()).collect();
    assert_eq!(projects, vec!["C"]);
}

#[test]
fn test_batch_delete_then_undo_restores_order() {
    let original = sample_collection();
    let mut collection = original.clone();

    let deletion = batch_delete(&mut collection, &[1, 3]);
    assert_eq!(deletion.count(), 2);
    assert_eq!(collection.len(), 3);

    deletion.undo(&mut collection);
    assert_eq!(collection, original);
}

#[test]
fn test_imported_undated_rows_into_report() {
    let decoded = decode_csv("Project,Edit,Review\nAlpha,3,1\nBeta,2,2\n").unwrap();
    assert_eq!(classify(&decoded).unwrap().kind, ImportKind::Undated);

    let records = materialize(&decoded, &ImportTarget::Report("Q3".to_string())).unwrap();
    let mut collection = sample_collection();
    apply_batch(&mut collection, records, ConflictMode::Merge);

    let visible = filter(&collection, &ViewMode::Aggregated { report: Some("Q3".to_string()) });
    assert_eq!(visible.len(), 2);
    assert_eq!(totals(visible.iter().copied()).edit, 5);
}

#[test]
fn test_export_reimport_keeps_records() {
    let collection = sample_collection();
    let csv = export_csv(&collection).unwrap();

    let decoded = decode_csv(&csv).unwrap();
    assert_eq!(classify(&decoded).unwrap().kind, ImportKind::Mixed);

    let records = materialize(&decoded, &ImportTarget::Mixed { report: "Q1".to_string() }).unwrap();
    let mut reimported = Collection::new();
    apply_batch(&mut reimported, records, ConflictMode::Merge);
    assert_eq!(reimported, collection);
}

#[test]
fn test_range_filter_and_search_compose() {
    let collection = sample_collection();
    let range = ViewMode::Range(RangeBounds::new(period(2024, 4), period(2024, 6)));

    let mut visible = search(filter(&collection, &range), "c");
    sort_records(&mut visible, SortField::Edit, SortDirection::Desc);
    let projects: Vec<&str> = visible.iter().map(|r| r.project.as_str()).collect();
    assert_eq!(projects, vec!["C"]);
}

#[test]
fn test_json_round_trip_of_mixed_collection() {
    let collection = sample_collection();
    let json = serde_json::to_string(&collection).unwrap();
    let parsed: Collection = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, collection);
}

// ============================================================================
// Properties
// ============================================================================

#[test]
fn test_identities_stay_unique_under_random_operations() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut collection = Collection::new();

    for step in 0..500 {
        match rng.gen_range(0..5) {
            0 | 1 => {
                let record = random_record(&mut rng);
                let mode = random_mode(&mut rng);
                add_or_update(&mut collection, record, mode);
            }
            2 => {
                let indices = random_indices(&mut rng, collection.len());
                batch_delete(&mut collection, &indices);
            }
            3 => {
                let indices = random_indices(&mut rng, collection.len());
                let report = REPORTS[rng.gen_range(0..REPORTS.len())];
                assign_to_report(&mut collection, &indices, report).unwrap();
            }
            _ => {
                let indices = random_indices(&mut rng, collection.len());
                let target = period(2024, rng.gen_range(0..12));
                reassign_date(&mut collection, &indices, target);
            }
        }
        assert!(collection.has_unique_identities(), "duplicate identity after step {step}");
    }
}

#[test]
fn test_merge_is_additive_and_overwrite_idempotent() {
    let mut rng = StdRng::seed_from_u64(11);

    for _ in 0..100 {
        let record = random_record(&mut rng);

        let mut merged = Collection::new();
        add_or_update(&mut merged, record.clone(), ConflictMode::Merge);
        add_or_update(&mut merged, record.clone(), ConflictMode::Merge);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged.records()[0].edit_total, record.edit_total * 2);
        assert_eq!(merged.records()[0].review_total, record.review_total * 2);

        let mut overwritten = Collection::new();
        add_or_update(&mut overwritten, record.clone(), ConflictMode::Overwrite);
        add_or_update(&mut overwritten, record.clone(), ConflictMode::Overwrite);
        assert_eq!(overwritten.records(), &[record]);
    }
}

#[test]
fn test_delete_undo_restores_random_collections() {
    let mut rng = StdRng::seed_from_u64(23);

    for _ in 0..50 {
        let records: Vec<Record> = (0..rng.gen_range(1..15)).map(|_| random_record(&mut rng)).collect();
        let original = Collection::from_records(records);
        let mut collection = original.clone();

        let indices = random_indices(&mut rng, collection.len());
        let deletion = batch_delete(&mut collection, &indices);
        deletion.undo(&mut collection);
        assert_eq!(collection, original);
    }
}

#[test]
fn test_filters_and_aggregates_do_not_mutate() {
    let mut rng = StdRng::seed_from_u64(31);
    let records: Vec<Record> = (0..40).map(|_| random_record(&mut rng)).collect();
    let collection = Collection::from_records(records);
    let before = collection.clone();

    let modes = [
        ViewMode::Aggregated { report: Some("Q1".to_string()) },
        ViewMode::Aggregated { report: None },
        ViewMode::SingleMonth(period(2024, 3)),
        ViewMode::Range(RangeBounds::new(period(2023, 6), period(2024, 2))),
        ViewMode::Range(RangeBounds::default()),
    ];
    for mode in &modes {
        let visible = filter(&collection, mode);
        let series = aggregate_by_project(visible.iter().copied());
        assert_eq!(series.edit.iter().sum::<u64>(), totals(visible.iter().copied()).edit);
        aggregate_by_month(visible.iter().copied(), &EnglishMonths);
    }
    assert_eq!(collection, before);
}

#[test]
fn test_project_series_has_one_label_per_group() {
    let mut rng = StdRng::seed_from_u64(47);
    let records: Vec<Record> = (0..60).map(|_| random_record(&mut rng)).collect();
    let collection = Collection::from_records(records);

    let mut groups: Vec<(Option<&str>, &str)> = collection
        .iter()
        .map(|r| (r.report_name(), r.project.as_str()))
        .collect();
    groups.sort();
    groups.dedup();

    let series = aggregate_by_project(&collection);
    assert_eq!(series.len(), groups.len());
    assert_eq!(series.review.iter().sum::<u64>(), totals(&collection).review);
}

#[test]
fn test_assign_then_redate_round_trip() {
    let mut rng = StdRng::seed_from_u64(59);

    for _ in 0..30 {
        let original = Record::dated(
            PROJECTS[rng.gen_range(0..PROJECTS.len())],
            rng.gen_range(0..100),
            rng.gen_range(0..100),
            period(2024, rng.gen_range(0..12)),
        );
        let target = original.period().unwrap();

        let mut collection = Collection::from_records(vec![original.clone()]);
        assign_to_report(&mut collection, &[0], "Holding").unwrap();
        assert!(!collection.records()[0].is_dated());

        reassign_date(&mut collection, &[0], target);
        assert_eq!(collection.records(), &[original]);
    }
}
