//! Batch operations over selected collection indices
//!
//! Indices refer to positions in the collection at call time. Duplicate and
//! out-of-range indices are ignored. Removal always runs in descending index
//! order so earlier positions stay valid; undo re-inserts in ascending order so
//! each record lands back at its original position.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::domain::result::{Error, Result};
use crate::domain::{Collection, Period, Record, Tag};
use crate::services::reconcile::{add_or_update, ConflictMode};

/// How to reverse a batch operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Undo {
    /// Put removed `(index, record)` pairs back, ascending
    Reinsert(Vec<(usize, Record)>),
    /// Replace the collection with its prior state
    Restore(Collection),
}

impl Undo {
    /// Reverse the operation
    ///
    /// Re-inserted records that collide with records added since are folded
    /// into the earlier one.
    pub fn apply(self, collection: &mut Collection) {
        match self {
            Self::Reinsert(removed) => {
                for (index, record) in removed {
                    collection.insert(index, record);
                }
                collection.coalesce();
            }
            Self::Restore(prior) => *collection = prior,
        }
    }
}

/// Result of a re-tagging batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOutcome {
    /// Records that were re-tagged
    pub affected: usize,
    /// Indices that were duplicate, out of range, or already of the target kind
    pub ignored: usize,
    pub undo: Undo,
}

/// Summary suitable for JSON output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub affected: usize,
    pub ignored: usize,
}

impl From<&BatchOutcome> for BatchSummary {
    fn from(outcome: &BatchOutcome) -> Self {
        Self {
            affected: outcome.affected,
            ignored: outcome.ignored,
        }
    }
}

/// Distinct in-range indices, ascending, plus how many inputs were dropped
fn select(collection: &Collection, indices: &[usize]) -> (BTreeSet<usize>, usize) {
    let selected: BTreeSet<usize> = indices
        .iter()
        .copied()
        .filter(|&i| i < collection.len())
        .collect();
    let ignored = indices.len() - selected.len();
    (selected, ignored)
}

/// Remove the given positions, descending; returns the records in ascending order
fn remove_descending(collection: &mut Collection, positions: &BTreeSet<usize>) -> Vec<(usize, Record)> {
    let mut removed: Vec<(usize, Record)> = positions
        .iter()
        .rev()
        .map(|&i| (i, collection.remove(i)))
        .collect();
    removed.reverse();
    removed
}

/// Move dated records into a named report
///
/// Each record is removed and merged back as an aggregated record with the
/// same project and totals. Records already in a report are ignored.
pub fn assign_to_report(collection: &mut Collection, indices: &[usize], report: &str) -> Result<BatchOutcome> {
    let report = report.trim();
    if report.is_empty() {
        return Err(Error::validation("report name must not be empty"));
    }

    let prior = collection.clone();
    let (selected, mut ignored) = select(collection, indices);
    let dated: BTreeSet<usize> = selected
        .into_iter()
        .filter(|&i| collection.get(i).is_some_and(Record::is_dated))
        .collect();
    ignored += indices.len() - ignored - dated.len();

    let removed = remove_descending(collection, &dated);
    let affected = removed.len();
    for (_, mut record) in removed {
        record.tag = Tag::Report(report.to_string());
        add_or_update(collection, record, ConflictMode::Merge);
    }

    Ok(BatchOutcome {
        affected,
        ignored,
        undo: Undo::Restore(prior),
    })
}

/// Move records to one month
///
/// Dated records get their period overwritten in place; aggregated records
/// are removed and merged back as dated records. Identities that collide
/// afterwards are folded into the earliest record.
pub fn reassign_date(collection: &mut Collection, indices: &[usize], period: Period) -> BatchOutcome {
    let prior = collection.clone();
    let (selected, ignored) = select(collection, indices);

    let mut aggregated = BTreeSet::new();
    for &index in &selected {
        match collection.get_mut(index) {
            Some(record) if record.is_dated() => record.tag = Tag::Dated(period),
            Some(_) => {
                aggregated.insert(index);
            }
            None => {}
        }
    }

    let removed = remove_descending(collection, &aggregated);
    collection.coalesce();
    for (_, mut record) in removed {
        record.tag = Tag::Dated(period);
        add_or_update(collection, record, ConflictMode::Merge);
    }

    BatchOutcome {
        affected: selected.len(),
        ignored,
        undo: Undo::Restore(prior),
    }
}

/// Records removed by a delete, in ascending original position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deletion {
    pub removed: Vec<(usize, Record)>,
    pub ignored: usize,
}

impl Deletion {
    pub fn count(&self) -> usize {
        self.removed.len()
    }

    /// Put the removed records back at their original positions
    pub fn undo(self, collection: &mut Collection) {
        self.into_undo().apply(collection);
    }

    pub fn into_undo(self) -> Undo {
        Undo::Reinsert(self.removed)
    }
}

/// Delete the records at `indices`
pub fn batch_delete(collection: &mut Collection, indices: &[usize]) -> Deletion {
    let (selected, ignored) = select(collection, indices);
    Deletion {
        removed: remove_descending(collection, &selected),
        ignored,
    }
}

/// Delete a single record
pub fn delete_one(collection: &mut Collection, index: usize) -> Result<Deletion> {
    if index >= collection.len() {
        return Err(Error::not_found(format!("no record at index {index}")));
    }
    Ok(batch_delete(collection, &[index]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn period(year: i32, month: u32) -> Period {
        Period::new(year, month).unwrap()
    }

    fn sample() -> Collection {
        Collection::from_records(vec![
            Record::dated("A", 1, 1, period(2024, 0)),
            Record::report("B", 2, 2, "Q1"),
            Record::dated("C", 3, 3, period(2024, 1)),
            Record::dated("B", 4, 4, period(2024, 1)),
            Record::report("E", 5, 5, "Q2"),
        ])
    }

    #[test]
    fn test_batch_delete_and_undo_restores_order() {
        let mut collection = sample();
        let original = collection.clone();

        let deletion = batch_delete(&mut collection, &[3, 0, 3, 99]);
        assert_eq!(deletion.ignored, 2);
        assert_eq!(
            deletion.removed.iter().map(|(i, _)| *i).collect::<Vec<_>>(),
            vec![0, 3]
        );
        assert_eq!(collection.len(), 3);
        assert_eq!(collection.get(0).unwrap().project, "B");

        deletion.undo(&mut collection);
        assert_eq!(collection, original);
    }

    #[test]
    fn test_delete_one() {
        let mut collection = sample();
        let deletion = delete_one(&mut collection, 4).unwrap();
        assert_eq!(deletion.removed[0].1.project, "E");
        assert!(matches!(delete_one(&mut collection, 4), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_assign_to_report_merges_into_existing() {
        let mut collection = sample();
        let outcome = assign_to_report(&mut collection, &[3, 1, 0], " Q1 ").unwrap();

        assert_eq!(outcome.affected, 2);
        assert_eq!(outcome.ignored, 1);
        assert!(collection.has_unique_identities());
        assert_eq!(
            collection.find(&Record::report("B", 0, 0, "Q1")),
            Some(&Record::report("B", 6, 6, "Q1"))
        );
        assert_eq!(
            collection.find(&Record::report("A", 0, 0, "Q1")),
            Some(&Record::report("A", 1, 1, "Q1"))
        );
        assert_eq!(collection.len(), 4);
    }

    #[test]
    fn test_assign_to_report_undo() {
        let mut collection = sample();
        let original = collection.clone();
        let outcome = assign_to_report(&mut collection, &[0, 2], "Q3").unwrap();
        outcome.undo.apply(&mut collection);
        assert_eq!(collection, original);
    }

    #[test]
    fn test_assign_to_blank_report_is_rejected() {
        let mut collection = sample();
        assert!(assign_to_report(&mut collection, &[0], "  ").is_err());
    }

    #[test]
    fn test_reassign_date_coalesces_collisions() {
        let mut collection = sample();
        let feb = period(2024, 1);

        let outcome = reassign_date(&mut collection, &[0, 1, 2], feb);
        assert_eq!(outcome.affected, 3);
        assert!(collection.has_unique_identities());

        assert_eq!(
            collection.find(&Record::dated("A", 0, 0, feb)),
            Some(&Record::dated("A", 1, 1, feb))
        );
        // B's report record merges into the already dated B for February
        assert_eq!(
            collection.find(&Record::dated("B", 0, 0, feb)),
            Some(&Record::dated("B", 6, 6, feb))
        );
        assert_eq!(collection.len(), 4);
    }

    #[test]
    fn test_reassign_date_in_place_collision() {
        let jan = period(2024, 0);
        let feb = period(2024, 1);
        let mut collection = Collection::from_records(vec![
            Record::dated("A", 1, 0, jan),
            Record::dated("A", 2, 0, feb),
        ]);

        reassign_date(&mut collection, &[1], jan);
        assert_eq!(collection.records(), &[Record::dated("A", 3, 0, jan)]);
    }
}
