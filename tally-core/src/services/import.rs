//! Import classifier - decides what follow-up input an import needs
//!
//! CSV files decode into rows that may or may not carry their own month.
//! Before anything reaches the reconciliation engine the caller must pick an
//! [`ImportTarget`] that gives every row a tag; [`classify`] tells it which
//! targets make sense. JSON files carry complete records and replace the
//! whole collection.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::domain::result::{Error, Result as CoreResult};
use crate::domain::{Period, Record};
use crate::services::decode::{decode_csv, DecodedImport};

/// Which kinds of rows an import contains
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportKind {
    /// Every row has its own month
    Dated,
    /// No row has a month
    Undated,
    /// Both kinds
    Mixed,
}

/// Input the caller has to collect before reconciling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FollowUp {
    /// Rows already carry dates; a single-period override may still be offered
    None,
    /// One period or one report name for all rows
    PeriodOrReport,
    /// A report name for the undated rows
    ReportForUndated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImportClassification {
    pub kind: ImportKind,
    pub follow_up: FollowUp,
}

/// How rows of an import get their tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportTarget {
    /// Keep each row's own month (dated files only)
    OwnDates,
    /// Put every row in one month, overriding row dates
    SinglePeriod(Period),
    /// Put every row in one report
    Report(String),
    /// Dated rows keep their month, undated rows go to the report (mixed files only)
    Mixed { report: String },
}

/// Classify decoded rows; a file without rows is an invalid file
pub fn classify(decoded: &DecodedImport) -> CoreResult<ImportClassification> {
    let classification = match (decoded.has_dated_rows, decoded.has_undated_rows) {
        (false, false) => {
            return Err(Error::import_format(
                "no recognizable header or summary rows found",
            ))
        }
        (true, false) => ImportClassification {
            kind: ImportKind::Dated,
            follow_up: FollowUp::None,
        },
        (false, true) => ImportClassification {
            kind: ImportKind::Undated,
            follow_up: FollowUp::PeriodOrReport,
        },
        (true, true) => ImportClassification {
            kind: ImportKind::Mixed,
            follow_up: FollowUp::ReportForUndated,
        },
    };
    Ok(classification)
}

/// Turn decoded rows into records using the chosen target
pub fn materialize(decoded: &DecodedImport, target: &ImportTarget) -> CoreResult<Vec<Record>> {
    let classification = classify(decoded)?;

    match target {
        ImportTarget::OwnDates if classification.kind != ImportKind::Dated => {
            return Err(Error::validation(
                "the file has rows without a month; choose a period or a report",
            ));
        }
        ImportTarget::Mixed { .. } if classification.kind != ImportKind::Mixed => {
            return Err(Error::validation(
                "a mixed import needs a file with both dated and undated rows",
            ));
        }
        ImportTarget::Report(report) | ImportTarget::Mixed { report } if report.trim().is_empty() => {
            return Err(Error::validation("report name must not be empty"));
        }
        _ => {}
    }

    decoded
        .rows
        .iter()
        .map(|row| {
            let with_period = |period: Period| {
                Record::dated(row.project.clone(), row.edit_total, row.review_total, period)
            };
            let with_report = |report: &str| {
                Record::report(row.project.clone(), row.edit_total, row.review_total, report.trim())
            };

            match (target, row.period) {
                (ImportTarget::SinglePeriod(period), _) => Ok(with_period(*period)),
                (ImportTarget::Report(report), _) => Ok(with_report(report.as_str())),
                (ImportTarget::OwnDates | ImportTarget::Mixed { .. }, Some(period)) => {
                    Ok(with_period(period))
                }
                (ImportTarget::Mixed { report }, None) => Ok(with_report(report.as_str())),
                (ImportTarget::OwnDates, None) => Err(Error::validation(format!(
                    "row for '{}' has no month",
                    row.project
                ))),
            }
        })
        .collect()
}

/// Report name suggested to the user for a file
pub fn suggested_report_name(file_name: &str, kind: ImportKind) -> String {
    match kind {
        ImportKind::Mixed => format!("Aggregated from {file_name}"),
        ImportKind::Dated | ImportKind::Undated => format!("Report from {file_name}"),
    }
}

/// Decode a JSON export: an array of records
pub fn decode_json(text: &str) -> CoreResult<Vec<Record>> {
    let value: serde_json::Value = serde_json::from_str(text)
        .map_err(|e| Error::import_format(format!("invalid JSON: {e}")))?;
    if !value.is_array() {
        return Err(Error::import_format("expected a JSON array of records"));
    }
    serde_json::from_value(value).map_err(|e| Error::import_format(e.to_string()))
}

/// Parsed contents of an import file
#[derive(Debug, Clone)]
pub enum ImportSource {
    Csv(DecodedImport),
    /// Complete records that replace the collection
    Json(Vec<Record>),
}

/// Read and decode an import file, choosing the codec by extension
pub fn read_import_file(path: &Path) -> Result<ImportSource> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read import file {}", path.display()))?;

    match extension.as_str() {
        "csv" => Ok(ImportSource::Csv(decode_csv(&text)?)),
        "json" => Ok(ImportSource::Json(decode_json(&text)?)),
        _ => Err(Error::import_format(format!(
            "unsupported file type '{}': expected .csv or .json",
            path.display()
        ))
        .into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::decode::ImportRow;

    fn row(project: &str, period: Option<Period>) -> ImportRow {
        ImportRow {
            project: project.to_string(),
            edit_total: 2,
            review_total: 1,
            period,
        }
    }

    fn decoded(rows: Vec<ImportRow>) -> DecodedImport {
        DecodedImport {
            has_dated_rows: rows.iter().any(|r| r.period.is_some()),
            has_undated_rows: rows.iter().any(|r| r.period.is_none()),
            rows,
        }
    }

    fn march() -> Period {
        Period::new(2024, 2).unwrap()
    }

    #[test]
    fn test_classify() {
        assert!(matches!(
            classify(&DecodedImport::default()),
            Err(Error::ImportFormat(_))
        ));

        let dated = decoded(vec![row("A", Some(march()))]);
        assert_eq!(classify(&dated).unwrap().follow_up, FollowUp::None);

        let undated = decoded(vec![row("A", None)]);
        assert_eq!(classify(&undated).unwrap().kind, ImportKind::Undated);
        assert_eq!(classify(&undated).unwrap().follow_up, FollowUp::PeriodOrReport);

        let mixed = decoded(vec![row("A", Some(march())), row("B", None)]);
        assert_eq!(classify(&mixed).unwrap().follow_up, FollowUp::ReportForUndated);
    }

    #[test]
    fn test_own_dates_requires_dated_file() {
        let undated = decoded(vec![row("A", None)]);
        assert!(matches!(
            materialize(&undated, &ImportTarget::OwnDates),
            Err(Error::Validation(_))
        ));

        let dated = decoded(vec![row("A", Some(march()))]);
        let records = materialize(&dated, &ImportTarget::OwnDates).unwrap();
        assert_eq!(records, vec![Record::dated("A", 2, 1, march())]);
    }

    #[test]
    fn test_single_period_overrides_row_dates() {
        let april = Period::new(2024, 3).unwrap();
        let mixed = decoded(vec![row("A", Some(march())), row("B", None)]);
        let records = materialize(&mixed, &ImportTarget::SinglePeriod(april)).unwrap();
        assert!(records.iter().all(|r| r.period() == Some(april)));
    }

    #[test]
    fn test_mixed_target() {
        let mixed = decoded(vec![row("A", Some(march())), row("B", None)]);
        let records = materialize(
            &mixed,
            &ImportTarget::Mixed {
                report: " Q1 ".to_string(),
            },
        )
        .unwrap();
        assert_eq!(records[0], Record::dated("A", 2, 1, march()));
        assert_eq!(records[1], Record::report("B", 2, 1, "Q1"));

        let undated = decoded(vec![row("B", None)]);
        assert!(materialize(
            &undated,
            &ImportTarget::Mixed {
                report: "Q1".to_string()
            }
        )
        .is_err());
    }

    #[test]
    fn test_blank_report_name_is_rejected() {
        let undated = decoded(vec![row("A", None)]);
        assert!(materialize(&undated, &ImportTarget::Report("  ".to_string())).is_err());
    }

    #[test]
    fn test_decode_json() {
        let records = decode_json(
            r#"[{"Project":"A","Edit_total":3,"Review_total":1,"year":2024,"month":0},
                {"Project":"B","Edit_total":1,"Review_total":0,"reportName":"Q1"}]"#,
        )
        .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].report_name(), Some("Q1"));

        assert!(matches!(decode_json(r#"{"Project":"A"}"#), Err(Error::ImportFormat(_))));
        assert!(matches!(decode_json("not json"), Err(Error::ImportFormat(_))));
    }

    #[test]
    fn test_suggested_report_name() {
        assert_eq!(
            suggested_report_name("march.csv", ImportKind::Undated),
            "Report from march.csv"
        );
        assert_eq!(
            suggested_report_name("march.csv", ImportKind::Mixed),
            "Aggregated from march.csv"
        );
    }
}
