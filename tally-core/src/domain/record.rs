//! Record domain model
//!
//! A record is one project's Edit/Review counts, tagged either with a calendar
//! month or with a named report bucket. Never both.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::result::{Error, Result};

/// Calendar month of a dated record
///
/// `month` is zero-based (0 = January) everywhere except CSV files, which use 1-12.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Period {
    year: i32,
    month: u32,
}

impl Period {
    /// Create a period from a zero-based month
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if month > 11 {
            return Err(Error::validation(format!(
                "month must be between 0 and 11, got {month}"
            )));
        }
        Ok(Self { year, month })
    }

    /// Create a period from a one-based month, as written in CSV files
    pub fn from_one_based(year: i32, month: u32) -> Result<Self> {
        if month == 0 {
            return Err(Error::validation("month must be between 1 and 12, got 0"));
        }
        Self::new(year, month - 1)
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    /// Zero-based month
    pub fn month(&self) -> u32 {
        self.month
    }

    /// One-based month number
    pub fn month_number(&self) -> u32 {
        self.month + 1
    }

    /// Sort key in `YYYY-MM` form
    pub fn key(&self) -> String {
        format!("{}-{:02}", self.year, self.month + 1)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

/// Which bucket a record is counted in
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Tag {
    Dated(Period),
    Report(String),
}

/// Identity used for deduplication
///
/// Dated and report records never share a key, even with identical project text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IdentityKey {
    Dated { project: String, period: Period },
    Report { project: String, report: String },
}

/// A project's Edit/Review counts for one period or report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RecordDto", into = "RecordDto")]
pub struct Record {
    pub project: String,
    pub edit_total: u64,
    pub review_total: u64,
    pub tag: Tag,
}

impl Record {
    /// Create a dated record
    pub fn dated(project: impl Into<String>, edit_total: u64, review_total: u64, period: Period) -> Self {
        Self {
            project: project.into(),
            edit_total,
            review_total,
            tag: Tag::Dated(period),
        }
    }

    /// Create a record in a named report bucket
    pub fn report(
        project: impl Into<String>,
        edit_total: u64,
        review_total: u64,
        report: impl Into<String>,
    ) -> Self {
        Self {
            project: project.into(),
            edit_total,
            review_total,
            tag: Tag::Report(report.into()),
        }
    }

    /// Check the entry-form preconditions
    ///
    /// Totals are unsigned, so only the text fields can be invalid.
    pub fn validate(&self) -> Result<()> {
        if self.project.trim().is_empty() {
            return Err(Error::validation("project name must not be empty"));
        }
        if let Tag::Report(name) = &self.tag {
            if name.trim().is_empty() {
                return Err(Error::validation("report name must not be empty"));
            }
        }
        Ok(())
    }

    pub fn identity(&self) -> IdentityKey {
        identity_of(self)
    }

    /// Whether both records denote the same entity
    pub fn same_identity(&self, other: &Record) -> bool {
        same_identity(self, other)
    }

    pub fn period(&self) -> Option<Period> {
        match &self.tag {
            Tag::Dated(period) => Some(*period),
            Tag::Report(_) => None,
        }
    }

    pub fn report_name(&self) -> Option<&str> {
        match &self.tag {
            Tag::Dated(_) => None,
            Tag::Report(name) => Some(name),
        }
    }

    pub fn is_dated(&self) -> bool {
        matches!(self.tag, Tag::Dated(_))
    }

    /// Add another record's totals into this one, saturating at `u64::MAX`
    pub(crate) fn absorb(&mut self, other: &Record) {
        self.edit_total = self.edit_total.saturating_add(other.edit_total);
        self.review_total = self.review_total.saturating_add(other.review_total);
    }

    /// Replace totals with another record's totals
    pub(crate) fn take_totals(&mut self, other: &Record) {
        self.edit_total = other.edit_total;
        self.review_total = other.review_total;
    }
}

/// Compute the identity key of a record
pub fn identity_of(record: &Record) -> IdentityKey {
    match &record.tag {
        Tag::Dated(period) => IdentityKey::Dated {
            project: record.project.clone(),
            period: *period,
        },
        Tag::Report(report) => IdentityKey::Report {
            project: record.project.clone(),
            report: report.clone(),
        },
    }
}

/// Exact project match plus matching tag of the same variant
pub fn same_identity(a: &Record, b: &Record) -> bool {
    a.project == b.project && a.tag == b.tag
}

/// JSON shape shared with the browser dashboard exports
#[derive(Debug, Serialize, Deserialize)]
struct RecordDto {
    #[serde(rename = "Project")]
    project: String,
    #[serde(rename = "Edit_total", default)]
    edit_total: u64,
    #[serde(rename = "Review_total", default)]
    review_total: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    month: Option<u32>,
    #[serde(rename = "reportName", default, skip_serializing_if = "Option::is_none")]
    report_name: Option<String>,
}

impl TryFrom<RecordDto> for Record {
    type Error = Error;

    fn try_from(dto: RecordDto) -> Result<Self> {
        let tag = match (dto.year, dto.month, dto.report_name) {
            (Some(year), Some(month), None) => Tag::Dated(Period::new(year, month)?),
            (None, None, Some(report)) => Tag::Report(report),
            (_, _, Some(_)) => {
                return Err(Error::validation(format!(
                    "record for '{}' carries both a date and a report name",
                    dto.project
                )))
            }
            _ => {
                return Err(Error::validation(format!(
                    "record for '{}' has neither a complete date nor a report name",
                    dto.project
                )))
            }
        };

        Ok(Self {
            project: dto.project,
            edit_total: dto.edit_total,
            review_total: dto.review_total,
            tag,
        })
    }
}

impl From<Record> for RecordDto {
    fn from(record: Record) -> Self {
        let (year, month, report_name) = match record.tag {
            Tag::Dated(period) => (Some(period.year()), Some(period.month()), None),
            Tag::Report(name) => (None, None, Some(name)),
        };
        Self {
            project: record.project,
            edit_total: record.edit_total,
            review_total: record.review_total,
            year,
            month,
            report_name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn period(year: i32, month: u32) -> Period {
        Period::new(year, month).unwrap()
    }

    #[test]
    fn test_period_bounds() {
        assert!(Period::new(2024, 11).is_ok());
        assert!(Period::new(2024, 12).is_err());
        assert_eq!(Period::from_one_based(2024, 3).unwrap().month(), 2);
        assert!(Period::from_one_based(2024, 0).is_err());
        assert_eq!(period(2024, 0).key(), "2024-01");
    }

    #[test]
    fn test_identity_distinguishes_variants() {
        let dated = Record::dated("A", 1, 1, period(2024, 0));
        let report = Record::report("A", 1, 1, "2024-01");
        assert!(!dated.same_identity(&report));
        assert_ne!(dated.identity(), report.identity());
    }

    #[test]
    fn test_identity_ignores_totals_but_not_case() {
        let a = Record::dated("Alpha", 1, 2, period(2024, 5));
        let b = Record::dated("Alpha", 9, 9, period(2024, 5));
        let c = Record::dated("alpha", 1, 2, period(2024, 5));
        assert!(a.same_identity(&b));
        assert!(!a.same_identity(&c));
    }

    #[test]
    fn test_validate() {
        assert!(Record::dated("  ", 0, 0, period(2024, 0)).validate().is_err());
        assert!(Record::report("A", 0, 0, " ").validate().is_err());
        assert!(Record::report("A", 0, 0, "Q1").validate().is_ok());
    }

    #[test]
    fn test_json_shape() {
        let dated = Record::dated("Foo", 10, 5, period(2024, 2));
        let json = serde_json::to_value(&dated).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"Project": "Foo", "Edit_total": 10, "Review_total": 5, "year": 2024, "month": 2})
        );

        let report = Record::report("Foo", 1, 0, "Q1");
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"Project": "Foo", "Edit_total": 1, "Review_total": 0, "reportName": "Q1"})
        );
    }

    #[test]
    fn test_json_rejects_ambiguous_tags() {
        let both = r#"{"Project":"A","Edit_total":1,"Review_total":1,"year":2024,"month":1,"reportName":"Q"}"#;
        assert!(serde_json::from_str::<Record>(both).is_err());

        let neither = r#"{"Project":"A","Edit_total":1,"Review_total":1}"#;
        assert!(serde_json::from_str::<Record>(neither).is_err());

        let missing_totals = r#"{"Project":"A","reportName":"Q"}"#;
        let record: Record = serde_json::from_str(missing_totals).unwrap();
        assert_eq!((record.edit_total, record.review_total), (0, 0));
    }
}
