//! Aggregation engine - chart-ready series from filtered records
//!
//! Pure functions over borrowed records. Grouping uses ordered maps with
//! explicit key types so the output order never depends on hashing.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::Month;
use serde::Serialize;

use crate::domain::report::caseless_cmp;
use crate::domain::{Period, Record};

/// Parallel label / edit / review vectors, one entry per group
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Series {
    pub labels: Vec<String>,
    pub edit: Vec<u64>,
    pub review: Vec<u64>,
}

impl Series {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    fn push(&mut self, label: String, edit: u64, review: u64) {
        self.labels.push(label);
        self.edit.push(edit);
        self.review.push(review);
    }
}

/// Group key for the by-project view
///
/// Ordered by project label case-insensitively, then the exact label, then
/// the report name (dated records sort before any report).
#[derive(Debug, Clone, PartialEq, Eq)]
struct ProjectGroupKey {
    project: String,
    report: Option<String>,
}

impl Ord for ProjectGroupKey {
    fn cmp(&self, other: &Self) -> Ordering {
        caseless_cmp(&self.project, &other.project).then_with(|| self.report.cmp(&other.report))
    }
}

impl PartialOrd for ProjectGroupKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Sum totals per `(report, project)` and label each group with its project
pub fn aggregate_by_project<'a>(records: impl IntoIterator<Item = &'a Record>) -> Series {
    let mut groups: BTreeMap<ProjectGroupKey, (u64, u64)> = BTreeMap::new();
    for record in records {
        let key = ProjectGroupKey {
            project: record.project.clone(),
            report: record.report_name().map(str::to_string),
        };
        let sums = groups.entry(key).or_default();
        sums.0 = sums.0.saturating_add(record.edit_total);
        sums.1 = sums.1.saturating_add(record.review_total);
    }

    let mut series = Series::default();
    for (key, (edit, review)) in groups {
        series.push(key.project, edit, review);
    }
    series
}

/// Localized month names for chart labels
pub trait MonthNames {
    /// Name of a zero-based month
    fn month_name(&self, month: u32) -> String;
}

/// English month names from chrono
#[derive(Debug, Clone, Copy, Default)]
pub struct EnglishMonths;

impl MonthNames for EnglishMonths {
    fn month_name(&self, month: u32) -> String {
        month
            .checked_add(1)
            .and_then(|number| u8::try_from(number).ok())
            .and_then(|number| Month::try_from(number).ok())
            .map(|m| m.name().to_string())
            .unwrap_or_else(|| format!("Month {}", u64::from(month) + 1))
    }
}

/// Sum dated records per month in chronological order
///
/// Aggregated records are ignored. Labels read `"<month name> <year>"`.
pub fn aggregate_by_month<'a>(
    records: impl IntoIterator<Item = &'a Record>,
    names: &impl MonthNames,
) -> Series {
    let mut groups: BTreeMap<Period, (u64, u64)> = BTreeMap::new();
    for record in records {
        if let Some(period) = record.period() {
            let sums = groups.entry(period).or_default();
            sums.0 = sums.0.saturating_add(record.edit_total);
            sums.1 = sums.1.saturating_add(record.review_total);
        }
    }

    let mut series = Series::default();
    for (period, (edit, review)) in groups {
        let label = format!("{} {}", names.month_name(period.month()), period.year());
        series.push(label, edit, review);
    }
    series
}

/// Which count a single-measure chart shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Measure {
    Edit,
    Review,
}

/// Labels and values of one pie chart
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PieSeries {
    pub labels: Vec<String>,
    pub values: Vec<u64>,
}

/// Entries of a by-project series with a positive value for `measure`
pub fn pie_slices(series: &Series, measure: Measure) -> PieSeries {
    let values = match measure {
        Measure::Edit => &series.edit,
        Measure::Review => &series.review,
    };

    let mut pie = PieSeries::default();
    for (label, value) in series.labels.iter().zip(values) {
        if *value > 0 {
            pie.labels.push(label.clone());
            pie.values.push(*value);
        }
    }
    pie
}

/// Summary counters over a set of records
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Totals {
    pub edit: u64,
    pub review: u64,
}

pub fn totals<'a>(records: impl IntoIterator<Item = &'a Record>) -> Totals {
    records.into_iter().fold(Totals::default(), |acc, record| Totals {
        edit: acc.edit.saturating_add(record.edit_total),
        review: acc.review.saturating_add(record.review_total),
    })
}

/// Mark series labels containing `term`, case-insensitively
///
/// A blank term highlights nothing.
pub fn highlight(series: &Series, term: &str) -> Vec<bool> {
    let term = term.trim().to_lowercase();
    series
        .labels
        .iter()
        .map(|label| !term.is_empty() && label.to_lowercase().contains(&term))
        .collect()
}
