//! Filter engine - selects the records a view shows
//!
//! Filters borrow from the collection and never mutate it.

use std::cmp::Ordering;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::report::{caseless_cmp, natural_cmp};
use crate::domain::result::{Error, Result};
use crate::domain::{Period, Record};

/// Day of the month a dated record stands for in range checks
const RECORD_DAY: u32 = 15;

/// Dashboard view types, as stored in settings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ViewKind {
    #[default]
    Total,
    Monthly,
    SingleMonthProject,
    Aggregated,
}

impl ViewKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Total => "total",
            Self::Monthly => "monthly",
            Self::SingleMonthProject => "singleMonthProject",
            Self::Aggregated => "aggregated",
        }
    }
}

impl FromStr for ViewKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "total" => Ok(Self::Total),
            "monthly" => Ok(Self::Monthly),
            "singleMonthProject" => Ok(Self::SingleMonthProject),
            "aggregated" => Ok(Self::Aggregated),
            other => Err(Error::validation(format!("unknown view type '{other}'"))),
        }
    }
}

/// Inclusive month range; months are zero-based
///
/// Any missing or out-of-range part makes the range select every dated record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeBounds {
    pub start_year: Option<i32>,
    pub start_month: Option<u32>,
    pub end_year: Option<i32>,
    pub end_month: Option<u32>,
}

impl RangeBounds {
    pub fn new(start: Period, end: Period) -> Self {
        Self {
            start_year: Some(start.year()),
            start_month: Some(start.month()),
            end_year: Some(end.year()),
            end_month: Some(end.month()),
        }
    }

    /// First day of the start month and last day of the end month
    fn window(&self) -> Option<(NaiveDate, NaiveDate)> {
        let start = NaiveDate::from_ymd_opt(self.start_year?, self.start_month?.checked_add(1)?, 1)?;
        let end = last_day_of_month(self.end_year?, self.end_month?.checked_add(1)?)?;
        Some((start, end))
    }
}

fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let first_of_next = if month == 12 {
        NaiveDate::from_ymd_opt(year.checked_add(1)?, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month.checked_add(1)?, 1)?
    };
    first_of_next.pred_opt()
}

/// What subset of the collection a view shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewMode {
    /// Records of one report; no selection shows nothing
    Aggregated { report: Option<String> },
    /// Dated records of exactly one month
    SingleMonth(Period),
    /// Dated records within a month range
    Range(RangeBounds),
}

/// Records visible in `mode`, in collection order
pub fn filter<'a>(records: impl IntoIterator<Item = &'a Record>, mode: &ViewMode) -> Vec<&'a Record> {
    let records = records.into_iter();
    match mode {
        ViewMode::Aggregated { report } => match report.as_deref() {
            Some(selected) if !selected.is_empty() => records
                .filter(|r| r.report_name() == Some(selected))
                .collect(),
            _ => Vec::new(),
        },
        ViewMode::SingleMonth(period) => records.filter(|r| r.period() == Some(*period)).collect(),
        ViewMode::Range(bounds) => {
            let window = bounds.window();
            records
                .filter(|r| match (r.period(), window) {
                    (None, _) => false,
                    (Some(_), None) => true,
                    (Some(period), Some((start, end))) => {
                        record_date(period).is_some_and(|date| date >= start && date <= end)
                    }
                })
                .collect()
        }
    }
}

fn record_date(period: Period) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(period.year(), period.month_number(), RECORD_DAY)
}

/// Records whose project contains `term`, case-insensitively
pub fn search<'a>(records: impl IntoIterator<Item = &'a Record>, term: &str) -> Vec<&'a Record> {
    let term = term.trim().to_lowercase();
    records
        .into_iter()
        .filter(|r| term.is_empty() || r.project.to_lowercase().contains(&term))
        .collect()
}

/// Column to sort the record list by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    Project,
    Edit,
    Review,
    /// Period key (`YYYY-MM`) for dated records, report name otherwise
    DateOrReport,
}

impl FromStr for SortField {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "project" => Ok(Self::Project),
            "edit" => Ok(Self::Edit),
            "review" => Ok(Self::Review),
            "date" | "report" | "date-or-report" => Ok(Self::DateOrReport),
            other => Err(Error::validation(format!("unknown sort field '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// Stable sort of a filtered record list
pub fn sort_records(records: &mut [&Record], field: SortField, direction: SortDirection) {
    records.sort_by(|a, b| {
        let ordering = compare(a, b, field);
        match direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
}

fn compare(a: &Record, b: &Record, field: SortField) -> Ordering {
    match field {
        SortField::Project => caseless_cmp(&a.project, &b.project),
        SortField::Edit => a.edit_total.cmp(&b.edit_total),
        SortField::Review => a.review_total.cmp(&b.review_total),
        SortField::DateOrReport => natural_cmp(&date_or_report(a), &date_or_report(b)),
    }
}

fn date_or_report(record: &Record) -> String {
    match (record.period(), record.report_name()) {
        (Some(period), _) => period.key(),
        (None, Some(report)) => report.to_string(),
        (None, None) => String::new(),
    }
}

/// Months that have at least one dated record, newest first
pub fn available_periods<'a>(records: impl IntoIterator<Item = &'a Record>) -> Vec<Period> {
    let mut periods: Vec<Period> = records.into_iter().filter_map(Record::period).collect();
    periods.sort_unstable_by(|a, b| b.cmp(a));
    periods.dedup();
    periods
}

/// Range covering every dated record, if any
pub fn full_range<'a>(records: impl IntoIterator<Item = &'a Record>) -> Option<RangeBounds> {
    let periods = available_periods(records);
    let newest = *periods.first()?;
    let oldest = *periods.last()?;
    Some(RangeBounds::new(oldest, newest))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn period(year: i32, month: u32) -> Period {
        Period::new(year, month).unwrap()
    }

    fn sample() -> Vec<Record> {
        vec![
            Record::dated("Alpha", 1, 1, period(2023, 11)),
            Record::dated("Beta", 2, 2, period(2024, 0)),
            Record::report("Gamma", 3, 3, "Q1"),
            Record::dated("Delta", 4, 4, period(2024, 5)),
            Record::report("Alpha", 5, 5, "Q2"),
        ]
    }

    fn projects(records: &[&Record]) -> Vec<String> {
        records.iter().map(|r| r.project.clone()).collect()
    }

    #[test]
    fn test_aggregated_view() {
        let records = sample();
        let q1 = filter(&records, &ViewMode::Aggregated { report: Some("Q1".into()) });
        assert_eq!(projects(&q1), vec!["Gamma"]);

        assert!(filter(&records, &ViewMode::Aggregated { report: None }).is_empty());
        assert!(filter(&records, &ViewMode::Aggregated { report: Some(String::new()) }).is_empty());
    }

    #[test]
    fn test_single_month_view() {
        let records = sample();
        let jan = filter(&records, &ViewMode::SingleMonth(period(2024, 0)));
        assert_eq!(projects(&jan), vec!["Beta"]);
    }

    #[test]
    fn test_range_is_inclusive_of_whole_months() {
        let records = sample();
        let bounds = RangeBounds::new(period(2023, 11), period(2024, 0));
        let visible = filter(&records, &ViewMode::Range(bounds));
        assert_eq!(projects(&visible), vec!["Alpha", "Beta"]);
    }

    #[test]
    fn test_invalid_range_shows_all_dated_records() {
        let records = sample();
        let bounds = RangeBounds {
            start_year: None,
            start_month: Some(0),
            end_year: Some(2024),
            end_month: Some(0),
        };
        let visible = filter(&records, &ViewMode::Range(bounds));
        assert_eq!(projects(&visible), vec!["Alpha", "Beta", "Delta"]);

        let bounds = RangeBounds {
            start_year: Some(2024),
            start_month: Some(12),
            end_year: Some(2024),
            end_month: Some(0),
        };
        assert_eq!(filter(&records, &ViewMode::Range(bounds)).len(), 3);
    }

    #[test]
    fn test_extreme_month_bounds_show_all_dated_records() {
        let records = sample();
        let bounds = RangeBounds {
            start_year: Some(2024),
            start_month: Some(u32::MAX),
            end_year: Some(2024),
            end_month: Some(u32::MAX),
        };
        assert_eq!(filter(&records, &ViewMode::Range(bounds)).len(), 3);

        let bounds = RangeBounds {
            start_year: Some(2023),
            start_month: Some(0),
            end_year: Some(2024),
            end_month: Some(u32::MAX - 1),
        };
        assert_eq!(filter(&records, &ViewMode::Range(bounds)).len(), 3);
    }

    #[test]
    fn test_reversed_range_is_empty() {
        let records = sample();
        let bounds = RangeBounds::new(period(2024, 5), period(2024, 0));
        assert!(filter(&records, &ViewMode::Range(bounds)).is_empty());
    }

    #[test]
    fn test_view_kind_parsing() {
        assert_eq!("singleMonthProject".parse::<ViewKind>().unwrap(), ViewKind::SingleMonthProject);
        assert_eq!(ViewKind::Aggregated.as_str(), "aggregated");
        assert!("pie".parse::<ViewKind>().is_err());
        let json = serde_json::to_string(&ViewKind::SingleMonthProject).unwrap();
        assert_eq!(json, "\"singleMonthProject\"");
    }

    #[test]
    fn test_search() {
        let records = sample();
        assert_eq!(projects(&search(&records, "ALP")), vec!["Alpha", "Alpha"]);
        assert_eq!(search(&records, "").len(), records.len());
    }

    #[test]
    fn test_sort_by_date_or_report() {
        let records = vec![
            Record::report("A", 0, 0, "Report 10"),
            Record::dated("B", 0, 0, period(2024, 9)),
            Record::report("C", 0, 0, "Report 2"),
            Record::dated("D", 0, 0, period(2024, 1)),
        ];
        let mut view: Vec<&Record> = records.iter().collect();
        sort_records(&mut view, SortField::DateOrReport, SortDirection::Asc);
        assert_eq!(projects(&view), vec!["D", "B", "C", "A"]);

        sort_records(&mut view, SortField::DateOrReport, SortDirection::Desc);
        assert_eq!(projects(&view), vec!["A", "C", "B", "D"]);
    }

    #[test]
    fn test_sort_by_totals_is_stable() {
        let records = sample();
        let mut view: Vec<&Record> = records.iter().collect();
        sort_records(&mut view, SortField::Edit, SortDirection::Desc);
        assert_eq!(projects(&view), vec!["Alpha", "Delta", "Gamma", "Beta", "Alpha"]);
        assert_eq!(view[0].edit_total, 5);
    }

    #[test]
    fn test_available_periods_and_full_range() {
        let records = sample();
        assert_eq!(
            available_periods(&records),
            vec![period(2024, 5), period(2024, 0), period(2023, 11)]
        );
        let range = full_range(&records).unwrap();
        assert_eq!(filter(&records, &ViewMode::Range(range)).len(), 3);
        assert!(full_range(&Vec::<Record>::new()).is_none());
    }
}
