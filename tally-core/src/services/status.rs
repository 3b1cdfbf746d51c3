//! Status service - dataset summaries

use std::collections::HashSet;
use std::sync::Arc;

use anyhow::Result;
use serde::Serialize;

use crate::domain::{report_names, Collection};
use crate::ports::Storage;
use crate::services::aggregate::totals;

/// Status service for dataset summaries
pub struct StatusService {
    storage: Arc<dyn Storage>,
}

impl StatusService {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Get overall status summary
    pub fn get_status(&self, collection: &Collection) -> Result<StatusSummary> {
        let snapshots = self.storage.list_snapshots()?;
        let totals = totals(collection);

        let dated: Vec<_> = collection.iter().filter_map(|r| r.period()).collect();
        let projects: HashSet<&str> = collection.iter().map(|r| r.project.as_str()).collect();

        Ok(StatusSummary {
            storage: self.storage.name().to_string(),
            total_records: collection.len(),
            dated_records: dated.len(),
            report_records: collection.len() - dated.len(),
            total_projects: projects.len(),
            edit_total: totals.edit,
            review_total: totals.review,
            reports: report_names(collection),
            total_snapshots: snapshots.len(),
            date_range: DateRange {
                earliest: dated.iter().min().map(|p| p.key()),
                latest: dated.iter().max().map(|p| p.key()),
            },
        })
    }
}

#[derive(Debug, Serialize)]
pub struct StatusSummary {
    pub storage: String,
    pub total_records: usize,
    pub dated_records: usize,
    pub report_records: usize,
    pub total_projects: usize,
    pub edit_total: u64,
    pub review_total: u64,
    pub reports: Vec<String>,
    pub total_snapshots: usize,
    pub date_range: DateRange,
}

#[derive(Debug, Serialize)]
pub struct DateRange {
    pub earliest: Option<String>,
    pub latest: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::LocalStore;
    use crate::domain::{Period, Record};
    use tempfile::tempdir;

    #[test]
    fn test_get_status() {
        let dir = tempdir().unwrap();
        let storage = Arc::new(LocalStore::new(dir.path()).unwrap());
        let collection = Collection::from_records(vec![
            Record::dated("A", 3, 1, Period::new(2024, 4).unwrap()),
            Record::dated("A", 1, 0, Period::new(2023, 10).unwrap()),
            Record::report("B", 2, 2, "Q1"),
        ]);
        storage.save_snapshot("march", &collection).unwrap();

        let status = StatusService::new(storage).get_status(&collection).unwrap();
        assert_eq!(status.storage, "local");
        assert_eq!(status.total_records, 3);
        assert_eq!(status.dated_records, 2);
        assert_eq!(status.report_records, 1);
        assert_eq!(status.total_projects, 2);
        assert_eq!((status.edit_total, status.review_total), (6, 3));
        assert_eq!(status.reports, vec!["Q1"]);
        assert_eq!(status.total_snapshots, 1);
        assert_eq!(status.date_range.earliest.as_deref(), Some("2023-11"));
        assert_eq!(status.date_range.latest.as_deref(), Some("2024-05"));
    }
}
