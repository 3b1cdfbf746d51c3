//! Record collection
//!
//! Insertion order is kept (it drives list display and index-based batch
//! operations). No two records share an identity key once an operation has
//! completed; mutation is crate-private so only the reconciliation engine and
//! batch operations can change the contents.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::record::{IdentityKey, Record};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Record>", into = "Vec<Record>")]
pub struct Collection {
    records: Vec<Record>,
}

impl Collection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a collection from loaded or imported records
    ///
    /// Records that share an identity are folded into the first occurrence by
    /// adding their totals.
    pub fn from_records(records: Vec<Record>) -> Self {
        let mut collection = Self { records };
        collection.coalesce();
        collection
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Record> {
        self.records.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }

    /// Index of the record with the same identity as `record`
    pub fn position_of(&self, record: &Record) -> Option<usize> {
        self.records.iter().position(|r| r.same_identity(record))
    }

    pub fn find(&self, record: &Record) -> Option<&Record> {
        self.position_of(record).map(|i| &self.records[i])
    }

    /// Whether every record has a distinct identity key
    pub fn has_unique_identities(&self) -> bool {
        let mut seen = std::collections::HashSet::new();
        self.records.iter().all(|r| seen.insert(r.identity()))
    }

    pub(crate) fn push(&mut self, record: Record) {
        self.records.push(record);
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut Record> {
        self.records.get_mut(index)
    }

    pub(crate) fn remove(&mut self, index: usize) -> Record {
        self.records.remove(index)
    }

    /// Insert at `index`, appending when the index is past the end
    pub(crate) fn insert(&mut self, index: usize, record: Record) {
        let index = index.min(self.records.len());
        self.records.insert(index, record);
    }

    pub(crate) fn replace_all(&mut self, records: Vec<Record>) {
        self.records = records;
    }

    /// Fold records with duplicate identities into their first occurrence
    ///
    /// Returns the number of records folded away.
    pub(crate) fn coalesce(&mut self) -> usize {
        let before = self.records.len();
        let mut positions: HashMap<IdentityKey, usize> = HashMap::with_capacity(before);
        let mut kept: Vec<Record> = Vec::with_capacity(before);

        for record in self.records.drain(..) {
            match positions.get(&record.identity()) {
                Some(&index) => kept[index].absorb(&record),
                None => {
                    positions.insert(record.identity(), kept.len());
                    kept.push(record);
                }
            }
        }

        self.records = kept;
        before - self.records.len()
    }
}

impl From<Vec<Record>> for Collection {
    fn from(records: Vec<Record>) -> Self {
        Self::from_records(records)
    }
}

impl From<Collection> for Vec<Record> {
    fn from(collection: Collection) -> Self {
        collection.records
    }
}

impl<'a> IntoIterator for &'a Collection {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Period;

    #[test]
    fn test_from_records_saturates_folded_totals() {
        let collection: Collection = serde_json::from_str(
            r#"[
                {"Project": "A", "Edit_total": 18446744073709551615, "reportName": "Q1"},
                {"Project": "A", "Edit_total": 3, "Review_total": 4, "reportName": "Q1"}
            ]"#,
        )
        .unwrap();

        assert_eq!(collection.len(), 1);
        assert_eq!(collection.records()[0].edit_total, u64::MAX);
        assert_eq!(collection.records()[0].review_total, 4);
    }

    #[test]
    fn test_from_records_coalesces_duplicates() {
        let jan = Period::new(2024, 0).unwrap();
        let collection = Collection::from_records(vec![
            Record::dated("A", 5, 2, jan),
            Record::report("B", 1, 1, "Q1"),
            Record::dated("A", 3, 1, jan),
        ]);

        assert_eq!(collection.len(), 2);
        assert_eq!(collection.get(0), Some(&Record::dated("A", 8, 3, jan)));
        assert!(collection.has_unique_identities());
    }

    #[test]
    fn test_insert_past_end_appends() {
        let mut collection = Collection::new();
        collection.insert(7, Record::report("A", 0, 0, "Q1"));
        assert_eq!(collection.len(), 1);
    }

    #[test]
    fn test_json_is_a_plain_array() {
        let collection = Collection::from_records(vec![Record::report("A", 1, 2, "Q1")]);
        let json = serde_json::to_string(&collection).unwrap();
        assert!(json.starts_with('['));
        let back: Collection = serde_json::from_str(&json).unwrap();
        assert_eq!(back, collection);
    }
}
