//! Reconciliation engine - merges incoming records into the collection
//!
//! Every path that adds records goes through [`add_or_update`], so the
//! collection never ends up holding two records with the same identity.
//! Conflicts that need a human decision are split into a pure detection phase
//! and an apply phase; the prompt itself belongs to the caller.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::result::{Error, Result};
use crate::domain::{Collection, Record};

/// What to do when an incoming record matches an existing one
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictMode {
    /// Add the incoming totals to the existing ones
    #[default]
    Merge,
    /// Replace the existing totals
    Overwrite,
    /// Keep the existing record untouched
    Skip,
}

impl FromStr for ConflictMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "merge" => Ok(Self::Merge),
            "overwrite" => Ok(Self::Overwrite),
            "skip" => Ok(Self::Skip),
            other => Err(Error::validation(format!(
                "unknown conflict mode '{other}': expected merge, overwrite or skip"
            ))),
        }
    }
}

/// Result of reconciling one record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Inserted,
    Merged,
    Overwritten,
    Skipped,
}

/// Insert `record`, or reconcile it with the record sharing its identity
pub fn add_or_update(collection: &mut Collection, record: Record, mode: ConflictMode) -> Outcome {
    let Some(index) = collection.position_of(&record) else {
        collection.push(record);
        return Outcome::Inserted;
    };

    match (mode, collection.get_mut(index)) {
        (ConflictMode::Overwrite, Some(existing)) => {
            existing.take_totals(&record);
            Outcome::Overwritten
        }
        (ConflictMode::Merge, Some(existing)) => {
            existing.absorb(&record);
            Outcome::Merged
        }
        (ConflictMode::Skip, _) | (_, None) => Outcome::Skipped,
    }
}

/// An existing record that a manual entry would collide with
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Conflict {
    pub index: usize,
    /// Snapshot of the existing record at detection time
    pub existing: Record,
}

/// Answer to "replace the existing values?"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManualDecision {
    /// Replace the existing totals
    Accept,
    /// Add to the existing totals
    Decline,
}

impl From<ManualDecision> for ConflictMode {
    fn from(decision: ManualDecision) -> Self {
        match decision {
            ManualDecision::Accept => Self::Overwrite,
            ManualDecision::Decline => Self::Merge,
        }
    }
}

/// Find the record a manual entry would collide with
pub fn detect_conflict(collection: &Collection, record: &Record) -> Option<Conflict> {
    collection.position_of(record).map(|index| Conflict {
        index,
        existing: collection.records()[index].clone(),
    })
}

/// Apply a decision to a previously detected conflict
///
/// Fails with a conflict error when the collection changed since detection.
pub fn resolve(
    collection: &mut Collection,
    record: Record,
    conflict: &Conflict,
    decision: ManualDecision,
) -> Result<Outcome> {
    let current = collection.get(conflict.index);
    if current != Some(&conflict.existing) || !conflict.existing.same_identity(&record) {
        return Err(Error::conflict(format!(
            "record for '{}' changed since the conflict was detected",
            record.project
        )));
    }
    Ok(add_or_update(collection, record, decision.into()))
}

/// Manual entry: validate, then insert or ask `decide` how to resolve a collision
///
/// `decide` returning `None` cancels the entry and leaves the collection unchanged.
pub fn add_manual(
    collection: &mut Collection,
    record: Record,
    decide: impl FnOnce(&Conflict) -> Option<ManualDecision>,
) -> Result<Option<Outcome>> {
    record.validate()?;

    match detect_conflict(collection, &record) {
        None => Ok(Some(add_or_update(collection, record, ConflictMode::Merge))),
        Some(conflict) => match decide(&conflict) {
            Some(decision) => resolve(collection, record, &conflict, decision).map(Some),
            None => Ok(None),
        },
    }
}

/// An imported record that matches an existing one
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingConflict {
    /// Position of the record in the import
    pub import_index: usize,
    pub incoming: Record,
    pub existing: Record,
}

/// Import split into records that can go straight in and records needing a decision
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReview {
    pub fresh: Vec<Record>,
    pub conflicts: Vec<PendingConflict>,
}

impl ImportReview {
    pub fn has_conflicts(&self) -> bool {
        !self.conflicts.is_empty()
    }
}

/// Split an import into fresh records and conflicts with the collection
///
/// Records repeated within the import itself are not conflicts; they merge
/// when applied.
pub fn review_import(collection: &Collection, records: Vec<Record>) -> ImportReview {
    let mut review = ImportReview::default();
    for (import_index, incoming) in records.into_iter().enumerate() {
        match collection.find(&incoming) {
            Some(existing) => review.conflicts.push(PendingConflict {
                import_index,
                existing: existing.clone(),
                incoming,
            }),
            None => review.fresh.push(incoming),
        }
    }
    review
}

/// Counts per outcome for a batch of reconciled records
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ApplySummary {
    pub inserted: usize,
    pub merged: usize,
    pub overwritten: usize,
    pub skipped: usize,
}

impl ApplySummary {
    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Inserted => self.inserted += 1,
            Outcome::Merged => self.merged += 1,
            Outcome::Overwritten => self.overwritten += 1,
            Outcome::Skipped => self.skipped += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.inserted + self.merged + self.overwritten + self.skipped
    }

    /// Whether anything in the collection changed
    pub fn changed(&self) -> bool {
        self.inserted + self.merged + self.overwritten > 0
    }
}

/// Apply a reviewed import: fresh records merge, conflicts follow `decisions`
///
/// `decisions[i]` answers `review.conflicts[i]`. A mismatched list is rejected
/// before anything is applied.
pub fn apply_review(
    collection: &mut Collection,
    review: ImportReview,
    decisions: &[ConflictMode],
) -> Result<ApplySummary> {
    if decisions.len() != review.conflicts.len() {
        return Err(Error::validation(format!(
            "expected {} conflict decisions, got {}",
            review.conflicts.len(),
            decisions.len()
        )));
    }

    let mut summary = ApplySummary::default();
    for record in review.fresh {
        summary.record(add_or_update(collection, record, ConflictMode::Merge));
    }
    for (conflict, mode) in review.conflicts.into_iter().zip(decisions) {
        summary.record(add_or_update(collection, conflict.incoming, *mode));
    }
    Ok(summary)
}

/// Apply one mode to every record
pub fn apply_batch(
    collection: &mut Collection,
    records: impl IntoIterator<Item = Record>,
    mode: ConflictMode,
) -> ApplySummary {
    let mut summary = ApplySummary::default();
    for record in records {
        summary.record(add_or_update(collection, record, mode));
    }
    summary
}

/// A single-field change to an existing record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordEdit {
    Project(String),
    EditTotal(u64),
    ReviewTotal(u64),
}

/// Edit one record in place
pub fn edit_record(collection: &mut Collection, index: usize, edit: RecordEdit) -> Result<()> {
    let Some(current) = collection.get(index) else {
        return Err(Error::not_found(format!("no record at index {index}")));
    };

    let mut updated = current.clone();
    match edit {
        RecordEdit::Project(project) => {
            let project = project.trim().to_string();
            if project.is_empty() {
                return Err(Error::validation("project name must not be empty"));
            }
            updated.project = project;
            let collides = collection
                .iter()
                .enumerate()
                .any(|(i, other)| i != index && other.same_identity(&updated));
            if collides {
                return Err(Error::conflict(format!(
                    "a record for '{}' with the same period or report already exists",
                    updated.project
                )));
            }
        }
        RecordEdit::EditTotal(total) => updated.edit_total = total,
        RecordEdit::ReviewTotal(total) => updated.review_total = total,
    }

    if let Some(slot) = collection.get_mut(index) {
        *slot = updated;
    }
    Ok(())
}
