//! Snapshot service - named copies of the dataset
//!
//! Snapshots live next to the current dataset in whichever storage backend
//! is configured. Destructive operations hand back a [`SnapshotUndo`] holding
//! everything they removed.

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use serde::Serialize;

use crate::domain::result::Error;
use crate::domain::Collection;
use crate::ports::{check_snapshot_name, Storage};

/// Snapshots removed by a delete or clear
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotUndo {
    pub snapshots: Vec<(String, Collection)>,
}

impl SnapshotUndo {
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SnapshotInfo {
    pub name: String,
    pub records: usize,
}

/// Snapshot management over a storage backend
pub struct SnapshotService {
    storage: Arc<dyn Storage>,
}

impl SnapshotService {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    fn exists(&self, name: &str) -> Result<bool> {
        Ok(self.storage.list_snapshots()?.iter().any(|n| n == name))
    }

    /// Save a new snapshot; an existing name must be overwritten explicitly
    pub fn save(&self, name: &str, collection: &Collection) -> Result<()> {
        let name = name.trim();
        check_snapshot_name(name)?;
        if self.exists(name)? {
            return Err(Error::conflict(format!(
                "snapshot '{name}' already exists; overwrite it instead"
            ))
            .into());
        }
        self.storage
            .save_snapshot(name, collection)
            .with_context(|| format!("Failed to save snapshot '{name}'"))
    }

    /// Replace an existing snapshot with the given collection
    pub fn overwrite(&self, name: &str, collection: &Collection) -> Result<()> {
        if !self.exists(name)? {
            return Err(Error::not_found(format!("snapshot '{name}'")).into());
        }
        self.storage
            .save_snapshot(name, collection)
            .with_context(|| format!("Failed to overwrite snapshot '{name}'"))
    }

    pub fn load(&self, name: &str) -> Result<Collection> {
        match self.storage.load_snapshot(name)? {
            Some(collection) => Ok(collection),
            None => Err(Error::not_found(format!("snapshot '{name}'")).into()),
        }
    }

    pub fn list(&self) -> Result<Vec<String>> {
        Ok(self.storage.list_snapshots()?)
    }

    /// Snapshot names with their record counts
    pub fn list_with_sizes(&self) -> Result<Vec<SnapshotInfo>> {
        self.list()?
            .into_iter()
            .map(|name| {
                let records = self.load(&name)?.len();
                Ok(SnapshotInfo { name, records })
            })
            .collect()
    }

    pub fn rename(&self, from: &str, to: &str) -> Result<()> {
        let to = to.trim();
        check_snapshot_name(to)?;
        if from == to {
            return Ok(());
        }
        if self.exists(to)? {
            bail!("snapshot '{}' already exists", to);
        }
        Ok(self.storage.rename_snapshot(from, to)?)
    }

    /// Delete one snapshot, returning it for undo
    pub fn delete(&self, name: &str) -> Result<SnapshotUndo> {
        let collection = self.load(name)?;
        self.storage.delete_snapshot(name)?;
        Ok(SnapshotUndo {
            snapshots: vec![(name.to_string(), collection)],
        })
    }

    /// Delete every snapshot, returning them all for undo
    pub fn clear(&self) -> Result<SnapshotUndo> {
        let mut undo = SnapshotUndo::default();
        for name in self.list()? {
            let collection = self.load(&name)?;
            self.storage.delete_snapshot(&name)?;
            undo.snapshots.push((name, collection));
        }
        Ok(undo)
    }

    /// Re-save snapshots removed by `delete` or `clear`
    pub fn restore(&self, undo: SnapshotUndo) -> Result<usize> {
        let count = undo.snapshots.len();
        for (name, collection) in undo.snapshots {
            self.storage.save_snapshot(&name, &collection)?;
        }
        Ok(count)
    }
}
