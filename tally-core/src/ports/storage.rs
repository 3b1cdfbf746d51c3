//! Storage port - persistence of the current dataset and named snapshots

use crate::domain::result::{Error, Result};
use crate::domain::Collection;

/// Key of the current dataset in key-value stores
pub const CURRENT_KEY: &str = "chartData";

/// Prefix of named snapshot keys (`chartData_<name>`)
pub const SNAPSHOT_KEY_PREFIX: &str = "chartData_";

/// Dataset persistence
///
/// Storage is a best-effort mirror of the in-memory collection. A failed write
/// never changes the collection the caller holds.
pub trait Storage: Send + Sync {
    /// Backend name for messages and logs ("local", "remote")
    fn name(&self) -> &str;

    /// Read the current dataset, `None` when nothing has been stored yet
    fn read_current(&self) -> Result<Option<Collection>>;

    /// Replace the stored current dataset
    fn write_current(&self, collection: &Collection) -> Result<()>;

    /// Store a named snapshot, replacing any snapshot with the same name
    fn save_snapshot(&self, name: &str, collection: &Collection) -> Result<()>;

    /// Load a named snapshot, `None` when it does not exist
    fn load_snapshot(&self, name: &str) -> Result<Option<Collection>>;

    /// Snapshot names, sorted
    fn list_snapshots(&self) -> Result<Vec<String>>;

    /// Rename a snapshot; fails with `NotFound` when `from` does not exist
    fn rename_snapshot(&self, from: &str, to: &str) -> Result<()>;

    /// Delete a snapshot; deleting a missing snapshot is not an error
    fn delete_snapshot(&self, name: &str) -> Result<()>;
}

/// Reject snapshot names that cannot be used as a key or file name
pub fn check_snapshot_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::validation("snapshot name must not be empty"));
    }
    if name.contains(|c: char| c == '/' || c == '\\') || name.starts_with('.') {
        return Err(Error::validation(format!(
            "snapshot name '{name}' must not contain path separators or start with '.'"
        )));
    }
    Ok(())
}
