//! Object client port - flat folders of named blobs

use crate::domain::result::Result;

/// Client for a folder-based object store
///
/// Credentials are the implementation's concern; the store only passes
/// folder and file names through.
pub trait ObjectClient: Send + Sync {
    /// Names of the files directly inside `folder`; an absent folder is empty
    fn list(&self, folder: &str) -> Result<Vec<String>>;

    /// File contents, `None` when the file does not exist
    fn download(&self, folder: &str, name: &str) -> Result<Option<Vec<u8>>>;

    /// Create or replace a file
    fn upload(&self, folder: &str, name: &str, contents: &[u8]) -> Result<()>;

    /// Delete a file; a missing file is not an error
    fn delete(&self, folder: &str, name: &str) -> Result<()>;

    /// Rename a file inside `folder`
    fn rename(&self, folder: &str, from: &str, to: &str) -> Result<()>;
}
