//! Object client over a mounted or synced folder

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::domain::result::Result;
use crate::ports::ObjectClient;

/// Folders are subdirectories of `root`, files are plain files inside them
#[derive(Debug, Clone)]
pub struct DirObjectClient {
    root: PathBuf,
}

impl DirObjectClient {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }

    fn folder_path(&self, folder: &str) -> PathBuf {
        self.root.join(folder)
    }
}

impl ObjectClient for DirObjectClient {
    fn list(&self, folder: &str) -> Result<Vec<String>> {
        let entries = match fs::read_dir(self.folder_path(folder)) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                if let Some(name) = entry.file_name().to_str() {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    fn download(&self, folder: &str, name: &str) -> Result<Option<Vec<u8>>> {
        match fs::read(self.folder_path(folder).join(name)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn upload(&self, folder: &str, name: &str, contents: &[u8]) -> Result<()> {
        let folder = self.folder_path(folder);
        fs::create_dir_all(&folder)?;
        fs::write(folder.join(name), contents)?;
        Ok(())
    }

    fn delete(&self, folder: &str, name: &str) -> Result<()> {
        match fs::remove_file(self.folder_path(folder).join(name)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn rename(&self, folder: &str, from: &str, to: &str) -> Result<()> {
        let folder = self.folder_path(folder);
        fs::rename(folder.join(from), folder.join(to))?;
        Ok(())
    }
}
