//! Local key-value store - one JSON file per key in the data directory
//!
//! The current dataset lives in `chartData.json`, snapshots in
//! `chartData_<name>.json`. Writes go through a temporary file and a rename,
//! under an exclusive lock on `.store.lock`.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use fs2::FileExt;

use crate::domain::result::{Error, Result};
use crate::domain::Collection;
use crate::ports::{check_snapshot_name, Storage, CURRENT_KEY, SNAPSHOT_KEY_PREFIX};

const LOCK_FILE: &str = ".store.lock";

/// Maximum number of attempts to take the store lock
const MAX_RETRIES: u32 = 5;

/// Initial retry delay in milliseconds (doubles each retry: 50, 100, 200, 400ms)
const INITIAL_RETRY_DELAY_MS: u64 = 50;

/// Directory-backed store
#[derive(Debug, Clone)]
pub struct LocalStore {
    dir: PathBuf,
}

impl LocalStore {
    /// Open the store, creating the directory if needed
    pub fn new(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    fn snapshot_path(&self, name: &str) -> PathBuf {
        self.key_path(&format!("{SNAPSHOT_KEY_PREFIX}{name}"))
    }

    /// Hold an exclusive lock on the store while `f` runs
    ///
    /// Retries with exponential backoff when another process holds the lock.
    fn with_lock<T>(&self, f: impl FnOnce() -> Result<T>) -> Result<T> {
        let lock = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(self.dir.join(LOCK_FILE))?;

        let mut attempt = 0;
        loop {
            match lock.try_lock_exclusive() {
                Ok(()) => break,
                Err(_) if attempt < MAX_RETRIES - 1 => {
                    thread::sleep(Duration::from_millis(INITIAL_RETRY_DELAY_MS * 2u64.pow(attempt)));
                    attempt += 1;
                }
                Err(e) => {
                    return Err(Error::storage(format!(
                        "store at {} is busy: {e}",
                        self.dir.display()
                    )))
                }
            }
        }

        let result = f();
        let _ = lock.unlock();
        result
    }

    fn read_key(&self, path: &Path) -> Result<Option<Collection>> {
        if !path.exists() {
            return Ok(None);
        }
        let text = fs::read_to_string(path)?;
        if text.trim().is_empty() {
            return Ok(Some(Collection::new()));
        }
        let collection = serde_json::from_str(&text).map_err(|e| {
            Error::storage(format!("{} is not a valid dataset: {e}", path.display()))
        })?;
        Ok(Some(collection))
    }

    fn write_key(&self, path: &Path, collection: &Collection) -> Result<()> {
        let json = serde_json::to_vec_pretty(collection)?;
        let tmp_path = path.with_extension("json.tmp");

        self.with_lock(|| {
            let mut file = File::create(&tmp_path)?;
            file.write_all(&json)?;
            file.sync_all()?;
            fs::rename(&tmp_path, path)?;
            Ok(())
        })
    }
}

impl Storage for LocalStore {
    fn name(&self) -> &str {
        "local"
    }

    fn read_current(&self) -> Result<Option<Collection>> {
        self.read_key(&self.key_path(CURRENT_KEY))
    }

    fn write_current(&self, collection: &Collection) -> Result<()> {
        self.write_key(&self.key_path(CURRENT_KEY), collection)
    }

    fn save_snapshot(&self, name: &str, collection: &Collection) -> Result<()> {
        check_snapshot_name(name)?;
        self.write_key(&self.snapshot_path(name), collection)
    }

    fn load_snapshot(&self, name: &str) -> Result<Option<Collection>> {
        check_snapshot_name(name)?;
        self.read_key(&self.snapshot_path(name))
    }

    fn list_snapshots(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let file_name = entry?.file_name();
            let Some(file_name) = file_name.to_str() else {
                continue;
            };
            let name = file_name
                .strip_prefix(SNAPSHOT_KEY_PREFIX)
                .and_then(|rest| rest.strip_suffix(".json"));
            if let Some(name) = name.filter(|n| !n.is_empty()) {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    fn rename_snapshot(&self, from: &str, to: &str) -> Result<()> {
        check_snapshot_name(from)?;
        check_snapshot_name(to)?;
        let from_path = self.snapshot_path(from);
        if !from_path.exists() {
            return Err(Error::not_found(format!("snapshot '{from}'")));
        }
        let to_path = self.snapshot_path(to);
        self.with_lock(|| Ok(fs::rename(&from_path, &to_path)?))
    }

    fn delete_snapshot(&self, name: &str) -> Result<()> {
        check_snapshot_name(name)?;
        let path = self.snapshot_path(name);
        self.with_lock(|| match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Period, Record};
    use tempfile::tempdir;

    fn sample() -> Collection {
        Collection::from_records(vec![
            Record::dated("Foo, Inc", 10, 5, Period::new(2024, 2).unwrap()),
            Record::report("Docs", 1, 0, "Q1"),
        ])
    }

    #[test]
    fn test_current_round_trip() {
        let dir = tempdir().unwrap();
        let store = LocalStore::new(dir.path()).unwrap();

        assert_eq!(store.read_current().unwrap(), None);
        store.write_current(&sample()).unwrap();
        assert_eq!(store.read_current().unwrap(), Some(sample()));
        assert!(dir.path().join("chartData.json").exists());
    }

    #[test]
    fn test_snapshot_keys() {
        let dir = tempdir().unwrap();
        let store = LocalStore::new(dir.path()).unwrap();

        store.save_snapshot("march", &sample()).unwrap();
        assert!(dir.path().join("chartData_march.json").exists());
        // the current dataset is not a snapshot
        store.write_current(&sample()).unwrap();
        assert_eq!(store.list_snapshots().unwrap(), vec!["march"]);
    }

    #[test]
    fn test_rename_and_delete() {
        let dir = tempdir().unwrap();
        let store = LocalStore::new(dir.path()).unwrap();

        store.save_snapshot("march", &sample()).unwrap();
        store.rename_snapshot("march", "april").unwrap();
        assert_eq!(store.load_snapshot("march").unwrap(), None);
        assert_eq!(store.load_snapshot("april").unwrap(), Some(sample()));
        assert!(matches!(
            store.rename_snapshot("march", "may"),
            Err(Error::NotFound(_))
        ));

        store.delete_snapshot("april").unwrap();
        store.delete_snapshot("april").unwrap();
        assert!(store.list_snapshots().unwrap().is_empty());
    }

    #[test]
    fn test_invalid_file_is_a_storage_error() {
        let dir = tempdir().unwrap();
        let store = LocalStore::new(dir.path()).unwrap();
        fs::write(dir.path().join("chartData.json"), "{\"not\": \"an array\"}").unwrap();
        assert!(matches!(store.read_current(), Err(Error::Storage(_))));
    }
}
