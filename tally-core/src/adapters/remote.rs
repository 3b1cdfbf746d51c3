//! Remote folder store over an [`ObjectClient`]
//!
//! Snapshots are `record_<name>.json` files in one folder (`TransifexReports`
//! by default); the current dataset is `chartData.json` in the same folder.

use crate::domain::result::{Error, Result};
use crate::domain::Collection;
use crate::ports::{check_snapshot_name, ObjectClient, Storage, CURRENT_KEY};

pub const DEFAULT_FOLDER: &str = "TransifexReports";

const SNAPSHOT_FILE_PREFIX: &str = "record_";
const FILE_SUFFIX: &str = ".json";

pub struct RemoteStore<C: ObjectClient> {
    client: C,
    folder: String,
}

impl<C: ObjectClient> RemoteStore<C> {
    pub fn new(client: C, folder: impl Into<String>) -> Self {
        Self {
            client,
            folder: folder.into(),
        }
    }

    pub fn folder(&self) -> &str {
        &self.folder
    }

    fn current_file() -> String {
        format!("{CURRENT_KEY}{FILE_SUFFIX}")
    }

    fn snapshot_file(name: &str) -> String {
        format!("{SNAPSHOT_FILE_PREFIX}{name}{FILE_SUFFIX}")
    }

    fn download(&self, file: &str) -> Result<Option<Collection>> {
        let Some(bytes) = self.client.download(&self.folder, file)? else {
            return Ok(None);
        };
        let collection = serde_json::from_slice(&bytes).map_err(|e| {
            Error::storage(format!("{}/{file} is not a valid dataset: {e}", self.folder))
        })?;
        Ok(Some(collection))
    }

    fn upload(&self, file: &str, collection: &Collection) -> Result<()> {
        let json = serde_json::to_vec(collection)?;
        self.client.upload(&self.folder, file, &json)
    }
}

impl<C: ObjectClient> Storage for RemoteStore<C> {
    fn name(&self) -> &str {
        "remote"
    }

    fn read_current(&self) -> Result<Option<Collection>> {
        self.download(&Self::current_file())
    }

    fn write_current(&self, collection: &Collection) -> Result<()> {
        self.upload(&Self::current_file(), collection)
    }

    fn save_snapshot(&self, name: &str, collection: &Collection) -> Result<()> {
        check_snapshot_name(name)?;
        self.upload(&Self::snapshot_file(name), collection)
    }

    fn load_snapshot(&self, name: &str) -> Result<Option<Collection>> {
        check_snapshot_name(name)?;
        self.download(&Self::snapshot_file(name))
    }

    fn list_snapshots(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = self
            .client
            .list(&self.folder)?
            .iter()
            .filter_map(|file| {
                file.strip_prefix(SNAPSHOT_FILE_PREFIX)
                    .and_then(|rest| rest.strip_suffix(FILE_SUFFIX))
            })
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect();
        names.sort();
        Ok(names)
    }

    fn rename_snapshot(&self, from: &str, to: &str) -> Result<()> {
        check_snapshot_name(from)?;
        check_snapshot_name(to)?;
        let from_file = Self::snapshot_file(from);
        if !self.client.list(&self.folder)?.contains(&from_file) {
            return Err(Error::not_found(format!("snapshot '{from}'")));
        }
        self.client
            .rename(&self.folder, &from_file, &Self::snapshot_file(to))
    }

    fn delete_snapshot(&self, name: &str) -> Result<()> {
        check_snapshot_name(name)?;
        self.client.delete(&self.folder, &Self::snapshot_file(name))
    }
}
