//! Tally Core - reconciliation and aggregation engine for report tracking
//!
//! This crate implements the core domain logic following hexagonal architecture:
//!
//! - **domain**: Core entities (Record, Period, Collection, report registry)
//! - **ports**: Trait definitions for external dependencies (Storage, ObjectClient)
//! - **services**: Import, reconciliation, aggregation, filtering and batch engines,
//!   plus snapshot, status and logging services
//! - **adapters**: Concrete implementations (local directory, remote folder store)

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod services;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use url::Url;

use adapters::{DirObjectClient, HttpObjectClient, LocalStore, RemoteStore};
use config::{Backend, Config};
use ports::Storage;
use services::*;

// Re-export commonly used types at crate root
pub use domain::result::{Error, OperationResult};
pub use domain::{Collection, IdentityKey, Period, Record, Tag};
pub use services::{EntryPoint, LogEvent, LoggingService};

/// Main context for Tally operations
///
/// Holds the configuration, the storage backend and the loaded collection.
/// Engines borrow the collection from here; [`TallyContext::persist`] writes it
/// back.
pub struct TallyContext {
    pub config: Config,
    pub data_dir: PathBuf,
    pub storage: Arc<dyn Storage>,
    pub snapshot_service: SnapshotService,
    pub status_service: StatusService,
    collection: Collection,
}

impl TallyContext {
    /// Create a context from the settings in `data_dir`
    pub fn new(data_dir: &Path) -> Result<Self> {
        let config = Config::load(data_dir)?;
        let storage = open_storage(&config, data_dir)?;
        Self::with_storage(config, data_dir, storage)
    }

    /// Create a context over an explicit storage backend
    pub fn with_storage(config: Config, data_dir: &Path, storage: Arc<dyn Storage>) -> Result<Self> {
        let collection = storage
            .read_current()
            .with_context(|| format!("Failed to read the current dataset from {} storage", storage.name()))?
            .unwrap_or_default();

        Ok(Self {
            config,
            data_dir: data_dir.to_path_buf(),
            snapshot_service: SnapshotService::new(Arc::clone(&storage)),
            status_service: StatusService::new(Arc::clone(&storage)),
            storage,
            collection,
        })
    }

    pub fn collection(&self) -> &Collection {
        &self.collection
    }

    /// Mutable access for the reconciliation and batch engines
    pub fn collection_mut(&mut self) -> &mut Collection {
        &mut self.collection
    }

    /// Replace the whole collection, folding duplicate identities
    pub fn replace(&mut self, records: Vec<Record>) {
        self.collection = Collection::from_records(records);
    }

    /// Write the collection to storage
    pub fn persist(&self) -> Result<()> {
        self.storage
            .write_current(&self.collection)
            .with_context(|| format!("Failed to save to {} storage", self.storage.name()))
    }

    /// Re-read the collection from storage
    pub fn reload(&mut self) -> Result<()> {
        self.collection = self.storage.read_current()?.unwrap_or_default();
        Ok(())
    }
}

/// Build the configured storage backend
///
/// A remote URL with the `file` scheme is treated as a mounted folder.
pub fn open_storage(config: &Config, data_dir: &Path) -> Result<Arc<dyn Storage>> {
    match config.backend {
        Backend::Local => Ok(Arc::new(LocalStore::new(data_dir)?)),
        Backend::Remote => {
            let Some(url) = config.remote.url.as_deref() else {
                bail!("Remote storage is selected but storage.remote.url is not set");
            };

            let folder = config.remote.folder.clone();
            match Url::parse(url) {
                Ok(parsed) if parsed.scheme() == "file" => {
                    let Ok(root) = parsed.to_file_path() else {
                        bail!("'{}' is not a usable folder path", url);
                    };
                    Ok(Arc::new(RemoteStore::new(DirObjectClient::new(&root), folder)))
                }
                _ => {
                    let client = HttpObjectClient::new(
                        url,
                        config.remote.username.clone(),
                        config.remote.password(),
                    )?;
                    Ok(Arc::new(RemoteStore::new(client, folder)))
                }
            }
        }
    }
}
