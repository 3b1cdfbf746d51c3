//! Port definitions (hexagonal architecture)
//!
//! Ports define the interfaces for external dependencies. The engines never
//! touch them; the context reads and writes datasets through them around
//! engine calls.

mod object_client;
mod storage;

pub use object_client::ObjectClient;
pub use storage::{check_snapshot_name, Storage, CURRENT_KEY, SNAPSHOT_KEY_PREFIX};
