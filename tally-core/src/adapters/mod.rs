//! Adapter implementations
//!
//! Adapters implement the port traits with concrete technologies:
//! - Local data directory for the Storage port
//! - Remote folder store for the Storage port, over an ObjectClient
//! - HTTP (WebDAV-style) and mounted-folder ObjectClients

mod dir;
mod http;
mod local;
mod remote;

pub use dir::DirObjectClient;
pub use http::HttpObjectClient;
pub use local::LocalStore;
pub use remote::{RemoteStore, DEFAULT_FOLDER};
