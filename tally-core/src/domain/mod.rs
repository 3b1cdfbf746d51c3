//! Core domain entities
//!
//! Records, the collection that owns them, and the derived report registry.
//! These are pure data structures with validation logic - no I/O.

mod collection;
mod record;
pub mod report;
pub mod result;

pub use collection::Collection;
pub use record::{identity_of, same_identity, IdentityKey, Period, Record, Tag};
pub use report::{report_names, unique_report_name};
