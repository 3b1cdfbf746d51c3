//! Service layer - business logic orchestration
//!
//! The engines (decode, import, reconcile, aggregate, filter, batch, export)
//! are pure functions over the collection. The services (snapshot, status,
//! logging) coordinate them with the storage ports.

pub mod aggregate;
pub mod batch;
pub mod decode;
pub mod export;
pub mod filter;
pub mod import;
pub mod logging;
pub mod reconcile;
mod snapshot;
mod status;

pub use aggregate::{
    aggregate_by_month, aggregate_by_project, highlight, pie_slices, totals, EnglishMonths,
    Measure, MonthNames, PieSeries, Series, Totals,
};
pub use batch::{
    assign_to_report, batch_delete, delete_one, reassign_date, BatchOutcome, BatchSummary,
    Deletion, Undo,
};
pub use decode::{decode_csv, DecodedImport, ImportRow};
pub use export::{export_csv, export_file_name, export_file_name_with, export_json};
pub use filter::{filter, search, sort_records, RangeBounds, SortDirection, SortField, ViewKind, ViewMode};
pub use import::{
    classify, decode_json, materialize, read_import_file, suggested_report_name, FollowUp,
    ImportClassification, ImportKind, ImportSource, ImportTarget,
};
pub use logging::{EntryPoint, LogEntry, LogEvent, LoggingService};
pub use reconcile::{
    add_manual, add_or_update, apply_batch, apply_review, detect_conflict, edit_record,
    resolve, review_import, ApplySummary, Conflict, ConflictMode, ImportReview,
    ManualDecision, Outcome, PendingConflict, RecordEdit,
};
pub use snapshot::{SnapshotInfo, SnapshotService, SnapshotUndo};
pub use status::{DateRange, StatusService, StatusSummary};
