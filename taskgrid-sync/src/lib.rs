//! Workspace sheet synchronization.
//!
//! Turns schema-less Google Sheets into typed task rows and keeps the DuckDB
//! mirror in step with them:
//! - column mapping detection from header rows
//! - row parsing and value normalization
//! - per-sheet reconciliation in a single storage transaction
//! - single-cell field write-back
//! - workspace-wide sequential sync passes

pub mod detect;
pub mod engine;
pub mod error;
pub mod guard;
pub mod normalize;
pub mod orchestrator;
pub mod parse;
pub mod reconcile;
pub mod writeback;

pub use detect::{detect_mapping, mapping_from_header};
pub use engine::SheetSyncEngine;
pub use error::{SyncError, SyncResult};
pub use guard::{SyncGuard, SyncLease};
pub use normalize::{
    display_priority, display_status, normalize_priority, normalize_status, parse_due_date,
};
pub use orchestrator::WorkspaceSyncReport;
pub use parse::{parse_rows, parse_tasks};
pub use reconcile::SheetSyncOutcome;
pub use writeback::FieldUpdateReport;
