//! Error types for the sync engine.

use taskgrid_sheets::SheetsError;
use taskgrid_storage::{StorageError, TaskField};
use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur while syncing sheets or writing fields back.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("spreadsheet error: {0}")]
    Sheets(#[from] SheetsError),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("field {0} is not mapped to a sheet column")]
    UnmappedField(TaskField),

    #[error("invalid value '{value}' for field {field}")]
    InvalidValue { field: TaskField, value: String },

    #[error("sync already in progress for sheet {0}")]
    SyncInProgress(String),

    #[error("sync already in progress for workspace {0}")]
    WorkspaceSyncInProgress(String),

    #[error("sheet {sheet_id} failed to sync: {message}")]
    SheetSyncFailed { sheet_id: String, message: String },
}
