//! DuckDB storage layer for taskgrid.
//!
//! Holds the relational mirror of every spreadsheet the sync engine tracks.
//!
//! # Architecture
//!
//! - `workspaces` is the root: one row per organization folder, carrying the
//!   aggregate sync status and the owning user used for credential lookup
//! - `synced_sheets` binds one external spreadsheet to a workspace and stores
//!   the last detected column mapping as JSON
//! - `sheet_tasks` mirrors one spreadsheet data row, keyed by
//!   `(synced_sheet_id, row_index)`
//! - `sync_log` is an append-only audit trail of sync passes
//!
//! DuckDB has no cascading foreign keys, so detaching a sheet deletes its
//! tasks explicitly.

mod error;
mod schema;
mod store;
mod types;

pub use error::{StorageError, StorageResult};
pub use schema::initialize_schema;
pub use store::TaskGridStore;
pub use types::{
    ColumnMapping, ReconcileCounts, SheetId, SheetStatus, SheetTask, SyncLogEntry, SyncedSheet,
    TaskField, TaskFieldValue, TaskId, TaskPriority, TaskRecord, TaskStatus, Workspace,
    WorkspaceId, WorkspaceStatus,
};

/// Open a DuckDB connection with stale WAL recovery and resource limits.
///
/// If the initial open fails and a `.wal` file exists alongside the database,
/// it is removed and the open is retried once. An unclean shutdown can leave a
/// WAL file behind that prevents reopening.
pub fn open_duckdb_with_wal_recovery(
    path: &std::path::Path,
    memory_limit: &str,
    threads: u32,
) -> StorageResult<duckdb::Connection> {
    let conn = match duckdb::Connection::open(path) {
        Ok(c) => c,
        Err(first_err) => {
            let wal_path = path.with_extension(
                path.extension()
                    .map(|ext| format!("{}.wal", ext.to_string_lossy()))
                    .unwrap_or_else(|| "wal".to_string()),
            );
            if wal_path.exists() {
                tracing::warn!(
                    wal = %wal_path.display(),
                    "DuckDB open failed, removing stale WAL and retrying"
                );
                if std::fs::remove_file(&wal_path).is_ok() {
                    let c = duckdb::Connection::open(path)?;
                    apply_resource_limits(&c, memory_limit, threads)?;
                    return Ok(c);
                }
            }
            return Err(first_err.into());
        }
    };
    apply_resource_limits(&conn, memory_limit, threads)?;
    Ok(conn)
}

/// Apply memory and thread limits to a DuckDB connection.
fn apply_resource_limits(
    conn: &duckdb::Connection,
    memory_limit: &str,
    threads: u32,
) -> StorageResult<()> {
    conn.execute_batch(&format!(
        "PRAGMA memory_limit='{}'; PRAGMA threads={};",
        memory_limit, threads
    ))?;
    Ok(())
}
