//! Mirror store: thread-safe DuckDB wrapper split into per-table modules.

pub(crate) mod helpers;
mod sheets;
mod sync_log;
mod tasks;
mod workspaces;

use crate::error::{StorageError, StorageResult};
use crate::schema::initialize_schema;
use duckdb::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

/// Thread-safe store for workspaces, synced sheets and their mirrored tasks.
#[derive(Clone)]
pub struct TaskGridStore {
    conn: Arc<Mutex<Connection>>,
}

impl TaskGridStore {
    /// Opens or creates the mirror database at the given path.
    pub fn open(path: &Path) -> StorageResult<Self> {
        let conn = crate::open_duckdb_with_wal_recovery(path, "256MB", 2)?;
        initialize_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Opens an in-memory mirror (for testing).
    pub fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory().map_err(StorageError::DuckDb)?;
        initialize_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Acquire the connection lock, recovering from poison if a prior
    /// holder panicked.
    pub(crate) fn lock_conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|poisoned| {
            tracing::warn!("recovering from poisoned store mutex");
            poisoned.into_inner()
        })
    }

    /// Run CHECKPOINT for maintenance.
    pub fn maintenance(&self) -> StorageResult<()> {
        let conn = self.lock_conn();
        conn.execute_batch("CHECKPOINT")?;
        Ok(())
    }
}

/// Runs `f` inside a transaction, committing on success and rolling back on
/// any error.
pub(crate) fn with_transaction<T>(
    conn: &Connection,
    f: impl FnOnce(&Connection) -> StorageResult<T>,
) -> StorageResult<T> {
    conn.execute_batch("BEGIN TRANSACTION")?;
    match f(conn) {
        Ok(value) => {
            if let Err(e) = conn.execute_batch("COMMIT") {
                let _ = conn.execute_batch("ROLLBACK");
                return Err(e.into());
            }
            Ok(value)
        }
        Err(e) => {
            let _ = conn.execute_batch("ROLLBACK");
            Err(e)
        }
    }
}
