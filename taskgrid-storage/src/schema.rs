//! DDL for the mirror database.

use crate::error::StorageResult;
use duckdb::Connection;

const WORKSPACES_DDL: &str = r#"
CREATE TABLE IF NOT EXISTS workspaces (
    id VARCHAR PRIMARY KEY,
    name VARCHAR NOT NULL,
    organization_id VARCHAR NOT NULL,
    owner_user_id VARCHAR NOT NULL,
    root_folder_id VARCHAR,
    sync_status VARCHAR NOT NULL DEFAULT 'idle',
    last_synced_at BIGINT,
    last_error TEXT,
    created_at BIGINT NOT NULL
);
"#;

/// One external spreadsheet per (workspace, spreadsheet) pair.
const SYNCED_SHEETS_DDL: &str = r#"
CREATE TABLE IF NOT EXISTS synced_sheets (
    id VARCHAR PRIMARY KEY,
    workspace_id VARCHAR NOT NULL,
    project_id VARCHAR,
    spreadsheet_id VARCHAR NOT NULL,
    name VARCHAR NOT NULL,
    column_mapping_json TEXT,
    status VARCHAR NOT NULL DEFAULT 'active',
    last_synced_at BIGINT,
    row_count BIGINT NOT NULL DEFAULT 0,
    created_at BIGINT NOT NULL,
    UNIQUE (workspace_id, spreadsheet_id)
);
CREATE INDEX IF NOT EXISTS idx_synced_sheets_workspace ON synced_sheets(workspace_id);
"#;

/// Row index, not title, is the identity of a mirrored task.
const SHEET_TASKS_DDL: &str = r#"
CREATE TABLE IF NOT EXISTS sheet_tasks (
    id VARCHAR PRIMARY KEY,
    synced_sheet_id VARCHAR NOT NULL,
    row_index BIGINT NOT NULL,
    title VARCHAR NOT NULL,
    description TEXT,
    status VARCHAR NOT NULL,
    priority VARCHAR NOT NULL,
    assignee_email VARCHAR,
    due_date VARCHAR,
    last_synced_at BIGINT NOT NULL,
    UNIQUE (synced_sheet_id, row_index)
);
"#;

const SYNC_LOG_DDL: &str = r#"
CREATE TABLE IF NOT EXISTS sync_log (
    id VARCHAR PRIMARY KEY,
    workspace_id VARCHAR NOT NULL,
    event_type VARCHAR NOT NULL,
    details_json TEXT NOT NULL DEFAULT '{}',
    created_at BIGINT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_sync_log_workspace ON sync_log(workspace_id, created_at);
"#;

/// Initialize all mirror tables.
pub fn initialize_schema(conn: &Connection) -> StorageResult<()> {
    conn.execute_batch(WORKSPACES_DDL)?;
    conn.execute_batch(SYNCED_SHEETS_DDL)?;
    conn.execute_batch(SHEET_TASKS_DDL)?;
    conn.execute_batch(SYNC_LOG_DDL)?;
    Ok(())
}
