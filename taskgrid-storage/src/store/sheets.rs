//! Synced sheet rows: connect, detach, mapping and status updates.

use super::helpers::{now_millis, SheetRow, SHEET_COLUMNS};
use super::{with_transaction, TaskGridStore};
use crate::error::{StorageError, StorageResult};
use crate::types::{ColumnMapping, SheetId, SheetStatus, SyncedSheet, WorkspaceId};
use duckdb::params;
use tracing::info;

impl TaskGridStore {
    /// Register a spreadsheet under a workspace. A spreadsheet can be
    /// connected to a given workspace only once.
    pub fn create_sheet(
        &self,
        workspace_id: &WorkspaceId,
        spreadsheet_id: &str,
        name: &str,
        project_id: Option<&str>,
    ) -> StorageResult<SyncedSheet> {
        let sheet = SyncedSheet {
            id: SheetId::new(),
            workspace_id: workspace_id.clone(),
            project_id: project_id.map(str::to_string),
            spreadsheet_id: spreadsheet_id.to_string(),
            name: name.to_string(),
            column_mapping: None,
            status: SheetStatus::Active,
            last_synced_at: None,
            row_count: 0,
            created_at: now_millis(),
        };

        let conn = self.lock_conn();

        let workspaces: i64 = conn.query_row(
            "SELECT COUNT(*) FROM workspaces WHERE id = ?",
            params![workspace_id.as_str()],
            |row| row.get(0),
        )?;
        if workspaces == 0 {
            return Err(StorageError::NotFound(format!("workspace {workspace_id}")));
        }

        let existing: i64 = conn.query_row(
            "SELECT COUNT(*) FROM synced_sheets WHERE workspace_id = ? AND spreadsheet_id = ?",
            params![workspace_id.as_str(), spreadsheet_id],
            |row| row.get(0),
        )?;
        if existing > 0 {
            return Err(StorageError::Conflict(format!(
                "spreadsheet {spreadsheet_id} is already connected to workspace {workspace_id}"
            )));
        }

        conn.execute(
            r#"INSERT INTO synced_sheets (id, workspace_id, project_id, spreadsheet_id, name, status, row_count, created_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?)"#,
            params![
                sheet.id.as_str(),
                sheet.workspace_id.as_str(),
                sheet.project_id,
                sheet.spreadsheet_id,
                sheet.name,
                sheet.status.as_str(),
                sheet.row_count,
                sheet.created_at,
            ],
        )?;

        info!(sheet_id = %sheet.id, workspace_id = %workspace_id, spreadsheet_id, "Sheet connected");
        Ok(sheet)
    }

    pub fn get_sheet(&self, id: &SheetId) -> StorageResult<Option<SyncedSheet>> {
        let conn = self.lock_conn();
        let result = conn.query_row(
            &format!("SELECT {SHEET_COLUMNS} FROM synced_sheets WHERE id = ?"),
            params![id.as_str()],
            SheetRow::from_row,
        );

        match result {
            Ok(row) => row.decode().map(Some),
            Err(duckdb::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Sheets of a workspace in connection order, optionally filtered by status.
    pub fn list_sheets(
        &self,
        workspace_id: &WorkspaceId,
        status: Option<SheetStatus>,
    ) -> StorageResult<Vec<SyncedSheet>> {
        let conn = self.lock_conn();
        let mut sql = format!("SELECT {SHEET_COLUMNS} FROM synced_sheets WHERE workspace_id = ?");
        if status.is_some() {
            sql.push_str(" AND status = ?");
        }
        sql.push_str(" ORDER BY created_at, rowid");

        let mut stmt = conn.prepare(&sql)?;
        let rows = match status {
            Some(s) => stmt
                .query_map(params![workspace_id.as_str(), s.as_str()], SheetRow::from_row)?
                .collect::<Result<Vec<_>, _>>()?,
            None => stmt
                .query_map(params![workspace_id.as_str()], SheetRow::from_row)?
                .collect::<Result<Vec<_>, _>>()?,
        };

        rows.into_iter().map(SheetRow::decode).collect()
    }

    /// Persist a freshly detected column mapping.
    pub fn set_sheet_mapping(&self, id: &SheetId, mapping: &ColumnMapping) -> StorageResult<()> {
        let mapping_json = serde_json::to_string(mapping)?;
        let conn = self.lock_conn();
        let affected = conn.execute(
            "UPDATE synced_sheets SET column_mapping_json = ? WHERE id = ?",
            params![mapping_json, id.as_str()],
        )?;
        if affected == 0 {
            return Err(StorageError::NotFound(format!("sheet {id}")));
        }
        Ok(())
    }

    /// Pause or resume a sheet for workspace-wide sync passes.
    pub fn set_sheet_status(&self, id: &SheetId, status: SheetStatus) -> StorageResult<()> {
        let conn = self.lock_conn();
        let affected = conn.execute(
            "UPDATE synced_sheets SET status = ? WHERE id = ?",
            params![status.as_str(), id.as_str()],
        )?;
        if affected == 0 {
            return Err(StorageError::NotFound(format!("sheet {id}")));
        }
        Ok(())
    }

    /// Detach a sheet, deleting its mirrored tasks with it. Returns false if
    /// the sheet did not exist.
    pub fn delete_sheet(&self, id: &SheetId) -> StorageResult<bool> {
        let conn = self.lock_conn();
        let deleted = with_transaction(&conn, |conn| {
            let tasks = conn.execute(
                "DELETE FROM sheet_tasks WHERE synced_sheet_id = ?",
                params![id.as_str()],
            )?;
            let sheets = conn.execute("DELETE FROM synced_sheets WHERE id = ?", params![id.as_str()])?;
            Ok((sheets, tasks))
        })?;

        if deleted.0 > 0 {
            info!(sheet_id = %id, tasks_deleted = deleted.1, "Sheet detached");
        }
        Ok(deleted.0 > 0)
    }
}
