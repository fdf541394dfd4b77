//! Workspace rows: creation and sync-status bookkeeping.

use super::helpers::{now_millis, WorkspaceRow, WORKSPACE_COLUMNS};
use super::TaskGridStore;
use crate::error::{StorageError, StorageResult};
use crate::types::{Workspace, WorkspaceId, WorkspaceStatus};
use duckdb::params;
use tracing::info;

impl TaskGridStore {
    /// Create a workspace in the `idle` state.
    pub fn create_workspace(
        &self,
        name: &str,
        organization_id: &str,
        owner_user_id: &str,
        root_folder_id: Option<&str>,
    ) -> StorageResult<Workspace> {
        let workspace = Workspace {
            id: WorkspaceId::new(),
            name: name.to_string(),
            organization_id: organization_id.to_string(),
            owner_user_id: owner_user_id.to_string(),
            root_folder_id: root_folder_id.map(str::to_string),
            sync_status: WorkspaceStatus::Idle,
            last_synced_at: None,
            last_error: None,
            created_at: now_millis(),
        };

        let conn = self.lock_conn();
        conn.execute(
            r#"INSERT INTO workspaces (id, name, organization_id, owner_user_id, root_folder_id, sync_status, created_at)
               VALUES (?, ?, ?, ?, ?, ?, ?)"#,
            params![
                workspace.id.as_str(),
                workspace.name,
                workspace.organization_id,
                workspace.owner_user_id,
                workspace.root_folder_id,
                workspace.sync_status.as_str(),
                workspace.created_at,
            ],
        )?;

        info!(workspace_id = %workspace.id, name, "Workspace created");
        Ok(workspace)
    }

    pub fn get_workspace(&self, id: &WorkspaceId) -> StorageResult<Option<Workspace>> {
        let conn = self.lock_conn();
        let result = conn.query_row(
            &format!("SELECT {WORKSPACE_COLUMNS} FROM workspaces WHERE id = ?"),
            params![id.as_str()],
            WorkspaceRow::from_row,
        );

        match result {
            Ok(row) => row.decode().map(Some),
            Err(duckdb::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Set the aggregate status. `last_error` replaces the stored message,
    /// so passing `None` clears it.
    pub fn set_workspace_status(
        &self,
        id: &WorkspaceId,
        status: WorkspaceStatus,
        last_error: Option<&str>,
    ) -> StorageResult<()> {
        let conn = self.lock_conn();
        let affected = conn.execute(
            "UPDATE workspaces SET sync_status = ?, last_error = ? WHERE id = ?",
            params![status.as_str(), last_error, id.as_str()],
        )?;
        if affected == 0 {
            return Err(StorageError::NotFound(format!("workspace {id}")));
        }
        Ok(())
    }

    /// Mark a completed workspace pass: `active`, error cleared, timestamp set.
    ///
    /// Only a workspace still in `syncing` can complete; if its status was
    /// changed while the pass ran, the pass is not recorded and `Conflict` is
    /// returned.
    pub fn mark_workspace_synced(&self, id: &WorkspaceId, synced_at: i64) -> StorageResult<()> {
        let conn = self.lock_conn();
        let affected = conn.execute(
            "UPDATE workspaces SET sync_status = ?, last_error = NULL, last_synced_at = ? \
             WHERE id = ? AND sync_status = ?",
            params![
                WorkspaceStatus::Active.as_str(),
                synced_at,
                id.as_str(),
                WorkspaceStatus::Syncing.as_str(),
            ],
        )?;
        if affected > 0 {
            return Ok(());
        }

        let status: Option<String> = match conn.query_row(
            "SELECT sync_status FROM workspaces WHERE id = ?",
            params![id.as_str()],
            |row| row.get(0),
        ) {
            Ok(status) => Some(status),
            Err(duckdb::Error::QueryReturnedNoRows) => None,
            Err(e) => return Err(e.into()),
        };
        match status {
            Some(status) => Err(StorageError::Conflict(format!(
                "workspace {id} is {status}, not syncing"
            ))),
            None => Err(StorageError::NotFound(format!("workspace {id}"))),
        }
    }
}
