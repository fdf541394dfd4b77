//! Append-only sync audit log.

use super::helpers::now_millis;
use super::TaskGridStore;
use crate::error::StorageResult;
use crate::types::{SyncLogEntry, WorkspaceId};
use duckdb::params;
use uuid::Uuid;

impl TaskGridStore {
    pub fn append_sync_log(
        &self,
        workspace_id: &WorkspaceId,
        event_type: &str,
        details: serde_json::Value,
    ) -> StorageResult<SyncLogEntry> {
        let entry = SyncLogEntry {
            id: Uuid::now_v7().to_string(),
            workspace_id: workspace_id.clone(),
            event_type: event_type.to_string(),
            details,
            created_at: now_millis(),
        };
        let details_json = serde_json::to_string(&entry.details)?;

        let conn = self.lock_conn();
        conn.execute(
            "INSERT INTO sync_log (id, workspace_id, event_type, details_json, created_at) VALUES (?, ?, ?, ?, ?)",
            params![
                entry.id,
                entry.workspace_id.as_str(),
                entry.event_type,
                details_json,
                entry.created_at,
            ],
        )?;
        Ok(entry)
    }

    /// Most recent entries first.
    pub fn list_sync_log(
        &self,
        workspace_id: &WorkspaceId,
        limit: usize,
    ) -> StorageResult<Vec<SyncLogEntry>> {
        let conn = self.lock_conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT id, workspace_id, event_type, details_json, created_at FROM sync_log \
             WHERE workspace_id = ? ORDER BY created_at DESC, id DESC LIMIT {limit}"
        ))?;
        let rows: Vec<(String, String, String, String, i64)> = stmt
            .query_map(params![workspace_id.as_str()], |row| {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
            })?
            .collect::<Result<_, _>>()?;

        rows.into_iter()
            .map(|(id, workspace_id, event_type, details_json, created_at)| {
                Ok(SyncLogEntry {
                    id,
                    workspace_id: WorkspaceId(workspace_id),
                    event_type,
                    details: serde_json::from_str(&details_json)?,
                    created_at,
                })
            })
            .collect()
    }
}
