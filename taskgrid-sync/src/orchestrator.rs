//! Workspace-wide sync pass.
//!
//! Runs every active sheet of a workspace one after another and rolls the
//! result up into the workspace's aggregate status:
//!
//! ```text
//! idle | active | error ──sync_workspace──▶ syncing ──▶ active (all sheets ok)
//!                                                  └──▶ error  (first failing sheet)
//! ```

use crate::engine::SheetSyncEngine;
use crate::error::{SyncError, SyncResult};
use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use taskgrid_storage::{SheetStatus, WorkspaceId, WorkspaceStatus};
use tracing::{info, warn};

const EVENT_WORKSPACE_SYNCED: &str = "workspace_synced";
const EVENT_WORKSPACE_SYNC_FAILED: &str = "workspace_sync_failed";

fn workspace_lease_key(workspace_id: &WorkspaceId) -> String {
    format!("workspace:{workspace_id}")
}

/// Totals of a successful workspace pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkspaceSyncReport {
    pub workspace_id: WorkspaceId,
    pub sheets_synced: usize,
    pub created: usize,
    pub updated: usize,
    pub deleted: usize,
    pub synced_at: i64,
}

impl SheetSyncEngine {
    /// Sync every active sheet of a workspace, oldest connection first.
    ///
    /// The first failing sheet stops the pass; sheets before it keep their
    /// new state, sheets after it are not touched. A pass that fails while
    /// recording its completion also ends with the workspace in `error`.
    pub async fn sync_workspace(
        &self,
        workspace_id: &WorkspaceId,
    ) -> SyncResult<WorkspaceSyncReport> {
        self.require_workspace(workspace_id)?;
        let Some(_lease) = self.guard.try_acquire(&workspace_lease_key(workspace_id)) else {
            let err = SyncError::WorkspaceSyncInProgress(workspace_id.to_string());
            warn!(workspace_id = %workspace_id, "sync skipped: {err}");
            return Err(err);
        };
        self.store
            .set_workspace_status(workspace_id, WorkspaceStatus::Syncing, None)?;
        info!(workspace_id = %workspace_id, "workspace sync started");

        let result = self
            .sync_active_sheets(workspace_id)
            .await
            .and_then(|report| self.finish_workspace_pass(&report).map(|()| report));

        match result {
            Ok(report) => {
                info!(
                    workspace_id = %workspace_id,
                    sheets = report.sheets_synced,
                    created = report.created,
                    updated = report.updated,
                    deleted = report.deleted,
                    "workspace synced"
                );
                Ok(report)
            }
            Err(e) => {
                let message = e.to_string();
                warn!(workspace_id = %workspace_id, error = %message, "workspace sync failed");
                if let Err(status_err) = self.store.set_workspace_status(
                    workspace_id,
                    WorkspaceStatus::Error,
                    Some(&message),
                ) {
                    warn!(workspace_id = %workspace_id, error = %status_err, "failed to record workspace error");
                }
                if let Err(log_err) = self.store.append_sync_log(
                    workspace_id,
                    EVENT_WORKSPACE_SYNC_FAILED,
                    json!({ "error": message }),
                ) {
                    warn!(workspace_id = %workspace_id, error = %log_err, "failed to record sync log entry");
                }
                Err(e)
            }
        }
    }

    fn finish_workspace_pass(&self, report: &WorkspaceSyncReport) -> SyncResult<()> {
        self.store
            .mark_workspace_synced(&report.workspace_id, report.synced_at)?;
        self.store.append_sync_log(
            &report.workspace_id,
            EVENT_WORKSPACE_SYNCED,
            json!({
                "sheets": report.sheets_synced,
                "created": report.created,
                "updated": report.updated,
                "deleted": report.deleted,
            }),
        )?;
        Ok(())
    }

    async fn sync_active_sheets(
        &self,
        workspace_id: &WorkspaceId,
    ) -> SyncResult<WorkspaceSyncReport> {
        let sheets = self
            .store
            .list_sheets(workspace_id, Some(SheetStatus::Active))?;

        let mut report = WorkspaceSyncReport {
            workspace_id: workspace_id.clone(),
            sheets_synced: 0,
            created: 0,
            updated: 0,
            deleted: 0,
            synced_at: 0,
        };

        for sheet in &sheets {
            let outcome = self.sync_sheet(&sheet.id).await;
            if !outcome.success {
                return Err(SyncError::SheetSyncFailed {
                    sheet_id: sheet.id.to_string(),
                    message: outcome.error.unwrap_or_default(),
                });
            }
            report.sheets_synced += 1;
            report.created += outcome.created;
            report.updated += outcome.updated;
            report.deleted += outcome.deleted;
        }

        report.synced_at = Utc::now().timestamp_millis();
        Ok(report)
    }
}
