//! Per-sheet reconciliation pass.

use crate::engine::SheetSyncEngine;
use crate::error::{SyncError, SyncResult};
use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use taskgrid_storage::{ReconcileCounts, SheetId, SyncedSheet};
use tracing::{info, warn};

pub(crate) const EVENT_SHEET_SYNCED: &str = "sheet_synced";
pub(crate) const EVENT_SHEET_SYNC_FAILED: &str = "sheet_sync_failed";

/// Result of one `sync_sheet` call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SheetSyncOutcome {
    pub success: bool,
    pub created: usize,
    pub updated: usize,
    pub deleted: usize,
    pub error: Option<String>,
}

impl SheetSyncOutcome {
    fn succeeded(counts: ReconcileCounts) -> Self {
        Self {
            success: true,
            created: counts.created,
            updated: counts.updated,
            deleted: counts.deleted,
            error: None,
        }
    }

    fn failed(error: &SyncError) -> Self {
        Self {
            success: false,
            error: Some(error.to_string()),
            ..Self::default()
        }
    }

    pub fn counts(&self) -> ReconcileCounts {
        ReconcileCounts {
            created: self.created,
            updated: self.updated,
            deleted: self.deleted,
        }
    }
}

impl SheetSyncEngine {
    /// Bring the mirror of one sheet in line with the spreadsheet.
    ///
    /// Re-running on an unchanged sheet updates every task and creates or
    /// deletes none. Failures are reported in the outcome; the mirror then
    /// keeps whatever the last successful pass left.
    ///
    /// A failed pass leaves the sheet's status as it was. Outside a workspace
    /// pass the failure is only visible in the outcome and the
    /// `sheet_sync_failed` log entry; `sync_workspace` is what moves the
    /// workspace to `error`.
    pub async fn sync_sheet(&self, sheet_id: &SheetId) -> SheetSyncOutcome {
        let Some(_lease) = self.guard.try_acquire(sheet_id.as_str()) else {
            let err = SyncError::SyncInProgress(sheet_id.to_string());
            warn!(sheet_id = %sheet_id, "sync skipped: {err}");
            return SheetSyncOutcome::failed(&err);
        };

        let sheet = match self.require_sheet(sheet_id) {
            Ok(sheet) => sheet,
            Err(e) => {
                warn!(sheet_id = %sheet_id, error = %e, "sheet sync failed");
                return SheetSyncOutcome::failed(&e);
            }
        };

        match self.reconcile(&sheet).await {
            Ok(counts) => {
                info!(
                    sheet_id = %sheet.id,
                    workspace_id = %sheet.workspace_id,
                    created = counts.created,
                    updated = counts.updated,
                    deleted = counts.deleted,
                    "sheet synced"
                );
                let details = json!({
                    "sheet_id": sheet.id.as_str(),
                    "spreadsheet_id": sheet.spreadsheet_id,
                    "created": counts.created,
                    "updated": counts.updated,
                    "deleted": counts.deleted,
                });
                if let Err(e) =
                    self.store
                        .append_sync_log(&sheet.workspace_id, EVENT_SHEET_SYNCED, details)
                {
                    warn!(sheet_id = %sheet.id, error = %e, "failed to record sync log entry");
                }
                SheetSyncOutcome::succeeded(counts)
            }
            Err(e) => {
                warn!(sheet_id = %sheet.id, error = %e, "sheet sync failed");
                let details = json!({
                    "sheet_id": sheet.id.as_str(),
                    "spreadsheet_id": sheet.spreadsheet_id,
                    "error": e.to_string(),
                });
                if let Err(log_err) =
                    self.store
                        .append_sync_log(&sheet.workspace_id, EVENT_SHEET_SYNC_FAILED, details)
                {
                    warn!(sheet_id = %sheet.id, error = %log_err, "failed to record sync log entry");
                }
                SheetSyncOutcome::failed(&e)
            }
        }
    }

    async fn reconcile(&self, sheet: &SyncedSheet) -> SyncResult<ReconcileCounts> {
        let workspace = self.require_workspace(&sheet.workspace_id)?;
        let credential = self.workspace_credential(&workspace).await?;

        let mapping = self
            .detect_mapping(&credential, &sheet.spreadsheet_id)
            .await?;
        self.store.set_sheet_mapping(&sheet.id, &mapping)?;

        let records = self
            .parse_tasks(&credential, &sheet.spreadsheet_id, &mapping)
            .await?;

        let synced_at = Utc::now().timestamp_millis();
        Ok(self
            .store
            .apply_sheet_snapshot(&sheet.id, &records, synced_at)?)
    }
}
