//! Sync engine: owns the mirror store and the external seams.
//!
//! The reconciliation, write-back and workspace passes live in their own
//! modules as further `impl SheetSyncEngine` blocks.

use crate::detect;
use crate::error::{SyncError, SyncResult};
use crate::guard::SyncGuard;
use crate::parse;
use crate::reconcile::SheetSyncOutcome;
use std::sync::Arc;
use taskgrid_sheets::{CredentialProvider, GoogleCredential, SpreadsheetProvider};
use taskgrid_storage::{
    ColumnMapping, SheetId, SheetTask, SyncLogEntry, SyncedSheet, TaskGridStore, TaskRecord,
    Workspace, WorkspaceId,
};
use tracing::info;

/// Keeps the task mirror of a set of workspaces in step with their sheets.
pub struct SheetSyncEngine {
    pub(crate) store: TaskGridStore,
    pub(crate) sheets: Arc<dyn SpreadsheetProvider>,
    pub(crate) credentials: Arc<dyn CredentialProvider>,
    pub(crate) guard: SyncGuard,
}

impl SheetSyncEngine {
    pub fn new(
        store: TaskGridStore,
        sheets: Arc<dyn SpreadsheetProvider>,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Self {
        Self {
            store,
            sheets,
            credentials,
            guard: SyncGuard::new(),
        }
    }

    pub fn store(&self) -> &TaskGridStore {
        &self.store
    }

    /// Single-flight guard. `sync_sheet` holds the sheet id; `sync_workspace`
    /// holds `workspace:<id>`.
    pub fn sync_guard(&self) -> &SyncGuard {
        &self.guard
    }

    pub async fn detect_mapping(
        &self,
        credential: &GoogleCredential,
        spreadsheet_id: &str,
    ) -> SyncResult<ColumnMapping> {
        detect::detect_mapping(self.sheets.as_ref(), credential, spreadsheet_id).await
    }

    pub async fn parse_tasks(
        &self,
        credential: &GoogleCredential,
        spreadsheet_id: &str,
        mapping: &ColumnMapping,
    ) -> SyncResult<Vec<TaskRecord>> {
        parse::parse_tasks(self.sheets.as_ref(), credential, spreadsheet_id, mapping).await
    }

    /// Connect a spreadsheet to a workspace and run its first sync.
    ///
    /// The sheet stays connected even when the first sync fails; the
    /// outcome says what happened.
    pub async fn connect_sheet(
        &self,
        workspace_id: &WorkspaceId,
        spreadsheet_id: &str,
        name: &str,
        project_id: Option<&str>,
    ) -> SyncResult<(SyncedSheet, SheetSyncOutcome)> {
        let sheet = self
            .store
            .create_sheet(workspace_id, spreadsheet_id, name, project_id)?;
        let outcome = self.sync_sheet(&sheet.id).await;
        let sheet = self.require_sheet(&sheet.id)?;
        Ok((sheet, outcome))
    }

    /// Disconnect a sheet, dropping its mirrored tasks.
    pub fn detach_sheet(&self, sheet_id: &SheetId) -> SyncResult<()> {
        if !self.store.delete_sheet(sheet_id)? {
            return Err(SyncError::NotFound(format!("sheet {sheet_id}")));
        }
        info!(sheet_id = %sheet_id, "sheet detached");
        Ok(())
    }

    pub fn tasks_for_sheet(&self, sheet_id: &SheetId) -> SyncResult<Vec<SheetTask>> {
        Ok(self.store.list_tasks_for_sheet(sheet_id)?)
    }

    pub fn tasks_for_workspace(&self, workspace_id: &WorkspaceId) -> SyncResult<Vec<SheetTask>> {
        Ok(self.store.list_tasks_for_workspace(workspace_id)?)
    }

    /// Newest entries first.
    pub fn sync_log(&self, workspace_id: &WorkspaceId, limit: usize) -> SyncResult<Vec<SyncLogEntry>> {
        Ok(self.store.list_sync_log(workspace_id, limit)?)
    }

    pub(crate) fn require_workspace(&self, id: &WorkspaceId) -> SyncResult<Workspace> {
        self.store
            .get_workspace(id)?
            .ok_or_else(|| SyncError::NotFound(format!("workspace {id}")))
    }

    pub(crate) fn require_sheet(&self, id: &SheetId) -> SyncResult<SyncedSheet> {
        self.store
            .get_sheet(id)?
            .ok_or_else(|| SyncError::NotFound(format!("sheet {id}")))
    }

    /// Credential of the workspace owner; every sheet in a workspace is
    /// read and written as that user.
    pub(crate) async fn workspace_credential(
        &self,
        workspace: &Workspace,
    ) -> SyncResult<GoogleCredential> {
        Ok(self
            .credentials
            .get_credential(&workspace.owner_user_id)
            .await?)
    }
}
