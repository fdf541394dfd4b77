//! Row decoding shared by the store submodules.

use crate::error::{StorageError, StorageResult};
use crate::types::{
    ColumnMapping, SheetId, SheetTask, SyncedSheet, TaskId, Workspace, WorkspaceId,
};
use chrono::{NaiveDate, Utc};
use std::str::FromStr;

pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";

pub(crate) const WORKSPACE_COLUMNS: &str = "id, name, organization_id, owner_user_id, root_folder_id, \
     sync_status, last_synced_at, last_error, created_at";

pub(crate) const SHEET_COLUMNS: &str = "id, workspace_id, project_id, spreadsheet_id, name, \
     column_mapping_json, status, last_synced_at, row_count, created_at";

pub(crate) const TASK_COLUMNS: &str = "id, synced_sheet_id, row_index, title, description, \
     status, priority, assignee_email, due_date, last_synced_at";

pub(crate) fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

pub(crate) fn parse_column<T: FromStr<Err = String>>(raw: &str) -> StorageResult<T> {
    raw.parse().map_err(StorageError::InvalidData)
}

pub(crate) fn format_date(date: Option<NaiveDate>) -> Option<String> {
    date.map(|d| d.format(DATE_FORMAT).to_string())
}

fn parse_date(raw: Option<String>) -> StorageResult<Option<NaiveDate>> {
    raw.map(|s| {
        NaiveDate::parse_from_str(&s, DATE_FORMAT)
            .map_err(|e| StorageError::InvalidData(format!("bad due_date '{s}': {e}")))
    })
    .transpose()
}

/// Undecoded `workspaces` row, in `WORKSPACE_COLUMNS` order.
pub(crate) struct WorkspaceRow {
    id: String,
    name: String,
    organization_id: String,
    owner_user_id: String,
    root_folder_id: Option<String>,
    sync_status: String,
    last_synced_at: Option<i64>,
    last_error: Option<String>,
    created_at: i64,
}

impl WorkspaceRow {
    pub(crate) fn from_row(row: &duckdb::Row<'_>) -> duckdb::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            organization_id: row.get(2)?,
            owner_user_id: row.get(3)?,
            root_folder_id: row.get(4)?,
            sync_status: row.get(5)?,
            last_synced_at: row.get(6)?,
            last_error: row.get(7)?,
            created_at: row.get(8)?,
        })
    }

    pub(crate) fn decode(self) -> StorageResult<Workspace> {
        Ok(Workspace {
            id: WorkspaceId(self.id),
            name: self.name,
            organization_id: self.organization_id,
            owner_user_id: self.owner_user_id,
            root_folder_id: self.root_folder_id,
            sync_status: parse_column(&self.sync_status)?,
            last_synced_at: self.last_synced_at,
            last_error: self.last_error,
            created_at: self.created_at,
        })
    }
}

/// Undecoded `synced_sheets` row, in `SHEET_COLUMNS` order.
pub(crate) struct SheetRow {
    id: String,
    workspace_id: String,
    project_id: Option<String>,
    spreadsheet_id: String,
    name: String,
    column_mapping_json: Option<String>,
    status: String,
    last_synced_at: Option<i64>,
    row_count: i64,
    created_at: i64,
}

impl SheetRow {
    pub(crate) fn from_row(row: &duckdb::Row<'_>) -> duckdb::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            workspace_id: row.get(1)?,
            project_id: row.get(2)?,
            spreadsheet_id: row.get(3)?,
            name: row.get(4)?,
            column_mapping_json: row.get(5)?,
            status: row.get(6)?,
            last_synced_at: row.get(7)?,
            row_count: row.get(8)?,
            created_at: row.get(9)?,
        })
    }

    pub(crate) fn decode(self) -> StorageResult<SyncedSheet> {
        let column_mapping = self
            .column_mapping_json
            .as_deref()
            .map(serde_json::from_str::<ColumnMapping>)
            .transpose()?;
        Ok(SyncedSheet {
            id: SheetId(self.id),
            workspace_id: WorkspaceId(self.workspace_id),
            project_id: self.project_id,
            spreadsheet_id: self.spreadsheet_id,
            name: self.name,
            column_mapping,
            status: parse_column(&self.status)?,
            last_synced_at: self.last_synced_at,
            row_count: self.row_count,
            created_at: self.created_at,
        })
    }
}

/// Undecoded `sheet_tasks` row, in `TASK_COLUMNS` order.
pub(crate) struct TaskRow {
    id: String,
    synced_sheet_id: String,
    row_index: i64,
    title: String,
    description: Option<String>,
    status: String,
    priority: String,
    assignee_email: Option<String>,
    due_date: Option<String>,
    last_synced_at: i64,
}

impl TaskRow {
    pub(crate) fn from_row(row: &duckdb::Row<'_>) -> duckdb::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            synced_sheet_id: row.get(1)?,
            row_index: row.get(2)?,
            title: row.get(3)?,
            description: row.get(4)?,
            status: row.get(5)?,
            priority: row.get(6)?,
            assignee_email: row.get(7)?,
            due_date: row.get(8)?,
            last_synced_at: row.get(9)?,
        })
    }

    pub(crate) fn decode(self) -> StorageResult<SheetTask> {
        Ok(SheetTask {
            id: TaskId(self.id),
            synced_sheet_id: SheetId(self.synced_sheet_id),
            row_index: self.row_index,
            title: self.title,
            description: self.description,
            status: parse_column(&self.status)?,
            priority: parse_column(&self.priority)?,
            assignee_email: self.assignee_email,
            due_date: parse_date(self.due_date)?,
            last_synced_at: self.last_synced_at,
        })
    }
}
