//! Single-field edits written back to the source cell.

use crate::engine::SheetSyncEngine;
use crate::error::{SyncError, SyncResult};
use crate::normalize::{display_priority, display_status, parse_due_date};
use serde::Serialize;
use std::str::FromStr;
use taskgrid_sheets::a1;
use taskgrid_storage::{StorageError, TaskField, TaskFieldValue, TaskId, TaskPriority, TaskStatus};
use tracing::{debug, info};

/// Result of `update_fields`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldUpdateReport {
    pub applied: Vec<TaskField>,
    /// One `"<field>: <error>"` line per rejected update.
    pub errors: Vec<String>,
}

/// Cell text and typed mirror value for a caller-supplied field value.
fn prepare_value(field: TaskField, raw: &str) -> SyncResult<(String, TaskFieldValue)> {
    let invalid = || SyncError::InvalidValue {
        field,
        value: raw.to_string(),
    };
    let trimmed = raw.trim();

    match field {
        TaskField::Status => {
            let status = TaskStatus::from_str(raw).map_err(|_| invalid())?;
            Ok((display_status(status).to_string(), TaskFieldValue::Status(status)))
        }
        TaskField::Priority => {
            let priority = TaskPriority::from_str(raw).map_err(|_| invalid())?;
            Ok((
                display_priority(priority).to_string(),
                TaskFieldValue::Priority(priority),
            ))
        }
        TaskField::Assignee => {
            let assignee = (!trimmed.is_empty()).then(|| trimmed.to_string());
            Ok((trimmed.to_string(), TaskFieldValue::Assignee(assignee)))
        }
        TaskField::DueDate => {
            if trimmed.is_empty() {
                return Ok((String::new(), TaskFieldValue::DueDate(None)));
            }
            let date = parse_due_date(trimmed).ok_or_else(invalid)?;
            Ok((trimmed.to_string(), TaskFieldValue::DueDate(Some(date))))
        }
    }
}

impl SheetSyncEngine {
    /// Write one field of a mirrored task back to its spreadsheet cell, then
    /// to the mirror.
    ///
    /// The caller is responsible for the permission check. Nothing is
    /// written anywhere if the field has no column or the value is invalid,
    /// and the mirror is only touched once the sheet write succeeded.
    pub async fn update_field(
        &self,
        task_id: &TaskId,
        field: TaskField,
        value: &str,
    ) -> SyncResult<()> {
        let task = self
            .store
            .get_task(task_id)?
            .ok_or_else(|| SyncError::NotFound(format!("task {task_id}")))?;
        let sheet = self.require_sheet(&task.synced_sheet_id)?;

        let mapping = sheet
            .column_mapping
            .as_ref()
            .ok_or(SyncError::UnmappedField(field))?;
        let column = mapping
            .column_for(field)
            .ok_or(SyncError::UnmappedField(field))?;

        let (cell_text, mirror_value) = prepare_value(field, value)?;

        let workspace = self.require_workspace(&sheet.workspace_id)?;
        let credential = self.workspace_credential(&workspace).await?;

        let row_number = usize::try_from(task.row_index)
            .map_err(|_| StorageError::InvalidData(format!("row index {}", task.row_index)))?
            + 1;
        let range = a1::cell_range(mapping.tab_name.as_deref(), column, row_number);
        debug!(task_id = %task_id, %field, range = %range, "writing field to sheet");

        self.sheets
            .update_range(
                &credential,
                &sheet.spreadsheet_id,
                &range,
                vec![vec![cell_text]],
            )
            .await?;
        self.store.update_task_field(task_id, &mirror_value)?;

        info!(task_id = %task_id, sheet_id = %sheet.id, %field, "field written back");
        Ok(())
    }

    /// Apply several field updates in order. A failing update does not stop
    /// the ones after it.
    pub async fn update_fields(
        &self,
        task_id: &TaskId,
        updates: &[(TaskField, String)],
    ) -> FieldUpdateReport {
        let mut report = FieldUpdateReport::default();
        for (field, value) in updates {
            match self.update_field(task_id, *field, value).await {
                Ok(()) => report.applied.push(*field),
                Err(e) => report.errors.push(format!("{field}: {e}")),
            }
        }
        report
    }
}
