//! Mirrored task rows: snapshot reconciliation, reads and single-field updates.

use super::helpers::{format_date, TaskRow, TASK_COLUMNS};
use super::{with_transaction, TaskGridStore};
use crate::error::{StorageError, StorageResult};
use crate::types::{
    ReconcileCounts, SheetId, SheetStatus, SheetTask, TaskFieldValue, TaskId, TaskRecord,
    WorkspaceId,
};
use duckdb::params;
use std::collections::{HashMap, HashSet};
use tracing::debug;

impl TaskGridStore {
    /// Make the mirror of one sheet match a full parse of that sheet.
    ///
    /// In a single transaction: every record is upserted by
    /// `(sheet_id, row_index)`, every stored task whose row index is absent
    /// from `records` is deleted, and the sheet's row count, sync timestamp
    /// and `active` status are updated. On error nothing is applied.
    pub fn apply_sheet_snapshot(
        &self,
        sheet_id: &SheetId,
        records: &[TaskRecord],
        synced_at: i64,
    ) -> StorageResult<ReconcileCounts> {
        let conn = self.lock_conn();

        with_transaction(&conn, |conn| {
            let sheets: i64 = conn.query_row(
                "SELECT COUNT(*) FROM synced_sheets WHERE id = ?",
                params![sheet_id.as_str()],
                |row| row.get(0),
            )?;
            if sheets == 0 {
                return Err(StorageError::NotFound(format!("sheet {sheet_id}")));
            }

            let existing: HashMap<i64, String> = {
                let mut stmt =
                    conn.prepare("SELECT row_index, id FROM sheet_tasks WHERE synced_sheet_id = ?")?;
                stmt.query_map(params![sheet_id.as_str()], |row| {
                    Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
                })?
                .collect::<Result<_, _>>()?
            };

            let mut counts = ReconcileCounts::default();
            let mut seen: HashSet<i64> = HashSet::with_capacity(records.len());

            for record in records {
                seen.insert(record.row_index);
                let due_date = format_date(record.due_date);

                match existing.get(&record.row_index) {
                    Some(task_id) => {
                        conn.execute(
                            r#"UPDATE sheet_tasks SET title = ?, description = ?, status = ?, priority = ?,
                                   assignee_email = ?, due_date = ?, last_synced_at = ?
                               WHERE id = ?"#,
                            params![
                                record.title,
                                record.description,
                                record.status.as_str(),
                                record.priority.as_str(),
                                record.assignee_email,
                                due_date,
                                synced_at,
                                task_id,
                            ],
                        )?;
                        counts.updated += 1;
                    }
                    None => {
                        conn.execute(
                            r#"INSERT INTO sheet_tasks (id, synced_sheet_id, row_index, title, description,
                                   status, priority, assignee_email, due_date, last_synced_at)
                               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
                            params![
                                TaskId::new().as_str(),
                                sheet_id.as_str(),
                                record.row_index,
                                record.title,
                                record.description,
                                record.status.as_str(),
                                record.priority.as_str(),
                                record.assignee_email,
                                due_date,
                                synced_at,
                            ],
                        )?;
                        counts.created += 1;
                    }
                }
            }

            for (row_index, task_id) in &existing {
                if !seen.contains(row_index) {
                    conn.execute("DELETE FROM sheet_tasks WHERE id = ?", params![task_id])?;
                    counts.deleted += 1;
                }
            }

            conn.execute(
                "UPDATE synced_sheets SET row_count = ?, last_synced_at = ?, status = ? WHERE id = ?",
                params![
                    records.len() as i64,
                    synced_at,
                    SheetStatus::Active.as_str(),
                    sheet_id.as_str(),
                ],
            )?;

            debug!(
                sheet_id = %sheet_id,
                created = counts.created,
                updated = counts.updated,
                deleted = counts.deleted,
                "Snapshot applied"
            );
            Ok(counts)
        })
    }

    pub fn get_task(&self, id: &TaskId) -> StorageResult<Option<SheetTask>> {
        let conn = self.lock_conn();
        let result = conn.query_row(
            &format!("SELECT {TASK_COLUMNS} FROM sheet_tasks WHERE id = ?"),
            params![id.as_str()],
            TaskRow::from_row,
        );

        match result {
            Ok(row) => row.decode().map(Some),
            Err(duckdb::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Mirrored tasks of one sheet, in row order.
    pub fn list_tasks_for_sheet(&self, sheet_id: &SheetId) -> StorageResult<Vec<SheetTask>> {
        let conn = self.lock_conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {TASK_COLUMNS} FROM sheet_tasks WHERE synced_sheet_id = ? ORDER BY row_index"
        ))?;
        let rows = stmt
            .query_map(params![sheet_id.as_str()], TaskRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter().map(TaskRow::decode).collect()
    }

    /// Mirrored tasks of every sheet in a workspace, grouped by sheet in
    /// connection order, then by row.
    pub fn list_tasks_for_workspace(
        &self,
        workspace_id: &WorkspaceId,
    ) -> StorageResult<Vec<SheetTask>> {
        let columns = TASK_COLUMNS
            .split(", ")
            .map(|c| format!("t.{}", c.trim()))
            .collect::<Vec<_>>()
            .join(", ");

        let conn = self.lock_conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {columns} FROM sheet_tasks t \
             JOIN synced_sheets s ON s.id = t.synced_sheet_id \
             WHERE s.workspace_id = ? \
             ORDER BY s.created_at, s.rowid, t.row_index"
        ))?;
        let rows = stmt
            .query_map(params![workspace_id.as_str()], TaskRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter().map(TaskRow::decode).collect()
    }

    /// Overwrite a single field of a mirrored task.
    pub fn update_task_field(&self, id: &TaskId, value: &TaskFieldValue) -> StorageResult<()> {
        let conn = self.lock_conn();
        let affected = match value {
            TaskFieldValue::Status(status) => conn.execute(
                "UPDATE sheet_tasks SET status = ? WHERE id = ?",
                params![status.as_str(), id.as_str()],
            )?,
            TaskFieldValue::Priority(priority) => conn.execute(
                "UPDATE sheet_tasks SET priority = ? WHERE id = ?",
                params![priority.as_str(), id.as_str()],
            )?,
            TaskFieldValue::Assignee(assignee) => conn.execute(
                "UPDATE sheet_tasks SET assignee_email = ? WHERE id = ?",
                params![assignee, id.as_str()],
            )?,
            TaskFieldValue::DueDate(due) => conn.execute(
                "UPDATE sheet_tasks SET due_date = ? WHERE id = ?",
                params![format_date(*due), id.as_str()],
            )?,
        };

        if affected == 0 {
            return Err(StorageError::NotFound(format!("task {id}")));
        }
        Ok(())
    }
}
