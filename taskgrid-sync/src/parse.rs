//! Spreadsheet rows to task records.

use crate::error::SyncResult;
use crate::normalize::{normalize_priority, normalize_status, parse_due_date};
use taskgrid_sheets::{a1, GoogleCredential, SpreadsheetProvider};
use taskgrid_storage::{ColumnMapping, TaskRecord};

fn cell(row: &[String], column: Option<usize>) -> Option<&str> {
    column.and_then(|i| row.get(i)).map(String::as_str)
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Turn a tab's value grid into task records.
///
/// Row 0 is the header. A row without a title is skipped but still counts
/// toward the index, so `row_index` always points at the same grid row.
pub fn parse_rows(rows: &[Vec<String>], mapping: &ColumnMapping) -> Vec<TaskRecord> {
    if mapping.title.is_none() {
        return Vec::new();
    }

    rows.iter()
        .enumerate()
        .skip(1)
        .filter_map(|(index, row)| {
            let title = cell(row, mapping.title)?.trim();
            if title.is_empty() {
                return None;
            }

            Some(TaskRecord {
                row_index: index as i64,
                title: title.to_string(),
                description: non_blank(cell(row, mapping.description)).map(str::to_string),
                status: normalize_status(cell(row, mapping.status).unwrap_or_default()),
                priority: normalize_priority(cell(row, mapping.priority).unwrap_or_default()),
                assignee_email: non_blank(cell(row, mapping.assignee))
                    .map(|a| a.trim().to_string()),
                due_date: cell(row, mapping.due_date).and_then(parse_due_date),
            })
        })
        .collect()
}

/// Read the mapped tab and parse every data row.
pub async fn parse_tasks(
    provider: &dyn SpreadsheetProvider,
    credential: &GoogleCredential,
    spreadsheet_id: &str,
    mapping: &ColumnMapping,
) -> SyncResult<Vec<TaskRecord>> {
    let range = a1::sheet_range(mapping.tab_name.as_deref());
    let rows = provider.read_range(credential, spreadsheet_id, &range).await?;
    Ok(parse_rows(&rows, mapping))
}
