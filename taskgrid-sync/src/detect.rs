//! Column mapping detection from header rows.

use crate::error::SyncResult;
use taskgrid_sheets::{a1, GoogleCredential, SpreadsheetProvider};
use taskgrid_storage::ColumnMapping;
use tracing::{debug, warn};

const TITLE_PATTERNS: &[&str] = &["title", "task", "name", "item"];
const STATUS_PATTERNS: &[&str] = &["status", "state"];
const PRIORITY_PATTERNS: &[&str] = &["priority", "importance"];
const ASSIGNEE_PATTERNS: &[&str] = &["assignee", "assigned", "owner", "email"];
const DUE_DATE_PATTERNS: &[&str] = &["due", "deadline", "date", "due_date", "duedate", "due date"];
const DESCRIPTION_PATTERNS: &[&str] = &["description", "desc", "details", "notes"];

#[derive(Clone, Copy)]
enum Slot {
    Status,
    Priority,
    DueDate,
    Assignee,
    Description,
    Title,
}

/// Order in which fields claim columns. Title goes last so a header like
/// "Task Status" lands on status.
const SLOT_ORDER: &[(Slot, &[&str])] = &[
    (Slot::Status, STATUS_PATTERNS),
    (Slot::Priority, PRIORITY_PATTERNS),
    (Slot::DueDate, DUE_DATE_PATTERNS),
    (Slot::Assignee, ASSIGNEE_PATTERNS),
    (Slot::Description, DESCRIPTION_PATTERNS),
    (Slot::Title, TITLE_PATTERNS),
];

fn header_matches(header: &str, patterns: &[&str]) -> bool {
    let header = header.trim().to_lowercase();
    if header.is_empty() {
        return false;
    }
    patterns.iter().any(|p| {
        header == *p
            || header
                .split(|c: char| c.is_whitespace() || matches!(c, '_' | '-' | '/'))
                .any(|token| token == *p)
    })
}

/// Map header cells to task fields.
///
/// Each column is claimed by at most one field and each field takes the
/// leftmost unclaimed column that matches it. `title` is `None` when no
/// header looks like a title.
pub fn mapping_from_header(header: &[String], tab_name: Option<&str>) -> ColumnMapping {
    let mut claimed = vec![false; header.len()];
    let mut mapping = ColumnMapping {
        tab_name: tab_name.map(str::to_string),
        ..ColumnMapping::default()
    };

    for (slot, patterns) in SLOT_ORDER {
        let column = header
            .iter()
            .enumerate()
            .position(|(i, cell)| !claimed[i] && header_matches(cell, patterns));
        let Some(column) = column else { continue };
        claimed[column] = true;

        let target = match slot {
            Slot::Status => &mut mapping.status,
            Slot::Priority => &mut mapping.priority,
            Slot::DueDate => &mut mapping.due_date,
            Slot::Assignee => &mut mapping.assignee,
            Slot::Description => &mut mapping.description,
            Slot::Title => &mut mapping.title,
        };
        *target = Some(column);
    }

    mapping
}

/// Find the task columns of a spreadsheet.
///
/// Tabs are scanned in display order and the first one whose header has a
/// title column wins. When none does, the first column of the first tab is
/// taken as the title and nothing else is mapped. A tab whose header can't
/// be read is skipped; failing to list tabs at all is an error.
pub async fn detect_mapping(
    provider: &dyn SpreadsheetProvider,
    credential: &GoogleCredential,
    spreadsheet_id: &str,
) -> SyncResult<ColumnMapping> {
    let tabs = provider.list_tabs(credential, spreadsheet_id).await?;

    for tab in &tabs {
        let range = a1::header_range(Some(&tab.title));
        let rows = match provider.read_range(credential, spreadsheet_id, &range).await {
            Ok(rows) => rows,
            Err(e) => {
                warn!(spreadsheet_id, tab = %tab.title, error = %e, "skipping unreadable tab");
                continue;
            }
        };

        let header = rows.into_iter().next().unwrap_or_default();
        let mapping = mapping_from_header(&header, Some(&tab.title));
        if mapping.title.is_some() {
            debug!(spreadsheet_id, tab = %tab.title, ?mapping, "column mapping detected");
            return Ok(mapping);
        }
        debug!(spreadsheet_id, tab = %tab.title, "no title column in header");
    }

    let fallback = ColumnMapping::title_only(tabs.first().map(|t| t.title.clone()));
    debug!(spreadsheet_id, ?fallback, "falling back to title-only mapping");
    Ok(fallback)
}
