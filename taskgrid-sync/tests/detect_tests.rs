mod support;

use pretty_assertions::assert_eq;
use support::FakeSheets;
use taskgrid_sheets::GoogleCredential;
use taskgrid_storage::ColumnMapping;
use taskgrid_sync::{detect_mapping, mapping_from_header, SyncError};

fn header(cells: &[&str]) -> Vec<String> {
    cells.iter().map(|c| c.to_string()).collect()
}

fn credential() -> GoogleCredential {
    GoogleCredential::new("token", None)
}

// ── mapping_from_header ─────────────────────────────────────────

#[test]
fn maps_common_headers() {
    let mapping = mapping_from_header(
        &header(&["Task", "Status", "Priority", "Assignee", "Due Date", "Notes"]),
        Some("Tasks"),
    );
    assert_eq!(
        mapping,
        ColumnMapping {
            tab_name: Some("Tasks".into()),
            title: Some(0),
            status: Some(1),
            priority: Some(2),
            assignee: Some(3),
            due_date: Some(4),
            description: Some(5),
        }
    );
}

#[test]
fn headers_are_trimmed_and_case_insensitive() {
    let mapping = mapping_from_header(&header(&["  NAME ", "STATE", "Owner Email"]), None);
    assert_eq!(mapping.title, Some(0));
    assert_eq!(mapping.status, Some(1));
    assert_eq!(mapping.assignee, Some(2));
    assert_eq!(mapping.tab_name, None);
}

#[test]
fn tokens_split_on_separators() {
    let mapping = mapping_from_header(
        &header(&["task_name", "due-date", "assigned/to", "item details"]),
        None,
    );
    assert_eq!(mapping.title, Some(0));
    assert_eq!(mapping.due_date, Some(1));
    assert_eq!(mapping.assignee, Some(2));
    assert_eq!(mapping.description, Some(3));
}

#[test]
fn whole_token_match_only() {
    // "Statuses" and "Titles" contain a pattern but no token equals one.
    let mapping = mapping_from_header(&header(&["Titles", "Statuses", "Summary"]), None);
    assert_eq!(mapping.title, None);
    assert_eq!(mapping.status, None);
}

#[test]
fn each_column_claimed_once() {
    // "Task Status" goes to status, leaving "Task Name" for the title.
    let mapping = mapping_from_header(&header(&["Task Status", "Task Name"]), None);
    assert_eq!(mapping.status, Some(0));
    assert_eq!(mapping.title, Some(1));
}

#[test]
fn leftmost_matching_column_wins() {
    let mapping = mapping_from_header(&header(&["Title", "Status", "State"]), None);
    assert_eq!(mapping.status, Some(1));
}

#[test]
fn empty_header_maps_nothing() {
    let mapping = mapping_from_header(&[], Some("Blank"));
    assert_eq!(mapping, ColumnMapping { tab_name: Some("Blank".into()), ..ColumnMapping::default() });
}

// ── detect_mapping ──────────────────────────────────────────────

#[tokio::test]
async fn first_tab_with_title_column_wins() {
    let sheets = FakeSheets::new();
    sheets.set_tab("ss-1", "Readme", &[&["About this sheet"], &["hello"]]);
    sheets.set_tab("ss-1", "Backlog", &[&["Item", "State"], &["a", "done"]]);
    sheets.set_tab("ss-1", "Sprint", &[&["Title", "Status", "Priority"]]);

    let mapping = detect_mapping(&*sheets, &credential(), "ss-1").await.unwrap();
    assert_eq!(mapping.tab_name.as_deref(), Some("Backlog"));
    assert_eq!(mapping.title, Some(0));
    assert_eq!(mapping.status, Some(1));
    assert_eq!(mapping.priority, None);

    // Only header rows are read, and scanning stops at the winning tab.
    assert_eq!(sheets.reads(), vec!["'Readme'!1:1".to_string(), "'Backlog'!1:1".to_string()]);
}

#[tokio::test]
async fn unreadable_tab_is_skipped() {
    let sheets = FakeSheets::new();
    sheets.set_tab("ss-1", "Broken", &[&["Title"]]);
    sheets.set_tab("ss-1", "Tasks", &[&["Task", "Owner"]]);
    sheets.fail_range("'Broken'!1:1");

    let mapping = detect_mapping(&*sheets, &credential(), "ss-1").await.unwrap();
    assert_eq!(mapping.tab_name.as_deref(), Some("Tasks"));
    assert_eq!(mapping.assignee, Some(1));
}

#[tokio::test]
async fn falls_back_to_first_column_of_first_tab() {
    let sheets = FakeSheets::new();
    sheets.set_tab("ss-1", "Sheet1", &[&["Thing", "Who"], &["x", "y"]]);
    sheets.set_tab("ss-1", "Sheet2", &[]);

    let mapping = detect_mapping(&*sheets, &credential(), "ss-1").await.unwrap();
    assert_eq!(mapping, ColumnMapping::title_only(Some("Sheet1".into())));
}

#[tokio::test]
async fn tab_names_with_quotes_are_escaped() {
    let sheets = FakeSheets::new();
    sheets.set_tab("ss-1", "Sam's tasks", &[&["Title"]]);

    let mapping = detect_mapping(&*sheets, &credential(), "ss-1").await.unwrap();
    assert_eq!(mapping.tab_name.as_deref(), Some("Sam's tasks"));
    assert_eq!(sheets.reads(), vec!["'Sam''s tasks'!1:1".to_string()]);
}

#[tokio::test]
async fn listing_failure_is_an_error() {
    let sheets = FakeSheets::new();
    sheets.set_tab("ss-1", "Tasks", &[&["Title"]]);
    sheets.fail_list_tabs();

    let err = detect_mapping(&*sheets, &credential(), "ss-1").await.unwrap_err();
    assert!(matches!(err, SyncError::Sheets(_)));
}
