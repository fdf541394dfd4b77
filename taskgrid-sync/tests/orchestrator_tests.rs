mod support;

use pretty_assertions::assert_eq;
use support::{engine, workspace, FakeSheets};
use taskgrid_storage::{SheetStatus, StorageError, WorkspaceId, WorkspaceStatus};
use taskgrid_sync::SyncError;

fn seed(sheets: &FakeSheets) {
    sheets.set_tab("ss-a", "Tasks", &[&["Title", "Status"], &["a1", "done"], &["a2", ""]]);
    sheets.set_tab("ss-b", "Tasks", &[&["Title"], &["b1"]]);
    sheets.set_tab("ss-c", "Tasks", &[&["Title"], &["c1"], &["c2"], &["c3"]]);
}

#[tokio::test]
async fn syncs_every_active_sheet_and_marks_workspace_active() {
    let sheets = FakeSheets::new();
    seed(&sheets);
    let engine = engine(&sheets);
    let ws = workspace(&engine);
    for ss in ["ss-a", "ss-b", "ss-c"] {
        engine.store().create_sheet(&ws.id, ss, ss, None).unwrap();
    }

    let report = engine.sync_workspace(&ws.id).await.unwrap();
    assert_eq!(report.sheets_synced, 3);
    assert_eq!(report.created, 6);
    assert_eq!(report.updated, 0);

    let stored = engine.store().get_workspace(&ws.id).unwrap().unwrap();
    assert_eq!(stored.sync_status, WorkspaceStatus::Active);
    assert_eq!(stored.last_synced_at, Some(report.synced_at));
    assert_eq!(stored.last_error, None);

    let titles: Vec<_> = engine
        .tasks_for_workspace(&ws.id)
        .unwrap()
        .into_iter()
        .map(|t| t.title)
        .collect();
    assert_eq!(titles, vec!["a1", "a2", "b1", "c1", "c2", "c3"]);

    let log = engine.sync_log(&ws.id, 1).unwrap();
    assert_eq!(log[0].event_type, "workspace_synced");
    assert_eq!(log[0].details["sheets"], 3);
}

#[tokio::test]
async fn paused_sheets_are_skipped() {
    let sheets = FakeSheets::new();
    seed(&sheets);
    let engine = engine(&sheets);
    let ws = workspace(&engine);
    let a = engine.store().create_sheet(&ws.id, "ss-a", "A", None).unwrap();
    let b = engine.store().create_sheet(&ws.id, "ss-b", "B", None).unwrap();
    engine.store().set_sheet_status(&b.id, SheetStatus::Paused).unwrap();

    let report = engine.sync_workspace(&ws.id).await.unwrap();
    assert_eq!(report.sheets_synced, 1);
    assert_eq!(engine.tasks_for_sheet(&a.id).unwrap().len(), 2);
    assert!(engine.tasks_for_sheet(&b.id).unwrap().is_empty());
    assert_eq!(
        engine.store().get_sheet(&b.id).unwrap().unwrap().status,
        SheetStatus::Paused
    );
}

#[tokio::test]
async fn failing_sheet_aborts_pass_and_sets_error() {
    let sheets = FakeSheets::new();
    seed(&sheets);
    sheets.fail_range("'Tasks'");
    let engine = engine(&sheets);
    let ws = workspace(&engine);
    let a = engine.store().create_sheet(&ws.id, "ss-a", "A", None).unwrap();
    let c = engine.store().create_sheet(&ws.id, "ss-c", "C", None).unwrap();

    let err = engine.sync_workspace(&ws.id).await.unwrap_err();
    match &err {
        SyncError::SheetSyncFailed { sheet_id, message } => {
            assert_eq!(sheet_id, a.id.as_str());
            assert!(message.contains("HTTP 500"));
        }
        other => panic!("expected SheetSyncFailed, got {other:?}"),
    }

    let stored = engine.store().get_workspace(&ws.id).unwrap().unwrap();
    assert_eq!(stored.sync_status, WorkspaceStatus::Error);
    assert_eq!(stored.last_error, Some(err.to_string()));
    assert_eq!(stored.last_synced_at, None);

    // The second sheet was never attempted.
    assert!(engine.store().get_sheet(&c.id).unwrap().unwrap().column_mapping.is_none());

    let events: Vec<_> = engine
        .sync_log(&ws.id, 10)
        .unwrap()
        .into_iter()
        .map(|e| e.event_type)
        .collect();
    assert_eq!(events, vec!["workspace_sync_failed", "sheet_sync_failed"]);
}

#[tokio::test]
async fn recovers_after_a_failed_pass() {
    let sheets = FakeSheets::new();
    seed(&sheets);
    let engine = engine(&sheets);
    let ws = workspace(&engine);
    engine.store().create_sheet(&ws.id, "ss-b", "B", None).unwrap();

    sheets.fail_list_tabs();
    assert!(engine.sync_workspace(&ws.id).await.is_err());
    assert_eq!(
        engine.store().get_workspace(&ws.id).unwrap().unwrap().sync_status,
        WorkspaceStatus::Error
    );

    sheets.clear_failures();
    engine.sync_workspace(&ws.id).await.unwrap();
    let stored = engine.store().get_workspace(&ws.id).unwrap().unwrap();
    assert_eq!(stored.sync_status, WorkspaceStatus::Active);
    assert_eq!(stored.last_error, None);
}

#[tokio::test]
async fn failure_to_record_completion_sets_error() {
    let sheets = FakeSheets::new();
    seed(&sheets);
    let engine = engine(&sheets);
    let ws = workspace(&engine);
    let a = engine.store().create_sheet(&ws.id, "ss-a", "A", None).unwrap();

    // Someone resets the workspace while its sheets are being read.
    let store = engine.store().clone();
    let ws_id = ws.id.clone();
    sheets.on_read(move |range| {
        if range == "'Tasks'" {
            store
                .set_workspace_status(&ws_id, WorkspaceStatus::Idle, None)
                .unwrap();
        }
    });

    let err = engine.sync_workspace(&ws.id).await.unwrap_err();
    assert!(matches!(err, SyncError::Storage(StorageError::Conflict(_))));

    // The sheet itself synced; only the workspace pass failed.
    assert_eq!(engine.tasks_for_sheet(&a.id).unwrap().len(), 2);

    let stored = engine.store().get_workspace(&ws.id).unwrap().unwrap();
    assert_eq!(stored.sync_status, WorkspaceStatus::Error);
    assert_eq!(stored.last_error, Some(err.to_string()));
    assert_eq!(stored.last_synced_at, None);

    let log = engine.sync_log(&ws.id, 1).unwrap();
    assert_eq!(log[0].event_type, "workspace_sync_failed");
}

#[tokio::test]
async fn concurrent_workspace_pass_is_rejected() {
    let sheets = FakeSheets::new();
    seed(&sheets);
    let engine = engine(&sheets);
    let ws = workspace(&engine);
    engine.store().create_sheet(&ws.id, "ss-b", "B", None).unwrap();

    let key = format!("workspace:{}", ws.id);
    let lease = engine.sync_guard().try_acquire(&key).unwrap();
    let err = engine.sync_workspace(&ws.id).await.unwrap_err();
    assert!(matches!(err, SyncError::WorkspaceSyncInProgress(_)));
    assert!(sheets.reads().is_empty());
    assert_eq!(
        engine.store().get_workspace(&ws.id).unwrap().unwrap().sync_status,
        WorkspaceStatus::Idle
    );

    drop(lease);
    engine.sync_workspace(&ws.id).await.unwrap();
    assert!(!engine.sync_guard().is_held(&key));
}

#[tokio::test]
async fn empty_workspace_syncs_cleanly() {
    let sheets = FakeSheets::new();
    let engine = engine(&sheets);
    let ws = workspace(&engine);

    let report = engine.sync_workspace(&ws.id).await.unwrap();
    assert_eq!(report.sheets_synced, 0);
    assert_eq!(
        engine.store().get_workspace(&ws.id).unwrap().unwrap().sync_status,
        WorkspaceStatus::Active
    );
}

#[tokio::test]
async fn unknown_workspace_is_not_found() {
    let sheets = FakeSheets::new();
    let engine = engine(&sheets);

    let err = engine
        .sync_workspace(&WorkspaceId::from("ghost"))
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::NotFound(_)));
    assert!(engine.sync_log(&WorkspaceId::from("ghost"), 10).unwrap().is_empty());
}
