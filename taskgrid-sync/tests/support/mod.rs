//! In-memory stand-ins for the Sheets API and the credential store.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use taskgrid_sheets::a1;
use taskgrid_sheets::{
    CredentialProvider, GoogleCredential, SheetTab, SheetsError, SheetsResult,
    SpreadsheetProvider,
};
use taskgrid_storage::{TaskGridStore, Workspace};
use taskgrid_sync::SheetSyncEngine;

pub const OWNER: &str = "owner-1";

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// ── Fake spreadsheets ───────────────────────────────────────────

#[derive(Default)]
struct FakeState {
    /// spreadsheet id → tabs in display order.
    spreadsheets: HashMap<String, Vec<(String, Vec<Vec<String>>)>>,
    failing_ranges: HashSet<String>,
    fail_list_tabs: bool,
    fail_writes: bool,
    reads: Vec<String>,
    writes: Vec<(String, String, Vec<Vec<String>>)>,
    on_read: Option<ReadHook>,
}

type ReadHook = Arc<dyn Fn(&str) + Send + Sync>;

/// Spreadsheets held in memory. Understands the range shapes the engine
/// produces: `'Tab'!1:1`, `'Tab'`, `A:ZZZ`, `1:1` and single cells.
#[derive(Default)]
pub struct FakeSheets {
    state: Mutex<FakeState>,
}

fn to_grid(rows: &[&[&str]]) -> Vec<Vec<String>> {
    rows.iter()
        .map(|row| row.iter().map(|c| c.to_string()).collect())
        .collect()
}

fn unquote(raw: &str) -> String {
    raw.strip_prefix('\'')
        .and_then(|s| s.strip_suffix('\''))
        .map(|s| s.replace("''", "'"))
        .unwrap_or_else(|| raw.to_string())
}

impl FakeSheets {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn state(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    /// Add a tab, or replace the contents of an existing one.
    pub fn set_tab(&self, spreadsheet_id: &str, tab: &str, rows: &[&[&str]]) {
        let mut state = self.state();
        let tabs = state
            .spreadsheets
            .entry(spreadsheet_id.to_string())
            .or_default();
        match tabs.iter_mut().find(|(title, _)| title == tab) {
            Some((_, grid)) => *grid = to_grid(rows),
            None => tabs.push((tab.to_string(), to_grid(rows))),
        }
    }

    pub fn fail_range(&self, range: &str) {
        self.state().failing_ranges.insert(range.to_string());
    }

    pub fn clear_failures(&self) {
        let mut state = self.state();
        state.failing_ranges.clear();
        state.fail_list_tabs = false;
        state.fail_writes = false;
    }

    pub fn fail_list_tabs(&self) {
        self.state().fail_list_tabs = true;
    }

    /// Run `hook` with the requested range before every read is served.
    pub fn on_read(&self, hook: impl Fn(&str) + Send + Sync + 'static) {
        self.state().on_read = Some(Arc::new(hook));
    }

    pub fn fail_writes(&self) {
        self.state().fail_writes = true;
    }

    pub fn reads(&self) -> Vec<String> {
        self.state().reads.clone()
    }

    pub fn writes(&self) -> Vec<(String, String, Vec<Vec<String>>)> {
        self.state().writes.clone()
    }

    /// Cell value by grid position (row 0 is the header).
    pub fn cell(&self, spreadsheet_id: &str, tab: &str, row: usize, column: usize) -> Option<String> {
        let state = self.state();
        let tabs = state.spreadsheets.get(spreadsheet_id)?;
        let (_, grid) = tabs.iter().find(|(title, _)| title == tab)?;
        grid.get(row)?.get(column).cloned()
    }
}

fn resolve_tab<'a>(
    tabs: &'a mut [(String, Vec<Vec<String>>)],
    name: Option<&str>,
) -> SheetsResult<&'a mut Vec<Vec<String>>> {
    let found = match name {
        Some(name) => tabs.iter_mut().find(|(title, _)| title == name),
        None => tabs.iter_mut().next(),
    };
    found
        .map(|(_, grid)| grid)
        .ok_or_else(|| SheetsError::InvalidRange(format!("unknown tab {name:?}")))
}

#[async_trait]
impl SpreadsheetProvider for FakeSheets {
    async fn list_tabs(
        &self,
        _credential: &GoogleCredential,
        spreadsheet_id: &str,
    ) -> SheetsResult<Vec<SheetTab>> {
        let state = self.state();
        if state.fail_list_tabs {
            return Err(SheetsError::Api("HTTP 500: list tabs".into()));
        }
        let tabs = state
            .spreadsheets
            .get(spreadsheet_id)
            .ok_or_else(|| SheetsError::NotFound(format!("spreadsheet {spreadsheet_id}")))?;
        Ok(tabs
            .iter()
            .enumerate()
            .map(|(i, (title, _))| SheetTab {
                sheet_id: i as i64,
                title: title.clone(),
                index: i as i64,
            })
            .collect())
    }

    async fn read_range(
        &self,
        _credential: &GoogleCredential,
        spreadsheet_id: &str,
        range: &str,
    ) -> SheetsResult<Vec<Vec<String>>> {
        let hook = self.state().on_read.clone();
        if let Some(hook) = hook {
            hook(range);
        }

        let mut state = self.state();
        state.reads.push(range.to_string());
        if state.failing_ranges.contains(range) {
            return Err(SheetsError::Api(format!("HTTP 500: range {range}")));
        }
        let tabs = state
            .spreadsheets
            .get_mut(spreadsheet_id)
            .ok_or_else(|| SheetsError::NotFound(format!("spreadsheet {spreadsheet_id}")))?;

        if let Some(prefix) = range.strip_suffix("!1:1") {
            let grid = resolve_tab(tabs, Some(&unquote(prefix)))?;
            return Ok(grid.iter().take(1).cloned().collect());
        }
        if range == "1:1" {
            let grid = resolve_tab(tabs, None)?;
            return Ok(grid.iter().take(1).cloned().collect());
        }
        if range == "A:ZZZ" {
            return Ok(resolve_tab(tabs, None)?.clone());
        }
        if range.starts_with('\'') && !range.contains('!') {
            return Ok(resolve_tab(tabs, Some(&unquote(range)))?.clone());
        }
        if let Some(cell) = a1::parse_cell_range(range) {
            let grid = resolve_tab(tabs, cell.tab.as_deref())?;
            let value = grid
                .get(cell.row_number - 1)
                .and_then(|row| row.get(cell.column))
                .cloned();
            return Ok(value.map(|v| vec![vec![v]]).unwrap_or_default());
        }
        Err(SheetsError::InvalidRange(range.to_string()))
    }

    async fn update_range(
        &self,
        _credential: &GoogleCredential,
        spreadsheet_id: &str,
        range: &str,
        values: Vec<Vec<String>>,
    ) -> SheetsResult<()> {
        let mut state = self.state();
        if state.fail_writes {
            return Err(SheetsError::Api(format!("HTTP 500: range {range}")));
        }
        let cell = a1::parse_cell_range(range)
            .ok_or_else(|| SheetsError::InvalidRange(range.to_string()))?;
        let value = values
            .first()
            .and_then(|row| row.first())
            .cloned()
            .unwrap_or_default();

        let tabs = state
            .spreadsheets
            .get_mut(spreadsheet_id)
            .ok_or_else(|| SheetsError::NotFound(format!("spreadsheet {spreadsheet_id}")))?;
        let grid = resolve_tab(tabs, cell.tab.as_deref())?;
        let row_idx = cell.row_number - 1;
        if grid.len() <= row_idx {
            grid.resize(row_idx + 1, Vec::new());
        }
        let row = &mut grid[row_idx];
        if row.len() <= cell.column {
            row.resize(cell.column + 1, String::new());
        }
        row[cell.column] = value;

        state
            .writes
            .push((spreadsheet_id.to_string(), range.to_string(), values));
        Ok(())
    }
}

// ── Fake credentials ────────────────────────────────────────────

#[derive(Default)]
pub struct FakeCredentials {
    tokens: HashMap<String, GoogleCredential>,
}

impl FakeCredentials {
    pub fn with_user(user_id: &str) -> Arc<Self> {
        let mut tokens = HashMap::new();
        tokens.insert(
            user_id.to_string(),
            GoogleCredential::new(format!("token-{user_id}"), Some(format!("refresh-{user_id}"))),
        );
        Arc::new(Self { tokens })
    }
}

#[async_trait]
impl CredentialProvider for FakeCredentials {
    async fn get_credential(&self, user_id: &str) -> SheetsResult<GoogleCredential> {
        self.tokens
            .get(user_id)
            .cloned()
            .ok_or_else(|| SheetsError::CredentialMissing(user_id.to_string()))
    }
}

// ── Fixtures ────────────────────────────────────────────────────

pub fn engine(sheets: &Arc<FakeSheets>) -> SheetSyncEngine {
    init_tracing();
    let store = TaskGridStore::open_in_memory().unwrap();
    SheetSyncEngine::new(store, sheets.clone(), FakeCredentials::with_user(OWNER))
}

pub fn workspace(engine: &SheetSyncEngine) -> Workspace {
    engine
        .store()
        .create_workspace("Launch", "org-1", OWNER, None)
        .unwrap()
}
