//! Core data types for the mirror database.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Workspace identifier. Workspaces are created by the caller's CRUD layer,
/// so any opaque string is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkspaceId(pub String);

impl WorkspaceId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for WorkspaceId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for WorkspaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for WorkspaceId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Synced sheet identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SheetId(pub String);

impl SheetId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SheetId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SheetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SheetId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Mirrored task identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskId(pub String);

impl TaskId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TaskId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Aggregate sync status of a workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkspaceStatus {
    Idle,
    Syncing,
    Active,
    Error,
}

impl WorkspaceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Syncing => "syncing",
            Self::Active => "active",
            Self::Error => "error",
        }
    }
}

impl FromStr for WorkspaceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "idle" => Ok(Self::Idle),
            "syncing" => Ok(Self::Syncing),
            "active" => Ok(Self::Active),
            "error" => Ok(Self::Error),
            other => Err(format!("unknown workspace status '{other}'")),
        }
    }
}

/// Whether a sheet takes part in workspace-wide sync passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SheetStatus {
    Active,
    Paused,
}

impl SheetStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Paused => "paused",
        }
    }
}

impl FromStr for SheetStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "paused" => Ok(Self::Paused),
            other => Err(format!("unknown sheet status '{other}'")),
        }
    }
}

/// Normalized task status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    #[serde(rename = "todo")]
    Todo,
    #[serde(rename = "in-progress")]
    InProgress,
    #[serde(rename = "review")]
    Review,
    #[serde(rename = "done")]
    Done,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::InProgress => "in-progress",
            Self::Review => "review",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepts the canonical form only, case-insensitively.
impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "todo" => Ok(Self::Todo),
            "in-progress" => Ok(Self::InProgress),
            "review" => Ok(Self::Review),
            "done" => Ok(Self::Done),
            other => Err(format!("unknown task status '{other}'")),
        }
    }
}

/// Normalized task priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
    Critical,
}

impl TaskPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepts the canonical form only, case-insensitively.
impl FromStr for TaskPriority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "critical" => Ok(Self::Critical),
            other => Err(format!("unknown task priority '{other}'")),
        }
    }
}

/// Task fields that can be written back to the spreadsheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskField {
    Status,
    Priority,
    Assignee,
    DueDate,
}

impl TaskField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Status => "status",
            Self::Priority => "priority",
            Self::Assignee => "assignee",
            Self::DueDate => "due_date",
        }
    }
}

impl fmt::Display for TaskField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed value for one writable task field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskFieldValue {
    Status(TaskStatus),
    Priority(TaskPriority),
    Assignee(Option<String>),
    DueDate(Option<NaiveDate>),
}

/// Zero-based column indices of task fields within one tab, plus the tab
/// they were detected on. `None` means the sheet has no such column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ColumnMapping {
    pub tab_name: Option<String>,
    pub title: Option<usize>,
    pub status: Option<usize>,
    pub priority: Option<usize>,
    pub assignee: Option<usize>,
    pub due_date: Option<usize>,
    pub description: Option<usize>,
}

impl ColumnMapping {
    /// Degraded mapping: first column is the title, nothing else is known.
    pub fn title_only(tab_name: Option<String>) -> Self {
        Self {
            tab_name,
            title: Some(0),
            ..Self::default()
        }
    }

    /// Column holding a writable field, if the sheet has one.
    pub fn column_for(&self, field: TaskField) -> Option<usize> {
        match field {
            TaskField::Status => self.status,
            TaskField::Priority => self.priority,
            TaskField::Assignee => self.assignee,
            TaskField::DueDate => self.due_date,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workspace {
    pub id: WorkspaceId,
    pub name: String,
    pub organization_id: String,
    /// User whose Google credential is used for every sheet in the workspace.
    pub owner_user_id: String,
    pub root_folder_id: Option<String>,
    pub sync_status: WorkspaceStatus,
    pub last_synced_at: Option<i64>,
    pub last_error: Option<String>,
    pub created_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncedSheet {
    pub id: SheetId,
    pub workspace_id: WorkspaceId,
    pub project_id: Option<String>,
    pub spreadsheet_id: String,
    pub name: String,
    pub column_mapping: Option<ColumnMapping>,
    pub status: SheetStatus,
    pub last_synced_at: Option<i64>,
    pub row_count: i64,
    pub created_at: i64,
}

/// Mirror of one spreadsheet data row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetTask {
    pub id: TaskId,
    pub synced_sheet_id: SheetId,
    /// Index into the tab's value grid; row 0 is the header, so the A1 row
    /// number is `row_index + 1`.
    pub row_index: i64,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub assignee_email: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub last_synced_at: i64,
}

/// One parsed spreadsheet row, ready to be reconciled into the mirror.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRecord {
    pub row_index: i64,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub assignee_email: Option<String>,
    pub due_date: Option<NaiveDate>,
}

/// Append-only audit record of one sync event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncLogEntry {
    pub id: String,
    pub workspace_id: WorkspaceId,
    pub event_type: String,
    pub details: serde_json::Value,
    pub created_at: i64,
}

/// Outcome counts of reconciling one parse into the mirror.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileCounts {
    pub created: usize,
    pub updated: usize,
    pub deleted: usize,
}
