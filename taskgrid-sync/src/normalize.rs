//! Free-text cell values to canonical task enums and back.
//!
//! Matching is by case-insensitive substring: a status cell reading
//! "Finished 3/4" is `done`. Anything unrecognized falls back to a default
//! instead of failing.

use chrono::{DateTime, Datelike, NaiveDate};
use taskgrid_storage::{TaskPriority, TaskStatus};

/// Substring rules for status, checked in order; the first hit wins.
const STATUS_RULES: &[(&[&str], TaskStatus)] = &[
    (&["done", "complete", "finished", "closed"], TaskStatus::Done),
    (&["progress", "doing", "working", "started"], TaskStatus::InProgress),
    (&["review", "check", "pending", "waiting"], TaskStatus::Review),
];

/// Substring rules for priority, checked in order; the first hit wins.
const PRIORITY_RULES: &[(&[&str], TaskPriority)] = &[
    (&["critical", "urgent", "highest"], TaskPriority::Critical),
    (&["high", "important"], TaskPriority::High),
    (&["low", "minor"], TaskPriority::Low),
];

/// Date layouts accepted in due-date cells. `%B` also accepts abbreviated
/// month names when parsing.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d.%m.%Y",
    "%B %d, %Y",
    "%B %d %Y",
    "%d %B %Y",
];

fn first_match<T: Copy>(raw: &str, rules: &[(&[&str], T)]) -> Option<T> {
    let lowered = raw.to_lowercase();
    rules
        .iter()
        .find(|(needles, _)| needles.iter().any(|n| lowered.contains(n)))
        .map(|(_, value)| *value)
}

/// Status from a free-text cell. Defaults to `todo`.
pub fn normalize_status(raw: &str) -> TaskStatus {
    first_match(raw, STATUS_RULES).unwrap_or(TaskStatus::Todo)
}

/// Priority from a free-text cell. Defaults to `medium`.
pub fn normalize_priority(raw: &str) -> TaskPriority {
    first_match(raw, PRIORITY_RULES).unwrap_or(TaskPriority::Medium)
}

/// Text written to a status cell.
pub fn display_status(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::Done => "Complete",
        TaskStatus::InProgress => "In Progress",
        TaskStatus::Review => "Review",
        TaskStatus::Todo => "To Do",
    }
}

/// Text written to a priority cell.
pub fn display_priority(priority: TaskPriority) -> &'static str {
    match priority {
        TaskPriority::Critical => "Critical",
        TaskPriority::High => "High",
        TaskPriority::Medium => "Medium",
        TaskPriority::Low => "Low",
    }
}

/// Due date from a free-text cell, or `None` when it can't be read.
///
/// Numeric day/month orders are tried US-first, so `03/04/2026` is March 4.
/// Two-digit years are rejected.
pub fn parse_due_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let parsed = DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|dt| dt.date_naive())
        })?;

    (parsed.year() >= 1000).then_some(parsed)
}
