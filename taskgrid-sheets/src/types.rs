//! Shared types for spreadsheet access.

use serde::{Deserialize, Serialize};

/// OAuth token pair for one user, as issued by the auth layer.
///
/// The sync core never refreshes tokens itself; the provider behind
/// `CredentialProvider` hands out a currently valid access token.
#[derive(Clone, Serialize, Deserialize)]
pub struct GoogleCredential {
    pub access_token: String,
    pub refresh_token: Option<String>,
}

impl GoogleCredential {
    pub fn new(access_token: impl Into<String>, refresh_token: Option<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token,
        }
    }
}

impl std::fmt::Debug for GoogleCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleCredential")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// One tab (worksheet) of a spreadsheet.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetTab {
    /// Numeric `sheetId` of the tab; stable across renames.
    #[serde(default)]
    pub sheet_id: i64,
    pub title: String,
    /// Position of the tab in the spreadsheet, left to right.
    #[serde(default)]
    pub index: i64,
}

/// A rectangular block of cell values as returned by the values endpoint.
/// Trailing empty cells and rows are omitted by the API, so rows may be
/// ragged.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueRange {
    #[serde(default)]
    pub range: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub major_dimension: Option<String>,
    #[serde(default)]
    pub values: Vec<Vec<serde_json::Value>>,
}

impl ValueRange {
    /// Cell values as display strings. Numbers and booleans are rendered the
    /// way they appear in JSON; nulls become empty strings.
    pub fn into_rows(self) -> Vec<Vec<String>> {
        self.values
            .into_iter()
            .map(|row| row.into_iter().map(cell_to_string).collect())
            .collect()
    }
}

fn cell_to_string(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}
