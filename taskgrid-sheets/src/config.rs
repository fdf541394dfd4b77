//! Sheets client configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the Google Sheets client.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetsConfig {
    /// Base URL for the Sheets REST API (e.g., "https://sheets.googleapis.com/v4").
    pub api_base_url: String,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,

    /// How written values are interpreted: "USER_ENTERED" parses them like
    /// typed input, "RAW" stores them verbatim.
    pub value_input_option: String,
}

impl Default for SheetsConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://sheets.googleapis.com/v4".to_string(),
            request_timeout_secs: 30,
            value_input_option: "USER_ENTERED".to_string(),
        }
    }
}

impl SheetsConfig {
    /// Config pointing at a local mock server.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: base_url.into(),
            ..Self::default()
        }
    }
}
