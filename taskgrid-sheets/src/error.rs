//! Spreadsheet access error types.

use thiserror::Error;

/// Result type for spreadsheet operations.
pub type SheetsResult<T> = Result<T, SheetsError>;

/// Errors that can occur talking to the spreadsheet provider.
#[derive(Debug, Error)]
pub enum SheetsError {
    #[error("Sheets API request failed: {0}")]
    Api(String),

    #[error("authentication failed: {0}")]
    AuthFailed(String),

    #[error("no credential available for user {0}")]
    CredentialMissing(String),

    #[error("rate limited by Sheets API")]
    RateLimited,

    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid range: {0}")]
    InvalidRange(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl SheetsError {
    /// True for failures a later attempt may not hit: rate limits, server
    /// errors and transport failures.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::RateLimited => true,
            Self::Http(e) => e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error()),
            Self::Api(msg) => msg.starts_with("HTTP 5"),
            _ => false,
        }
    }
}
