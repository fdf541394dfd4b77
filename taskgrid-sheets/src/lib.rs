//! Google Sheets access for taskgrid.
//!
//! Provides:
//! - `SpreadsheetProvider`, the list-tabs / read-range / update-range seam the
//!   sync engine talks to
//! - `CredentialProvider`, the per-user token lookup owned by the auth layer
//! - `SheetsApiClient`, a reqwest implementation against the Sheets v4 REST API
//! - A1-notation helpers (column letters, quoted tab ranges)

pub mod a1;
pub mod api_client;
pub mod config;
pub mod error;
pub mod provider;
pub mod types;

pub use api_client::SheetsApiClient;
pub use config::SheetsConfig;
pub use error::{SheetsError, SheetsResult};
pub use provider::{CredentialProvider, SpreadsheetProvider};
pub use types::*;
