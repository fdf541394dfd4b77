//! Seams between the sync core and its external collaborators.

use crate::error::SheetsResult;
use crate::types::{GoogleCredential, SheetTab};
use async_trait::async_trait;

/// External spreadsheet store.
///
/// Ranges are A1 notation (see [`crate::a1`]). Rows come back as display
/// strings with trailing empty cells trimmed, exactly as the Sheets values
/// endpoint returns them.
#[async_trait]
pub trait SpreadsheetProvider: Send + Sync {
    /// Tabs of a spreadsheet in display order.
    async fn list_tabs(
        &self,
        credential: &GoogleCredential,
        spreadsheet_id: &str,
    ) -> SheetsResult<Vec<SheetTab>>;

    /// Values of a range, row-major.
    async fn read_range(
        &self,
        credential: &GoogleCredential,
        spreadsheet_id: &str,
        range: &str,
    ) -> SheetsResult<Vec<Vec<String>>>;

    /// Overwrite a range (a single cell or row) with the given values.
    async fn update_range(
        &self,
        credential: &GoogleCredential,
        spreadsheet_id: &str,
        range: &str,
        values: Vec<Vec<String>>,
    ) -> SheetsResult<()>;
}

/// Token lookup owned by the authentication layer.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// A currently valid (or refreshable) token pair for the user.
    async fn get_credential(&self, user_id: &str) -> SheetsResult<GoogleCredential>;
}
