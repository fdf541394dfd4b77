//! HTTP client for the Google Sheets v4 REST API.
//!
//! Every call carries the caller's access token as a bearer token. Token
//! refresh belongs to the credential provider, so a 401 surfaces as
//! `SheetsError::AuthFailed` instead of being retried here.

use crate::config::SheetsConfig;
use crate::error::{SheetsError, SheetsResult};
use crate::provider::SpreadsheetProvider;
use crate::types::{GoogleCredential, SheetTab, ValueRange};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Longest error body kept in an `Api` error message.
const MAX_ERROR_BODY: usize = 512;

/// Sheets REST client.
pub struct SheetsApiClient {
    client: Client,
    config: SheetsConfig,
}

#[derive(Deserialize)]
struct SpreadsheetResponse {
    #[serde(default)]
    sheets: Vec<SheetEntry>,
}

#[derive(Deserialize)]
struct SheetEntry {
    properties: SheetTab,
}

impl SheetsApiClient {
    pub fn new(config: SheetsConfig) -> SheetsResult<Self> {
        if config.api_base_url.trim().is_empty() {
            return Err(SheetsError::Config("api_base_url is empty".to_string()));
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| SheetsError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    fn spreadsheet_url(&self, spreadsheet_id: &str) -> String {
        format!(
            "{}/spreadsheets/{}",
            self.config.api_base_url.trim_end_matches('/'),
            urlencoding::encode(spreadsheet_id)
        )
    }

    fn values_url(&self, spreadsheet_id: &str, range: &str) -> String {
        format!(
            "{}/values/{}",
            self.spreadsheet_url(spreadsheet_id),
            urlencoding::encode(range)
        )
    }
}

/// Map a non-2xx response onto the error taxonomy.
async fn check_status(resp: reqwest::Response, what: &str) -> SheetsResult<reqwest::Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let body = resp.text().await.unwrap_or_default();
    debug!(status = status.as_u16(), what, "Sheets API error response");

    Err(match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            SheetsError::AuthFailed(format!("{what}: HTTP {}", status.as_u16()))
        }
        StatusCode::NOT_FOUND => SheetsError::NotFound(what.to_string()),
        StatusCode::TOO_MANY_REQUESTS => SheetsError::RateLimited,
        _ => {
            let body: String = body.chars().take(MAX_ERROR_BODY).collect();
            SheetsError::Api(format!("HTTP {}: {what}: {body}", status.as_u16()))
        }
    })
}

#[async_trait]
impl SpreadsheetProvider for SheetsApiClient {
    async fn list_tabs(
        &self,
        credential: &GoogleCredential,
        spreadsheet_id: &str,
    ) -> SheetsResult<Vec<SheetTab>> {
        let resp = self
            .client
            .get(self.spreadsheet_url(spreadsheet_id))
            .query(&[("fields", "sheets.properties")])
            .bearer_auth(&credential.access_token)
            .send()
            .await?;
        let resp = check_status(resp, &format!("spreadsheet {spreadsheet_id}")).await?;

        let data: SpreadsheetResponse = resp.json().await?;
        let mut tabs: Vec<SheetTab> = data.sheets.into_iter().map(|s| s.properties).collect();
        tabs.sort_by_key(|t| t.index);
        Ok(tabs)
    }

    async fn read_range(
        &self,
        credential: &GoogleCredential,
        spreadsheet_id: &str,
        range: &str,
    ) -> SheetsResult<Vec<Vec<String>>> {
        let resp = self
            .client
            .get(self.values_url(spreadsheet_id, range))
            .bearer_auth(&credential.access_token)
            .send()
            .await?;
        let resp = check_status(resp, &format!("range {range} of {spreadsheet_id}")).await?;

        let data: ValueRange = resp.json().await?;
        Ok(data.into_rows())
    }

    async fn update_range(
        &self,
        credential: &GoogleCredential,
        spreadsheet_id: &str,
        range: &str,
        values: Vec<Vec<String>>,
    ) -> SheetsResult<()> {
        let body = ValueRange {
            range: range.to_string(),
            major_dimension: Some("ROWS".to_string()),
            values: values
                .into_iter()
                .map(|row| row.into_iter().map(serde_json::Value::String).collect())
                .collect(),
        };

        let resp = self
            .client
            .put(self.values_url(spreadsheet_id, range))
            .query(&[("valueInputOption", self.config.value_input_option.as_str())])
            .bearer_auth(&credential.access_token)
            .json(&body)
            .send()
            .await?;
        check_status(resp, &format!("range {range} of {spreadsheet_id}")).await?;

        debug!(spreadsheet_id, range, "range updated");
        Ok(())
    }
}
