//! Spreadsheet sinks
//!
//! Feedback rows are appended to a spreadsheet range. The HTTP sink talks to
//! the Sheets v4 `values:append` endpoint with a pre-issued bearer token.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

use crate::config::SheetsConfig;

#[derive(Debug, Error)]
pub enum SheetsError {
    #[error("Spreadsheet sink is not configured: {0}")]
    NotConfigured(&'static str),

    #[error("Spreadsheet request failed: {0}")]
    Request(String),

    #[error("Spreadsheet API returned {status}: {body}")]
    Api { status: u16, body: String },
}

/// Destination for tabular rows
#[async_trait]
pub trait SpreadsheetSink: Send + Sync {
    /// Append `rows` after the last row of the configured range. Returns the
    /// number of rows the sink reports as written.
    async fn append_rows(&self, rows: Vec<Vec<String>>) -> Result<usize, SheetsError>;
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppendResponse {
    updates: Option<AppendUpdates>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppendUpdates {
    updated_rows: Option<usize>,
}

/// Sheets v4 REST sink
pub struct HttpSheetsSink {
    client: reqwest::Client,
    api_base: String,
    spreadsheet_id: Option<String>,
    range: String,
    access_token: Option<String>,
}

impl HttpSheetsSink {
    pub fn new(config: &SheetsConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            spreadsheet_id: config.spreadsheet_id.clone(),
            range: config.range.clone(),
            access_token: config.access_token.clone(),
        }
    }

    fn append_url(&self, spreadsheet_id: &str) -> String {
        format!(
            "{}/spreadsheets/{}/values/{}:append?valueInputOption=USER_ENTERED",
            self.api_base,
            urlencoding::encode(spreadsheet_id),
            urlencoding::encode(&self.range)
        )
    }
}

#[async_trait]
impl SpreadsheetSink for HttpSheetsSink {
    async fn append_rows(&self, rows: Vec<Vec<String>>) -> Result<usize, SheetsError> {
        let spreadsheet_id = self
            .spreadsheet_id
            .as_deref()
            .ok_or(SheetsError::NotConfigured("SHEETS_SPREADSHEET_ID"))?;
        let token = self
            .access_token
            .as_deref()
            .ok_or(SheetsError::NotConfigured("SHEETS_ACCESS_TOKEN"))?;

        let count = rows.len();
        let response = self
            .client
            .post(self.append_url(spreadsheet_id))
            .bearer_auth(token)
            .json(&json!({ "values": rows }))
            .send()
            .await
            .map_err(|e| SheetsError::Request(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(SheetsError::Api { status, body });
        }

        let parsed: AppendResponse = response
            .json()
            .await
            .map_err(|e| SheetsError::Request(format!("Failed to parse response: {}", e)))?;

        Ok(parsed
            .updates
            .and_then(|u| u.updated_rows)
            .unwrap_or(count))
    }
}
