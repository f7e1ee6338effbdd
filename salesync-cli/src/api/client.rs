//! Google Sheets v4 REST client
//!
//! Thin reqwest wrapper implementing [`SheetStore`]. Authentication is a
//! pre-issued bearer token; obtaining and refreshing it is left to the
//! credential helper that populates the configuration.

use std::time::Duration;

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use log::debug;
use reqwest::{Client, RequestBuilder, Response};
use serde_json::{Value, json};

use super::formatting::FormattingOp;
use super::models::SpreadsheetMetadata;
use super::store::SheetStore;
use crate::config::RemoteConfig;

/// Fields requested by the metadata query
const METADATA_FIELDS: &str =
    "sheets(properties(sheetId,title),bandedRanges(bandedRangeId,range))";

/// Sheets API client bound to one spreadsheet
#[derive(Clone)]
pub struct SheetsClient {
    http: Client,
    api_base: String,
    spreadsheet_id: String,
    access_token: String,
}

impl std::fmt::Debug for SheetsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SheetsClient")
            .field("api_base", &self.api_base)
            .field("spreadsheet_id", &self.spreadsheet_id)
            .finish_non_exhaustive()
    }
}

impl SheetsClient {
    /// Build a client from configuration; fails when id or token is missing
    pub fn from_config(remote: &RemoteConfig) -> Result<Self> {
        if remote.spreadsheet_id.trim().is_empty() {
            bail!(
                "No spreadsheet configured. Set [remote].spreadsheet_id or {}",
                crate::config::ENV_SPREADSHEET_ID
            );
        }
        let access_token = match remote.access_token.as_deref().map(str::trim) {
            Some(token) if !token.is_empty() => token.to_string(),
            _ => bail!(
                "No access token configured. Set {} or [remote].access_token",
                crate::config::ENV_ACCESS_TOKEN
            ),
        };

        let http = Client::builder()
            .user_agent(format!("salesync/{}", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(remote.timeout_secs.max(1)))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http,
            api_base: remote.api_base.trim_end_matches('/').to_string(),
            spreadsheet_id: remote.spreadsheet_id.trim().to_string(),
            access_token,
        })
    }

    pub fn spreadsheet_id(&self) -> &str {
        &self.spreadsheet_id
    }

    fn spreadsheet_url(&self) -> String {
        format!(
            "{}/spreadsheets/{}",
            self.api_base,
            urlencoding::encode(&self.spreadsheet_id)
        )
    }

    fn values_url(&self, range: &str, suffix: &str) -> String {
        format!(
            "{}/values/{}{}",
            self.spreadsheet_url(),
            urlencoding::encode(range),
            suffix
        )
    }

    async fn send(&self, request: RequestBuilder, what: &str) -> Result<Response> {
        let response = request
            .bearer_auth(&self.access_token)
            .send()
            .await
            .with_context(|| format!("{} request failed", what))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("{} returned HTTP {}: {}", what, status.as_u16(), error_message(&body));
        }

        debug!("{} -> HTTP {}", what, status.as_u16());
        Ok(response)
    }
}

/// Pull `error.message` out of a Google error body, else return it raw
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}

#[async_trait]
impl SheetStore for SheetsClient {
    async fn clear_range(&self, range: &str) -> Result<()> {
        let request = self
            .http
            .post(self.values_url(range, ":clear"))
            .json(&json!({}));
        self.send(request, &format!("Clear {}", range)).await?;
        Ok(())
    }

    async fn write_rows(&self, range: &str, rows: Vec<Vec<Value>>) -> Result<()> {
        let body = json!({
            "range": range,
            "majorDimension": "ROWS",
            "values": rows,
        });
        let request = self
            .http
            .put(self.values_url(range, ""))
            .query(&[("valueInputOption", "RAW")])
            .json(&body);
        self.send(request, &format!("Write {}", range)).await?;
        Ok(())
    }

    async fn fetch_metadata(&self) -> Result<SpreadsheetMetadata> {
        let request = self
            .http
            .get(self.spreadsheet_url())
            .query(&[("fields", METADATA_FIELDS)]);
        let response = self.send(request, "Metadata query").await?;
        response
            .json::<SpreadsheetMetadata>()
            .await
            .context("Failed to decode spreadsheet metadata")
    }

    async fn batch_update(&self, ops: &[FormattingOp]) -> Result<()> {
        if ops.is_empty() {
            return Ok(());
        }
        debug!(
            "Batch update: {}",
            ops.iter()
                .map(FormattingOp::request_type)
                .collect::<Vec<_>>()
                .join(", ")
        );
        let request = self
            .http
            .post(format!("{}:batchUpdate", self.spreadsheet_url()))
            .json(&json!({ "requests": ops }));
        self.send(request, &format!("Batch update ({} requests)", ops.len()))
            .await?;
        Ok(())
    }
}
