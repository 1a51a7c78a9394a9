//! Google Sheets (v4 REST) tracker backend.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use super::{Tracker, COLUMNS};
use crate::config::AppConfig;

pub const SHEETS_API: &str = "https://sheets.googleapis.com/v4/spreadsheets";
pub const SHEET_NAME: &str = "Internships";

#[derive(Debug, Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetMeta>,
}

#[derive(Debug, Deserialize)]
struct SheetMeta {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
struct SheetProperties {
    title: String,
}

/// Sheet titles from a `spreadsheets.get` response body.
pub fn sheet_titles(body: &str) -> Result<Vec<String>> {
    let meta: SpreadsheetMeta = serde_json::from_str(body).context("parsing spreadsheet metadata")?;
    Ok(meta.sheets.into_iter().map(|s| s.properties.title).collect())
}

pub struct SheetsTracker {
    http: reqwest::Client,
    api_base: String,
    spreadsheet_id: String,
    token: String,
    sheet: String,
}

impl SheetsTracker {
    pub fn new(spreadsheet_id: &str, token: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("internship-assistant/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .context("building Sheets HTTP client")?;
        Ok(Self {
            http,
            api_base: SHEETS_API.to_string(),
            spreadsheet_id: spreadsheet_id.to_string(),
            token: token.to_string(),
            sheet: SHEET_NAME.to_string(),
        })
    }

    pub fn with_api_base(mut self, base: &str) -> Self {
        self.api_base = base.trim_end_matches('/').to_string();
        self
    }

    /// Validate settings, then make sure the tracker sheet exists.
    pub async fn connect(cfg: &AppConfig) -> Result<Self> {
        let id = cfg.require_spreadsheet_id()?;
        let token = cfg.require_access_token()?;
        let tracker = Self::new(id, token, cfg.http_timeout)?;
        tracker.ensure_sheet().await?;
        Ok(tracker)
    }

    fn spreadsheet_url(&self) -> String {
        format!("{}/{}", self.api_base, self.spreadsheet_id)
    }

    pub fn append_url(&self) -> String {
        format!("{}/values/{}!A1:append", self.spreadsheet_url(), self.sheet)
    }

    /// Create the sheet and its header row on first use. Returns `true` when it was created.
    pub async fn ensure_sheet(&self) -> Result<bool> {
        let body = self
            .http
            .get(self.spreadsheet_url())
            .query(&[("fields", "sheets.properties.title")])
            .bearer_auth(&self.token)
            .send()
            .await
            .context("sheets get")?
            .error_for_status()
            .context("sheets get non-2xx")?
            .text()
            .await
            .context("sheets get body")?;

        if sheet_titles(&body)?.iter().any(|t| t == &self.sheet) {
            return Ok(false);
        }

        let req = json!({ "requests": [{ "addSheet": { "properties": { "title": self.sheet } } }] });
        self.http
            .post(format!("{}:batchUpdate", self.spreadsheet_url()))
            .bearer_auth(&self.token)
            .json(&req)
            .send()
            .await
            .context("sheets batchUpdate")?
            .error_for_status()
            .context("sheets batchUpdate non-2xx")?;

        let header: Vec<String> = COLUMNS.iter().map(|c| c.to_string()).collect();
        self.append_rows(vec![header]).await?;
        tracing::info!(target: "tracker", sheet = %self.sheet, "created tracker sheet");
        Ok(true)
    }
}

#[async_trait]
impl Tracker for SheetsTracker {
    async fn append_rows(&self, rows: Vec<Vec<String>>) -> Result<()> {
        self.http
            .post(self.append_url())
            .query(&[("valueInputOption", "RAW")])
            .bearer_auth(&self.token)
            .json(&json!({ "values": rows }))
            .send()
            .await
            .context("sheets append")?
            .error_for_status()
            .context("sheets append non-2xx")?;
        Ok(())
    }
}
