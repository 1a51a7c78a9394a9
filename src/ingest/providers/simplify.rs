// src/ingest/providers/simplify.rs
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;

use crate::ingest::types::{JobRecord, JobSource};

pub const DEFAULT_BASE: &str = "https://api.simplify.jobs";
pub const DEFAULT_QUERY: &str = "software engineering intern";
pub const SOURCE_TAG: &str = "simplify";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    company: Option<String>,
    title: Option<String>,
    location: Option<String>,
    deadline: Option<String>,
    url: Option<String>,
    source: Option<String>,
}

impl From<SearchItem> for JobRecord {
    fn from(it: SearchItem) -> Self {
        JobRecord {
            company: it.company.unwrap_or_default(),
            role: it.title.unwrap_or_default(),
            location: it.location.unwrap_or_else(|| "Remote".to_string()),
            deadline: it.deadline.unwrap_or_default(),
            apply_link: it.url.unwrap_or_default(),
            source: SOURCE_TAG.to_string(),
            notes: it.source.unwrap_or_default(),
        }
    }
}

/// Thin client for the Simplify job search endpoint.
pub struct SimplifyClient {
    http: reqwest::Client,
    base: String,
    api_key: Option<String>,
}

impl SimplifyClient {
    pub fn new(base: &str, api_key: Option<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("internship-assistant/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self {
            http,
            base: base.trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        })
    }

    pub fn search_url(&self) -> String {
        format!("{}/v1/jobs/search", self.base)
    }

    pub async fn search(&self, query: &str, location: Option<&str>) -> Result<Vec<JobRecord>> {
        let mut params = vec![("q", query), ("type", "internship")];
        if let Some(loc) = location {
            params.push(("location", loc));
        }

        let mut req = self.http.get(self.search_url()).query(&params);
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }

        let body = req
            .send()
            .await
            .context("simplify search")?
            .error_for_status()
            .context("simplify non-2xx")?
            .text()
            .await
            .context("simplify body")?;
        parse_results(&body)
    }
}

/// Map a search response body to job records.
pub fn parse_results(body: &str) -> Result<Vec<JobRecord>> {
    let resp: SearchResponse = serde_json::from_str(body).context("parsing simplify response")?;
    Ok(resp.results.into_iter().map(JobRecord::from).collect())
}

/// A fixed Simplify query as a [`JobSource`].
pub struct SimplifySource {
    client: SimplifyClient,
    query: String,
    location: Option<String>,
}

impl SimplifySource {
    pub fn new(client: SimplifyClient, query: &str, location: Option<String>) -> Self {
        Self {
            client,
            query: query.to_string(),
            location,
        }
    }
}

#[async_trait]
impl JobSource for SimplifySource {
    async fn fetch_jobs(&self) -> Result<Vec<JobRecord>> {
        self.client
            .search(&self.query, self.location.as_deref())
            .await
    }

    fn name(&self) -> &'static str {
        "simplify"
    }
}
