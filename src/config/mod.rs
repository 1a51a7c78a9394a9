// src/config/mod.rs
//! Process-wide settings, read once at startup and passed to each component.

pub mod llm;

use std::time::Duration;

use thiserror::Error;

use crate::config::llm::LlmConfig;
use crate::ingest::DEFAULT_FEED_DELAY;
use crate::ingest::providers::simplify::DEFAULT_BASE as DEFAULT_SIMPLIFY_BASE;

pub const ENV_LLM_CONFIG_PATH: &str = "LLM_CONFIG_PATH";
pub const DEFAULT_CALENDAR_ID: &str = "primary";
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required setting {0}")]
    Missing(&'static str),

    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub llm: LlmConfig,
    pub spreadsheet_id: Option<String>,
    /// OAuth access token for the Google APIs; obtaining it is outside this tool.
    pub google_access_token: Option<String>,
    pub calendar_id: String,
    pub simplify_api_key: Option<String>,
    pub simplify_base: String,
    pub rss_feeds: Vec<String>,
    pub feed_delay: Duration,
    pub http_timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            llm: LlmConfig::default(),
            spreadsheet_id: None,
            google_access_token: None,
            calendar_id: DEFAULT_CALENDAR_ID.to_string(),
            simplify_api_key: None,
            simplify_base: DEFAULT_SIMPLIFY_BASE.to_string(),
            rss_feeds: Vec::new(),
            feed_delay: DEFAULT_FEED_DELAY,
            http_timeout: DEFAULT_HTTP_TIMEOUT,
        }
    }
}

/// Split a comma separated feed list, dropping blanks.
pub fn split_feed_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn non_empty(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn parse_u64(key: &'static str, raw: Option<String>) -> Result<Option<u64>, ConfigError> {
    match non_empty(raw) {
        None => Ok(None),
        Some(s) => s.parse::<u64>().map(Some).map_err(|e| ConfigError::Invalid {
            key,
            reason: e.to_string(),
        }),
    }
}

impl AppConfig {
    /// Environment (after `.env`), plus the feed list file when `RSS_FEEDS` is empty.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut cfg = Self::from_lookup(|k| std::env::var(k).ok())?;
        if cfg.rss_feeds.is_empty() {
            cfg.rss_feeds = crate::ingest::config::load_feeds_default().map_err(|e| {
                ConfigError::Invalid {
                    key: crate::ingest::config::ENV_FEEDS_PATH,
                    reason: format!("{e:#}"),
                }
            })?;
        }
        Ok(cfg)
    }

    /// Build from any key lookup; used by `from_env` and by tests.
    pub fn from_lookup<F: Fn(&str) -> Option<String>>(get: F) -> Result<Self, ConfigError> {
        let llm = match non_empty(get(ENV_LLM_CONFIG_PATH)) {
            Some(path) => LlmConfig::load_from_file(&path).map_err(|e| ConfigError::Invalid {
                key: ENV_LLM_CONFIG_PATH,
                reason: format!("{e:#}"),
            })?,
            None => LlmConfig::from_lookup(&get),
        };

        let defaults = Self::default();
        Ok(Self {
            llm,
            spreadsheet_id: non_empty(get("GOOGLE_SHEETS_SPREADSHEET_ID")),
            google_access_token: non_empty(get("GOOGLE_ACCESS_TOKEN")),
            calendar_id: non_empty(get("GOOGLE_CALENDAR_ID")).unwrap_or(defaults.calendar_id),
            simplify_api_key: non_empty(get("SIMPLIFY_API_KEY")),
            simplify_base: non_empty(get("SIMPLIFY_BASE")).unwrap_or(defaults.simplify_base),
            rss_feeds: get("RSS_FEEDS")
                .map(|s| split_feed_list(&s))
                .unwrap_or_default(),
            feed_delay: parse_u64("INGEST_DELAY_MS", get("INGEST_DELAY_MS"))?
                .map(Duration::from_millis)
                .unwrap_or(defaults.feed_delay),
            http_timeout: parse_u64("HTTP_TIMEOUT_SECS", get("HTTP_TIMEOUT_SECS"))?
                .map(Duration::from_secs)
                .unwrap_or(defaults.http_timeout),
        })
    }

    pub fn require_spreadsheet_id(&self) -> Result<&str, ConfigError> {
        self.spreadsheet_id
            .as_deref()
            .ok_or(ConfigError::Missing("GOOGLE_SHEETS_SPREADSHEET_ID"))
    }

    pub fn require_access_token(&self) -> Result<&str, ConfigError> {
        self.google_access_token
            .as_deref()
            .ok_or(ConfigError::Missing("GOOGLE_ACCESS_TOKEN"))
    }
}
