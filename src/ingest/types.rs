// src/ingest/types.rs
use anyhow::Result;

/// Normalized internship posting as it flows from any source into the tracker.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct JobRecord {
    pub company: String,
    pub role: String,
    pub location: String,
    /// ISO date when a known format parsed, otherwise the raw matched text.
    pub deadline: String,
    pub apply_link: String,
    pub source: String, // e.g. "rss:<feed>", "simplify", "scraper:amazon"
    pub notes: String,
}

impl JobRecord {
    /// `role` and `apply_link` are the only fields a record cannot live without.
    pub fn is_complete(&self) -> bool {
        !self.role.trim().is_empty() && !self.apply_link.trim().is_empty()
    }
}

/// One `<item>` / `<entry>` from a syndication document, before normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawEntry {
    pub title: Option<String>,
    pub link: Option<String>,
    pub author: Option<String>,
    pub creator: Option<String>,
    pub publisher: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    /// Structured location element (`<location>`, `<job:location>`, ...).
    pub location: Option<String>,
    pub categories: Vec<String>,
}

impl RawEntry {
    /// Summary as a feed reader would expose it: `<summary>` first, RSS `<description>` otherwise.
    pub fn summary_text(&self) -> Option<&str> {
        self.summary
            .as_deref()
            .or(self.description.as_deref())
            .filter(|s| !s.trim().is_empty())
    }
}

/// Any adapter that yields postings already shaped as [`JobRecord`]s.
#[async_trait::async_trait]
pub trait JobSource: Send + Sync {
    async fn fetch_jobs(&self) -> Result<Vec<JobRecord>>;
    fn name(&self) -> &'static str;
}
