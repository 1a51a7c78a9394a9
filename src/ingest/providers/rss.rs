// src/ingest/providers/rss.rs
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;

use crate::ingest::extract::FieldExtractor;
use crate::ingest::feed::{
    parse_feed, FeedAddress, FeedFetcher, FetchError, FetchedFeed, HttpFeedFetcher,
};
use crate::ingest::types::{JobRecord, JobSource};
use crate::ingest::Pipeline;

/// RSS/Atom feeds as a job source: the ingest pipeline over a fixed feed list.
pub struct RssSource {
    pipeline: Pipeline,
    feeds: Vec<String>,
}

impl RssSource {
    pub fn new(pipeline: Pipeline, feeds: Vec<String>) -> Self {
        Self { pipeline, feeds }
    }

    pub fn over_http(
        feeds: Vec<String>,
        extractor: FieldExtractor,
        delay: Duration,
        timeout: Duration,
    ) -> Result<Self> {
        let fetcher = HttpFeedFetcher::new(timeout)?;
        let pipeline = Pipeline::new(Arc::new(fetcher))
            .with_extractor(extractor)
            .with_delay(delay);
        Ok(Self::new(pipeline, feeds))
    }

    pub fn feeds(&self) -> &[String] {
        &self.feeds
    }
}

#[async_trait]
impl JobSource for RssSource {
    async fn fetch_jobs(&self) -> Result<Vec<JobRecord>> {
        // Per-feed failures are absorbed by the pipeline.
        Ok(self.pipeline.ingest(&self.feeds).await)
    }

    fn name(&self) -> &'static str {
        "rss"
    }
}

/// Serves feed documents from memory, keyed by address. Unknown addresses answer 404.
#[derive(Default)]
pub struct FixtureFeedFetcher {
    docs: HashMap<String, String>,
}

impl FixtureFeedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_feed(mut self, address: &str, xml: &str) -> Self {
        self.docs.insert(address.trim().to_string(), xml.to_string());
        self
    }
}

#[async_trait]
impl FeedFetcher for FixtureFeedFetcher {
    async fn fetch(&self, address: &FeedAddress) -> Result<FetchedFeed, FetchError> {
        match self.docs.get(address.as_str()) {
            Some(xml) => parse_feed(xml),
            None => Err(FetchError::Status { status: 404 }),
        }
    }
}
