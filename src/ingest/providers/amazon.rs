// src/ingest/providers/amazon.rs
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use serde_json::{Map, Value};

use crate::ingest::providers::generic::collect_jobs;
use crate::ingest::types::{JobRecord, JobSource};

pub const BASE_URL: &str = "https://www.amazon.jobs/en/search";
const SITE_ROOT: &str = "https://www.amazon.jobs";
pub const SOURCE_TAG: &str = "scraper:amazon";

/// Scrapes the public Amazon Jobs search page for internship listings.
pub struct AmazonScraper {
    client: reqwest::Client,
    keyword: String,
    location: Option<String>,
}

impl AmazonScraper {
    pub fn new(keyword: &str, location: Option<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("internship-assistant/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self {
            client,
            keyword: keyword.to_string(),
            location,
        })
    }

    fn query(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("base_query", self.keyword.clone()),
            ("category[]", "software-development".to_string()),
            ("job_type", "Internship".to_string()),
        ];
        if let Some(loc) = &self.location {
            params.push(("location", loc.clone()));
        }
        params
    }
}

#[async_trait]
impl JobSource for AmazonScraper {
    async fn fetch_jobs(&self) -> Result<Vec<JobRecord>> {
        let body = self
            .client
            .get(BASE_URL)
            .query(&self.query())
            .send()
            .await
            .context("amazon search request")?
            .error_for_status()
            .context("amazon search non-2xx")?
            .text()
            .await
            .context("amazon search body")?;
        Ok(parse_listings(&body))
    }

    fn name(&self) -> &'static str {
        "amazon"
    }
}

fn text_of(card: &ElementRef<'_>, sel: &Selector) -> String {
    card.select(sel)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .unwrap_or_default()
}

/// Parse `div.job-tile` cards from a search results page.
pub fn parse_listings(html: &str) -> Vec<JobRecord> {
    let (Ok(card_sel), Ok(title_sel), Ok(link_sel), Ok(loc_sel)) = (
        Selector::parse("div.job-tile"),
        Selector::parse("h3.job-title"),
        Selector::parse("a.job-link"),
        Selector::parse("p.location-and-id"),
    ) else {
        return Vec::new();
    };

    let document = Html::parse_document(html);
    let cards = document.select(&card_sel).map(|card| {
        let apply_link = card
            .select(&link_sel)
            .next()
            .and_then(|a| a.value().attr("href"))
            .filter(|href| !href.is_empty())
            .map(|href| format!("{SITE_ROOT}{href}"))
            .unwrap_or_default();
        let mut raw = Map::new();
        raw.insert("company".into(), Value::from("Amazon"));
        raw.insert("role".into(), Value::from(text_of(&card, &title_sel)));
        raw.insert("location".into(), Value::from(text_of(&card, &loc_sel)));
        raw.insert("apply_link".into(), Value::from(apply_link));
        raw.insert("source".into(), Value::from(SOURCE_TAG));
        raw
    });
    collect_jobs(cards)
}
