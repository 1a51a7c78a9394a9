// src/ingest/providers/generic.rs
//! Shared normalization for company scrapers, and a source that reads scraper
//! output saved as a JSON array of objects.

use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::ingest::types::{JobRecord, JobSource};

pub const GENERIC_SCRAPER_SOURCE: &str = "scraper:generic";

fn field(raw: &Map<String, Value>, key: &str) -> String {
    match raw.get(key) {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

/// Map a loosely shaped scraper payload onto a [`JobRecord`]. Missing keys become empty.
pub fn normalize_job(raw: &Map<String, Value>) -> JobRecord {
    let source = field(raw, "source");
    JobRecord {
        company: field(raw, "company"),
        role: field(raw, "role"),
        location: field(raw, "location"),
        deadline: field(raw, "deadline"),
        apply_link: field(raw, "apply_link"),
        source: if source.is_empty() {
            GENERIC_SCRAPER_SOURCE.to_string()
        } else {
            source
        },
        notes: field(raw, "notes"),
    }
}

pub fn collect_jobs<I>(raw: I) -> Vec<JobRecord>
where
    I: IntoIterator<Item = Map<String, Value>>,
{
    raw.into_iter().map(|r| normalize_job(&r)).collect()
}

/// Decode a scraper dump. Non-object array items are skipped.
pub fn parse_scraped(json: &str) -> Result<Vec<JobRecord>> {
    let items: Vec<Value> = serde_json::from_str(json).context("expected a JSON array")?;
    let total = items.len();
    let objects: Vec<Map<String, Value>> = items
        .into_iter()
        .filter_map(|v| match v {
            Value::Object(m) => Some(m),
            _ => None,
        })
        .collect();
    if objects.len() < total {
        tracing::warn!(target: "ingest", skipped = total - objects.len(), "non-object scraper items ignored");
    }
    Ok(collect_jobs(objects))
}

/// Postings written to disk by an external scraper.
pub struct ScrapedFileSource {
    path: PathBuf,
}

impl ScrapedFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl JobSource for ScrapedFileSource {
    async fn fetch_jobs(&self) -> Result<Vec<JobRecord>> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("reading {}", self.path.display()))?;
        parse_scraped(&raw).with_context(|| format!("parsing {}", self.path.display()))
    }

    fn name(&self) -> &'static str {
        "scraped"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(v: Value) -> Map<String, Value> {
        match v {
            Value::Object(m) => m,
            _ => unreachable!(),
        }
    }

    #[test]
    fn missing_fields_default_and_source_falls_back() {
        let rec = normalize_job(&obj(json!({ "company": " Acme ", "role": "Intern" })));
        assert_eq!(rec.company, "Acme");
        assert_eq!(rec.role, "Intern");
        assert_eq!(rec.apply_link, "");
        assert_eq!(rec.source, GENERIC_SCRAPER_SOURCE);
    }

    #[test]
    fn collect_keeps_order_and_explicit_source() {
        let jobs = collect_jobs(vec![
            obj(json!({ "role": "A", "source": "scraper:x" })),
            obj(json!({ "role": "B", "deadline": null })),
        ]);
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].source, "scraper:x");
        assert_eq!(jobs[1].role, "B");
        assert_eq!(jobs[1].deadline, "");
    }

    #[test]
    fn scraped_dump_skips_non_objects() {
        let jobs = parse_scraped(r#"[{"company": "Acme", "role": "Intern"}, 7, "x"]"#).unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].company, "Acme");
        assert!(parse_scraped(r#"{"company": "Acme"}"#).is_err());
    }

    #[tokio::test]
    async fn file_source_reads_dump() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scraped.json");
        std::fs::write(
            &path,
            r#"[{"company": "Initech", "role": "QA Intern", "apply_link": "https://initech.test/4"}]"#,
        )
        .unwrap();

        let jobs = ScrapedFileSource::new(&path).fetch_jobs().await.unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].source, GENERIC_SCRAPER_SOURCE);
        assert!(jobs[0].is_complete());

        let missing = ScrapedFileSource::new(dir.path().join("absent.json"));
        assert!(missing.fetch_jobs().await.is_err());
    }
}
