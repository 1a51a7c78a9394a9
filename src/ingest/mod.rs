// src/ingest/mod.rs
pub mod config;
pub mod dedup;
pub mod extract;
pub mod feed;
pub mod providers;
pub mod types;

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge};
use once_cell::sync::OnceCell;

use crate::ingest::dedup::{is_duplicate, key_digest, key_for};
use crate::ingest::extract::FieldExtractor;
use crate::ingest::feed::{FeedAddress, FeedFetcher};
use crate::ingest::types::{JobRecord, RawEntry};

/// Pause between two consecutive feed requests.
pub const DEFAULT_FEED_DELAY: Duration = Duration::from_millis(1_000);

/// Company used when an entry names no author, creator or publisher.
pub const UNKNOWN_COMPANY: &str = "Unknown";

/// One-time metrics registration.
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("ingest_feeds_total", "Feeds fetched (valid addresses only).");
        describe_counter!(
            "ingest_invalid_address_total",
            "Feed addresses rejected before any network access."
        );
        describe_counter!("ingest_feed_errors_total", "Feed fetch/parse failures.");
        describe_counter!("ingest_accepted_total", "Job records accepted.");
        describe_counter!(
            "ingest_duplicate_total",
            "Entries dropped as duplicates within a run."
        );
        describe_counter!(
            "ingest_skipped_total",
            "Entries dropped for a missing role or apply link."
        );
        describe_histogram!("ingest_parse_ms", "Feed parse time in milliseconds.");
        describe_gauge!(
            "ingest_pipeline_last_run_ts",
            "Unix ts when the ingest pipeline last ran."
        );
    });
}

/// Normalize text: decode entities, strip tags, collapse whitespace, trim.
pub fn normalize_text(s: &str) -> String {
    // 1) HTML entity decode
    let mut out = html_escape::decode_html_entities(s).to_string();

    // 2) Strip HTML tags
    static RE_TAGS: OnceCell<regex::Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, " ").to_string();

    // 3) Normalize “ ” ‘ ’ « » to ASCII quotes
    out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    // 4) Collapse whitespace
    static RE_WS: OnceCell<regex::Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").trim().to_string();

    // 5) Length cap: 1500 chars
    if out.chars().count() > 1500 {
        out = out.chars().take(1500).collect();
    }

    out
}

/// Like [`normalize_text`] but block-level tags become line breaks, so labeled
/// values ("Location: ...") end at the end of their paragraph.
pub fn to_plain_lines(s: &str) -> String {
    static RE_BLOCK: OnceCell<regex::Regex> = OnceCell::new();
    let re_block = RE_BLOCK.get_or_init(|| {
        regex::Regex::new(r"(?i)<br\s*/?>|</?(p|div|li|ul|ol|tr|h[1-6])\b[^>]*>").unwrap()
    });
    static RE_TAGS: OnceCell<regex::Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?s)<[^>]+>").unwrap());
    static RE_HWS: OnceCell<regex::Regex> = OnceCell::new();
    let re_hws = RE_HWS.get_or_init(|| regex::Regex::new(r"[^\S\n]+").unwrap());

    let decoded = html_escape::decode_html_entities(s);
    let broken = re_block.replace_all(&decoded, "\n");
    let stripped = re_tags.replace_all(&broken, " ");

    stripped
        .lines()
        .map(|line| re_hws.replace_all(line, " ").trim().to_string())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Map one feed entry to a candidate record. Acceptance is decided by the caller.
pub fn build_record(entry: &RawEntry, address: &FeedAddress, extractor: &FieldExtractor) -> JobRecord {
    let company = [&entry.author, &entry.creator, &entry.publisher]
        .into_iter()
        .flatten()
        .map(|s| normalize_text(s))
        .find(|s| !s.is_empty())
        .unwrap_or_else(|| UNKNOWN_COMPANY.to_string());

    let summary = entry.summary_text().map(normalize_text).unwrap_or_default();
    let content = entry.content.as_deref().map(normalize_text).unwrap_or_default();
    let notes = if content.is_empty() || content == summary {
        summary
    } else if summary.is_empty() {
        content
    } else {
        format!("{summary} | {content}")
    };

    JobRecord {
        company,
        role: entry.title.as_deref().map(normalize_text).unwrap_or_default(),
        location: extractor.location(entry),
        deadline: extractor.deadline(entry),
        apply_link: entry.link.as_deref().map(str::trim).unwrap_or_default().to_string(),
        source: format!("rss:{address}"),
        notes,
    }
}

/// Why a feed contributed (or did not contribute) records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedStatus {
    /// Rejected before any network access.
    Invalid(String),
    /// Network or parse failure; skipped.
    Failed(String),
    /// Parsed fine, no entries.
    Empty,
    /// Entries were processed; `bozo` is set when the document was malformed.
    Fetched { bozo: Option<String> },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeedStats {
    pub accepted: usize,
    pub duplicates: usize,
    pub skipped: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedReport {
    pub address: String,
    pub status: FeedStatus,
    pub stats: FeedStats,
}

/// Result of one ingestion run. Only `records` is part of the ingest contract;
/// per-feed reports exist for logging.
#[derive(Debug, Clone, Default)]
pub struct IngestReport {
    pub records: Vec<JobRecord>,
    pub feeds: Vec<FeedReport>,
}

impl IngestReport {
    pub fn totals(&self) -> FeedStats {
        self.feeds.iter().fold(FeedStats::default(), |acc, f| FeedStats {
            accepted: acc.accepted + f.stats.accepted,
            duplicates: acc.duplicates + f.stats.duplicates,
            skipped: acc.skipped + f.stats.skipped,
        })
    }

    /// Feeds that were attempted but failed.
    pub fn failures(&self) -> impl Iterator<Item = &FeedReport> {
        self.feeds
            .iter()
            .filter(|f| matches!(f.status, FeedStatus::Failed(_)))
    }
}

/// Sequential feed ingestion: validate, rate-limit, fetch, normalize, dedup.
#[derive(Clone)]
pub struct Pipeline {
    fetcher: Arc<dyn FeedFetcher>,
    extractor: FieldExtractor,
    delay: Duration,
}

impl Pipeline {
    pub fn new(fetcher: Arc<dyn FeedFetcher>) -> Self {
        Self {
            fetcher,
            extractor: FieldExtractor::shared_default().clone(),
            delay: DEFAULT_FEED_DELAY,
        }
    }

    pub fn with_extractor(mut self, extractor: FieldExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Accepted records in feed order, then entry order.
    pub async fn ingest<S: AsRef<str>>(&self, addresses: &[S]) -> Vec<JobRecord> {
        self.run(addresses).await.records
    }

    /// Same as [`Pipeline::ingest`] but also returns per-feed outcomes.
    pub async fn run<S: AsRef<str>>(&self, addresses: &[S]) -> IngestReport {
        let mut report = IngestReport::default();
        if addresses.is_empty() {
            return report;
        }
        ensure_metrics_described();

        let mut seen: HashSet<String> = HashSet::new();
        let mut fetched_any = false;

        for (index, raw) in addresses.iter().enumerate() {
            let raw = raw.as_ref();
            let address = match FeedAddress::parse(raw) {
                Ok(a) => a,
                Err(e) => {
                    tracing::warn!(target: "ingest", index, address = raw, error = %e, "skipping invalid feed address");
                    counter!("ingest_invalid_address_total").increment(1);
                    report.feeds.push(FeedReport {
                        address: raw.trim().to_string(),
                        status: FeedStatus::Invalid(e.to_string()),
                        stats: FeedStats::default(),
                    });
                    continue;
                }
            };

            // Fixed-rate limiting between actual requests; rejected addresses never wait.
            if fetched_any && !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            fetched_any = true;
            counter!("ingest_feeds_total").increment(1);

            let feed = match self.fetcher.fetch(&address).await {
                Ok(feed) => feed,
                Err(e) => {
                    tracing::warn!(target: "ingest", index, address = %address, error = %e, "feed fetch failed");
                    counter!("ingest_feed_errors_total").increment(1);
                    report.feeds.push(FeedReport {
                        address: address.to_string(),
                        status: FeedStatus::Failed(e.to_string()),
                        stats: FeedStats::default(),
                    });
                    continue;
                }
            };

            if let Some(reason) = &feed.bozo {
                tracing::warn!(target: "ingest", address = %address, reason = %reason, "malformed feed, keeping parsed entries");
            }
            if feed.entries.is_empty() {
                tracing::info!(target: "ingest", address = %address, "feed has no entries");
                report.feeds.push(FeedReport {
                    address: address.to_string(),
                    status: FeedStatus::Empty,
                    stats: FeedStats::default(),
                });
                continue;
            }

            let mut stats = FeedStats::default();
            for entry in &feed.entries {
                let rec = build_record(entry, &address, &self.extractor);
                if !rec.is_complete() {
                    stats.skipped += 1;
                    tracing::debug!(target: "ingest", address = %address, title = ?entry.title, "entry missing role or link");
                    continue;
                }
                let key = key_for(&rec);
                if is_duplicate(&key, &seen) {
                    stats.duplicates += 1;
                    tracing::debug!(target: "ingest", key = %key_digest(&key), "duplicate posting");
                    continue;
                }
                seen.insert(key);
                report.records.push(rec);
                stats.accepted += 1;
            }

            counter!("ingest_accepted_total").increment(stats.accepted as u64);
            counter!("ingest_duplicate_total").increment(stats.duplicates as u64);
            counter!("ingest_skipped_total").increment(stats.skipped as u64);
            tracing::info!(
                target: "ingest",
                address = %address,
                accepted = stats.accepted,
                duplicates = stats.duplicates,
                skipped = stats.skipped,
                "feed ingested"
            );

            report.feeds.push(FeedReport {
                address: address.to_string(),
                status: FeedStatus::Fetched { bozo: feed.bozo },
                stats,
            });
        }

        gauge!("ingest_pipeline_last_run_ts").set(chrono::Utc::now().timestamp().max(0) as f64);
        report
    }
}
