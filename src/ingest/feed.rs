// src/ingest/feed.rs
//! Feed addresses, the fetcher seam, and a tolerant RSS 2.0 / RSS 1.0 / Atom reader.

use std::fmt;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use metrics::histogram;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use reqwest::Url;
use thiserror::Error;

use crate::ingest::types::RawEntry;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid feed address `{address}`: {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("feed responded with status {status}")]
    Status { status: u16 },

    #[error("feed parse error: {0}")]
    Parse(String),
}

/// A feed URI that has both a scheme and a host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedAddress {
    raw: String,
    url: Url,
}

impl FeedAddress {
    /// Validation only; never touches the network.
    pub fn parse(raw: &str) -> Result<Self, FetchError> {
        let trimmed = raw.trim();
        let invalid = |reason: &str| FetchError::InvalidAddress {
            address: trimmed.to_string(),
            reason: reason.to_string(),
        };
        let url = Url::parse(trimmed).map_err(|e| invalid(&e.to_string()))?;
        if url.scheme().is_empty() {
            return Err(invalid("missing scheme"));
        }
        if url.host_str().map_or(true, str::is_empty) {
            return Err(invalid("missing host"));
        }
        Ok(Self {
            raw: trimmed.to_string(),
            url,
        })
    }

    /// The address exactly as configured (trimmed).
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

impl fmt::Display for FeedAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Parsed feed. `bozo` carries the reason when the document was malformed but
/// still yielded entries.
#[derive(Debug, Clone, Default)]
pub struct FetchedFeed {
    pub entries: Vec<RawEntry>,
    pub bozo: Option<String>,
}

#[async_trait]
pub trait FeedFetcher: Send + Sync {
    async fn fetch(&self, address: &FeedAddress) -> Result<FetchedFeed, FetchError>;
}

pub struct HttpFeedFetcher {
    client: reqwest::Client,
}

impl HttpFeedFetcher {
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("internship-assistant/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(5))
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl FeedFetcher for HttpFeedFetcher {
    async fn fetch(&self, address: &FeedAddress) -> Result<FetchedFeed, FetchError> {
        let resp = self
            .client
            .get(address.url().clone())
            .header(
                reqwest::header::ACCEPT,
                "application/rss+xml, application/atom+xml, application/xml;q=0.9, */*;q=0.8",
            )
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }
        let body = resp.text().await?;

        let t0 = Instant::now();
        let parsed = parse_feed(&body);
        histogram!("ingest_parse_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
        parsed
    }
}

/// Parse a syndication document.
///
/// Malformed XML is tolerated as long as at least one complete entry was read
/// before the error; the error text is then reported as `bozo`.
pub fn parse_feed(xml: &str) -> Result<FetchedFeed, FetchError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut entries = Vec::new();
    let mut bozo: Option<String> = None;
    let mut saw_root = false;
    // Open entry plus the element path below it.
    let mut current: Option<(RawEntry, Vec<String>)> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = local_name(&e);
                if let Some((entry, path)) = current.as_mut() {
                    if path.is_empty() {
                        open_child(entry, &name, &e);
                    }
                    path.push(name);
                    continue;
                }
                match name.as_str() {
                    "rss" | "feed" | "rdf" => saw_root = true,
                    "item" | "entry" => current = Some((RawEntry::default(), Vec::new())),
                    _ => {}
                }
            }
            Ok(Event::Empty(e)) => {
                if let Some((entry, path)) = current.as_mut() {
                    if path.is_empty() {
                        let name = local_name(&e);
                        open_child(entry, &name, &e);
                    }
                }
            }
            Ok(Event::Text(t)) => {
                if let Some((entry, path)) = current.as_mut() {
                    let text = match t.unescape() {
                        Ok(s) => s.into_owned(),
                        Err(err) => {
                            bozo.get_or_insert_with(|| err.to_string());
                            let raw = String::from_utf8_lossy(&t).into_owned();
                            html_escape::decode_html_entities(&raw).into_owned()
                        }
                    };
                    assign_text(entry, path, &text);
                }
            }
            Ok(Event::CData(c)) => {
                if let Some((entry, path)) = current.as_mut() {
                    let text = String::from_utf8_lossy(&c.into_inner()).into_owned();
                    assign_text(entry, path, &text);
                }
            }
            Ok(Event::End(_)) => {
                let closes_entry = match current.as_mut() {
                    Some((_, path)) => path.pop().is_none(),
                    None => false,
                };
                if closes_entry {
                    if let Some((mut entry, _)) = current.take() {
                        entry.categories.retain(|c| !c.trim().is_empty());
                        entries.push(entry);
                    }
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                bozo = Some(e.to_string());
                break;
            }
        }
    }

    if entries.is_empty() {
        if let Some(reason) = bozo {
            return Err(FetchError::Parse(reason));
        }
        if !saw_root {
            bozo = Some("no rss/atom root element".to_string());
        }
    }

    Ok(FetchedFeed { entries, bozo })
}

fn local_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).to_ascii_lowercase()
}

fn attr(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.local_name().as_ref() == key)
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}

/// Attribute-carrying children of an entry (Atom `<link href>`, `<category term>`).
fn open_child(entry: &mut RawEntry, name: &str, e: &BytesStart<'_>) {
    match name {
        "link" => {
            let rel = attr(e, b"rel");
            if entry.link.is_none() && matches!(rel.as_deref(), None | Some("alternate")) {
                entry.link = attr(e, b"href");
            }
        }
        "category" => entry.categories.push(attr(e, b"term").unwrap_or_default()),
        _ => {}
    }
}

fn assign_text(entry: &mut RawEntry, path: &[String], text: &str) {
    let Some(top) = path.first() else {
        return;
    };
    let leaf = path.last().map(String::as_str).unwrap_or_default();
    let slot = match top.as_str() {
        "title" => &mut entry.title,
        "link" => &mut entry.link,
        // Atom nests <name>/<email> under <author>; only the name counts.
        "author" if path.len() == 1 || leaf == "name" => &mut entry.author,
        "creator" => &mut entry.creator,
        "publisher" => &mut entry.publisher,
        "summary" => &mut entry.summary,
        "description" => &mut entry.description,
        "encoded" | "content" => &mut entry.content,
        "location" => &mut entry.location,
        "category" => {
            if let Some(last) = entry.categories.last_mut() {
                if last.is_empty() {
                    last.push_str(text.trim());
                }
            }
            return;
        }
        _ => return,
    };
    match slot {
        Some(existing) => existing.push_str(text),
        None => *slot = Some(text.to_string()),
    }
}
