// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod config;
pub mod generator;
pub mod ingest;
pub mod prep;
pub mod reminders;
pub mod tracker;

// ---- Re-exports for stable public API ----
pub use crate::config::{AppConfig, ConfigError};
pub use crate::ingest::feed::{FeedAddress, FeedFetcher, FetchError, HttpFeedFetcher};
pub use crate::ingest::types::{JobRecord, JobSource, RawEntry};
pub use crate::ingest::{IngestReport, Pipeline};
pub use crate::tracker::{ingest_jobs, NoopTracker, Tracker};
