//! Application tracker: one appended row per posting.

pub mod sheets;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};

use crate::ingest::types::JobRecord;

pub use sheets::SheetsTracker;

/// Fixed column order of the tracker sheet.
pub const COLUMNS: [&str; 11] = [
    "added_at", // RFC 3339 timestamp
    "company",
    "role",
    "location",
    "deadline", // ISO date or blank
    "apply_link",
    "source", // e.g. simplify, rss:<feed>, scraper:amazon
    "status", // new | interested | applied | interview | offer | rejected
    "resume_file",
    "cover_letter_file",
    "notes",
];

pub const INITIAL_STATUS: &str = "new";

/// Files produced for an application, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MaterialRefs {
    pub resume_file: String,
    pub cover_letter_file: String,
}

/// Build a row in [`COLUMNS`] order.
pub fn tracker_row(job: &JobRecord, refs: &MaterialRefs, added_at: DateTime<Utc>) -> Vec<String> {
    vec![
        added_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        job.company.clone(),
        job.role.clone(),
        job.location.clone(),
        job.deadline.clone(),
        job.apply_link.clone(),
        job.source.clone(),
        INITIAL_STATUS.to_string(),
        refs.resume_file.clone(),
        refs.cover_letter_file.clone(),
        job.notes.clone(),
    ]
}

#[async_trait]
pub trait Tracker: Send + Sync {
    async fn append_rows(&self, rows: Vec<Vec<String>>) -> Result<()>;

    async fn add_application(&self, job: &JobRecord, refs: &MaterialRefs) -> Result<()> {
        self.append_rows(vec![tracker_row(job, refs, Utc::now())]).await
    }

    async fn add_job(&self, job: &JobRecord) -> Result<()> {
        self.add_application(job, &MaterialRefs::default()).await
    }
}

/// Logs rows instead of storing them; selected when no spreadsheet is configured.
pub struct NoopTracker;

#[async_trait]
impl Tracker for NoopTracker {
    async fn append_rows(&self, rows: Vec<Vec<String>>) -> Result<()> {
        for row in rows {
            tracing::info!(target: "tracker", row = ?row, "tracker disabled, row not stored");
        }
        Ok(())
    }
}

/// Append every job, one row per call. Stops at the first storage error.
pub async fn ingest_jobs(tracker: &dyn Tracker, jobs: &[JobRecord]) -> Result<usize> {
    let mut count = 0usize;
    for job in jobs {
        tracker.add_job(job).await?;
        count += 1;
    }
    tracing::info!(target: "tracker", count, "jobs added to tracker");
    Ok(count)
}
