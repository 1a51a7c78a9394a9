// src/ingest/providers/mod.rs
pub mod amazon;
pub mod generic;
pub mod rss;
pub mod simplify;

use std::collections::HashSet;

use crate::ingest::dedup::{is_duplicate, key_digest, key_for};
use crate::ingest::types::{JobRecord, JobSource};
use metrics::counter;

/// Collect from every source in order. A failing source is logged and skipped.
///
/// Records missing a role or apply link are dropped, and a posting seen from an
/// earlier source (same company, role and link) keeps that first copy.
pub async fn fetch_jobs(sources: &[Box<dyn JobSource>]) -> Vec<JobRecord> {
    let mut jobs = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    for s in sources {
        let batch = match s.fetch_jobs().await {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(target: "ingest", error = ?e, source = s.name(), "source error");
                counter!("ingest_source_errors_total").increment(1);
                continue;
            }
        };

        let (mut accepted, mut duplicates, mut skipped) = (0usize, 0usize, 0usize);
        for rec in batch {
            if !rec.is_complete() {
                skipped += 1;
                tracing::debug!(target: "ingest", source = s.name(), company = %rec.company, "record missing role or link");
                continue;
            }
            let key = key_for(&rec);
            if is_duplicate(&key, &seen) {
                duplicates += 1;
                tracing::debug!(target: "ingest", source = s.name(), key = %key_digest(&key), "duplicate posting");
                continue;
            }
            seen.insert(key);
            jobs.push(rec);
            accepted += 1;
        }

        counter!("ingest_duplicate_total").increment(duplicates as u64);
        counter!("ingest_skipped_total").increment(skipped as u64);
        tracing::info!(
            target: "ingest",
            source = s.name(),
            count = accepted,
            duplicates,
            skipped,
            "source collected"
        );
    }
    jobs
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use async_trait::async_trait;

    struct Fixed(&'static str, Vec<JobRecord>);

    #[async_trait]
    impl JobSource for Fixed {
        async fn fetch_jobs(&self) -> Result<Vec<JobRecord>> {
            Ok(self.1.clone())
        }
        fn name(&self) -> &'static str {
            self.0
        }
    }

    fn rec(company: &str, role: &str, link: &str, source: &str) -> JobRecord {
        JobRecord {
            company: company.into(),
            role: role.into(),
            apply_link: link.into(),
            source: source.into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn incomplete_and_repeated_records_are_dropped() {
        let sources: Vec<Box<dyn JobSource>> = vec![
            Box::new(Fixed(
                "first",
                vec![
                    rec("Acme", "SWE Intern", "https://acme.test/1", "first"),
                    rec("Acme", "SWE Intern", "", "first"),
                ],
            )),
            Box::new(Fixed(
                "second",
                vec![
                    rec("ACME", " swe intern", "https://acme.test/1", "second"),
                    rec("Globex", "", "https://globex.test/2", "second"),
                    rec("Globex", "Data Intern", "https://globex.test/2", "second"),
                ],
            )),
        ];

        let jobs = fetch_jobs(&sources).await;

        let got: Vec<(&str, &str)> = jobs
            .iter()
            .map(|j| (j.role.as_str(), j.source.as_str()))
            .collect();
        assert_eq!(got, vec![("SWE Intern", "first"), ("Data Intern", "second")]);
    }

    #[tokio::test]
    async fn no_sources_yield_nothing() {
        assert!(fetch_jobs(&[]).await.is_empty());
    }
}
