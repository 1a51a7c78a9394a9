// tests/providers_rss.rs
use std::sync::Arc;
use std::time::Duration;

use internship_assistant::ingest::providers::rss::{FixtureFeedFetcher, RssSource};
use internship_assistant::ingest::types::JobSource;
use internship_assistant::ingest::Pipeline;

const RSS_XML: &str = include_str!("fixtures/jobs_rss.xml");
const ATOM_XML: &str = include_str!("fixtures/jobs_atom.xml");

const RSS_URL: &str = "https://board.test/feed.rss";
const ATOM_URL: &str = "https://campus.test/feed.atom";

fn source(feeds: &[&str]) -> RssSource {
    let fetcher = FixtureFeedFetcher::new()
        .with_feed(RSS_URL, RSS_XML)
        .with_feed(ATOM_URL, ATOM_XML);
    let pipeline = Pipeline::new(Arc::new(fetcher)).with_delay(Duration::ZERO);
    RssSource::new(pipeline, feeds.iter().map(|s| s.to_string()).collect())
}

#[tokio::test]
async fn rss_fixture_yields_normalized_records() {
    let jobs = source(&[RSS_URL]).fetch_jobs().await.expect("rss ok");

    // Four items: one repost of the first, one without a link.
    assert_eq!(jobs.len(), 2);

    let first = &jobs[0];
    assert_eq!(first.company, "Acme Robotics");
    assert_eq!(first.role, "Software Engineering Intern, Summer 2025");
    assert_eq!(first.location, "Pittsburgh, PA");
    assert_eq!(first.deadline, "2025-02-15");
    assert_eq!(first.apply_link, "https://board.test/jobs/101");
    assert_eq!(first.source, format!("rss:{RSS_URL}"));
    assert!(first.notes.ends_with("| Twelve-week paid internship on the planning team."));

    let second = &jobs[1];
    assert_eq!(second.company, "Globex & Co");
    assert_eq!(second.location, "remote");
    assert_eq!(second.deadline, "rolling");
}

#[tokio::test]
async fn atom_fixture_uses_alternate_links_and_tags() {
    let jobs = source(&[ATOM_URL]).fetch_jobs().await.expect("atom ok");
    assert_eq!(jobs.len(), 2);

    assert_eq!(jobs[0].company, "Umbrella Labs");
    assert_eq!(jobs[0].apply_link, "https://campus.test/jobs/7");
    assert_eq!(jobs[0].location, "Toronto, ON");
    assert_eq!(jobs[0].deadline, "2025-03-01");

    assert_eq!(jobs[1].company, "Hooli");
    assert_eq!(jobs[1].location, "Zurich, Switzerland");
    assert_eq!(jobs[1].deadline, "2025-04-30");
}

#[tokio::test]
async fn feeds_are_read_in_configured_order_and_missing_ones_skipped() {
    let src = source(&[ATOM_URL, "https://gone.test/rss", RSS_URL]);
    assert_eq!(src.name(), "rss");
    assert_eq!(src.feeds().len(), 3);

    let jobs = src.fetch_jobs().await.expect("never fails as a whole");
    let companies: Vec<&str> = jobs.iter().map(|j| j.company.as_str()).collect();
    assert_eq!(
        companies,
        vec!["Umbrella Labs", "Hooli", "Acme Robotics", "Globex & Co"]
    );
}
