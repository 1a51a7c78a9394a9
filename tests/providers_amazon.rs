// tests/providers_amazon.rs
use internship_assistant::ingest::providers::amazon::parse_listings;
use internship_assistant::ingest::providers::generic::{collect_jobs, normalize_job};
use serde_json::json;

const PAGE: &str = r#"<!doctype html>
<html><body>
  <div class="search-results">
    <div class="job-tile">
      <a class="job-link" href="/en/jobs/2801234/software-dev-engineer-intern">
        <h3 class="job-title">Software Dev Engineer Intern</h3>
      </a>
      <p class="location-and-id">USA, WA, Seattle | Job ID: 2801234</p>
    </div>
    <div class="job-tile">
      <a class="job-link" href="/en/jobs/2805555/data-engineer-intern">
        <h3 class="job-title">
          Data Engineer Intern
        </h3>
      </a>
      <p class="location-and-id">CAN, BC, Vancouver | Job ID: 2805555</p>
    </div>
    <div class="promo">Not a listing</div>
  </div>
</body></html>"#;

#[test]
fn job_tiles_become_records() {
    let jobs = parse_listings(PAGE);
    assert_eq!(jobs.len(), 2);

    assert_eq!(jobs[0].company, "Amazon");
    assert_eq!(jobs[0].role, "Software Dev Engineer Intern");
    assert_eq!(
        jobs[0].apply_link,
        "https://www.amazon.jobs/en/jobs/2801234/software-dev-engineer-intern"
    );
    assert_eq!(jobs[0].location, "USA, WA, Seattle | Job ID: 2801234");
    assert_eq!(jobs[0].source, "scraper:amazon");

    assert_eq!(jobs[1].role, "Data Engineer Intern");
    assert!(jobs.iter().all(|j| j.is_complete()));
}

#[test]
fn page_without_tiles_is_empty() {
    assert!(parse_listings("<html><body><p>No results</p></body></html>").is_empty());
}

#[test]
fn generic_payloads_normalize_like_scraped_ones() {
    let raw = json!({
        "company": "Initech",
        "role": " QA Intern ",
        "location": "Austin, TX",
        "apply_link": "https://initech.test/jobs/4"
    });
    let rec = normalize_job(raw.as_object().unwrap());
    assert_eq!(rec.role, "QA Intern");
    assert_eq!(rec.source, "scraper:generic");
    assert!(rec.is_complete());

    let batch = collect_jobs(vec![raw.as_object().unwrap().clone(); 3]);
    assert_eq!(batch.len(), 3);
}
