// tests/ingest_normalize.rs
use internship_assistant::ingest::feed::FeedAddress;
use internship_assistant::ingest::extract::FieldExtractor;
use internship_assistant::ingest::types::RawEntry;
use internship_assistant::ingest::{build_record, normalize_text, to_plain_lines};

#[test]
fn empty_is_ok() {
    assert_eq!(normalize_text(""), "");
}

#[test]
fn strips_html_and_unescapes() {
    let s = "<p>Hello&nbsp;<b>world</b> &ldquo;ok&rdquo;</p>";
    let n = normalize_text(s);
    assert_eq!(n, r#"Hello world "ok""#);
}

#[test]
fn folds_whitespace_and_nbsp() {
    let s = "A\u{00A0}\n\tB   C";
    let n = normalize_text(s);
    assert_eq!(n, "A B C");
}

#[test]
fn length_cap_applies() {
    let s = "x".repeat(2_000);
    let n = normalize_text(&s);
    assert!(n.len() <= 1_500);
}

#[test]
fn plain_lines_break_on_block_tags() {
    let s = "<div>One</div><p>Two&amp;<b>three</b></p>Four<br/>Five";
    assert_eq!(to_plain_lines(s), "One\nTwo& three\nFour\nFive");
}

#[test]
fn record_company_falls_back_through_creator_and_publisher() {
    let addr = FeedAddress::parse("https://jobs.test/feed").unwrap();
    let ex = FieldExtractor::default();
    let base = RawEntry {
        title: Some("<b>Intern</b>".into()),
        link: Some(" https://jobs.test/1 ".into()),
        ..Default::default()
    };

    let by_publisher = RawEntry {
        publisher: Some("Initech".into()),
        ..base.clone()
    };
    let by_creator = RawEntry {
        creator: Some("Globex".into()),
        ..by_publisher.clone()
    };

    assert_eq!(build_record(&base, &addr, &ex).company, "Unknown");
    assert_eq!(build_record(&by_publisher, &addr, &ex).company, "Initech");
    let rec = build_record(&by_creator, &addr, &ex);
    assert_eq!(rec.company, "Globex");
    assert_eq!(rec.role, "Intern");
    assert_eq!(rec.apply_link, "https://jobs.test/1");
    assert_eq!(rec.source, "rss:https://jobs.test/feed");
}

#[test]
fn record_notes_join_summary_and_distinct_content() {
    let addr = FeedAddress::parse("https://jobs.test/feed").unwrap();
    let ex = FieldExtractor::default();
    let e = RawEntry {
        title: Some("Intern".into()),
        link: Some("https://jobs.test/1".into()),
        summary: Some("Short blurb".into()),
        content: Some("<p>Full posting</p>".into()),
        ..Default::default()
    };
    assert_eq!(build_record(&e, &addr, &ex).notes, "Short blurb | Full posting");

    let same = RawEntry {
        content: Some("Short blurb".into()),
        ..e
    };
    assert_eq!(build_record(&same, &addr, &ex).notes, "Short blurb");
}
