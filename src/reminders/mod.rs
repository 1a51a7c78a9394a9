pub mod calendar;

use chrono::NaiveDate;

use crate::ingest::types::JobRecord;

pub use calendar::{Calendar, CalendarEvent, GoogleCalendar, NoopCalendar};

pub fn format_reminder(message: &str) -> String {
    format!("[reminder] {message}")
}

/// Print reminder lines to stdout.
pub fn notify<I, S>(messages: I)
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    for m in messages {
        println!("{}", format_reminder(m.as_ref()));
    }
}

/// Messages for jobs whose ISO deadline falls within `days` of `today` (inclusive).
/// Deadlines that are not ISO dates are ignored.
pub fn upcoming_deadlines(jobs: &[JobRecord], today: NaiveDate, days: i64) -> Vec<String> {
    let mut due: Vec<(NaiveDate, &JobRecord)> = jobs
        .iter()
        .filter_map(|j| {
            let d = NaiveDate::parse_from_str(j.deadline.trim(), "%Y-%m-%d").ok()?;
            let left = (d - today).num_days();
            (0..=days).contains(&left).then_some((d, j))
        })
        .collect();
    due.sort_by_key(|(d, _)| *d);
    due.into_iter()
        .map(|(d, j)| format!("{} at {} closes {}", j.role, j.company, d))
        .collect()
}
