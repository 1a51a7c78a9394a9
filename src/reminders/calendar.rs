//! Deadline events on a calendar (Google Calendar v3 REST backend).

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

use crate::config::AppConfig;

pub const CALENDAR_API: &str = "https://www.googleapis.com/calendar/v3/calendars";
/// Length of a deadline event.
pub fn event_length() -> chrono::Duration {
    chrono::Duration::hours(1)
}

const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"];

#[derive(Debug, Error)]
pub enum CalendarError {
    #[error("not an ISO-8601 date or timestamp: `{0}`")]
    InvalidDeadline(String),
}

/// Identifier and link of a created event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "htmlLink", default)]
    pub html_link: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventTime {
    #[serde(rename = "dateTime")]
    pub date_time: String,
    #[serde(rename = "timeZone", skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

/// One-hour window starting at the deadline. Offset-less inputs are taken as UTC;
/// a bare date starts at midnight.
pub fn event_window(deadline_iso: &str) -> Result<(EventTime, EventTime), CalendarError> {
    let s = deadline_iso.trim();
    if let Ok(start) = DateTime::parse_from_rfc3339(s) {
        let end = start + event_length();
        return Ok((
            EventTime {
                date_time: start.to_rfc3339(),
                time_zone: None,
            },
            EventTime {
                date_time: end.to_rfc3339(),
                time_zone: None,
            },
        ));
    }

    let naive = NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .ok_or_else(|| CalendarError::InvalidDeadline(s.to_string()))?;

    let at = |t: NaiveDateTime| EventTime {
        date_time: t.format("%Y-%m-%dT%H:%M:%S").to_string(),
        time_zone: Some("UTC".to_string()),
    };
    Ok((at(naive), at(naive + event_length())))
}

/// Request body for `events.insert`.
pub fn event_body(title: &str, deadline_iso: &str, url: Option<&str>) -> Result<serde_json::Value, CalendarError> {
    let (start, end) = event_window(deadline_iso)?;
    Ok(json!({
        "summary": title,
        "start": start,
        "end": end,
        "description": url.unwrap_or_default(),
    }))
}

#[async_trait]
pub trait Calendar: Send + Sync {
    async fn add_deadline(&self, title: &str, deadline_iso: &str, url: Option<&str>) -> Result<CalendarEvent>;
}

pub struct GoogleCalendar {
    http: reqwest::Client,
    api_base: String,
    calendar_id: String,
    token: String,
}

impl GoogleCalendar {
    pub fn new(calendar_id: &str, token: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("internship-assistant/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .context("building Calendar HTTP client")?;
        Ok(Self {
            http,
            api_base: CALENDAR_API.to_string(),
            calendar_id: calendar_id.to_string(),
            token: token.to_string(),
        })
    }

    pub fn from_config(cfg: &AppConfig) -> Result<Self> {
        let token = cfg.require_access_token()?;
        Self::new(&cfg.calendar_id, token, cfg.http_timeout)
    }

    pub fn with_api_base(mut self, base: &str) -> Self {
        self.api_base = base.trim_end_matches('/').to_string();
        self
    }

    pub fn events_url(&self) -> String {
        format!("{}/{}/events", self.api_base, self.calendar_id)
    }
}

#[async_trait]
impl Calendar for GoogleCalendar {
    async fn add_deadline(&self, title: &str, deadline_iso: &str, url: Option<&str>) -> Result<CalendarEvent> {
        let body = event_body(title, deadline_iso, url)?;
        let event: CalendarEvent = self
            .http
            .post(self.events_url())
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await
            .context("calendar insert")?
            .error_for_status()
            .context("calendar insert non-2xx")?
            .json()
            .await
            .context("calendar insert response")?;
        tracing::info!(target: "reminders", id = %event.id, "calendar event created");
        Ok(event)
    }
}

/// Validates and logs the event without creating it.
pub struct NoopCalendar;

#[async_trait]
impl Calendar for NoopCalendar {
    async fn add_deadline(&self, title: &str, deadline_iso: &str, url: Option<&str>) -> Result<CalendarEvent> {
        let body = event_body(title, deadline_iso, url)?;
        tracing::info!(target: "reminders", event = %body, "calendar disabled, event not created");
        Ok(CalendarEvent::default())
    }
}
