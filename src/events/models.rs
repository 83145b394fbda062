//! Calendar event data models

use crate::common::ApiError;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Calendar event as stored server-side. `id` is the identity key; the
/// date fields stay as ISO-8601 wire strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub start_date: String,
    pub end_date: String,
    pub all_day: bool,
    #[serde(default)]
    pub location: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Payload for create and update calls. The server assigns `id` on
/// create and returns the stored entity.
#[derive(Debug, Clone, Serialize)]
pub struct CreateEventRequest {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub start_date: String,
    pub end_date: String,
    pub all_day: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// Create/update responses wrap the entity under an `event` key.
#[derive(Debug, Deserialize)]
pub struct EventEnvelope {
    pub event: CalendarEvent,
}

/// Normalize a caller-supplied date into the canonical wire timestamp
/// (`YYYY-MM-DDTHH:MM:SS.mmmZ`). Accepts RFC 3339 as well as the naive
/// forms the screens produce, treated as UTC.
pub fn to_api_timestamp(raw: &str) -> Result<String, ApiError> {
    let parsed = DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
                .map(|n| Utc.from_utc_datetime(&n))
        })
        .or_else(|_| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
                .map(|n| Utc.from_utc_datetime(&n))
        })
        .or_else(|_| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map(|d| Utc.from_utc_datetime(&d.and_time(NaiveTime::MIN)))
        });

    match parsed {
        Ok(dt) => Ok(dt.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()),
        Err(_) => Err(ApiError::BadRequest(format!("Invalid date: {raw}"))),
    }
}
