//! Expiration values and their calendar-relative display form.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Shown when a token has no expiration.
pub const NEVER: &str = "Never";
/// Shown when an expiration cannot be parsed as a date.
pub const UNKNOWN: &str = "Unknown";

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Raw expiration as received from the server.
///
/// Parsing is deferred to render time so a malformed value degrades to
/// [`UNKNOWN`] instead of failing the whole fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Expiration {
    /// Milliseconds since the Unix epoch.
    EpochMillis(i64),
    Text(String),
    Other(serde_json::Value),
}

impl Expiration {
    /// Parse into an instant expressed in `offset`.
    ///
    /// Timestamps without zone information are read as local to `offset`.
    pub fn parse(&self, offset: &FixedOffset) -> Option<DateTime<FixedOffset>> {
        match self {
            Self::EpochMillis(ms) => Utc
                .timestamp_millis_opt(*ms)
                .single()
                .map(|dt| dt.with_timezone(offset)),
            Self::Text(raw) => parse_text(raw.trim(), offset),
            Self::Other(_) => None,
        }
    }
}

fn parse_text(raw: &str, offset: &FixedOffset) -> Option<DateTime<FixedOffset>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(offset));
    }
    if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return Some(dt.with_timezone(offset));
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return offset.from_local_datetime(&naive).single();
        }
    }
    let midnight = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()?
        .and_hms_opt(0, 0, 0)?;
    offset.from_local_datetime(&midnight).single()
}

/// Display string for an optional expiration, relative to `now`.
pub fn format_expiration(expiration: Option<&Expiration>, now: DateTime<FixedOffset>) -> String {
    let Some(expiration) = expiration else {
        return NEVER.to_string();
    };
    match expiration.parse(now.offset()) {
        Some(instant) => calendar(instant, now),
        None => UNKNOWN.to_string(),
    }
}

/// Calendar-style formatting: "Today at 3:00 PM", "Last Monday at 9:15 AM",
/// falling back to `MM/DD/YYYY` beyond a week either side.
fn calendar(instant: DateTime<FixedOffset>, now: DateTime<FixedOffset>) -> String {
    let start_of_day = now
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .and_then(|midnight| now.offset().from_local_datetime(&midnight).single())
        .unwrap_or(now);
    let days = (instant - start_of_day).num_milliseconds() as f64 / 86_400_000.0;
    let time = instant.format("%-I:%M %p");

    if days < -6.0 {
        instant.format("%m/%d/%Y").to_string()
    } else if days < -1.0 {
        format!("Last {} at {time}", instant.format("%A"))
    } else if days < 0.0 {
        format!("Yesterday at {time}")
    } else if days < 1.0 {
        format!("Today at {time}")
    } else if days < 2.0 {
        format!("Tomorrow at {time}")
    } else if days < 7.0 {
        format!("{} at {time}", instant.format("%A"))
    } else {
        instant.format("%m/%d/%Y").to_string()
    }
}
