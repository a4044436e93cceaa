//! Local-time handling for logged calls and meetings.
//!
//! Callers give wall-clock times in their own zone; HubSpot wants UTC.

use super::errors::ValidationError;
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Resolve an IANA zone name such as `America/Edmonton`.
pub fn parse_timezone(name: &str) -> Result<Tz, ValidationError> {
    name.parse::<Tz>()
        .map_err(|_| ValidationError::InvalidTimezone(name.to_string()))
}

/// Interpret `YYYY-MM-DDTHH:MM:SS` (a trailing `Z` is ignored) as local time in `tz`.
///
/// Ambiguous times during a DST fall-back resolve to the earlier instant;
/// times skipped by a spring-forward are rejected.
pub fn local_to_utc(value: &str, tz: Tz) -> Result<DateTime<Utc>, ValidationError> {
    let invalid = || ValidationError::InvalidDateTime(value.to_string());
    let naive = NaiveDateTime::parse_from_str(value.trim_end_matches('Z'), "%Y-%m-%dT%H:%M:%S")
        .map_err(|_| invalid())?;

    tz.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(invalid)
}

/// `2024-01-15T17:30:00.000Z`, used for notes and calls.
pub fn format_millis(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%dT%H:%M:%S.000Z").to_string()
}

/// `2024-01-15T17:30:00Z`, used for meetings.
pub fn format_seconds(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}
