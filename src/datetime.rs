//! Date-time values at the host boundary.
//!
//! The engine stores date-times as text. Values are written as `YYYY-MM-DDTHH:MM:SS` and read
//! back into UTC [`DateTime`]s.
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::{Error, Result, Value};

const FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse an ISO-8601-like date-time string.
///
/// Accepts `T` or space separated date and time with optional fractional seconds, a bare date
/// (midnight), and RFC 3339 with an offset. An offset is dropped and the wall-clock time kept.
pub fn parse_date_time(s: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(Utc.from_utc_datetime(&dt.naive_local()));
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }
    match NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        Ok(date) => date
            .and_hms_opt(0, 0, 0)
            .map(|naive| Utc.from_utc_datetime(&naive))
            .ok_or_else(|| malformed(s, "invalid midnight")),
        Err(e) => Err(malformed(s, &e.to_string())),
    }
}

pub fn format_date_time(dt: &DateTime<Utc>) -> String {
    dt.format(FORMAT).to_string()
}

pub(crate) fn parse_opt(s: Option<String>) -> Result<Option<DateTime<Utc>>> {
    s.as_deref().map(parse_date_time).transpose()
}

fn malformed(input: &str, reason: &str) -> Error {
    Error::MalformedInput {
        input: input.to_owned(),
        reason: reason.to_owned(),
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(dt: DateTime<Utc>) -> Self {
        Value::Text(format_date_time(&dt))
    }
}

impl From<NaiveDateTime> for Value {
    fn from(dt: NaiveDateTime) -> Self {
        Value::Text(dt.format(FORMAT).to_string())
    }
}
