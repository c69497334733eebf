//! Time and timestamp helpers.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};

use crate::error::ValidationError;

/// UTC timestamp used for event dates, creation times and `updated_at`.
pub type Timestamp = DateTime<Utc>;

/// Naive layouts accepted in addition to RFC 3339. Naive values are UTC.
const NAIVE_LAYOUTS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Layouts carrying an explicit offset that RFC 3339 does not cover.
const OFFSET_LAYOUTS: &[&str] = &[
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%d %H:%M%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
];

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

/// Calendar year of `ts`.
#[must_use]
pub fn year_of(ts: Timestamp) -> i32 {
    ts.year()
}

/// Parse user-supplied ISO-8601 text into a UTC instant.
///
/// Accepts RFC 3339 (any offset, `Z` included), minute-precision instants
/// with an offset or `Z`, `YYYY-MM-DDTHH:MM[:SS]`, `YYYY-MM-DD HH:MM[:SS]`
/// and a bare `YYYY-MM-DD` (midnight). Values without an offset are UTC.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidDate`] when none of the layouts match.
pub fn parse_instant(text: &str) -> Result<Timestamp, ValidationError> {
    let text = text.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Ok(ts.to_utc());
    }
    let with_offset = match text.strip_suffix(['Z', 'z']) {
        Some(rest) => format!("{rest}+00:00"),
        None => text.to_string(),
    };
    for layout in OFFSET_LAYOUTS {
        if let Ok(ts) = DateTime::parse_from_str(&with_offset, layout) {
            return Ok(ts.to_utc());
        }
    }
    for layout in NAIVE_LAYOUTS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, layout) {
            return Ok(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| ValidationError::InvalidDate(text.to_string()))
}
