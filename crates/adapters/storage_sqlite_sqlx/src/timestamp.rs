//! Timestamp columns.
//!
//! Instants are stored as fixed-width UTC RFC 3339 text so that string order
//! in SQL matches chronological order.

use chrono::SecondsFormat;
use eventbot_domain::time::Timestamp;

pub(crate) fn encode(ts: Timestamp) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn decode(text: &str) -> Result<Timestamp, sqlx::Error> {
    chrono::DateTime::parse_from_rfc3339(text)
        .map(|ts| ts.to_utc())
        .map_err(|err| sqlx::Error::Decode(Box::new(err)))
}
