//! Time and timestamp helpers.

use chrono::{DateTime, SecondsFormat, Utc};

/// UTC timestamp used for order creation times.
pub type Timestamp = DateTime<Utc>;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

/// Render a timestamp in its persisted form.
///
/// The width is fixed (microseconds, `Z` suffix) so that lexical order of
/// the stored text matches chronological order.
#[must_use]
pub fn to_storage(ts: &Timestamp) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse a persisted RFC 3339 timestamp back into UTC.
///
/// # Errors
///
/// Returns [`chrono::ParseError`] when `value` is not RFC 3339.
pub fn from_storage(value: &str) -> Result<Timestamp, chrono::ParseError> {
    DateTime::parse_from_rfc3339(value).map(|ts| ts.to_utc())
}
