use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};

/// Format sources are expected to use. `%.f` accepts a missing fraction.
pub const PRIMARY_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Tried in order when the primary format does not match.
const LENIENT_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S%.f",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// Parse a transaction timestamp.
///
/// Tries [`PRIMARY_TIMESTAMP_FORMAT`] first, then [`parse_timestamp_lenient`].
/// Returns `None` when nothing matches; the caller keeps the record anyway.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    NaiveDateTime::parse_from_str(s, PRIMARY_TIMESTAMP_FORMAT)
        .ok()
        .or_else(|| parse_timestamp_lenient(s))
}

/// Fallback parse: RFC 3339 (offset dropped, wall clock kept), a handful of
/// common date-time layouts, then a bare date at midnight.
pub fn parse_timestamp_lenient(raw: &str) -> Option<NaiveDateTime> {
    let s = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }
    LENIENT_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| parse_date_only(s).map(|d| d.and_time(NaiveTime::MIN)))
}

/// Parse the calendar date column. Full timestamps are accepted and truncated.
pub fn parse_calendar_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    parse_date_only(s).or_else(|| parse_timestamp(s).map(|ts| ts.date()))
}

fn parse_date_only(s: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

/// Parse a monetary amount. Non-finite values are not amounts.
pub fn parse_amount(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}
