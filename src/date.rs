//! Date handling for post records. Post dates arrive in whatever shape the
//! author or the CMS produced (`2024.01.10`, `2024-01-10`,
//! `2024-01-10T09:00:00.000Z`), so they stay strings on the [`crate::post::Post`]
//! and are only interpreted when ordering or formatting.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// Returns the sort key for a post date: milliseconds since the Unix epoch.
/// Dots are treated as dashes before parsing. Missing or unparseable dates
/// map to `0` so they sink to the end of a descending sort instead of
/// failing.
pub fn sort_key(raw: &str) -> i64 {
    match parse(raw) {
        Some(date_time) => date_time.timestamp_millis(),
        None => 0,
    }
}

/// Parses a post date into a UTC date-time. Accepts RFC 3339 date-times,
/// naive `YYYY-MM-DDTHH:MM:SS[.fff]` date-times and plain `YYYY-MM-DD` dates.
/// The date part may use `.` separators; dots after it (fractional seconds)
/// are left alone. Plain dates are taken as midnight UTC.
pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let iso = match trimmed.get(..10) {
        Some(date) => format!("{}{}", date.replace('.', "-"), &trimmed[10..]),
        None => trimmed.to_owned(),
    };

    if let Ok(date_time) = DateTime::parse_from_rfc3339(&iso) {
        return Some(date_time.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(&iso, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    let date = NaiveDate::parse_from_str(&iso, "%Y-%m-%d").ok()?;
    Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?))
}

/// Formats a CMS date for display as `YYYY.MM.DD`. Strings that already use
/// dots, or don't start with `YYYY-MM-DD`, are returned unchanged.
pub fn to_ymd_dots(raw: &str) -> String {
    let prefix: Vec<&str> = match raw.get(..10) {
        Some(prefix) => prefix.split('-').collect(),
        None => return raw.to_owned(),
    };
    match prefix.as_slice() {
        [y, m, d]
            if y.len() == 4
                && m.len() == 2
                && d.len() == 2
                && prefix.iter().all(|p| p.bytes().all(|b| b.is_ascii_digit())) =>
        {
            format!("{}.{}.{}", y, m, d)
        }
        _ => raw.to_owned(),
    }
}

/// Formats a post date as an ISO calendar date (`YYYY-MM-DD`) for sitemap
/// `lastmod` entries, or `None` when the date doesn't parse.
pub fn to_iso_date(raw: &str) -> Option<String> {
    parse(raw).map(|date_time| date_time.format("%Y-%m-%d").to_string())
}
