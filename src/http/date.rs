//! HTTP date handling.
//!
//! Dates are written as `EEE, d MMM yyyy HH:mm:ss z` in GMT with an English
//! locale, e.g. `Mon, 1 Jan 2024 00:00:00 GMT`. Every function here is pure;
//! no formatter instance is shared between connections.

use std::time::SystemTime;

use chrono::{DateTime, NaiveDateTime, Timelike, Utc};

/// `strftime` pattern for outgoing dates. The day is not zero padded.
pub const HTTP_DATE_FORMAT: &str = "%a, %-d %b %Y %H:%M:%S GMT";

const PARSE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S";

pub fn format_http_date(time: DateTime<Utc>) -> String {
    time.format(HTTP_DATE_FORMAT).to_string()
}

/// Current time in HTTP date format, for the `Date` header.
pub fn http_date_now() -> String {
    format_http_date(Utc::now())
}

/// Parses a client supplied HTTP date. Returns `None` when the value cannot be
/// understood.
pub fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc2822(value) {
        return Some(parsed.with_timezone(&Utc));
    }

    let (stamp, zone) = value.rsplit_once(' ')?;
    if !matches!(zone, "GMT" | "UTC" | "UT" | "Z") {
        return None;
    }

    NaiveDateTime::parse_from_str(stamp, PARSE_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

/// Drops sub-second precision; HTTP dates carry whole seconds only.
pub fn truncate_to_seconds(time: SystemTime) -> DateTime<Utc> {
    let time = DateTime::<Utc>::from(time);
    time.with_nanosecond(0).unwrap_or(time)
}

/// Decides whether a resource must be sent in full.
///
/// The resource counts as modified when its timestamp is strictly after the
/// client's, and also whenever either side is unknown or the header value does
/// not parse.
pub fn is_modified_since(last_modified: Option<DateTime<Utc>>, if_modified_since: Option<&str>) -> bool {
    let Some(last_modified) = last_modified else {
        return true;
    };

    let Some(raw) = if_modified_since else {
        return true;
    };

    match parse_http_date(raw) {
        Some(client_time) => last_modified > client_time,
        None => {
            tracing::debug!(value = raw, "Unparseable If-Modified-Since, serving resource");
            true
        }
    }
}
