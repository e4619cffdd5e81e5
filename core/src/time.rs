//! Time related utils.

use crate::Error;
use chrono::{NaiveDateTime, Utc};

/// DateTime is the alias for chrono::DateTime<Utc>.
pub type DateTime = chrono::DateTime<Utc>;

/// Date format: "20220313"
const DATE: &str = "%Y%m%d";

/// Time format for ISO 8601 basic form: "20220313T072004Z"
const ISO8601: &str = "%Y%m%dT%H%M%SZ";

/// Time format for ISO 8601 extended form: "2022-03-13T07:20:04Z"
const ISO8601_WITH_SEPARATOR: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Create datetime of now.
pub fn now() -> DateTime {
    Utc::now()
}

/// Format time into date: `20220301`
pub fn format_date(t: DateTime) -> String {
    t.format(DATE).to_string()
}

/// Format time into ISO 8601 basic form: `20220313T072004Z`
///
/// This is the form used inside the SigV4 string to sign.
pub fn format_iso8601(t: DateTime) -> String {
    t.format(ISO8601).to_string()
}

/// Format time into ISO 8601 extended form: `2022-03-13T07:20:04Z`
pub fn format_iso8601_with_separator(t: DateTime) -> String {
    t.format(ISO8601_WITH_SEPARATOR).to_string()
}

/// Parse time from ISO 8601 basic form: `20220313T072004Z`
pub fn parse_iso8601(s: &str) -> crate::Result<DateTime> {
    parse_with(s, ISO8601)
}

/// Parse time from ISO 8601 extended form: `2022-03-13T07:20:04Z`
pub fn parse_iso8601_with_separator(s: &str) -> crate::Result<DateTime> {
    parse_with(s, ISO8601_WITH_SEPARATOR)
}

/// Parse time from rfc3339: `2022-03-13T07:20:04Z`, fractions and offsets allowed.
pub fn parse_rfc3339(s: &str) -> crate::Result<DateTime> {
    chrono::DateTime::parse_from_rfc3339(s)
        .map(|v| v.with_timezone(&Utc))
        .map_err(|e| {
            Error::unexpected("failed to parse rfc3339 time")
                .with_source(e)
                .with_context(format!("value: {s}"))
        })
}

fn parse_with(s: &str, fmt: &str) -> crate::Result<DateTime> {
    NaiveDateTime::parse_from_str(s, fmt)
        .map(|v| v.and_utc())
        .map_err(|e| {
            Error::unexpected("failed to parse time")
                .with_source(e)
                .with_context(format!("value: {s}"))
        })
}
