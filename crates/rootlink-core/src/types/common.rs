use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};

use crate::{Result, RootError};

/// Parse an ISO-8601 timestamp as issued by Root.
///
/// Accepts RFC 3339 values (`Z` or numeric offsets). A value without an
/// offset is read as UTC.
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|_| RootError::Validation(format!("invalid expiry timestamp: {value}")))
}

/// Render a timestamp the way it is persisted and shown to operators.
#[must_use]
pub fn format_timestamp(moment: &DateTime<Utc>) -> String {
    moment.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Take a required string field out of a response, rejecting absent or empty values.
pub fn require_field(value: Option<String>, field: &str, context: &str) -> Result<String> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(RootError::Validation(format!(
            "{context} response is missing `{field}`"
        ))),
    }
}
