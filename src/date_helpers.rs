use chrono::{
    format::{Item, StrftimeItems},
    DateTime, SecondsFormat, Utc,
};
use serde::Serializer;

/// Formats a timestamp as ISO 8601 in UTC with millisecond precision, e.g.
/// `2024-03-01T08:30:00.000Z`.
#[must_use]
pub fn iso_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Serializes a timestamp using [`iso_timestamp`]. Meant for `#[serde(serialize_with)]`.
pub fn serialize_iso<S: Serializer>(
    timestamp: &DateTime<Utc>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&iso_timestamp(timestamp))
}

/// Whether chrono is able to format dates with the given `strftime`-like format.
#[must_use]
pub fn is_valid_format(format: &str) -> bool {
    !StrftimeItems::new(format).any(|item| matches!(item, Item::Error))
}

/// Formats a timestamp for humans. `format` has to be checked with [`is_valid_format`]
/// beforehand, chrono panics on invalid ones.
#[must_use]
pub fn format_date(timestamp: &DateTime<Utc>, format: &str) -> String {
    timestamp.format(format).to_string()
}
