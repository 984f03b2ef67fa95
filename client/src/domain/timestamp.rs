//! Timestamp normalisation for inbound documents.
//!
//! The API emits RFC 3339 timestamps with a `Z` suffix, but older documents
//! and hand-built fixtures sometimes carry naive `YYYY-MM-DDTHH:MM:SS`
//! values. Naive values are read as UTC; everything else is rejected.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serializer};

/// A wire timestamp in none of the accepted shapes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TimestampError {
    /// The value was empty once trimmed.
    #[error("timestamp must not be empty")]
    Empty,
    /// The value is neither RFC 3339 nor a naive ISO-8601 date-time.
    #[error("`{0}` is not an ISO-8601 timestamp")]
    Unsupported(String),
}

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse a wire timestamp into UTC.
///
/// # Errors
///
/// Returns [`TimestampError`] when the value is blank or in an unsupported
/// shape.
///
/// # Examples
/// ```
/// use ubiclient::domain::parse_timestamp;
///
/// let zulu = parse_timestamp("2022-06-19T20:56:38Z").unwrap();
/// let naive = parse_timestamp("2022-06-19T20:56:38").unwrap();
/// let offset = parse_timestamp("2022-06-20T05:56:38+09:00").unwrap();
/// assert_eq!(zulu, naive);
/// assert_eq!(zulu, offset);
/// ```
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, TimestampError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(TimestampError::Empty);
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(parsed.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| TimestampError::Unsupported(raw.to_owned()))
}

/// Render a UTC timestamp the way the API does (`2022-06-19T20:56:38Z`).
pub fn format_timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub(crate) fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format_timestamp(value))
}

pub(crate) fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).map_err(serde::de::Error::custom)
}

/// Nullable variant used with `#[serde(with = "timestamp::option", default)]`.
pub(crate) mod option {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub(crate) fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(value) => super::serialize(value, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub(crate) fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<String>::deserialize(deserializer)?
            .filter(|raw| !raw.trim().is_empty())
            .map(|raw| super::parse_timestamp(&raw).map_err(serde::de::Error::custom))
            .transpose()
    }
}
