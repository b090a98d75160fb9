//! Version timestamps for collection definitions.

use chrono::{DateTime, NaiveDate, SecondsFormat, TimeZone, Utc};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Point on a schema version timeline (module or application).
pub type Timestamp = DateTime<Utc>;

/// Error returned when a version string is neither RFC 3339 nor `YYYY-MM-DD`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimestampParseError(String);

impl Display for TimestampParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid version timestamp `{}` (expected RFC 3339 or YYYY-MM-DD)",
            self.0
        )
    }
}

impl Error for TimestampParseError {}

/// Parses a version timestamp.
///
/// Bare dates resolve to midnight UTC, so `2019-01-01` and
/// `2019-01-01T00:00:00Z` denote the same version.
pub fn parse_timestamp(value: &str) -> Result<Timestamp, TimestampParseError> {
    let trimmed = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(parsed.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
        .ok_or_else(|| TimestampParseError(trimmed.to_string()))
}

/// Canonical wire form: RFC 3339 with `Z` suffix and second precision.
pub fn format_timestamp(value: &Timestamp) -> String {
    value.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Serde adapter accepting both accepted input forms.
pub mod serde_timestamp {
    use super::{format_timestamp, parse_timestamp, Timestamp};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Timestamp, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_timestamp(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Timestamp, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_timestamp(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::{format_timestamp, parse_timestamp};

    #[test]
    fn bare_date_equals_midnight_utc() {
        let date = parse_timestamp("2019-01-01").expect("bare date should parse");
        let full = parse_timestamp("2019-01-01T00:00:00Z").expect("rfc3339 should parse");
        assert_eq!(date, full);
        assert_eq!(format_timestamp(&date), "2019-01-01T00:00:00Z");
    }

    #[test]
    fn offsets_are_normalized_to_utc() {
        let parsed = parse_timestamp("2019-01-01T02:00:00+02:00").expect("offset should parse");
        assert_eq!(format_timestamp(&parsed), "2019-01-01T00:00:00Z");
    }

    #[test]
    fn rejects_garbage() {
        let err = parse_timestamp("next tuesday").expect_err("garbage must be rejected");
        assert!(err.to_string().contains("next tuesday"));
    }
}
