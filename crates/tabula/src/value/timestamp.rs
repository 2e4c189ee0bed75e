//! Timestamp primitive — signed milliseconds since the Unix epoch.

use chrono::{DateTime, SecondsFormat, TimeZone, Utc};

/// A point in time with millisecond precision.
///
/// The wire representation in every format is the signed millisecond
/// count; the ISO-8601 rendering exists only for readable JSON.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp {
    pub unix_millis: i64,
}

impl Timestamp {
    pub const EPOCH: Timestamp = Timestamp { unix_millis: 0 };

    pub fn from_unix_millis(unix_millis: i64) -> Self {
        Self { unix_millis }
    }

    /// The ISO-8601 (RFC 3339) rendering in UTC with millisecond precision.
    ///
    /// Returns `None` for instants outside chrono's representable range.
    pub fn to_rfc3339(&self) -> Option<String> {
        match Utc.timestamp_millis_opt(self.unix_millis) {
            chrono::LocalResult::Single(dt) => {
                Some(dt.to_rfc3339_opts(SecondsFormat::Millis, true))
            }
            _ => None,
        }
    }

    /// Parses an RFC 3339 rendering, truncating to millisecond precision.
    pub fn parse_rfc3339(s: &str) -> Option<Self> {
        DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| Self::from_unix_millis(dt.timestamp_millis()))
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self::from_unix_millis(dt.timestamp_millis())
    }
}
