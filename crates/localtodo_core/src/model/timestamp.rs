//! `createdAt` values.
//!
//! Stored strings are kept verbatim so a read-modify-write never rewrites
//! them. Stamps minted here use RFC 3339 with millisecond precision and a
//! `Z` suffix.

use chrono::{DateTime, ParseError, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{Display, Formatter};

/// Creation time of a record, carried as its original RFC 3339 text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CreatedAt {
    raw: String,
    instant: DateTime<Utc>,
}

impl CreatedAt {
    /// Stamps `value` truncated to whole milliseconds, formatted with `Z`.
    pub fn from_instant(value: DateTime<Utc>) -> Self {
        let instant = value.trunc_subsecs(3);
        Self {
            raw: instant.to_rfc3339_opts(SecondsFormat::Millis, true),
            instant,
        }
    }

    /// Accepts any RFC 3339 string and keeps it unchanged.
    pub fn parse(raw: &str) -> Result<Self, ParseError> {
        let instant = DateTime::parse_from_rfc3339(raw.trim())?.with_timezone(&Utc);
        Ok(Self {
            raw: raw.to_string(),
            instant,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The same moment in UTC, at the precision of the stored text.
    pub fn instant(&self) -> DateTime<Utc> {
        self.instant
    }
}

impl From<DateTime<Utc>> for CreatedAt {
    fn from(value: DateTime<Utc>) -> Self {
        Self::from_instant(value)
    }
}

impl Display for CreatedAt {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

impl Serialize for CreatedAt {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.raw)
    }
}

impl<'de> Deserialize<'de> for CreatedAt {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw)
            .map_err(|err| serde::de::Error::custom(format!("invalid createdAt `{raw}`: {err}")))
    }
}

#[cfg(test)]
mod tests {
    use super::CreatedAt;
    use chrono::{TimeZone, Timelike, Utc};

    #[test]
    fn minted_stamps_truncate_to_millis() {
        let value = Utc
            .with_ymd_and_hms(2024, 5, 1, 12, 0, 0)
            .unwrap()
            .with_nanosecond(123_456_789)
            .unwrap();
        let stamp = CreatedAt::from_instant(value);
        assert_eq!(stamp.instant().nanosecond(), 123_000_000);
        assert_eq!(stamp.as_str(), "2024-05-01T12:00:00.123Z");
    }

    #[test]
    fn parsed_text_is_kept_as_written() {
        let stamp = CreatedAt::parse("2024-05-01T14:00:00+02:00").unwrap();
        assert_eq!(stamp.as_str(), "2024-05-01T14:00:00+02:00");
        assert_eq!(
            stamp.instant(),
            Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
        );
    }
}
