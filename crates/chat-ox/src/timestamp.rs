use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

/// Message creation time.
///
/// Serialises as an RFC 3339 string and accepts either that or epoch
/// milliseconds, which is what the backend stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(DateTime<Utc>);

impl Serialize for Timestamp {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_iso_string())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct TimestampVisitor;

        impl de::Visitor<'_> for TimestampVisitor {
            type Value = Timestamp;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                formatter.write_str("epoch milliseconds (int) or an RFC 3339 string")
            }

            fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Timestamp::from_millis(value)
                    .ok_or_else(|| E::custom(format!("timestamp out of range: {value}")))
            }

            fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                let value = i64::try_from(value)
                    .map_err(|_| E::custom(format!("timestamp out of range: {value}")))?;
                self.visit_i64(value)
            }

            #[allow(clippy::cast_possible_truncation)]
            fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                if !value.is_finite() {
                    return Err(E::custom("floating point timestamp is not finite"));
                }
                self.visit_i64(value.trunc() as i64)
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Timestamp::from_iso_string(value)
                    .map_err(|err| E::custom(format!("invalid RFC 3339 timestamp: {err}")))
            }
        }

        deserializer.deserialize_any(TimestampVisitor)
    }
}

impl Timestamp {
    #[must_use]
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Milliseconds since the Unix epoch; `None` when out of range.
    #[must_use]
    pub fn from_millis(millis: i64) -> Option<Self> {
        Utc.timestamp_millis_opt(millis).single().map(Self)
    }

    pub fn from_iso_string(s: &str) -> Result<Self, chrono::ParseError> {
        DateTime::parse_from_rfc3339(s).map(|dt| Self(dt.with_timezone(&Utc)))
    }

    #[must_use]
    pub fn to_millis(&self) -> i64 {
        self.0.timestamp_millis()
    }

    #[must_use]
    pub fn to_iso_string(&self) -> String {
        self.0.to_rfc3339()
    }

    #[must_use]
    pub fn inner(&self) -> DateTime<Utc> {
        self.0
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::now()
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }
}

impl From<Timestamp> for DateTime<Utc> {
    fn from(ts: Timestamp) -> Self {
        ts.0
    }
}

#[cfg(test)]
mod tests {
    use super::Timestamp;

    #[test]
    fn deserializes_from_epoch_millis() {
        let ts: Timestamp =
            serde_json::from_str("1758887156000").expect("millisecond timestamps should parse");
        assert_eq!(ts.to_millis(), 1_758_887_156_000);
    }

    #[test]
    fn deserializes_from_rfc3339_string() {
        let json = "\"2025-09-26T11:45:56Z\"";
        let ts: Timestamp = serde_json::from_str(json).expect("RFC3339 string should parse");
        assert_eq!(ts.to_millis(), 1_758_887_156_000);
    }

    #[test]
    fn serializes_as_rfc3339() {
        let ts = Timestamp::from_millis(0).expect("epoch is in range");
        let json = serde_json::to_string(&ts).expect("timestamp serializes");
        assert_eq!(json, "\"1970-01-01T00:00:00+00:00\"");
    }
}
