//! Custom serde helpers for gateway wire formats.

/// Deserializes a Unix-seconds integer into `DateTime<Utc>`.
///
/// The ledger stamps trades with block time in seconds (`date`), sent either as
/// a JSON number or a decimal string.
pub mod timestamp_secs {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = match serde_json::Value::deserialize(deserializer)? {
            serde_json::Value::Number(n) => n
                .as_i64()
                .ok_or_else(|| serde::de::Error::custom(format!("Invalid timestamp: {}", n)))?,
            serde_json::Value::String(s) => s
                .parse::<i64>()
                .map_err(|_| serde::de::Error::custom(format!("Invalid timestamp: {}", s)))?,
            other => {
                return Err(serde::de::Error::custom(format!(
                    "Invalid timestamp: {}",
                    other
                )))
            }
        };
        DateTime::<Utc>::from_timestamp(secs, 0)
            .ok_or_else(|| serde::de::Error::custom(format!("Invalid timestamp: {}", secs)))
    }

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_i64(value.timestamp())
    }
}
