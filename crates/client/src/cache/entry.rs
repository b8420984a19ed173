//! Cache entry encoding.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A cached payload and the instant it was written.
///
/// Encoded as `{"data": ..., "timestamp": <epoch millis>}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub data: Value,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

impl CacheEntry {
    /// Entry stamped with the current time.
    pub fn new(data: Value) -> Self {
        Self { data, timestamp: Utc::now() }
    }

    /// Time since the entry was written. Timestamps in the future count as zero.
    pub fn age(&self) -> Duration {
        (Utc::now() - self.timestamp).to_std().unwrap_or(Duration::ZERO)
    }

    /// Whether the entry is older than `max_age`.
    pub fn is_stale(&self, max_age: Duration) -> bool {
        self.age() > max_age
    }

    /// Decode a raw stored value; anything unparseable is `None`.
    pub(crate) fn decode(raw: &str) -> Option<Self> {
        serde_json::from_str(raw).ok()
    }

    pub(crate) fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wire_format() {
        let entry = CacheEntry { data: json!("X"), timestamp: DateTime::from_timestamp_millis(1_700_000_000_123).unwrap() };
        let encoded: Value = serde_json::from_str(&entry.encode().unwrap()).unwrap();
        assert_eq!(encoded, json!({"data": "X", "timestamp": 1_700_000_000_123_i64}));
    }

    #[test]
    fn test_staleness() {
        let entry = CacheEntry { data: json!(1), timestamp: Utc::now() - chrono::Duration::seconds(60) };
        assert!(!entry.is_stale(Duration::from_secs(300)));

        let entry = CacheEntry { data: json!(1), timestamp: Utc::now() - chrono::Duration::seconds(600) };
        assert!(entry.is_stale(Duration::from_secs(300)));
    }

    #[test]
    fn test_future_timestamp_is_fresh() {
        let entry = CacheEntry { data: json!(1), timestamp: Utc::now() + chrono::Duration::seconds(60) };
        assert_eq!(entry.age(), Duration::ZERO);
    }

    #[test]
    fn test_decode_malformed() {
        assert!(CacheEntry::decode("{not json").is_none());
        assert!(CacheEntry::decode(r#"{"data": 1}"#).is_none());
        assert!(CacheEntry::decode(r#"{"data": 1, "timestamp": "yesterday"}"#).is_none());
        assert!(CacheEntry::decode(r#"{"data": 1, "timestamp": 1700000000000}"#).is_some());
    }
}
