//! Serialized record shapes and tolerant decoders
//!
//! Stored payloads may come from older versions or be corrupted; every
//! decoder here degrades to the type's empty/default value instead of
//! returning an error.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Persisted record of the most recent search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastQueryRecord {
    /// The committed query text
    pub query: String,
    /// Zero-based results page
    pub page: u32,
    /// Unix timestamp in milliseconds at commit time
    pub time: i64,
}

impl LastQueryRecord {
    pub fn new(query: impl Into<String>, page: u32, time: i64) -> Self {
        Self {
            query: query.into(),
            page,
            time,
        }
    }

    /// Whether the record is older than `ttl_ms` at `now_ms`
    pub fn is_stale(&self, now_ms: i64, ttl_ms: i64) -> bool {
        now_ms - self.time > ttl_ms
    }
}

/// Decode a stored last-query payload; malformed input is treated as absent
pub fn decode_last_query(raw: Option<&str>) -> Option<LastQueryRecord> {
    let raw = raw?;
    match serde_json::from_str(raw) {
        Ok(record) => Some(record),
        Err(err) => {
            debug!("discarding malformed last-query payload: {}", err);
            None
        }
    }
}

/// Decode a stored history payload; anything that is not a string array
/// decodes to the empty history
pub fn decode_history(raw: Option<&str>) -> Vec<String> {
    let Some(raw) = raw else {
        return Vec::new();
    };
    match serde_json::from_str::<Vec<String>>(raw) {
        Ok(entries) => entries,
        Err(err) => {
            debug!("discarding malformed history payload: {}", err);
            Vec::new()
        }
    }
}

/// Encode history entries for storage
pub fn encode_history(entries: &[String]) -> String {
    serde_json::to_string(entries).unwrap_or_else(|_| "[]".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_query_roundtrip() {
        let record = LastQueryRecord::new("cats", 2, 1_700_000_000_000);
        let encoded = serde_json::to_string(&record).unwrap();
        assert_eq!(decode_last_query(Some(&encoded)), Some(record));
    }

    #[test]
    fn test_last_query_malformed() {
        assert_eq!(decode_last_query(None), None);
        assert_eq!(decode_last_query(Some("not json")), None);
        assert_eq!(decode_last_query(Some(r#"{"query": 42}"#)), None);
    }

    #[test]
    fn test_last_query_staleness() {
        let record = LastQueryRecord::new("cats", 0, 1_000);
        assert!(!record.is_stale(1_000 + 600_000, 600_000));
        assert!(record.is_stale(1_000 + 600_001, 600_000));
    }

    #[test]
    fn test_history_decode() {
        assert_eq!(
            decode_history(Some(r#"["cats","dogs"]"#)),
            vec!["cats".to_string(), "dogs".to_string()]
        );
        assert!(decode_history(None).is_empty());
        assert!(decode_history(Some("\"not-an-array\"")).is_empty());
        assert!(decode_history(Some(r#"["ok", 3]"#)).is_empty());
        assert!(decode_history(Some("{broken")).is_empty());
    }

    #[test]
    fn test_history_encode() {
        let entries = vec!["a".to_string(), "b".to_string()];
        assert_eq!(encode_history(&entries), r#"["a","b"]"#);
    }
}
