//! Open field bags
//!
//! Events and log entries carry an open mapping of field name to typed
//! value next to their fixed attributes. Values are a closed tagged variant
//! rather than free-form JSON so that every field round-trips through
//! storage with the same value *and* type.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::pointer::LogPointer;

/// A typed value in an open field bag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    /// Free text
    Text(String),
    /// Signed integer
    Integer(i64),
    /// Floating point number
    Float(f64),
    /// Boolean flag
    Boolean(bool),
    /// Point in time, millisecond precision
    Timestamp(DateTime<Utc>),
    /// Log stream position
    Pointer(LogPointer),
}

impl FieldValue {
    /// Timestamp value truncated to millisecond precision.
    ///
    /// The storage layer only guarantees milliseconds, so timestamps are
    /// normalized at construction time to keep round trips exact.
    pub fn timestamp(at: DateTime<Utc>) -> Self {
        let millis = at.timestamp_millis();
        Self::Timestamp(
            DateTime::<Utc>::from_timestamp_millis(millis).unwrap_or(at),
        )
    }

    /// Tag identifying the value type, used for codec dispatch
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::Boolean(_) => "boolean",
            Self::Timestamp(_) => "timestamp",
            Self::Pointer(_) => "pointer",
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::timestamp(value)
    }
}

impl From<LogPointer> for FieldValue {
    fn from(value: LogPointer) -> Self {
        Self::Pointer(value)
    }
}

/// Open mapping of field name to typed value.
///
/// Keys are caller-supplied and carry no schema; the map is ordered so that
/// serialized documents are deterministic.
pub type FieldBag = BTreeMap<String, FieldValue>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_normalized_to_millis() {
        let at = DateTime::<Utc>::from_timestamp(100, 123_456_789).unwrap();
        let value = FieldValue::timestamp(at);
        match value {
            FieldValue::Timestamp(t) => {
                assert_eq!(t.timestamp_millis(), 100_123);
                assert_eq!(t.timestamp_subsec_nanos() % 1_000_000, 0);
            }
            other => panic!("expected timestamp, got {other:?}"),
        }
    }

    #[test]
    fn test_tags() {
        assert_eq!(FieldValue::from("x").tag(), "text");
        assert_eq!(FieldValue::from(1i64).tag(), "integer");
        assert_eq!(FieldValue::from(1.5f64).tag(), "float");
        assert_eq!(FieldValue::from(true).tag(), "boolean");
        assert_eq!(FieldValue::timestamp(Utc::now()).tag(), "timestamp");
        assert_eq!(FieldValue::from(LogPointer::new(0, 1)).tag(), "pointer");
    }

    #[test]
    fn test_bag_is_ordered() {
        let mut bag = FieldBag::new();
        bag.insert("z".to_string(), FieldValue::from(1i64));
        bag.insert("a".to_string(), FieldValue::from(2i64));
        let keys: Vec<_> = bag.keys().cloned().collect();
        assert_eq!(keys, vec!["a", "z"]);
    }
}
