//! Persisted events
//!
//! An [`Event`] records one match a sniffer detected while scanning a log
//! source. It is created exactly once per detected match, gets its id
//! assigned by the persistence layer, and is never mutated afterwards
//! except by deletion.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entry::LogEntry;
use crate::fields::{FieldBag, FieldValue};
use crate::sniffer::{SnifferId, SourceId};

/// Identifier of a persisted event, assigned at persist time
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EventId(pub String);

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for EventId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// A persisted record of one detected match.
///
/// The ordered entry list is the evidence the match was built from; the
/// open field bag carries match-level data independent of any single entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Id assigned by the persistence layer, `None` until persisted
    pub id: Option<EventId>,
    /// The sniffer that detected the match
    pub sniffer_id: SnifferId,
    /// The log source the sniffer was scanning
    pub source_id: SourceId,
    /// Path of the concrete log the match came from
    pub log_path: String,
    /// When the event was published, millisecond precision
    pub published: DateTime<Utc>,
    /// Ordered evidence entries; order is preserved exactly
    pub entries: Vec<LogEntry>,
    /// Match-level fields, keyed by field name
    #[serde(default)]
    pub fields: FieldBag,
}

impl Event {
    /// Create an unpersisted event for the given sniffer and source
    pub fn new(sniffer_id: SnifferId, source_id: SourceId, log_path: impl Into<String>) -> Self {
        Self {
            id: None,
            sniffer_id,
            source_id,
            log_path: log_path.into(),
            published: Utc::now(),
            entries: Vec::new(),
            fields: FieldBag::new(),
        }
    }

    /// Set the publication timestamp
    pub fn with_published(mut self, published: DateTime<Utc>) -> Self {
        self.published = published;
        self
    }

    /// Append an evidence entry
    pub fn with_entry(mut self, entry: LogEntry) -> Self {
        self.entries.push(entry);
        self
    }

    /// Attach a match-level field
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Get a match-level field by name
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }
}
