//! Log entries
//!
//! A [`LogEntry`] is one unit of evidence inside a persisted event: the raw
//! log line(s) it was built from, the pointers bracketing it in the log
//! stream, and any fields the sniffing engine extracted from it.

use serde::{Deserialize, Serialize};

use crate::fields::{FieldBag, FieldValue};
use crate::pointer::LogPointer;

/// One unit of evidence within an event.
///
/// Entries are immutable once attached to a persisted event; their order
/// within the event is significant and preserved by the persistence layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Raw log content this entry was built from
    pub raw_content: String,
    /// Position of the entry start in the log stream
    pub start: LogPointer,
    /// Position just past the entry end in the log stream
    pub end: LogPointer,
    /// Extracted fields, keyed by field name
    #[serde(default)]
    pub fields: FieldBag,
}

impl LogEntry {
    /// Create an entry spanning the given pointer range
    pub fn new(raw_content: impl Into<String>, start: LogPointer, end: LogPointer) -> Self {
        Self {
            raw_content: raw_content.into(),
            start,
            end,
            fields: FieldBag::new(),
        }
    }

    /// Attach an extracted field
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Get an extracted field by name
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }
}
