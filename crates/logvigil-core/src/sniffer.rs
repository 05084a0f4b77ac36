//! Sniffer and log source references
//!
//! Sniffers and log sources are owned by the configuration layer; the
//! persistence core only references them by id and resolves metadata
//! through the collaborator traits in [`crate::registry`].

use serde::{Deserialize, Serialize};

/// Identifier of a configured sniffer
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct SnifferId(pub u64);

impl std::fmt::Display for SnifferId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a log source
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct SourceId(pub u64);

impl std::fmt::Display for SourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A configured detection job scanning one log source for matches
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sniffer {
    /// Sniffer id
    pub id: SnifferId,
    /// The log source this sniffer scans
    pub source_id: SourceId,
    /// Human-readable name
    pub name: String,
}

impl Sniffer {
    /// Create a sniffer reference
    pub fn new(id: SnifferId, source_id: SourceId) -> Self {
        Self {
            id,
            source_id,
            name: String::new(),
        }
    }

    /// Set the name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

/// The origin of raw log content a sniffer scans
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogSource {
    /// Source id
    pub id: SourceId,
    /// Human-readable name
    pub name: String,
}

impl LogSource {
    /// Create a log source reference
    pub fn new(id: SourceId) -> Self {
        Self {
            id,
            name: String::new(),
        }
    }

    /// Set the name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sniffer_builder() {
        let sniffer = Sniffer::new(SnifferId(1), SourceId(2)).with_name("errors");
        assert_eq!(sniffer.id, SnifferId(1));
        assert_eq!(sniffer.source_id, SourceId(2));
        assert_eq!(sniffer.name, "errors");
    }

    #[test]
    fn test_id_display() {
        assert_eq!(SnifferId(7).to_string(), "7");
        assert_eq!(SourceId(3).to_string(), "3");
    }
}
