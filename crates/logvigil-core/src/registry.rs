//! Sniffer and log-source collaborators
//!
//! The persistence core does not own sniffer or log-source metadata; it
//! resolves both through these traits when a cleanup operation needs the
//! full scope of a sniffer. Implementations are supplied at construction
//! time, so tests can substitute the in-memory fakes below without a
//! container.

use std::sync::Mutex;

use async_trait::async_trait;
use dashmap::DashMap;

use crate::error::LookupError;
use crate::sniffer::{LogSource, Sniffer, SnifferId, SourceId};

/// Lookup of sniffer metadata by id
#[async_trait]
pub trait SnifferRegistry: Send + Sync {
    /// Get a sniffer by id, `None` if it is not configured
    async fn sniffer(&self, id: SnifferId) -> Result<Option<Sniffer>, LookupError>;
}

/// Lookup of log-source metadata by id
#[async_trait]
pub trait SourceProvider: Send + Sync {
    /// Get a log source by id, `None` if it is not configured
    async fn source_by_id(&self, id: SourceId) -> Result<Option<LogSource>, LookupError>;
}

/// In-memory sniffer registry for tests and embedding.
///
/// Records every lookup so tests can assert which sniffers were resolved.
#[derive(Debug, Default)]
pub struct StaticSnifferRegistry {
    sniffers: DashMap<SnifferId, Sniffer>,
    lookups: Mutex<Vec<SnifferId>>,
}

impl StaticSnifferRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a sniffer
    pub fn insert(&self, sniffer: Sniffer) {
        self.sniffers.insert(sniffer.id, sniffer);
    }

    /// Ids looked up so far, in call order
    pub fn recorded_lookups(&self) -> Vec<SnifferId> {
        self.lookups.lock().map(|l| l.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl SnifferRegistry for StaticSnifferRegistry {
    async fn sniffer(&self, id: SnifferId) -> Result<Option<Sniffer>, LookupError> {
        if let Ok(mut lookups) = self.lookups.lock() {
            lookups.push(id);
        }
        Ok(self.sniffers.get(&id).map(|s| s.clone()))
    }
}

/// In-memory log-source provider for tests and embedding.
///
/// Records every lookup so tests can assert which sources were resolved.
#[derive(Debug, Default)]
pub struct StaticSourceProvider {
    sources: DashMap<SourceId, LogSource>,
    lookups: Mutex<Vec<SourceId>>,
}

impl StaticSourceProvider {
    /// Create an empty provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a log source
    pub fn insert(&self, source: LogSource) {
        self.sources.insert(source.id, source);
    }

    /// Ids looked up so far, in call order
    pub fn recorded_lookups(&self) -> Vec<SourceId> {
        self.lookups.lock().map(|l| l.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl SourceProvider for StaticSourceProvider {
    async fn source_by_id(&self, id: SourceId) -> Result<Option<LogSource>, LookupError> {
        if let Ok(mut lookups) = self.lookups.lock() {
            lookups.push(id);
        }
        Ok(self.sources.get(&id).map(|s| s.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_registry_lookup() {
        let registry = StaticSnifferRegistry::new();
        registry.insert(Sniffer::new(SnifferId(1), SourceId(9)));

        let found = registry.sniffer(SnifferId(1)).await.unwrap();
        assert_eq!(found.map(|s| s.source_id), Some(SourceId(9)));

        let missing = registry.sniffer(SnifferId(2)).await.unwrap();
        assert!(missing.is_none());

        assert_eq!(registry.recorded_lookups(), vec![SnifferId(1), SnifferId(2)]);
    }

    #[tokio::test]
    async fn test_static_provider_lookup() {
        let provider = StaticSourceProvider::new();
        provider.insert(LogSource::new(SourceId(9)).with_name("syslog"));

        let found = provider.source_by_id(SourceId(9)).await.unwrap();
        assert_eq!(found.map(|s| s.name), Some("syslog".to_string()));
        assert_eq!(provider.recorded_lookups(), vec![SourceId(9)]);
    }
}
