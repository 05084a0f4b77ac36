//! Scoped cluster access
//!
//! [`IndexCluster`] is the sole owner of backend session acquisition. A
//! [`Session`] holds one pooled permit and the backend handle; the permit
//! is returned when the session is dropped, which covers success, error,
//! and cancellation paths alike.

use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::trace;

use crate::{IndexError, SearchIndex};

/// Configuration for cluster access
#[derive(Debug, Clone)]
pub struct ClusterConfig {
    /// Maximum number of concurrently open backend sessions
    pub max_sessions: usize,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self { max_sessions: 8 }
    }
}

impl ClusterConfig {
    /// Set the session pool bound
    pub fn with_max_sessions(mut self, max_sessions: usize) -> Self {
        self.max_sessions = max_sessions;
        self
    }
}

/// Pooled handle to a search backend.
///
/// Cloning is cheap; clones share the same backend and session pool.
#[derive(Clone)]
pub struct IndexCluster {
    backend: Arc<dyn SearchIndex>,
    sessions: Arc<Semaphore>,
}

impl IndexCluster {
    /// Create a cluster handle with the default configuration
    pub fn new(backend: Arc<dyn SearchIndex>) -> Self {
        Self::with_config(backend, ClusterConfig::default())
    }

    /// Create a cluster handle with an explicit configuration
    pub fn with_config(backend: Arc<dyn SearchIndex>, config: ClusterConfig) -> Self {
        Self {
            backend,
            sessions: Arc::new(Semaphore::new(config.max_sessions)),
        }
    }

    /// Number of sessions currently available in the pool
    pub fn available_sessions(&self) -> usize {
        self.sessions.available_permits()
    }

    /// Acquire a session scope.
    ///
    /// Waits until a pool permit is free. The permit is held for the
    /// lifetime of the returned [`Session`] and released on drop, so an
    /// abandoned caller never leaks a session.
    pub async fn session(&self) -> Result<Session, IndexError> {
        let permit = self
            .sessions
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| IndexError::Unavailable("session pool closed".to_string()))?;
        trace!(available = self.sessions.available_permits(), "Acquired index session");
        Ok(Session {
            backend: self.backend.clone(),
            _permit: permit,
        })
    }
}

impl std::fmt::Debug for IndexCluster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexCluster")
            .field("available_sessions", &self.sessions.available_permits())
            .finish()
    }
}

/// One scoped backend session.
///
/// Holds a pool permit until dropped.
pub struct Session {
    backend: Arc<dyn SearchIndex>,
    _permit: OwnedSemaphorePermit,
}

impl Session {
    /// The backend this session talks to
    pub fn backend(&self) -> &dyn SearchIndex {
        self.backend.as_ref()
    }
}

impl std::ops::Deref for Session {
    type Target = dyn SearchIndex;

    fn deref(&self) -> &Self::Target {
        self.backend.as_ref()
    }
}
