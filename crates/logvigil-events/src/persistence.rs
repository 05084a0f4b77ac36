//! Event persistence façade
//!
//! [`EventPersistence`] is the public API of the subsystem: persist,
//! point lookup, paginated query, delete by id, and bulk cleanup of a
//! sniffer's events. All collaborators are supplied at construction time.
//!
//! Writes target the sniffer's active index; reads span its retrieval
//! index set. A persisted event is immediately visible to
//! [`event`](EventPersistence::event) but becomes visible to
//! [`events`](EventPersistence::events) queries only after
//! [`make_visible`](EventPersistence::make_visible) (or a backend-side
//! refresh) — forcing visibility on every write would defeat the
//! backend's batching, so it is the caller's call to make.

use std::sync::Arc;

use serde_json::json;
use tracing::{debug, info, warn};
use uuid::Uuid;

use logvigil_core::{Event, EventId, SnifferId, SnifferRegistry, SourceProvider};
use logvigil_index::{IndexCluster, IndexError, SearchQuery, SortSpec};

use crate::convert::{EventDocMapper, FIELD_PUBLISHED, FIELD_SNIFFER_ID};
use crate::error::PersistenceError;
use crate::naming::IndexNaming;
use crate::query::{EventPage, EventQueryBuilder};

/// Persists, queries, and purges sniffer events against a search backend
pub struct EventPersistence {
    cluster: IndexCluster,
    naming: Arc<dyn IndexNaming>,
    mapper: EventDocMapper,
    sniffers: Arc<dyn SnifferRegistry>,
    sources: Arc<dyn SourceProvider>,
}

impl EventPersistence {
    /// Create a façade over the given cluster and collaborators
    pub fn new(
        cluster: IndexCluster,
        naming: Arc<dyn IndexNaming>,
        sniffers: Arc<dyn SnifferRegistry>,
        sources: Arc<dyn SourceProvider>,
    ) -> Self {
        Self {
            cluster,
            naming,
            mapper: EventDocMapper::new(),
            sniffers,
            sources,
        }
    }

    /// Replace the default document mapper (custom codec registries)
    pub fn with_mapper(mut self, mapper: EventDocMapper) -> Self {
        self.mapper = mapper;
        self
    }

    /// Persist an event, assigning it a fresh id.
    ///
    /// The write goes to the sniffer's active index. It is immediately
    /// visible to [`event`](Self::event); search visibility follows the
    /// crate-level consistency contract. Persisting the same event value
    /// again stores a second copy under a new id.
    pub async fn persist(&self, event: &Event) -> Result<EventId, PersistenceError> {
        let id = EventId(Uuid::new_v4().to_string());
        let body = self.mapper.to_document(event)?;
        let active = self.naming.active_name(event.sniffer_id);

        let session = self.cluster.session().await?;
        session.upsert(&active, &id.0, body).await?;

        debug!(sniffer = %event.sniffer_id, event = %id, index = %active, "Persisted event");
        Ok(id)
    }

    /// Point lookup of an event by id, scoped to a sniffer.
    ///
    /// Returns `Ok(None)` when the event does not exist or belongs to a
    /// different sniffer; absence is never an error.
    pub async fn event(
        &self,
        sniffer: SnifferId,
        id: &EventId,
    ) -> Result<Option<Event>, PersistenceError> {
        let names = self.naming.retrieval_names(sniffer);
        let session = self.cluster.session().await?;

        match session.get(&names, &id.0).await? {
            Some(document) => {
                let event = self.mapper.from_document(&document)?;
                // Retrieval indices may be shared; the sniffer scope still
                // has to hold.
                if event.sniffer_id == sniffer {
                    Ok(Some(event))
                } else {
                    Ok(None)
                }
            }
            None => Ok(None),
        }
    }

    /// Start a paginated query over a sniffer's events
    pub fn events(&self, sniffer: SnifferId) -> EventQueryBuilder<'_> {
        EventQueryBuilder::new(self, sniffer)
    }

    /// Delete the listed events from the sniffer's indices.
    ///
    /// Each id is deleted independently; ids that do not exist are
    /// skipped without failing the batch.
    pub async fn delete(
        &self,
        sniffer: SnifferId,
        ids: &[EventId],
    ) -> Result<(), PersistenceError> {
        let names = self.naming.retrieval_names(sniffer);
        let session = self.cluster.session().await?;

        for id in ids {
            for name in &names {
                match session.delete(name, &id.0).await {
                    Ok(_) | Err(IndexError::NotFound(_)) => {}
                    Err(e) => return Err(e.into()),
                }
            }
        }

        debug!(sniffer = %sniffer, count = ids.len(), "Deleted events");
        Ok(())
    }

    /// Delete all events of a sniffer, dropping its index artifacts.
    ///
    /// The sniffer and its log source are resolved through the
    /// collaborators to establish the full cleanup scope; when either is
    /// already gone the cleanup degrades to dropping the index artifacts.
    /// Idempotent: repeating the call after the artifacts are gone
    /// succeeds silently.
    pub async fn delete_all(&self, sniffer: SnifferId) -> Result<(), PersistenceError> {
        match self.sniffers.sniffer(sniffer).await? {
            Some(meta) => {
                let source = self.sources.source_by_id(meta.source_id).await?;
                if source.is_none() {
                    warn!(sniffer = %sniffer, source = %meta.source_id,
                        "Log source no longer configured, cleaning index artifacts only");
                }
                info!(sniffer = %sniffer, source = %meta.source_id, "Deleting all events");
            }
            None => {
                warn!(sniffer = %sniffer,
                    "Sniffer no longer configured, cleaning index artifacts only");
            }
        }

        let names = self.naming.retrieval_names(sniffer);
        let session = self.cluster.session().await?;
        for name in &names {
            match session.delete_index(name).await {
                Ok(()) | Err(IndexError::NotFound(_)) => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    /// Make all pending writes for a sniffer visible to queries.
    ///
    /// This is the explicit visibility step of the consistency contract;
    /// it is deliberately not part of [`persist`](Self::persist).
    pub async fn make_visible(&self, sniffer: SnifferId) -> Result<(), PersistenceError> {
        let names = self.naming.retrieval_names(sniffer);
        let session = self.cluster.session().await?;
        session.refresh(&names).await?;
        Ok(())
    }

    pub(crate) async fn fetch_page(
        &self,
        sniffer: SnifferId,
        offset: usize,
        limit: usize,
    ) -> Result<EventPage, PersistenceError> {
        let names = self.naming.retrieval_names(sniffer);
        let query = SearchQuery::match_all()
            .with_term(FIELD_SNIFFER_ID, json!(sniffer.0))
            .with_sort(SortSpec::descending(FIELD_PUBLISHED))
            .with_offset(offset)
            .with_limit(limit);

        let session = self.cluster.session().await?;
        let page = session.search(&names, &query).await?;

        let items = page
            .hits
            .iter()
            .map(|hit| self.mapper.from_document(hit))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(EventPage {
            items,
            total: page.total,
        })
    }
}

impl std::fmt::Debug for EventPersistence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventPersistence")
            .field("cluster", &self.cluster)
            .finish()
    }
}
