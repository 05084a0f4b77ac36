//! Paginated event queries
//!
//! Queries are scoped to exactly one sniffer and span its full retrieval
//! index set. Results are ordered **newest first** (descending publication
//! time, ties broken by descending document id), so the order is
//! deterministic for a fixed backend state.

use logvigil_core::{Event, SnifferId};

use crate::error::PersistenceError;
use crate::persistence::EventPersistence;

/// One page of events plus the total match count.
///
/// `total` counts all events matching the sniffer filter regardless of the
/// offset/limit window: a window past the end yields empty `items` with
/// the true `total`.
#[derive(Debug, Clone, PartialEq)]
pub struct EventPage {
    /// Events inside the window, newest first
    pub items: Vec<Event>,
    /// Total number of matching events
    pub total: u64,
}

/// Builder for a bounded, sniffer-scoped event query
#[derive(Debug)]
pub struct EventQueryBuilder<'a> {
    persistence: &'a EventPersistence,
    sniffer: SnifferId,
    offset: usize,
    limit: usize,
}

impl<'a> EventQueryBuilder<'a> {
    pub(crate) fn new(persistence: &'a EventPersistence, sniffer: SnifferId) -> Self {
        Self {
            persistence,
            sniffer,
            offset: 0,
            limit: 10,
        }
    }

    /// Skip the first `offset` matches
    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    /// Return at most `limit` events (default 10)
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Execute the query, returning one page plus the total count.
    ///
    /// Issues a single search call; a backend failure surfaces as an
    /// error, never as a silently truncated page.
    pub async fn list(self) -> Result<EventPage, PersistenceError> {
        self.persistence
            .fetch_page(self.sniffer, self.offset, self.limit)
            .await
    }

    /// Execute the query for the total count only
    pub async fn count(self) -> Result<u64, PersistenceError> {
        let page = self
            .persistence
            .fetch_page(self.sniffer, 0, 0)
            .await?;
        Ok(page.total)
    }
}
