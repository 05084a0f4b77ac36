//! # Logvigil Index
//!
//! Search index transport for logvigil.
//!
//! This crate is the thin access layer between the event persistence
//! subsystem and a document-oriented, near-real-time search backend. It
//! owns no domain knowledge: documents are opaque JSON bodies, indices are
//! names, and the consistency contract is the backend's.
//!
//! ## Key pieces
//!
//! - [`SearchIndex`]: the primitive operation set every backend implements
//! - [`IndexCluster`]: session-scoped execution over a pooled backend handle
//! - [`InMemoryIndex`]: in-process backend with the same visibility
//!   semantics as a real near-real-time index (pending writes are invisible
//!   to search until [`SearchIndex::refresh`], point gets see them
//!   immediately)
//!
//! ## Consistency contract
//!
//! [`SearchIndex::get`] observes a write as soon as the backend has
//! acknowledged it. [`SearchIndex::search`] observes it only after a
//! refresh of the index it landed in. Callers that need fresh search
//! results after a write must refresh explicitly; the transport never does
//! it implicitly.

pub mod cluster;
pub mod error;
pub mod memory;

pub use cluster::{ClusterConfig, IndexCluster, Session};
pub use error::IndexError;
pub use memory::InMemoryIndex;

use async_trait::async_trait;
use serde_json::Value;

/// A stored document: backend-assigned id plus opaque JSON body
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Document id, unique within its index
    pub id: String,
    /// Opaque JSON body
    pub body: Value,
}

/// Sort direction for search results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// Sort specification: a top-level document field plus direction.
///
/// Documents tied on the sort field are ordered by document id in the same
/// direction, so result order is deterministic for a fixed backend state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    /// Top-level field to sort on
    pub field: String,
    /// Sort direction
    pub order: SortOrder,
}

impl SortSpec {
    /// Sort ascending on a field
    pub fn ascending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            order: SortOrder::Ascending,
        }
    }

    /// Sort descending on a field
    pub fn descending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            order: SortOrder::Descending,
        }
    }
}

/// Exact-match filter on a top-level document field
#[derive(Debug, Clone, PartialEq)]
pub struct TermFilter {
    /// Top-level field to match
    pub field: String,
    /// Value the field must equal
    pub value: Value,
}

/// A bounded, filtered, sorted search request
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    /// Optional exact-match filter; `None` matches every document
    pub term: Option<TermFilter>,
    /// Optional sort; unsorted requests are ordered by document id
    pub sort: Option<SortSpec>,
    /// Number of matches to skip
    pub offset: usize,
    /// Maximum number of hits to return
    pub limit: usize,
}

impl SearchQuery {
    /// Match every document, no window
    pub fn match_all() -> Self {
        Self {
            term: None,
            sort: None,
            offset: 0,
            limit: usize::MAX,
        }
    }

    /// Restrict to documents whose `field` equals `value`
    pub fn with_term(mut self, field: impl Into<String>, value: Value) -> Self {
        self.term = Some(TermFilter {
            field: field.into(),
            value,
        });
        self
    }

    /// Set the sort specification
    pub fn with_sort(mut self, sort: SortSpec) -> Self {
        self.sort = Some(sort);
        self
    }

    /// Skip the first `offset` matches
    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    /// Return at most `limit` hits
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }
}

/// One page of search hits plus the total match count.
///
/// `total` counts every match for the filter regardless of the
/// offset/limit window, so a window past the end yields an empty `hits`
/// with the true `total`.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchPage {
    /// Hits inside the requested window, in query order
    pub hits: Vec<Document>,
    /// Total number of matches for the filter
    pub total: u64,
}

/// Primitive operation set of a document-oriented search backend.
///
/// Implementations must uphold the crate-level consistency contract:
/// acknowledged writes are immediately visible to [`get`](Self::get) and
/// become visible to [`search`](Self::search) only after
/// [`refresh`](Self::refresh).
#[async_trait]
pub trait SearchIndex: Send + Sync {
    /// Create or replace a document in an index.
    ///
    /// The index is created implicitly if it does not exist.
    async fn upsert(&self, index: &str, id: &str, body: Value) -> Result<(), IndexError>;

    /// Point lookup of a document by id across a set of indices.
    ///
    /// Indices that do not exist are skipped. Returns `Ok(None)` when no
    /// index holds the document.
    async fn get(&self, indices: &[String], id: &str) -> Result<Option<Document>, IndexError>;

    /// Search a set of indices, returning one result page plus the total
    /// match count. Indices that do not exist contribute no matches.
    async fn search(&self, indices: &[String], query: &SearchQuery)
    -> Result<SearchPage, IndexError>;

    /// Delete a document by id. Returns whether a document was removed;
    /// deleting an absent document is not an error.
    async fn delete(&self, index: &str, id: &str) -> Result<bool, IndexError>;

    /// Drop an entire index with all its documents. Dropping an absent
    /// index is a silent no-op.
    async fn delete_index(&self, index: &str) -> Result<(), IndexError>;

    /// Make all pending writes in the given indices visible to subsequent
    /// searches. Absent indices are skipped.
    async fn refresh(&self, indices: &[String]) -> Result<(), IndexError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    /// The SearchIndex trait must stay object-safe
    fn _assert_object_safe(_: &dyn SearchIndex) {}

    #[test]
    fn test_query_builder() {
        let query = SearchQuery::match_all()
            .with_term("snifferId", serde_json::json!(7))
            .with_sort(SortSpec::descending("published"))
            .with_offset(10)
            .with_limit(25);

        assert_eq!(query.offset, 10);
        assert_eq!(query.limit, 25);
        assert_eq!(query.term.as_ref().map(|t| t.field.as_str()), Some("snifferId"));
        assert_eq!(query.sort, Some(SortSpec::descending("published")));
    }
}
