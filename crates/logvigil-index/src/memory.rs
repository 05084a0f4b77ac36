//! In-memory search index
//!
//! [`InMemoryIndex`] implements [`SearchIndex`] entirely in process while
//! reproducing the visibility semantics of a near-real-time backend:
//! acknowledged writes are pending until [`SearchIndex::refresh`] makes
//! them searchable, but point lookups see them immediately. Used for
//! testing and embedding.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;
use tracing::{debug, trace};

use crate::{Document, IndexError, SearchIndex, SearchPage, SearchQuery, SortOrder};

#[derive(Debug, Clone)]
struct StoredDoc {
    body: Value,
    /// Whether the document has been made visible to searches
    visible: bool,
}

/// In-memory implementation of [`SearchIndex`]
///
/// Uses a `DashMap` of index name to document shard for concurrent access.
#[derive(Debug, Default)]
pub struct InMemoryIndex {
    shards: DashMap<String, BTreeMap<String, StoredDoc>>,
}

impl InMemoryIndex {
    /// Create an empty backend
    pub fn new() -> Self {
        Self::default()
    }

    /// Names of the indices currently present
    pub fn index_names(&self) -> Vec<String> {
        self.shards.iter().map(|s| s.key().clone()).collect()
    }

    /// Number of documents in an index, pending writes included
    pub fn doc_count(&self, index: &str) -> usize {
        self.shards.get(index).map(|s| s.len()).unwrap_or(0)
    }
}

/// Order two JSON scalars for sorting. Non-scalar and mismatched values
/// compare equal, leaving the document id tiebreak to decide.
fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Less,
        (_, Value::Null) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}

#[async_trait]
impl SearchIndex for InMemoryIndex {
    async fn upsert(&self, index: &str, id: &str, body: Value) -> Result<(), IndexError> {
        trace!(index, doc = id, "Upserting document");
        self.shards.entry(index.to_string()).or_default().insert(
            id.to_string(),
            StoredDoc {
                body,
                visible: false,
            },
        );
        Ok(())
    }

    async fn get(&self, indices: &[String], id: &str) -> Result<Option<Document>, IndexError> {
        for index in indices {
            if let Some(shard) = self.shards.get(index)
                && let Some(doc) = shard.get(id)
            {
                // Point lookups observe acknowledged writes immediately,
                // refreshed or not.
                return Ok(Some(Document {
                    id: id.to_string(),
                    body: doc.body.clone(),
                }));
            }
        }
        Ok(None)
    }

    async fn search(
        &self,
        indices: &[String],
        query: &SearchQuery,
    ) -> Result<SearchPage, IndexError> {
        let mut matches: Vec<Document> = Vec::new();

        for index in indices {
            let Some(shard) = self.shards.get(index) else {
                continue;
            };
            for (id, doc) in shard.iter() {
                if !doc.visible {
                    continue;
                }
                let matched = match &query.term {
                    Some(term) => doc.body.get(&term.field) == Some(&term.value),
                    None => true,
                };
                if matched {
                    matches.push(Document {
                        id: id.clone(),
                        body: doc.body.clone(),
                    });
                }
            }
        }

        match &query.sort {
            Some(sort) => {
                let field = sort.field.clone();
                matches.sort_by(|a, b| {
                    let key_a = a.body.get(&field).unwrap_or(&Value::Null);
                    let key_b = b.body.get(&field).unwrap_or(&Value::Null);
                    let ord = compare_values(key_a, key_b).then_with(|| a.id.cmp(&b.id));
                    match sort.order {
                        SortOrder::Ascending => ord,
                        SortOrder::Descending => ord.reverse(),
                    }
                });
            }
            None => matches.sort_by(|a, b| a.id.cmp(&b.id)),
        }

        let total = matches.len() as u64;
        let hits: Vec<Document> = matches
            .into_iter()
            .skip(query.offset)
            .take(query.limit)
            .collect();

        trace!(
            indices = indices.len(),
            total,
            hits = hits.len(),
            "Executed search"
        );
        Ok(SearchPage { hits, total })
    }

    async fn delete(&self, index: &str, id: &str) -> Result<bool, IndexError> {
        let removed = match self.shards.get_mut(index) {
            Some(mut shard) => shard.remove(id).is_some(),
            None => false,
        };
        if removed {
            trace!(index, doc = id, "Deleted document");
        }
        Ok(removed)
    }

    async fn delete_index(&self, index: &str) -> Result<(), IndexError> {
        if self.shards.remove(index).is_some() {
            debug!(index, "Dropped index");
        }
        Ok(())
    }

    async fn refresh(&self, indices: &[String]) -> Result<(), IndexError> {
        for index in indices {
            if let Some(mut shard) = self.shards.get_mut(index) {
                for doc in shard.values_mut() {
                    doc.visible = true;
                }
            }
        }
        trace!(indices = indices.len(), "Refreshed indices");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::SortSpec;

    fn names(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[tokio::test]
    async fn test_get_sees_unrefreshed_write() {
        let index = InMemoryIndex::new();
        index.upsert("a", "1", json!({"k": "v"})).await.unwrap();

        let doc = index.get(&names(&["a"]), "1").await.unwrap();
        assert_eq!(doc.map(|d| d.body), Some(json!({"k": "v"})));
    }

    #[tokio::test]
    async fn test_search_sees_write_only_after_refresh() {
        let index = InMemoryIndex::new();
        index.upsert("a", "1", json!({"k": "v"})).await.unwrap();

        let page = index
            .search(&names(&["a"]), &SearchQuery::match_all())
            .await
            .unwrap();
        assert_eq!(page.total, 0);
        assert!(page.hits.is_empty());

        index.refresh(&names(&["a"])).await.unwrap();

        let page = index
            .search(&names(&["a"]), &SearchQuery::match_all())
            .await
            .unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.hits[0].id, "1");
    }

    #[tokio::test]
    async fn test_term_filter() {
        let index = InMemoryIndex::new();
        index.upsert("a", "1", json!({"owner": 7})).await.unwrap();
        index.upsert("a", "2", json!({"owner": 8})).await.unwrap();
        index.refresh(&names(&["a"])).await.unwrap();

        let page = index
            .search(
                &names(&["a"]),
                &SearchQuery::match_all().with_term("owner", json!(7)),
            )
            .await
            .unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.hits[0].id, "1");
    }

    #[tokio::test]
    async fn test_offset_past_end_keeps_total() {
        let index = InMemoryIndex::new();
        index.upsert("a", "1", json!({})).await.unwrap();
        index.refresh(&names(&["a"])).await.unwrap();

        let page = index
            .search(
                &names(&["a"]),
                &SearchQuery::match_all().with_offset(1).with_limit(10),
            )
            .await
            .unwrap();
        assert!(page.hits.is_empty());
        assert_eq!(page.total, 1);
    }

    #[tokio::test]
    async fn test_sort_descending_with_id_tiebreak() {
        let index = InMemoryIndex::new();
        index.upsert("a", "1", json!({"at": 100})).await.unwrap();
        index.upsert("a", "2", json!({"at": 300})).await.unwrap();
        index.upsert("a", "3", json!({"at": 100})).await.unwrap();
        index.refresh(&names(&["a"])).await.unwrap();

        let page = index
            .search(
                &names(&["a"]),
                &SearchQuery::match_all().with_sort(SortSpec::descending("at")),
            )
            .await
            .unwrap();
        let ids: Vec<_> = page.hits.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "3", "1"]);
    }

    #[tokio::test]
    async fn test_search_spans_multiple_indices() {
        let index = InMemoryIndex::new();
        index.upsert("a", "1", json!({"at": 1})).await.unwrap();
        index.upsert("b", "2", json!({"at": 2})).await.unwrap();
        index.refresh(&names(&["a", "b"])).await.unwrap();

        let page = index
            .search(&names(&["a", "b", "missing"]), &SearchQuery::match_all())
            .await
            .unwrap();
        assert_eq!(page.total, 2);
    }

    #[tokio::test]
    async fn test_delete_document_idempotent() {
        let index = InMemoryIndex::new();
        index.upsert("a", "1", json!({})).await.unwrap();

        assert!(index.delete("a", "1").await.unwrap());
        assert!(!index.delete("a", "1").await.unwrap());
        assert!(!index.delete("missing", "1").await.unwrap());

        assert!(index.get(&names(&["a"]), "1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_index_idempotent() {
        let index = InMemoryIndex::new();
        index.upsert("a", "1", json!({})).await.unwrap();

        index.delete_index("a").await.unwrap();
        index.delete_index("a").await.unwrap();
        assert_eq!(index.doc_count("a"), 0);
    }

    #[tokio::test]
    async fn test_get_checks_indices_in_order() {
        let index = InMemoryIndex::new();
        index.upsert("a", "1", json!({"from": "a"})).await.unwrap();
        index.upsert("b", "1", json!({"from": "b"})).await.unwrap();

        let doc = index.get(&names(&["b", "a"]), "1").await.unwrap().unwrap();
        assert_eq!(doc.body, json!({"from": "b"}));
    }
}
