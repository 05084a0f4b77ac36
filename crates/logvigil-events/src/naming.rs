//! Index naming strategy
//!
//! Each sniffer writes to exactly one *active* index and reads across its
//! full set of *retrieval* indices. When a sniffer's configuration changes
//! in a way that invalidates its index layout, the strategy rotates to a
//! fresh physical index; older generations stay in the retrieval set so
//! previously persisted events remain queryable without a migration step.

use dashmap::DashMap;
use tracing::info;

use logvigil_core::SnifferId;

/// Per-sniffer index naming.
///
/// `active_name` is the single write target; `retrieval_names` is the
/// non-empty set of read targets and always contains the active name.
/// Both must be pure functions of the sniffer id and the strategy's
/// current configuration, never of call order.
pub trait IndexNaming: Send + Sync {
    /// Name of the index new events for this sniffer are written to
    fn active_name(&self, sniffer: SnifferId) -> String;

    /// All index names to search for this sniffer's events, newest
    /// generation first. Callers must not rely on the ordering for
    /// correctness; results are filtered by sniffer id regardless.
    fn retrieval_names(&self, sniffer: SnifferId) -> Vec<String>;
}

/// Default naming strategy with generation-based rotation.
///
/// Index names have the form `{prefix}-{sniffer_id}-{generation}`. A
/// rotation bumps the generation counter: the active name moves to the new
/// generation while every older generation remains a retrieval name.
#[derive(Debug)]
pub struct RotatingIndexNaming {
    prefix: String,
    generations: DashMap<SnifferId, u32>,
}

impl Default for RotatingIndexNaming {
    fn default() -> Self {
        Self::new()
    }
}

impl RotatingIndexNaming {
    /// Create a strategy with the default `vigil` prefix
    pub fn new() -> Self {
        Self::with_prefix("vigil")
    }

    /// Create a strategy with a custom index name prefix
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            generations: DashMap::new(),
        }
    }

    /// Current generation for a sniffer (0 before any rotation)
    pub fn generation(&self, sniffer: SnifferId) -> u32 {
        self.generations.get(&sniffer).map(|g| *g).unwrap_or(0)
    }

    /// Rotate the sniffer to a fresh physical index.
    ///
    /// Returns the new active name. Existing indices are not touched;
    /// they simply age into retrieval-only generations.
    pub fn rotate(&self, sniffer: SnifferId) -> String {
        let mut entry = self.generations.entry(sniffer).or_insert(0);
        *entry += 1;
        let generation = *entry;
        drop(entry);

        let active = self.name_for(sniffer, generation);
        info!(sniffer = %sniffer, generation, index = %active, "Rotated active index");
        active
    }

    fn name_for(&self, sniffer: SnifferId, generation: u32) -> String {
        format!("{}-{}-{}", self.prefix, sniffer, generation)
    }
}

impl IndexNaming for RotatingIndexNaming {
    fn active_name(&self, sniffer: SnifferId) -> String {
        self.name_for(sniffer, self.generation(sniffer))
    }

    fn retrieval_names(&self, sniffer: SnifferId) -> Vec<String> {
        (0..=self.generation(sniffer))
            .rev()
            .map(|generation| self.name_for(sniffer, generation))
            .collect()
    }
}
