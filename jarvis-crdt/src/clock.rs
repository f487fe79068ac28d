//! Replica clock for causality tracking.
//!
//! A replica clock (vector clock) tracks the highest version number seen
//! from each replica, enabling determination of causality (happens-before
//! relationships) between store states.
//!
//! Use cases:
//! - Detecting concurrent divergence between replicas
//! - Recording causal progress during merges
//! - Diagnostics (knowing how far behind a peer is)

use jarvis_types::ReplicaId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Causality relationship between two replica clocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CausalOrder {
    /// First clock happened before second.
    Before,
    /// First clock happened after second.
    After,
    /// Clocks are concurrent (neither happened before the other).
    Concurrent,
    /// Clocks are identical.
    Equal,
}

/// Per-replica version counters.
///
/// Each replica increments its own counter on every local write. Counters
/// are monotonically non-decreasing: [`observe`](Self::observe) only
/// raises, and [`merge`](Self::merge) takes the pointwise maximum.
///
/// Serializes as a plain `{ "<replica_id>": integer }` map, which is the
/// `vector_clock` field of the snapshot wire format.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReplicaClock {
    counters: HashMap<ReplicaId, u64>,
}

impl ReplicaClock {
    /// Creates a new empty clock.
    #[must_use]
    pub fn new() -> Self {
        Self {
            counters: HashMap::new(),
        }
    }

    /// Returns the version counter for a replica (0 if never seen).
    #[must_use]
    pub fn get(&self, replica_id: &ReplicaId) -> u64 {
        self.counters.get(replica_id).copied().unwrap_or(0)
    }

    /// Returns all replicas and their counters.
    pub fn iter(&self) -> impl Iterator<Item = (&ReplicaId, u64)> {
        self.counters.iter().map(|(id, &version)| (id, version))
    }

    /// Returns the number of replicas in the clock.
    #[must_use]
    pub fn len(&self) -> usize {
        self.counters.len()
    }

    /// Returns true if the clock has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counters.is_empty()
    }

    /// Increments the counter for a replica and returns the new value.
    ///
    /// Called when the replica performs a local write; the returned value
    /// is the version stamped on the written entry.
    pub fn increment(&mut self, replica_id: &ReplicaId) -> u64 {
        let entry = self.counters.entry(replica_id.clone()).or_insert(0);
        *entry += 1;
        *entry
    }

    /// Raises the counter for a replica to at least `version`.
    ///
    /// Lower values are ignored, preserving monotonicity.
    pub fn observe(&mut self, replica_id: &ReplicaId, version: u64) {
        let entry = self.counters.entry(replica_id.clone()).or_insert(0);
        if version > *entry {
            *entry = version;
        }
    }

    /// Merges another clock into this one.
    ///
    /// For each replica, takes the maximum of the two counters.
    /// This operation is commutative, associative, and idempotent.
    pub fn merge(&mut self, other: &Self) {
        for (replica_id, &version) in &other.counters {
            self.observe(replica_id, version);
        }
    }

    /// Creates a new clock that is the merge of this and another.
    #[must_use]
    pub fn merged(&self, other: &Self) -> Self {
        let mut result = self.clone();
        result.merge(other);
        result
    }

    /// Compares this clock with another to determine causal ordering.
    #[must_use]
    pub fn compare(&self, other: &Self) -> CausalOrder {
        let mut dominated_by_self = true; // self >= other for all replicas
        let mut dominated_by_other = true; // other >= self for all replicas

        let all_replicas: std::collections::HashSet<_> =
            self.counters.keys().chain(other.counters.keys()).collect();

        for replica_id in all_replicas {
            let self_version = self.get(replica_id);
            let other_version = other.get(replica_id);

            if self_version < other_version {
                dominated_by_self = false;
            }
            if other_version < self_version {
                dominated_by_other = false;
            }
        }

        match (dominated_by_self, dominated_by_other) {
            (true, true) => CausalOrder::Equal,
            (true, false) => CausalOrder::After,
            (false, true) => CausalOrder::Before,
            (false, false) => CausalOrder::Concurrent,
        }
    }

    /// Returns true if this clock is causally before the other.
    #[must_use]
    pub fn is_before(&self, other: &Self) -> bool {
        self.compare(other) == CausalOrder::Before
    }

    /// Returns true if this clock is causally after the other.
    #[must_use]
    pub fn is_after(&self, other: &Self) -> bool {
        self.compare(other) == CausalOrder::After
    }

    /// Returns true if this clock is concurrent with the other.
    #[must_use]
    pub fn is_concurrent(&self, other: &Self) -> bool {
        self.compare(other) == CausalOrder::Concurrent
    }

    /// Returns true if this clock dominates the other (is >= for all replicas).
    #[must_use]
    pub fn dominates(&self, other: &Self) -> bool {
        matches!(self.compare(other), CausalOrder::After | CausalOrder::Equal)
    }
}

impl PartialEq for ReplicaClock {
    fn eq(&self, other: &Self) -> bool {
        self.compare(other) == CausalOrder::Equal
    }
}

impl Eq for ReplicaClock {}
