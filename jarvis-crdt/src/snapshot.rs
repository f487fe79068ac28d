//! Full-state snapshot exchanged between replicas.
//!
//! The snapshot is the interoperability contract: two independently
//! implemented replicas (even in different languages) agree on exactly
//! this JSON shape. Field names here ARE the wire format; renaming one
//! is a protocol break.

use crate::clock::ReplicaClock;
use crate::entry::VersionedEntry;
use jarvis_types::{ReplicaId, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A value copy of one replica's complete state.
///
/// Produced by [`CrdtStore::export_state`](crate::CrdtStore::export_state)
/// and consumed by [`CrdtStore::merge`](crate::CrdtStore::merge). Owns all
/// of its data; mutating a snapshot never touches the store it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// The exporting replica.
    pub node_id: ReplicaId,
    /// The exporting replica's version counters.
    pub vector_clock: ReplicaClock,
    /// Every stored entry, tombstones included.
    pub data_store: HashMap<String, VersionedEntry>,
    /// Lifetime operation count at export time.
    pub operation_count: u64,
    /// Replicas the exporter has merged from.
    pub peers: Vec<ReplicaId>,
    /// Wall-clock time of the export.
    pub exported_at: Timestamp,
}

impl Snapshot {
    /// Returns the entry for a key, if present (tombstones included).
    #[must_use]
    pub fn entry(&self, key: &str) -> Option<&VersionedEntry> {
        self.data_store.get(key)
    }

    /// Returns the number of entries, tombstones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data_store.len()
    }

    /// Returns true if the snapshot carries no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data_store.is_empty()
    }
}
