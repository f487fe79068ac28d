//! Versioned entries and the last-writer-wins comparator.
//!
//! Every stored value, including deletions, is a [`VersionedEntry`].
//! Deletions are tombstones: ordinary entries with a null value and a
//! `deleted` metadata marker, so they flow through the same conflict
//! resolution as writes and a later delete beats a stale concurrent
//! update.

use jarvis_types::{ReplicaId, Timestamp};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::cmp::Ordering;

/// Metadata key marking an entry as a tombstone.
pub const META_DELETED: &str = "deleted";

/// Metadata key carrying the deletion wall-clock time.
pub const META_DELETED_AT: &str = "deleted_at";

/// One stored value together with the provenance of its last write.
///
/// Field names match the snapshot wire format: peers in other languages
/// deserialize these objects directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionedEntry {
    /// Replica that performed the write.
    pub node_id: ReplicaId,
    /// Wall-clock time of the write.
    pub timestamp: Timestamp,
    /// The written value; null for tombstones.
    pub value: Value,
    /// Per-replica version counter at write time, starting at 1.
    pub version: u64,
    /// Free-form metadata; carries the tombstone markers.
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl VersionedEntry {
    /// Creates an entry for a regular write.
    #[must_use]
    pub fn new(
        node_id: ReplicaId,
        timestamp: Timestamp,
        value: Value,
        version: u64,
        metadata: Map<String, Value>,
    ) -> Self {
        Self {
            node_id,
            timestamp,
            value,
            version,
            metadata,
        }
    }

    /// Creates a tombstone entry marking a deletion at `timestamp`.
    #[must_use]
    pub fn tombstone(node_id: ReplicaId, timestamp: Timestamp, version: u64) -> Self {
        let mut metadata = Map::new();
        metadata.insert(META_DELETED.to_owned(), Value::Bool(true));
        metadata.insert(META_DELETED_AT.to_owned(), Value::from(timestamp.as_secs()));
        Self {
            node_id,
            timestamp,
            value: Value::Null,
            version,
            metadata,
        }
    }

    /// Returns true if this entry is a logical deletion.
    #[must_use]
    pub fn is_tombstone(&self) -> bool {
        self.value.is_null()
            && self
                .metadata
                .get(META_DELETED)
                .and_then(Value::as_bool)
                .unwrap_or(false)
    }

    /// The LWW comparator: returns true if this entry wins over `other`.
    ///
    /// Greater timestamp wins; on a timestamp tie the lexically greater
    /// replica id wins. Over entries with distinct (timestamp, node_id)
    /// pairs this is a strict total order, which is what makes merging
    /// commutative and order-independent.
    #[must_use]
    pub fn supersedes(&self, other: &Self) -> bool {
        match self.timestamp.cmp(&other.timestamp) {
            Ordering::Greater => true,
            Ordering::Less => false,
            Ordering::Equal => self.node_id > other.node_id,
        }
    }

    /// Defensive validity check applied to entries arriving in peer
    /// snapshots. Versions start at 1; a zero version means the sender
    /// never incremented its clock for this write.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        self.version >= 1
    }
}
