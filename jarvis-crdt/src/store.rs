//! The store engine: local writes, tombstone deletes, snapshot merges.

use crate::clock::ReplicaClock;
use crate::entry::VersionedEntry;
use crate::oplog::{OpKind, OpRecord, OperationLog};
use crate::snapshot::Snapshot;
use jarvis_types::{ReplicaId, Timestamp};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};

/// Default retention for the operation log.
pub const DEFAULT_OP_LOG_CAPACITY: usize = 1024;

/// Configuration for a [`CrdtStore`].
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Maximum operation-log records retained before eviction.
    pub op_log_capacity: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            op_log_capacity: DEFAULT_OP_LOG_CAPACITY,
        }
    }
}

/// Result of a read that distinguishes deletion from absence.
///
/// [`CrdtStore::get`] collapses both to `None`; this is the explicit
/// alternative for callers that care.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Lookup<'a> {
    /// The key holds a live value.
    Found(&'a Value),
    /// The key was deleted (a tombstone is present).
    Deleted,
    /// The key was never set.
    NotFound,
}

/// Outcome counts from folding one peer snapshot into the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergeSummary {
    /// The replica whose snapshot was merged.
    pub peer_node_id: ReplicaId,
    /// Keys that were new locally and inserted as-is.
    pub updates_applied: usize,
    /// Keys where the peer's entry won over an existing local entry.
    pub conflicts_resolved: usize,
    /// Peer entries rejected by validation and ignored.
    pub entries_skipped: usize,
}

/// Read-only diagnostic snapshot of the store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoreStatus {
    /// This replica's identity.
    pub node_id: ReplicaId,
    /// Number of stored entries. Counts tombstones, unlike
    /// [`CrdtStore::list_keys`].
    pub data_items: usize,
    /// Lifetime count of local operations.
    pub operation_count: u64,
    /// Number of replicas merged from so far.
    pub peer_count: usize,
    /// Number of replicas tracked by the clock.
    pub vector_clock_size: usize,
    /// The most recent retained local operation.
    pub last_operation: Option<OpRecord>,
}

/// A last-writer-wins replicated key-value store.
///
/// Each store instance is one replica, identified by its `node_id`.
/// Local writes apply immediately; replicas reconcile divergence by
/// exchanging [`Snapshot`]s and calling [`merge`](Self::merge), which
/// resolves every conflicting key deterministically (greater timestamp
/// wins, ties broken by lexically greater replica id).
///
/// The store has no internal synchronization: all mutation goes through
/// `&mut self`, so exclusive access is enforced at compile time. A
/// multi-threaded embedding wraps the store in its own `Mutex`.
#[derive(Debug, Clone)]
pub struct CrdtStore {
    node_id: ReplicaId,
    data: HashMap<String, VersionedEntry>,
    clock: ReplicaClock,
    log: OperationLog,
    known_peers: HashSet<ReplicaId>,
}

impl CrdtStore {
    /// Creates a store for the given replica with default configuration.
    #[must_use]
    pub fn new(node_id: ReplicaId) -> Self {
        Self::with_config(node_id, StoreConfig::default())
    }

    /// Creates a store for the given replica with explicit configuration.
    #[must_use]
    pub fn with_config(node_id: ReplicaId, config: StoreConfig) -> Self {
        Self {
            node_id,
            data: HashMap::new(),
            clock: ReplicaClock::new(),
            log: OperationLog::with_capacity(config.op_log_capacity),
            known_peers: HashSet::new(),
        }
    }

    /// Creates a store with a generated replica id and default configuration.
    #[must_use]
    pub fn generate() -> Self {
        Self::new(ReplicaId::generate())
    }

    /// Returns this replica's identity.
    #[must_use]
    pub fn node_id(&self) -> &ReplicaId {
        &self.node_id
    }

    /// Returns the replica clock.
    #[must_use]
    pub fn clock(&self) -> &ReplicaClock {
        &self.clock
    }

    /// Returns the operation log.
    #[must_use]
    pub fn log(&self) -> &OperationLog {
        &self.log
    }

    /// Returns the replicas this store has merged from.
    #[must_use]
    pub fn known_peers(&self) -> &HashSet<ReplicaId> {
        &self.known_peers
    }

    /// Returns the number of stored entries, tombstones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if nothing has ever been stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Writes a value under a key.
    ///
    /// Returns whether the write became the visible value: `true` on a
    /// fresh key or when the new entry wins the conflict comparison,
    /// `false` when an existing entry supersedes it (possible after
    /// merging a peer write with a later timestamp). The operation is
    /// logged either way.
    pub fn set(&mut self, key: impl Into<String>, value: Value) -> bool {
        self.set_with_metadata(key, value, Map::new())
    }

    /// Writes a value with caller-supplied metadata.
    ///
    /// Same visibility semantics as [`set`](Self::set).
    pub fn set_with_metadata(
        &mut self,
        key: impl Into<String>,
        value: Value,
        metadata: Map<String, Value>,
    ) -> bool {
        let timestamp = Timestamp::now();
        let version = self.clock.increment(&self.node_id);
        let entry = VersionedEntry::new(
            self.node_id.clone(),
            timestamp,
            value,
            version,
            metadata,
        );
        self.apply_local(key.into(), entry, OpKind::Set)
    }

    /// Returns the live value for a key.
    ///
    /// `None` for keys never set AND for deleted keys (a tombstone's
    /// value is null). Use [`lookup`](Self::lookup) to tell them apart.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self.lookup(key) {
            Lookup::Found(value) => Some(value),
            Lookup::Deleted | Lookup::NotFound => None,
        }
    }

    /// Returns the state of a key, distinguishing deleted from never-set.
    #[must_use]
    pub fn lookup(&self, key: &str) -> Lookup<'_> {
        match self.data.get(key) {
            None => Lookup::NotFound,
            Some(entry) if entry.is_tombstone() => Lookup::Deleted,
            Some(entry) => Lookup::Found(&entry.value),
        }
    }

    /// Returns the full entry for a key, tombstones included.
    #[must_use]
    pub fn entry(&self, key: &str) -> Option<&VersionedEntry> {
        self.data.get(key)
    }

    /// Deletes a key by writing a tombstone.
    ///
    /// The tombstone flows through the same conflict resolution as a
    /// write, so the deletion propagates to peers and beats stale
    /// concurrent updates. Returns `true` if a tombstone was written,
    /// `false` if the key was never present (already-deleted keys are
    /// tombstoned again with a fresh timestamp).
    pub fn delete(&mut self, key: &str) -> bool {
        if !self.data.contains_key(key) {
            return false;
        }
        let timestamp = Timestamp::now();
        let version = self.clock.increment(&self.node_id);
        let entry = VersionedEntry::tombstone(self.node_id.clone(), timestamp, version);
        self.apply_local(key.to_owned(), entry, OpKind::Delete);
        true
    }

    /// Folds a peer snapshot into this store.
    ///
    /// Records the peer, raises the clock to the pointwise maximum, then
    /// decides each key on the two candidate entries alone: new keys are
    /// inserted, existing keys keep whichever entry supersedes the other.
    /// Peer entries failing validation (version 0) are skipped and
    /// counted, never applied.
    ///
    /// Merging is commutative and idempotent: the per-key outcome depends
    /// only on the candidates' (timestamp, replica id) pairs, so merge
    /// order and repetition cannot change the converged state.
    pub fn merge(&mut self, snapshot: &Snapshot) -> MergeSummary {
        self.known_peers.insert(snapshot.node_id.clone());
        self.clock.merge(&snapshot.vector_clock);

        let mut summary = MergeSummary {
            peer_node_id: snapshot.node_id.clone(),
            updates_applied: 0,
            conflicts_resolved: 0,
            entries_skipped: 0,
        };

        for (key, peer_entry) in &snapshot.data_store {
            if !peer_entry.is_well_formed() {
                summary.entries_skipped += 1;
                continue;
            }
            match self.data.get(key) {
                None => {
                    self.data.insert(key.clone(), peer_entry.clone());
                    summary.updates_applied += 1;
                }
                Some(local) if peer_entry.supersedes(local) => {
                    self.data.insert(key.clone(), peer_entry.clone());
                    summary.conflicts_resolved += 1;
                }
                Some(_) => {}
            }
        }

        summary
    }

    /// Exports the complete replica state as an owned value copy.
    ///
    /// Nothing in the returned snapshot aliases store internals.
    #[must_use]
    pub fn export_state(&self) -> Snapshot {
        let mut peers: Vec<ReplicaId> = self.known_peers.iter().cloned().collect();
        peers.sort();
        Snapshot {
            node_id: self.node_id.clone(),
            vector_clock: self.clock.clone(),
            data_store: self.data.clone(),
            operation_count: self.log.total_recorded(),
            peers,
            exported_at: Timestamp::now(),
        }
    }

    /// Returns all live keys, sorted.
    ///
    /// Tombstoned keys are excluded; [`status`](Self::status) counts them.
    #[must_use]
    pub fn list_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .data
            .iter()
            .filter(|(_, entry)| !entry.is_tombstone())
            .map(|(key, _)| key.clone())
            .collect();
        keys.sort();
        keys
    }

    /// Returns a diagnostic snapshot of the store.
    #[must_use]
    pub fn status(&self) -> StoreStatus {
        StoreStatus {
            node_id: self.node_id.clone(),
            data_items: self.data.len(),
            operation_count: self.log.total_recorded(),
            peer_count: self.known_peers.len(),
            vector_clock_size: self.clock.len(),
            last_operation: self.log.last().cloned(),
        }
    }

    /// Applies a locally created entry through the conflict comparison
    /// and logs the operation. Returns whether the entry became visible.
    fn apply_local(&mut self, key: String, entry: VersionedEntry, op: OpKind) -> bool {
        self.log.push(OpRecord {
            op,
            key: key.clone(),
            value: entry.value.clone(),
            timestamp: entry.timestamp,
            node_id: entry.node_id.clone(),
            version: entry.version,
        });

        match self.data.get(&key) {
            Some(existing) if existing.supersedes(&entry) => false,
            _ => {
                self.data.insert(key, entry);
                true
            }
        }
    }
}
