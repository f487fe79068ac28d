//! Sync engine — snapshot exchange logic without I/O.
//!
//! The engine owns one replica's store and packages its state for
//! exchange. A transport (network, file drop, clipboard, anything that
//! moves bytes) carries encoded snapshots between engines; the engine
//! itself never performs I/O.

use crate::error::{SyncError, SyncResult};
use crate::protocol::SnapshotEnvelope;
use jarvis_crdt::{CrdtStore, MergeSummary, Snapshot, StoreStatus};
use jarvis_types::ReplicaId;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Report of one completed merge, as exposed to embedders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergeReport {
    /// Whether the merge was applied.
    pub success: bool,
    /// The replica whose snapshot was merged.
    pub peer_node_id: ReplicaId,
    /// Keys where the peer's entry won over an existing local entry.
    pub conflicts_resolved: usize,
    /// Keys that were new locally.
    pub updates_applied: usize,
    /// Peer entries rejected by validation.
    pub entries_skipped: usize,
}

impl From<MergeSummary> for MergeReport {
    fn from(summary: MergeSummary) -> Self {
        Self {
            success: true,
            peer_node_id: summary.peer_node_id,
            conflicts_resolved: summary.conflicts_resolved,
            updates_applied: summary.updates_applied,
            entries_skipped: summary.entries_skipped,
        }
    }
}

/// Result of a full synchronize-with-peer round.
#[derive(Debug, Clone, Serialize)]
pub struct SyncOutcome {
    /// This replica's identity.
    pub our_node_id: ReplicaId,
    /// The peer's identity.
    pub peer_node_id: ReplicaId,
    /// What the merge changed.
    pub merge: MergeReport,
    /// Post-merge store diagnostics.
    pub final_state: StoreStatus,
}

/// The sync engine — wraps one [`CrdtStore`] for peer exchange.
///
/// Holds the store by value; embedders that also need direct key-value
/// access go through [`store`](Self::store)/[`store_mut`](Self::store_mut).
#[derive(Debug)]
pub struct SyncEngine {
    store: CrdtStore,
}

impl SyncEngine {
    /// Creates an engine around an existing store.
    #[must_use]
    pub fn new(store: CrdtStore) -> Self {
        Self { store }
    }

    /// Returns this replica's identity.
    #[must_use]
    pub fn node_id(&self) -> &ReplicaId {
        self.store.node_id()
    }

    /// Returns the wrapped store.
    #[must_use]
    pub fn store(&self) -> &CrdtStore {
        &self.store
    }

    /// Returns the wrapped store mutably.
    pub fn store_mut(&mut self) -> &mut CrdtStore {
        &mut self.store
    }

    /// Consumes the engine, returning the store.
    #[must_use]
    pub fn into_store(self) -> CrdtStore {
        self.store
    }

    /// Exports the replica's full state for delivery to a peer.
    #[must_use]
    pub fn export_state(&self) -> Snapshot {
        self.store.export_state()
    }

    /// Exports the replica's state as a version-stamped JSON payload.
    pub fn export_json(&self) -> SyncResult<String> {
        SnapshotEnvelope::new(self.store.export_state()).encode()
    }

    /// Folds a peer snapshot into the store and reports what changed.
    pub fn merge_from_peer(&mut self, snapshot: &Snapshot) -> MergeReport {
        debug!(
            peer = %snapshot.node_id,
            entries = snapshot.data_store.len(),
            "merging peer snapshot"
        );
        let summary = self.store.merge(snapshot);
        if summary.entries_skipped > 0 {
            warn!(
                peer = %summary.peer_node_id,
                skipped = summary.entries_skipped,
                "skipped malformed entries in peer snapshot"
            );
        }
        info!(
            peer = %summary.peer_node_id,
            updates = summary.updates_applied,
            conflicts = summary.conflicts_resolved,
            "merge complete"
        );
        MergeReport::from(summary)
    }

    /// Decodes a version-stamped JSON payload and merges it.
    ///
    /// Malformed payloads (bad JSON, missing `node_id`, wrong envelope
    /// version) come back as structured errors; nothing is applied and
    /// nothing panics.
    pub fn merge_from_json(&mut self, payload: &str) -> SyncResult<MergeReport> {
        let envelope = match SnapshotEnvelope::decode(payload) {
            Ok(envelope) => envelope,
            Err(err) => {
                warn!(error = %err, "rejected peer payload");
                return Err(err);
            }
        };
        if envelope.snapshot.node_id.as_str().is_empty() {
            warn!("rejected peer payload with empty node_id");
            return Err(SyncError::Snapshot("snapshot has empty node_id".into()));
        }
        Ok(self.merge_from_peer(&envelope.snapshot))
    }

    /// One-call synchronization: merges the peer's snapshot and returns
    /// the merge outcome together with post-merge diagnostics.
    ///
    /// For a two-way exchange the caller sends [`export_state`]
    /// (captured before or after this call; merging is idempotent, so
    /// either works) to the peer over its transport.
    ///
    /// [`export_state`]: Self::export_state
    pub fn synchronize_with_peer(&mut self, snapshot: &Snapshot) -> SyncOutcome {
        let merge = self.merge_from_peer(snapshot);
        SyncOutcome {
            our_node_id: self.store.node_id().clone(),
            peer_node_id: snapshot.node_id.clone(),
            merge,
            final_state: self.store.status(),
        }
    }
}
