//! Replicated key-value state for Jarvis.
//!
//! This crate implements a last-writer-wins (LWW) replicated map:
//!
//! - [`VersionedEntry`] — one stored value with its write provenance
//! - [`ReplicaClock`] — per-replica version counters (a vector clock)
//! - [`OperationLog`] — bounded record of local mutations
//! - [`CrdtStore`] — the store engine: local writes, deletes via
//!   tombstones, and deterministic merging of peer snapshots
//! - [`Snapshot`] — the full-state export two replicas exchange
//!
//! Merging satisfies the usual CRDT properties:
//! - **Commutative**: merge(a, b) == merge(b, a)
//! - **Associative**: merge(merge(a, b), c) == merge(a, merge(b, c))
//! - **Idempotent**: merge(a, a) == a
//!
//! The per-key decision depends only on the two candidate entries'
//! (timestamp, replica id) pair, never on merge order, so replicas that
//! exchange snapshots in any order converge to the same state.

mod clock;
mod entry;
mod oplog;
mod snapshot;
mod store;

pub use clock::{CausalOrder, ReplicaClock};
pub use entry::{META_DELETED, META_DELETED_AT, VersionedEntry};
pub use oplog::{OpKind, OpRecord, OperationLog};
pub use snapshot::Snapshot;
pub use store::{CrdtStore, DEFAULT_OP_LOG_CAPACITY, Lookup, MergeSummary, StoreConfig, StoreStatus};
