//! Peer snapshot exchange for the Jarvis replicated store.
//!
//! This crate packages [`jarvis_crdt`] state for exchange between
//! replicas and folds peer state back in with deterministic conflict
//! resolution.
//!
//! # Architecture
//!
//! - **Protocol**: the snapshot wire encoding and the versioned envelope
//! - **Engine**: wraps one store, exports state, merges peer state, and
//!   reports what each merge changed
//!
//! No I/O happens here. A transport (network, file exchange) moves the
//! encoded payloads; a persistence layer saves and restores snapshots
//! across restarts. Both are external collaborators.
//!
//! # Example
//!
//! ```
//! use jarvis_crdt::CrdtStore;
//! use jarvis_sync::SyncEngine;
//! use jarvis_types::ReplicaId;
//!
//! let mut laptop = SyncEngine::new(CrdtStore::new(ReplicaId::new("laptop")));
//! let mut phone = SyncEngine::new(CrdtStore::new(ReplicaId::new("phone")));
//!
//! laptop.store_mut().set("theme", "dark".into());
//! phone.store_mut().set("volume", 40.into());
//!
//! // Transport delivers each side's snapshot to the other.
//! let from_phone = phone.export_state();
//! let from_laptop = laptop.export_state();
//! laptop.merge_from_peer(&from_phone);
//! phone.merge_from_peer(&from_laptop);
//!
//! assert_eq!(laptop.store().get("volume"), phone.store().get("volume"));
//! ```

mod engine;
mod error;
mod protocol;

pub use engine::{MergeReport, SyncEngine, SyncOutcome};
pub use error::{SyncError, SyncResult};
pub use protocol::{PROTOCOL_VERSION, SnapshotEnvelope, decode_snapshot, encode_snapshot};
