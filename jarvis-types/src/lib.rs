//! Core type definitions for the Jarvis replication engine.
//!
//! This crate defines the fundamental types shared by the store and sync
//! layers:
//! - Replica identifiers (caller-supplied strings or generated UUID v7)
//! - Wall-clock timestamps (float seconds, the replication wire format)
//!
//! Domain-specific state (the key-value data itself, snapshots, merge
//! reports) lives in `jarvis-crdt` and `jarvis-sync`, not here.

mod ids;
mod timestamp;

pub use ids::ReplicaId;
pub use timestamp::Timestamp;
