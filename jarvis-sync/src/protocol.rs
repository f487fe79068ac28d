//! Snapshot wire encoding and the versioned exchange envelope.
//!
//! Two encodings exist:
//!
//! - The bare snapshot ([`encode_snapshot`]/[`decode_snapshot`]) is the
//!   cross-implementation contract: exactly the `{node_id, vector_clock,
//!   data_store, operation_count, peers, exported_at}` object, nothing
//!   around it. Any replica implementation that produces this shape can
//!   interoperate.
//! - The [`SnapshotEnvelope`] wraps a snapshot with a protocol version
//!   for exchange between engines, so an incompatible future encoding is
//!   rejected up front instead of half-merged.

use crate::error::{SyncError, SyncResult};
use jarvis_crdt::Snapshot;
use serde::{Deserialize, Serialize};

/// Protocol version for compatibility checking.
pub const PROTOCOL_VERSION: u32 = 1;

/// A version-stamped snapshot for engine-to-engine exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotEnvelope {
    /// Protocol version.
    pub version: u32,
    /// The carried snapshot.
    pub snapshot: Snapshot,
}

impl SnapshotEnvelope {
    /// Wraps a snapshot with the current protocol version.
    #[must_use]
    pub fn new(snapshot: Snapshot) -> Self {
        Self {
            version: PROTOCOL_VERSION,
            snapshot,
        }
    }

    /// Serializes the envelope to JSON.
    pub fn encode(&self) -> SyncResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parses an envelope from JSON and checks the protocol version.
    pub fn decode(payload: &str) -> SyncResult<Self> {
        let envelope: Self = serde_json::from_str(payload)?;
        if envelope.version != PROTOCOL_VERSION {
            return Err(SyncError::Protocol(format!(
                "unsupported protocol version {} (expected {PROTOCOL_VERSION})",
                envelope.version
            )));
        }
        Ok(envelope)
    }
}

/// Serializes a bare snapshot to its interop JSON shape.
pub fn encode_snapshot(snapshot: &Snapshot) -> SyncResult<String> {
    Ok(serde_json::to_string(snapshot)?)
}

/// Parses a bare snapshot from its interop JSON shape.
///
/// Missing required fields (`node_id` above all) surface as a
/// [`SyncError::Serialization`], never a panic.
pub fn decode_snapshot(payload: &str) -> SyncResult<Snapshot> {
    Ok(serde_json::from_str(payload)?)
}
