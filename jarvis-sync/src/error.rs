//! Error types for the sync layer.

use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur in sync operations.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Protocol error (unsupported version, invalid envelope).
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Serialization error (bad JSON, missing required fields).
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Snapshot decoded but is unusable.
    #[error("snapshot error: {0}")]
    Snapshot(String),
}
