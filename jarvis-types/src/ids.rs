//! Identifier types used throughout the Jarvis replication core.
//!
//! Replica identifiers are plain strings so embedders can name replicas
//! however they like ("laptop", "phone", a hostname). Generated identifiers
//! use UUID v7, which embeds a timestamp and therefore sorts by creation
//! instant.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for one replica of the store.
///
/// The derived `Ord` is a lexical order over the underlying string. That
/// order doubles as the conflict-resolution tie-break: when two entries
/// carry the same timestamp, the one from the lexically greater replica
/// wins.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReplicaId(String);

impl ReplicaId {
    /// Creates a replica ID from a caller-supplied name.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a fresh replica ID from the current time (UUID v7).
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ReplicaId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for ReplicaId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for ReplicaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
