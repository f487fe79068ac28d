//! Bounded log of local mutations.
//!
//! Every local `set` and `delete` appends an [`OpRecord`]. Retention is
//! bounded: the log keeps the most recent records up to a configured
//! capacity and evicts the oldest beyond that. The lifetime count of
//! appended records survives eviction, so `operation_count` in exports
//! and diagnostics reports every operation ever performed.

use jarvis_types::{ReplicaId, Timestamp};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::VecDeque;

/// Kind of local mutation recorded in the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpKind {
    /// A value write.
    Set,
    /// A tombstone write.
    Delete,
}

/// One recorded local mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpRecord {
    /// What was done.
    pub op: OpKind,
    /// The affected key.
    pub key: String,
    /// The written value; null for deletions.
    pub value: Value,
    /// Wall-clock time of the mutation.
    pub timestamp: Timestamp,
    /// Replica that performed the mutation.
    pub node_id: ReplicaId,
    /// Version stamped on the written entry.
    pub version: u64,
}

/// Ring buffer of the most recent local mutations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationLog {
    records: VecDeque<OpRecord>,
    capacity: usize,
    total_recorded: u64,
}

impl OperationLog {
    /// Creates a log retaining at most `capacity` records.
    ///
    /// A capacity of zero retains nothing while still counting appends.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: VecDeque::with_capacity(capacity.min(1024)),
            capacity,
            total_recorded: 0,
        }
    }

    /// Appends a record, evicting the oldest if at capacity.
    pub fn push(&mut self, record: OpRecord) {
        self.total_recorded += 1;
        if self.capacity == 0 {
            return;
        }
        while self.records.len() >= self.capacity {
            self.records.pop_front();
        }
        self.records.push_back(record);
    }

    /// Returns the number of currently retained records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if no records are retained.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns the retention capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the lifetime count of appended records, eviction included.
    #[must_use]
    pub fn total_recorded(&self) -> u64 {
        self.total_recorded
    }

    /// Returns the most recently appended retained record.
    #[must_use]
    pub fn last(&self) -> Option<&OpRecord> {
        self.records.back()
    }

    /// Iterates retained records, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &OpRecord> {
        self.records.iter()
    }
}
