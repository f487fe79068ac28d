//! Wall-clock timestamps for last-writer-wins ordering.
//!
//! The replication wire format carries timestamps as float seconds since
//! the Unix epoch, so the timestamp type wraps an `f64` rather than a
//! structured clock. Ordering uses `f64::total_cmp`, which is a total
//! order, so conflict resolution never hits an incomparable pair.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::time::{SystemTime, UNIX_EPOCH};

/// Seconds since the Unix epoch, as reported by the system wall clock.
///
/// Not guaranteed monotonic across processes or clock adjustments; the
/// store's conflict resolution only needs a total order, which
/// `total_cmp` provides.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(f64);

impl Timestamp {
    /// Creates a timestamp at the current time.
    #[must_use]
    pub fn now() -> Self {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before Unix epoch")
            .as_secs_f64();
        Self(secs)
    }

    /// Creates a timestamp from raw seconds.
    #[must_use]
    pub const fn from_secs(secs: f64) -> Self {
        Self(secs)
    }

    /// Returns the raw seconds value.
    #[must_use]
    pub const fn as_secs(&self) -> f64 {
        self.0
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::now()
    }
}

impl PartialEq for Timestamp {
    fn eq(&self, other: &Self) -> bool {
        self.0.total_cmp(&other.0) == Ordering::Equal
    }
}

impl Eq for Timestamp {}

impl PartialOrd for Timestamp {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Timestamp {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}
