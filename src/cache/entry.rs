//! Cache Entry Module
//!
//! Defines the stored payload envelope with its write timestamp and TTL.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

// == Cache Entry ==
/// A cached payload together with the metadata needed to expire it.
///
/// Persisted entries use exactly this JSON shape:
/// `{"data": ..., "timestamp": <epoch ms>, "ttl": <ms>}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    /// The cached payload
    pub data: T,
    /// Write time (Unix milliseconds), stamped by the cache on write
    pub timestamp: u64,
    /// Time to live in milliseconds
    pub ttl: u64,
}

impl<T> CacheEntry<T> {
    // == Constructor ==
    /// Creates an entry written at `timestamp`.
    pub fn new(data: T, timestamp: u64, ttl: u64) -> Self {
        Self {
            data,
            timestamp,
            ttl,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired at `now`.
    ///
    /// Boundary condition: an entry whose age equals its TTL is still fresh;
    /// it expires only once the age is strictly greater than the TTL.
    /// A timestamp in the future (clock skew between writers) counts as age zero.
    pub fn is_expired(&self, now: u64) -> bool {
        now.saturating_sub(self.timestamp) > self.ttl
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
