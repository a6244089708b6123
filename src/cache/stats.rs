//! Cache Statistics Module
//!
//! Tracks lookup outcomes, evictions and invalidations.

use serde::Serialize;

// == Cache Stats ==
/// Tracks cache performance metrics.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// Lookups answered from the cache
    pub hits: u64,
    /// Lookups that found nothing usable (absent or expired)
    pub misses: u64,
    /// Expired entries removed on read
    pub evictions: u64,
    /// Entries removed by exact or pattern invalidation
    pub invalidations: u64,
    /// Entries currently held in memory
    pub memory_entries: usize,
    /// Entries currently held in the persisted store
    pub persisted_entries: usize,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 if no lookups have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    pub fn record_evictions(&mut self, count: usize) {
        self.evictions += count as u64;
    }

    pub fn record_invalidations(&mut self, count: usize) {
        self.invalidations += count as u64;
    }

    // == Update Entry Counts ==
    pub fn set_entry_counts(&mut self, memory: usize, persisted: usize) {
        self.memory_entries = memory;
        self.persisted_entries = persisted;
    }

    pub fn total_entries(&self) -> usize {
        self.memory_entries + self.persisted_entries
    }
}
