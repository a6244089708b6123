//! Entry Lifecycle Module
//!
//! Stamps entries on write and evicts them lazily once expired.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::cache::{CacheEntry, CacheStats, CacheStore, StorageBackend};

/// Default TTL in milliseconds (5 minutes).
pub const DEFAULT_TTL_MS: u64 = 5 * 60 * 1000;

// == Response Cache ==
/// Cache facade used by the interceptor and by mutation collaborators.
///
/// Expiration is only evaluated when an entry is read; an expired entry is
/// removed on that read and never returned.
#[derive(Debug)]
pub struct ResponseCache {
    pub(crate) store: CacheStore,
    pub(crate) stats: CacheStats,
    default_ttl: u64,
}

impl ResponseCache {
    // == Constructor ==
    pub fn new(store: CacheStore) -> Self {
        Self::with_default_ttl(store, DEFAULT_TTL_MS)
    }

    /// `default_ttl` is used by writes that do not pass a TTL.
    pub fn with_default_ttl(store: CacheStore, default_ttl: u64) -> Self {
        Self {
            store,
            stats: CacheStats::new(),
            default_ttl,
        }
    }

    pub fn default_ttl(&self) -> u64 {
        self.default_ttl
    }

    // == Read ==
    /// Returns the payload stored under `key` if present and fresh.
    ///
    /// A payload that does not decode as `T` counts as a miss.
    pub fn read<T: DeserializeOwned>(&mut self, key: &str, backend: StorageBackend) -> Option<T> {
        let value = self.read_value(key, backend)?;
        match serde_json::from_value(value) {
            Ok(data) => Some(data),
            Err(e) => {
                debug!("Cached payload for {} has unexpected shape: {}", key, e);
                None
            }
        }
    }

    /// Returns the raw JSON payload stored under `key` if present and fresh.
    pub fn read_value(&mut self, key: &str, backend: StorageBackend) -> Option<Value> {
        let entry = self.fresh_entry(key, backend)?;
        self.stats.record_hit();
        Some(entry.data)
    }

    // == Has ==
    /// Returns true if a fresh entry exists. Evicts an expired one like `read`
    /// but leaves the hit and miss counters alone.
    pub fn has(&mut self, key: &str, backend: StorageBackend) -> bool {
        let Some(entry) = self.store.get(key, backend) else {
            return false;
        };
        if entry.is_expired(self.store.now()) {
            self.evict(key, backend);
            return false;
        }
        true
    }

    // == Write ==
    /// Stores `data` under `key`, stamped with the current time.
    ///
    /// Uses the default TTL when `ttl` is None. Never fails: a payload that
    /// cannot be encoded is logged and skipped.
    pub fn write<T: Serialize>(
        &mut self,
        key: &str,
        data: &T,
        ttl: Option<u64>,
        backend: StorageBackend,
    ) {
        let data = match serde_json::to_value(data) {
            Ok(data) => data,
            Err(e) => {
                warn!("Skipping cache write for {}: {}", key, e);
                return;
            }
        };
        let ttl = ttl.unwrap_or(self.default_ttl);
        let entry = CacheEntry::new(data, self.store.now(), ttl);

        let swept = self.store.set(key, entry, backend);
        self.stats.record_evictions(swept);
        debug!("Cached {} on {} (TTL: {}ms)", key, backend, ttl);
    }

    // == Stats ==
    /// Returns current statistics with up-to-date entry counts.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_entry_counts(
            self.store.len(StorageBackend::InMemory),
            self.store.len(StorageBackend::Persisted),
        );
        stats
    }

    /// Read-only access to the underlying store.
    pub fn store(&self) -> &CacheStore {
        &self.store
    }

    fn fresh_entry(&mut self, key: &str, backend: StorageBackend) -> Option<CacheEntry<Value>> {
        let Some(entry) = self.store.get(key, backend) else {
            self.stats.record_miss();
            return None;
        };

        if entry.is_expired(self.store.now()) {
            self.evict(key, backend);
            self.stats.record_miss();
            return None;
        }

        Some(entry)
    }

    fn evict(&mut self, key: &str, backend: StorageBackend) {
        debug!("Evicting expired cache entry {} from {}", key, backend);
        self.store.remove(key, backend);
        self.stats.record_eviction();
    }
}
