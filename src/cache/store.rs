//! Cache Store Module
//!
//! Backend-scoped storage of cache entries: an in-process map plus a
//! persisted key-value store namespaced under [`CACHE_PREFIX`].

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::cache::{CacheEntry, Clock, KeyValueStore, MemoryStorage, StorageBackend, SystemClock};

/// Namespace for entries in the persisted store.
pub const CACHE_PREFIX: &str = "policy_cache_";

// == Cache Store ==
/// Holds cache entries for every backend.
#[derive(Debug)]
pub struct CacheStore {
    /// In-process entries
    memory: HashMap<String, CacheEntry<Value>>,
    /// Durable store, possibly shared with unrelated data
    persisted: Box<dyn KeyValueStore>,
    /// Time source for expiry sweeps
    clock: Arc<dyn Clock>,
}

impl CacheStore {
    // == Constructor ==
    /// Creates a store over `persisted` using the wall clock.
    pub fn new(persisted: Box<dyn KeyValueStore>) -> Self {
        Self::with_clock(persisted, Arc::new(SystemClock))
    }

    pub fn with_clock(persisted: Box<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            memory: HashMap::new(),
            persisted,
            clock,
        }
    }

    /// Store whose persisted backend lives only in this process.
    pub fn ephemeral() -> Self {
        Self::new(Box::new(MemoryStorage::new()))
    }

    pub fn now(&self) -> u64 {
        self.clock.now_ms()
    }

    // == Get ==
    /// Fetches the raw entry without checking expiration.
    ///
    /// Persisted data that does not decode as an entry is dropped and
    /// reported as absent.
    pub fn get(&mut self, key: &str, backend: StorageBackend) -> Option<CacheEntry<Value>> {
        match backend {
            StorageBackend::InMemory => self.memory.get(key).cloned(),
            StorageBackend::Persisted => {
                let full_key = full_key(key);
                let raw = self.persisted.get_item(&full_key)?;
                match serde_json::from_str(&raw) {
                    Ok(entry) => Some(entry),
                    Err(e) => {
                        debug!("Discarding unreadable cache entry {}: {}", key, e);
                        self.persisted.remove_item(&full_key);
                        None
                    }
                }
            }
            StorageBackend::Remote => None,
        }
    }

    // == Set ==
    /// Stores `entry` under `key`, replacing any previous entry.
    ///
    /// A persisted write that fails is retried once after sweeping expired
    /// entries; if the retry fails too the write is dropped.
    ///
    /// Returns the number of expired entries swept to make room.
    pub fn set(&mut self, key: &str, entry: CacheEntry<Value>, backend: StorageBackend) -> usize {
        match backend {
            StorageBackend::InMemory | StorageBackend::Remote => {
                self.memory.insert(key.to_string(), entry);
                0
            }
            StorageBackend::Persisted => {
                let raw = match serde_json::to_string(&entry) {
                    Ok(raw) => raw,
                    Err(e) => {
                        warn!("Failed to encode cache entry {}: {}", key, e);
                        return 0;
                    }
                };
                let full_key = full_key(key);

                let Err(e) = self.persisted.set_item(&full_key, raw.clone()) else {
                    return 0;
                };
                warn!("Failed to persist cache entry {}: {}", key, e);
                let swept = self.sweep_expired();
                debug!("Swept {} expired persisted entries before retry", swept);

                if let Err(e) = self.persisted.set_item(&full_key, raw) {
                    warn!("Dropping cache entry {} after retry: {}", key, e);
                }
                swept
            }
        }
    }

    // == Remove ==
    /// Removes `key` from `backend`. `Remote` removes from both local backends.
    pub fn remove(&mut self, key: &str, backend: StorageBackend) -> bool {
        match backend {
            StorageBackend::InMemory => self.memory.remove(key).is_some(),
            StorageBackend::Persisted => self.persisted.remove_item(&full_key(key)),
            StorageBackend::Remote => {
                let in_memory = self.memory.remove(key).is_some();
                let persisted = self.persisted.remove_item(&full_key(key));
                in_memory || persisted
            }
        }
    }

    // == Clear ==
    /// Removes every entry of `backend`. Returns the number removed.
    ///
    /// Foreign keys in the persisted store are never touched.
    pub fn clear(&mut self, backend: StorageBackend) -> usize {
        match backend {
            StorageBackend::InMemory => {
                let count = self.memory.len();
                self.memory.clear();
                count
            }
            StorageBackend::Persisted => {
                let keys = self.keys(StorageBackend::Persisted);
                keys.iter()
                    .filter(|key| self.persisted.remove_item(&full_key(key)))
                    .count()
            }
            StorageBackend::Remote => {
                self.clear(StorageBackend::InMemory) + self.clear(StorageBackend::Persisted)
            }
        }
    }

    // == Keys ==
    /// Lists stored keys of `backend`, without the persisted prefix.
    pub fn keys(&self, backend: StorageBackend) -> Vec<String> {
        match backend {
            StorageBackend::InMemory => self.memory.keys().cloned().collect(),
            StorageBackend::Persisted => self
                .persisted
                .keys()
                .into_iter()
                .filter_map(|k| k.strip_prefix(CACHE_PREFIX).map(str::to_string))
                .collect(),
            StorageBackend::Remote => Vec::new(),
        }
    }

    // == Sweep Expired ==
    /// Removes expired or unreadable entries from the persisted store.
    ///
    /// Returns the number of entries removed.
    pub fn sweep_expired(&mut self) -> usize {
        let now = self.now();
        let stale: Vec<String> = self
            .persisted
            .keys()
            .into_iter()
            .filter(|k| k.starts_with(CACHE_PREFIX))
            .filter(|k| {
                self.persisted
                    .get_item(k)
                    .and_then(|raw| serde_json::from_str::<CacheEntry<Value>>(&raw).ok())
                    .map_or(true, |entry| entry.is_expired(now))
            })
            .collect();

        stale
            .iter()
            .filter(|k| self.persisted.remove_item(k))
            .count()
    }

    // == Length ==
    /// Returns the number of entries stored in `backend`.
    pub fn len(&self, backend: StorageBackend) -> usize {
        match backend {
            StorageBackend::InMemory => self.memory.len(),
            StorageBackend::Persisted => self.keys(StorageBackend::Persisted).len(),
            StorageBackend::Remote => 0,
        }
    }

    // == Is Empty ==
    pub fn is_empty(&self, backend: StorageBackend) -> bool {
        self.len(backend) == 0
    }
}

fn full_key(key: &str) -> String {
    format!("{}{}", CACHE_PREFIX, key)
}
