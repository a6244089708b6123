//! Persisted Key-Value Storage
//!
//! String key-value stores backing the `Persisted` cache backend. Both
//! implementations can be given a byte quota; writes beyond it fail the
//! same way a full host store would.

use std::collections::{BTreeMap, HashMap};
use std::fmt::Debug;
use std::path::PathBuf;

use tracing::warn;

use crate::error::{CacheError, Result};

// == Key-Value Store Trait ==
/// Durable string store shared with data that is not ours.
pub trait KeyValueStore: Debug + Send + Sync {
    /// Returns the raw value stored under `key`.
    fn get_item(&self, key: &str) -> Option<String>;

    /// Writes `value` under `key`, replacing any previous value.
    fn set_item(&mut self, key: &str, value: String) -> Result<()>;

    /// Removes `key`. Returns true if it was present.
    fn remove_item(&mut self, key: &str) -> bool;

    /// Lists every key in the store, including foreign ones.
    fn keys(&self) -> Vec<String>;
}

/// Bytes used once `key` holds `value`, counting keys and values.
fn usage_after<'a>(
    items: impl Iterator<Item = (&'a String, &'a String)>,
    key: &str,
    value: &str,
) -> usize {
    let others: usize = items
        .filter(|(k, _)| k.as_str() != key)
        .map(|(k, v)| k.len() + v.len())
        .sum();
    others + key.len() + value.len()
}

fn check_quota(quota: Option<usize>, needed: usize) -> Result<()> {
    match quota {
        Some(quota) if needed > quota => Err(CacheError::QuotaExceeded { needed, quota }),
        _ => Ok(()),
    }
}

// == Memory Storage ==
/// Process-local key-value store.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: HashMap<String, String>,
    quota: Option<usize>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that rejects writes once `quota` bytes are in use.
    pub fn with_quota(quota: usize) -> Self {
        Self {
            items: HashMap::new(),
            quota: Some(quota),
        }
    }
}

impl KeyValueStore for MemoryStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.get(key).cloned()
    }

    fn set_item(&mut self, key: &str, value: String) -> Result<()> {
        check_quota(self.quota, usage_after(self.items.iter(), key, &value))?;
        self.items.insert(key.to_string(), value);
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> bool {
        self.items.remove(key).is_some()
    }

    fn keys(&self) -> Vec<String> {
        self.items.keys().cloned().collect()
    }
}

// == File Storage ==
/// Key-value store persisted as a single JSON object on disk.
///
/// Every operation reads the file, so keys written by other processes are
/// visible. A mutation reloads the file, changes its own key and writes the
/// result back. Writers are not coordinated; the last one wins per key.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    quota: Option<usize>,
}

impl FileStorage {
    /// Opens the store at `path`. A missing or corrupt file reads as empty.
    pub fn open(path: impl Into<PathBuf>, quota: Option<usize>) -> Self {
        Self {
            path: path.into(),
            quota,
        }
    }

    fn load(&self) -> BTreeMap<String, String> {
        let path = self.path.as_path();
        match std::fs::read_to_string(path) {
            Ok(data) => match serde_json::from_str(&data) {
                Ok(items) => items,
                Err(e) => {
                    warn!(
                        "Cache file {} is corrupt, reading as empty: {}",
                        path.display(),
                        e
                    );
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                warn!("Failed to read cache file {}: {}", path.display(), e);
                BTreeMap::new()
            }
        }
    }

    fn persist(&self, items: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let data = serde_json::to_string(items)?;
        std::fs::write(&self.path, data)?;
        Ok(())
    }
}

impl KeyValueStore for FileStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.load().remove(key)
    }

    fn set_item(&mut self, key: &str, value: String) -> Result<()> {
        let mut items = self.load();
        check_quota(self.quota, usage_after(items.iter(), key, &value))?;

        items.insert(key.to_string(), value);
        self.persist(&items)
    }

    fn remove_item(&mut self, key: &str) -> bool {
        let mut items = self.load();
        if items.remove(key).is_none() {
            return false;
        }
        if let Err(e) = self.persist(&items) {
            warn!("Failed to persist removal of {}: {}", key, e);
            return false;
        }
        true
    }

    fn keys(&self) -> Vec<String> {
        self.load().into_keys().collect()
    }
}
