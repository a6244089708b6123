//! Invalidation Module
//!
//! Exact and substring-pattern removal of cache entries. Knows nothing about
//! which resources depend on which; callers decide what to invalidate.

use tracing::info;

use crate::cache::key::sanitize;
use crate::cache::{ResponseCache, StorageBackend};

impl ResponseCache {
    // == Remove Exact ==
    /// Removes each of `keys` from `backend` without checking expiration.
    ///
    /// Returns the number of entries actually removed; repeating the call is a no-op.
    pub fn remove_exact<S: AsRef<str>>(&mut self, keys: &[S], backend: StorageBackend) -> usize {
        let removed = keys
            .iter()
            .filter(|key| self.store.remove(key.as_ref(), backend))
            .count();
        self.stats.record_invalidations(removed);
        removed
    }

    // == Remove By Pattern ==
    /// Removes every entry whose key contains `pattern` after sanitizing it
    /// like a key.
    ///
    /// Matching is a case-sensitive substring test and deliberately coarse:
    /// `"Polizas"` removes every cached view of any policies endpoint.
    /// `Remote` applies to both local backends.
    pub fn remove_by_pattern(&mut self, pattern: &str, backend: StorageBackend) -> usize {
        let normalized = sanitize(pattern);

        let removed = match backend {
            StorageBackend::Remote => {
                self.remove_matching(&normalized, StorageBackend::InMemory)
                    + self.remove_matching(&normalized, StorageBackend::Persisted)
            }
            local => self.remove_matching(&normalized, local),
        };

        self.stats.record_invalidations(removed);
        info!(
            "Invalidated {} cache entries matching pattern '{}' on {}",
            removed, pattern, backend
        );
        removed
    }

    // == Clear ==
    /// Removes every entry of `backend`.
    pub fn clear(&mut self, backend: StorageBackend) -> usize {
        let removed = self.store.clear(backend);
        info!("Cleared {} cache entries from {}", removed, backend);
        removed
    }

    fn remove_matching(&mut self, normalized: &str, backend: StorageBackend) -> usize {
        let matching: Vec<String> = self
            .store
            .keys(backend)
            .into_iter()
            .filter(|key| key.contains(normalized))
            .collect();

        matching
            .iter()
            .filter(|key| self.store.remove(key, backend))
            .count()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheStore, MemoryStorage};

    fn seeded(backend: StorageBackend) -> ResponseCache {
        let mut cache = ResponseCache::new(CacheStore::new(Box::new(MemoryStorage::new())));
        for key in ["Polizas_1", "Polizas_cliente_5", "Clientes_1"] {
            cache.write(key, &key, None, backend);
        }
        cache
    }

    fn sorted_keys(cache: &ResponseCache, backend: StorageBackend) -> Vec<String> {
        let mut keys = cache.store().keys(backend);
        keys.sort();
        keys
    }

    #[test]
    fn test_pattern_removes_matching_keys_only() {
        for backend in [StorageBackend::InMemory, StorageBackend::Persisted] {
            let mut cache = seeded(backend);

            assert_eq!(cache.remove_by_pattern("Polizas", backend), 2);
            assert_eq!(sorted_keys(&cache, backend), vec!["Clientes_1".to_string()]);
        }
    }

    #[test]
    fn test_pattern_is_sanitized() {
        let mut cache = seeded(StorageBackend::InMemory);

        // "/cliente/" normalizes to "_cliente_"
        assert_eq!(cache.remove_by_pattern("/cliente/", StorageBackend::InMemory), 1);
        assert!(!cache.has("Polizas_cliente_5", StorageBackend::InMemory));
    }

    #[test]
    fn test_pattern_is_case_sensitive() {
        let mut cache = seeded(StorageBackend::InMemory);
        assert_eq!(cache.remove_by_pattern("polizas", StorageBackend::InMemory), 0);
    }

    #[test]
    fn test_pattern_over_matches_substrings() {
        let mut cache = seeded(StorageBackend::InMemory);
        cache.write("User_7", &1, None, StorageBackend::InMemory);
        cache.write("SuperUser_settings", &1, None, StorageBackend::InMemory);

        assert_eq!(cache.remove_by_pattern("User", StorageBackend::InMemory), 2);
    }

    #[test]
    fn test_pattern_scoped_to_backend() {
        let mut cache = seeded(StorageBackend::InMemory);
        cache.write("Polizas_1", &1, None, StorageBackend::Persisted);

        cache.remove_by_pattern("Polizas", StorageBackend::InMemory);
        assert!(cache.has("Polizas_1", StorageBackend::Persisted));

        assert_eq!(cache.remove_by_pattern("Polizas", StorageBackend::Remote), 1);
        assert!(!cache.has("Polizas_1", StorageBackend::Persisted));
    }

    #[test]
    fn test_remove_exact_is_idempotent() {
        let mut cache = seeded(StorageBackend::Persisted);

        let keys = ["Clientes_1", "absent"];
        assert_eq!(cache.remove_exact(&keys, StorageBackend::Persisted), 1);
        assert_eq!(cache.remove_exact(&keys, StorageBackend::Persisted), 0);
        assert_eq!(cache.store().len(StorageBackend::Persisted), 2);
        assert_eq!(cache.stats().invalidations, 1);
    }

    #[test]
    fn test_clear_backend() {
        let mut cache = seeded(StorageBackend::InMemory);
        assert_eq!(cache.clear(StorageBackend::InMemory), 3);
        assert!(cache.store().is_empty(StorageBackend::InMemory));
    }
}
