//! Cache Module
//!
//! Response cache with per-entry TTL, in-memory and persisted backends, and
//! exact or pattern-based invalidation.

mod backend;
mod clock;
mod entry;
mod invalidation;
pub mod key;
mod lifecycle;
mod stats;
mod storage;
mod store;


use std::sync::Arc;

use tokio::sync::RwLock;

// Re-export public types
pub use backend::StorageBackend;
pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::{current_timestamp_ms, CacheEntry};
pub use key::{build_key, sanitize};
pub use lifecycle::{ResponseCache, DEFAULT_TTL_MS};
pub use stats::CacheStats;
pub use storage::{FileStorage, KeyValueStore, MemoryStorage};
pub use store::{CacheStore, CACHE_PREFIX};

/// Cache instance shared by the interceptor and mutation collaborators.
pub type SharedCache = Arc<RwLock<ResponseCache>>;

/// Wraps `cache` for sharing.
pub fn shared(cache: ResponseCache) -> SharedCache {
    Arc::new(RwLock::new(cache))
}
