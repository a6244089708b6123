//! Configuration Module
//!
//! Handles loading and managing gateway configuration from environment variables.

use std::env;
use std::path::PathBuf;

use crate::cache::{StorageBackend, DEFAULT_TTL_MS};

/// Quota of the persisted store in bytes (5 MiB).
pub const DEFAULT_STORAGE_QUOTA: usize = 5 * 1024 * 1024;

/// Gateway configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Base URL of the clients/policies API
    pub upstream_url: String,
    /// TTL in milliseconds for writes that do not pick one
    pub default_ttl_ms: u64,
    /// File backing the persisted cache backend
    pub cache_file: PathBuf,
    /// Byte quota of the persisted store
    pub storage_quota: usize,
    /// Backend used for cached reads
    pub read_backend: StorageBackend,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `UPSTREAM_URL` - Clients/policies API base URL (default: http://localhost:5002/api)
    /// - `DEFAULT_TTL_MS` - Default TTL in milliseconds (default: 300000)
    /// - `CACHE_FILE` - Persisted cache file (default: policy_cache.json)
    /// - `STORAGE_QUOTA_BYTES` - Persisted store quota (default: 5 MiB)
    /// - `READ_BACKEND` - `in_memory`, `persisted` or `remote` (default: persisted)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_port: parsed_var("SERVER_PORT").unwrap_or(defaults.server_port),
            upstream_url: env::var("UPSTREAM_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.upstream_url),
            default_ttl_ms: parsed_var("DEFAULT_TTL_MS").unwrap_or(defaults.default_ttl_ms),
            cache_file: env::var("CACHE_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.cache_file),
            storage_quota: parsed_var("STORAGE_QUOTA_BYTES").unwrap_or(defaults.storage_quota),
            read_backend: parsed_var("READ_BACKEND").unwrap_or(defaults.read_backend),
        }
    }
}

fn parsed_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            upstream_url: "http://localhost:5002/api".to_string(),
            default_ttl_ms: DEFAULT_TTL_MS,
            cache_file: PathBuf::from("policy_cache.json"),
            storage_quota: DEFAULT_STORAGE_QUOTA,
            read_backend: StorageBackend::Persisted,
        }
    }
}
