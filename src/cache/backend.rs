//! Storage Backend Module

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CacheError;

// == Storage Backend ==
/// Where a cache entry lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    /// Process-local map, lost on restart
    InMemory,
    /// Durable key-value store shared by every process using it
    #[default]
    Persisted,
    /// Caching delegated to the upstream: reads always miss locally,
    /// writes fall back to `InMemory`
    Remote,
}

impl StorageBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageBackend::InMemory => "in_memory",
            StorageBackend::Persisted => "persisted",
            StorageBackend::Remote => "remote",
        }
    }
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StorageBackend {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "in_memory" | "memory" => Ok(StorageBackend::InMemory),
            "persisted" | "local_storage" => Ok(StorageBackend::Persisted),
            "remote" => Ok(StorageBackend::Remote),
            other => Err(CacheError::InvalidRequest(format!(
                "Unknown storage backend: {}",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_backend() {
        let parse = |s: &str| s.parse::<StorageBackend>();

        assert_eq!(parse("memory").unwrap(), StorageBackend::InMemory);
        assert_eq!(parse(" Persisted ").unwrap(), StorageBackend::Persisted);
        assert_eq!(parse("remote").unwrap(), StorageBackend::Remote);
        assert!(parse("redis").is_err());
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&StorageBackend::InMemory).unwrap();
        assert_eq!(json, "\"in_memory\"");

        let parsed: StorageBackend = serde_json::from_str("\"persisted\"").unwrap();
        assert_eq!(parsed, StorageBackend::Persisted);
    }
}
