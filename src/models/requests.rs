//! Request DTOs for the gateway API
//!
//! Defines the structure of incoming HTTP request bodies and query strings.

use serde::Deserialize;

use crate::cache::StorageBackend;

/// Request body for manual invalidation (POST /cache/invalidate)
///
/// Exactly one of `pattern` or `keys` must be given.
#[derive(Debug, Clone, Deserialize)]
pub struct InvalidateRequest {
    /// Substring to match against stored keys
    #[serde(default)]
    pub pattern: Option<String>,
    /// Exact keys to remove
    #[serde(default)]
    pub keys: Option<Vec<String>>,
    /// Backend to act on (default: persisted)
    #[serde(default)]
    pub backend: StorageBackend,
}

impl InvalidateRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        match (&self.pattern, &self.keys) {
            (Some(_), Some(_)) => Some("Give either a pattern or keys, not both".to_string()),
            (None, None) => Some("A pattern or a list of keys is required".to_string()),
            (Some(pattern), None) if pattern.is_empty() => {
                Some("Pattern cannot be empty".to_string())
            }
            _ => None,
        }
    }
}

/// Query string for DELETE /cache
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BackendQuery {
    #[serde(default)]
    pub backend: StorageBackend,
}
