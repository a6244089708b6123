//! Cache Key Module
//!
//! Derives storage-safe cache keys from a request URL and its parameters.

use std::collections::HashMap;

use serde_json::Value;

/// Substitute for every character outside `[A-Za-z0-9]`.
pub const KEY_SEPARATOR: char = '_';

// == Build Key ==
/// Builds the cache key for `url` with optional parameters.
///
/// Parameters are sorted by name and serialized as `name=<json value>`, so the
/// key does not depend on insertion order. Distinct URLs may sanitize to the
/// same key; such collisions are accepted.
pub fn build_key(url: &str, params: Option<&HashMap<String, Value>>) -> String {
    let raw = match params {
        Some(params) if !params.is_empty() => {
            let mut names: Vec<&String> = params.keys().collect();
            names.sort();

            let query = names
                .into_iter()
                .map(|name| format!("{}={}", name, params[name]))
                .collect::<Vec<_>>()
                .join("&");

            format!("{}?{}", url, query)
        }
        _ => url.to_string(),
    };

    sanitize(&raw)
}

// == Sanitize ==
/// Replaces every character outside `[A-Za-z0-9]` with [`KEY_SEPARATOR`].
pub fn sanitize(raw: &str) -> String {
    raw.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c
            } else {
                KEY_SEPARATOR
            }
        })
        .collect()
}
