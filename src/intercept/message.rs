//! Request and response types exchanged with the transport.

use std::collections::HashMap;

use axum::http::{Method, StatusCode};
use serde_json::Value;

use crate::cache::build_key;

// == Http Request ==
/// Outgoing request as seen by the cache.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    /// Absolute URL without the query string
    pub url: String,
    /// Query parameters in the order they were given
    pub query_params: Vec<(String, String)>,
    /// JSON body, for mutations
    pub body: Option<Value>,
    /// Caller's `Authorization` header, forwarded as is
    pub authorization: Option<String>,
}

impl HttpRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            query_params: Vec::new(),
            body: None,
            authorization: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query_params.push((name.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_authorization(mut self, value: impl Into<String>) -> Self {
        self.authorization = Some(value.into());
        self
    }

    /// Only anonymous GETs are served from or written to the cache.
    ///
    /// Keys carry no caller identity, so a credentialed read could leak one
    /// user's data to another.
    pub fn is_cacheable(&self) -> bool {
        self.method == Method::GET && self.authorization.is_none()
    }

    // == Cache Key ==
    /// Key for this request: URL plus query parameters, order-independent.
    ///
    /// When a name repeats, its first value is used.
    pub fn cache_key(&self) -> String {
        let mut params: HashMap<String, Value> = HashMap::new();
        for (name, value) in &self.query_params {
            params
                .entry(name.clone())
                .or_insert_with(|| Value::String(value.clone()));
        }
        build_key(&self.url, Some(&params))
    }
}

// == Response Source ==
/// Where a response came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseSource {
    Network,
    Cache { key: String },
}

// == Http Response ==
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub body: Value,
    pub source: ResponseSource,
}

impl HttpResponse {
    /// Response received from the network.
    pub fn network(status: StatusCode, body: Value) -> Self {
        Self {
            status,
            body,
            source: ResponseSource::Network,
        }
    }

    /// Synthetic `200 OK` built from a cached payload.
    pub fn from_cache(body: Value, key: impl Into<String>) -> Self {
        Self {
            status: StatusCode::OK,
            body,
            source: ResponseSource::Cache { key: key.into() },
        }
    }

    pub fn is_from_cache(&self) -> bool {
        matches!(self.source, ResponseSource::Cache { .. })
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn status_text(&self) -> String {
        let reason = self.status.canonical_reason().unwrap_or("");
        match self.source {
            ResponseSource::Network => reason.to_string(),
            ResponseSource::Cache { .. } => format!("{} (from cache)", reason),
        }
    }
}
