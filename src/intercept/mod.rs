//! Interception Module
//!
//! Transparent caching in front of the network transport.
//!
//! # Flow
//! - `GET` requests are looked up by cache key; a hit returns a synthetic
//!   `200 OK` tagged [`ResponseSource::Cache`] without touching the network
//! - misses are forwarded and 2xx bodies are stored with [`ttl_for_url`]
//! - every other method passes straight through

mod interceptor;
mod message;
mod transport;
mod ttl;

pub use interceptor::CachingInterceptor;
pub use message::{HttpRequest, HttpResponse, ResponseSource};
pub use transport::{ReqwestTransport, Transport};
pub use ttl::{ttl_for_url, COLLECTION_TTL_MS, FALLBACK_TTL_MS, POLICY_TTL_MS, PROFILE_TTL_MS};
