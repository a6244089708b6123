//! Caching Interceptor
//!
//! Serves eligible reads from the cache and writes successful responses
//! through to it.

use std::sync::Arc;

use tracing::debug;

use super::message::{HttpRequest, HttpResponse};
use super::transport::Transport;
use super::ttl::ttl_for_url;
use crate::cache::{SharedCache, StorageBackend};
use crate::error::TransportError;

// == Caching Interceptor ==
/// Sits between callers and the transport.
///
/// The cache lock is never held across the network call. Two concurrent
/// misses for the same key both reach the network and the later write wins.
#[derive(Clone)]
pub struct CachingInterceptor {
    cache: SharedCache,
    transport: Arc<dyn Transport>,
    backend: StorageBackend,
}

impl CachingInterceptor {
    /// Creates an interceptor caching on the persisted backend.
    pub fn new(cache: SharedCache, transport: Arc<dyn Transport>) -> Self {
        Self {
            cache,
            transport,
            backend: StorageBackend::Persisted,
        }
    }

    pub fn with_backend(mut self, backend: StorageBackend) -> Self {
        self.backend = backend;
        self
    }

    pub fn backend(&self) -> StorageBackend {
        self.backend
    }

    // == Send ==
    /// Sends `request`, answering from the cache when possible.
    ///
    /// Only transport failures are returned as errors; cache problems never
    /// fail a request.
    pub async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        if !request.is_cacheable() {
            return self.transport.send(&request).await;
        }

        let key = request.cache_key();
        let cached = self.cache.write().await.read_value(&key, self.backend);

        if let Some(body) = cached {
            debug!("Cache hit for {}", request.url);
            return Ok(HttpResponse::from_cache(body, key));
        }

        debug!("Cache miss for {}, fetching from upstream", request.url);
        let response = self.transport.send(&request).await?;

        if response.is_success() {
            let ttl = ttl_for_url(&request.url);
            self.cache
                .write()
                .await
                .write(&key, &response.body, Some(ttl), self.backend);
        }

        Ok(response)
    }
}
