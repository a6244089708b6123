//! Mutation Gateway
//!
//! Sends create/update/delete requests and invalidates the cached views
//! they make stale.

use std::sync::Arc;

use tracing::info;

use super::rules::{classify, invalidation_patterns, Mutation, Resource};
use crate::cache::{SharedCache, StorageBackend};
use crate::error::TransportError;
use crate::intercept::{HttpRequest, HttpResponse, Transport};

/// Backends cleaned after a mutation.
const INVALIDATED_BACKENDS: [StorageBackend; 2] =
    [StorageBackend::InMemory, StorageBackend::Persisted];

#[derive(Clone)]
pub struct MutationGateway {
    cache: SharedCache,
    transport: Arc<dyn Transport>,
}

impl MutationGateway {
    pub fn new(cache: SharedCache, transport: Arc<dyn Transport>) -> Self {
        Self { cache, transport }
    }

    // == Send ==
    /// Forwards `request`; on a 2xx answer invalidates what the mutation
    /// made stale. The response is returned unchanged.
    pub async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let response = self.transport.send(&request).await?;

        if response.is_success() {
            if let Some((resource, mutation)) = classify(&request) {
                self.invalidate(resource, mutation).await;
            }
        }

        Ok(response)
    }

    // == Invalidate ==
    /// Applies the invalidation rules for `mutation` on `resource`.
    ///
    /// Returns the number of entries removed.
    pub async fn invalidate(&self, resource: Resource, mutation: Mutation) -> usize {
        let patterns = invalidation_patterns(resource, mutation);
        let mut cache = self.cache.write().await;

        let removed: usize = patterns
            .iter()
            .flat_map(|pattern| INVALIDATED_BACKENDS.into_iter().map(move |b| (*pattern, b)))
            .map(|(pattern, backend)| cache.remove_by_pattern(pattern, backend))
            .sum();

        info!("{:?} {:?}: invalidated {} cache entries", mutation, resource, removed);
        removed
    }
}
