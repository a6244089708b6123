//! API Handlers
//!
//! HTTP request handlers for the caching gateway.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header::AUTHORIZATION, HeaderMap, Method},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;

use crate::cache::{shared, CacheStore, FileStorage, ResponseCache, SharedCache, StorageBackend};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::intercept::{CachingInterceptor, HttpRequest, ReqwestTransport, Transport};
use crate::models::{
    BackendQuery, HealthResponse, InvalidateRequest, InvalidateResponse, StatsResponse,
};
use crate::mutations::MutationGateway;

/// Header telling clients how a proxied response was served.
pub const CACHE_STATUS_HEADER: &str = "x-cache";

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Shared response cache
    pub cache: SharedCache,
    /// Cached read path
    pub interceptor: CachingInterceptor,
    /// Mutation path with invalidation
    pub mutations: MutationGateway,
    /// Base URL proxied requests are sent to
    pub upstream_url: String,
}

impl AppState {
    /// Creates a new AppState around `cache` and `transport`.
    pub fn new(
        cache: ResponseCache,
        transport: Arc<dyn Transport>,
        upstream_url: impl Into<String>,
    ) -> Self {
        let cache = shared(cache);
        Self {
            interceptor: CachingInterceptor::new(cache.clone(), transport.clone()),
            mutations: MutationGateway::new(cache.clone(), transport),
            cache,
            upstream_url: upstream_url.into(),
        }
    }

    /// Serves cached reads from `backend` instead of the persisted store.
    pub fn with_read_backend(mut self, backend: StorageBackend) -> Self {
        self.interceptor = self.interceptor.with_backend(backend);
        self
    }

    /// Creates a new AppState from configuration.
    ///
    /// Opens the persisted cache file and talks to the upstream over reqwest.
    pub fn from_config(config: &Config) -> Self {
        let storage = FileStorage::open(&config.cache_file, Some(config.storage_quota));
        let cache = ResponseCache::with_default_ttl(
            CacheStore::new(Box::new(storage)),
            config.default_ttl_ms,
        );
        Self::new(
            cache,
            Arc::new(ReqwestTransport::default()),
            config.upstream_url.clone(),
        )
        .with_read_backend(config.read_backend)
    }
}

/// Handler for ANY /api/*path
///
/// Forwards the request upstream. Reads go through the cache, everything
/// else through the mutation gateway.
///
/// Only the `Authorization` header is forwarded. Reads carrying it bypass
/// the cache, since cache keys do not identify the caller.
pub async fn proxy_handler(
    State(state): State<AppState>,
    method: Method,
    Path(path): Path<String>,
    Query(query): Query<Vec<(String, String)>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response> {
    let mut request = HttpRequest::new(method, format!("{}/{}", state.upstream_url, path));
    request.query_params = query;
    request.authorization = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    if !body.is_empty() {
        let json: Value = serde_json::from_slice(&body).map_err(|e| {
            CacheError::InvalidRequest(format!("Body is not valid JSON: {}", e))
        })?;
        request.body = Some(json);
    }

    let (response, cache_status) = if request.is_cacheable() {
        let response = state.interceptor.send(request).await?;
        let cache_status = if response.is_from_cache() { "HIT" } else { "MISS" };
        (response, cache_status)
    } else {
        (state.mutations.send(request).await?, "BYPASS")
    };

    Ok((
        response.status,
        [(CACHE_STATUS_HEADER, cache_status)],
        Json(response.body),
    )
        .into_response())
}

/// Handler for GET /stats
///
/// Returns current cache statistics.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let cache = state.cache.read().await;
    Json(StatsResponse::from(cache.stats()))
}

/// Handler for DELETE /cache
///
/// Clears one backend (default: persisted).
pub async fn clear_handler(
    State(state): State<AppState>,
    Query(query): Query<BackendQuery>,
) -> Json<InvalidateResponse> {
    let removed = state.cache.write().await.clear(query.backend);
    Json(InvalidateResponse::new(removed, query.backend))
}

/// Handler for POST /cache/invalidate
///
/// Removes entries by pattern or by exact keys.
pub async fn invalidate_handler(
    State(state): State<AppState>,
    Json(req): Json<InvalidateRequest>,
) -> Result<Json<InvalidateResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let mut cache = state.cache.write().await;
    let removed = match (&req.pattern, &req.keys) {
        (Some(pattern), _) => cache.remove_by_pattern(pattern, req.backend),
        (None, Some(keys)) => cache.remove_exact(keys, req.backend),
        (None, None) => 0,
    };

    Ok(Json(InvalidateResponse::new(removed, req.backend)))
}

/// Handler for GET /health
///
/// Returns health status of the gateway.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
