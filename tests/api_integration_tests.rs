//! Integration Tests for the Caching Gateway
//!
//! Drives the full router with a recording transport in place of the upstream API.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use policy_cache::{
    api::create_router,
    cache::{CacheStore, ManualClock, MemoryStorage},
    error::TransportError,
    intercept::{HttpRequest, HttpResponse, Transport},
    AppState, ResponseCache, StorageBackend,
};
use serde_json::{json, Value};
use tower::ServiceExt;

const UPSTREAM: &str = "http://localhost:5002/api";
const T0: u64 = 1_700_000_000_000;
const CLIENTS_KEY: &str = "http___localhost_5002_api_clientes";

// == Helper Types ==

/// Upstream stand-in: GETs echo the URL, mutations succeed with `mutation_status`.
struct RecordingTransport {
    calls: Mutex<Vec<(Method, String)>>,
    mutation_status: StatusCode,
}

impl RecordingTransport {
    fn new(mutation_status: StatusCode) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            mutation_status,
        })
    }

    fn gets(&self) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(method, _)| method == Method::GET)
            .count()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let call_number = {
            let mut calls = self.calls.lock().unwrap();
            calls.push((request.method.clone(), request.url.clone()));
            calls.len()
        };

        if request.method == Method::GET {
            Ok(HttpResponse::network(
                StatusCode::OK,
                json!({"url": request.url, "query": request.query_params, "call": call_number}),
            ))
        } else {
            Ok(HttpResponse::network(
                self.mutation_status,
                json!({"success": self.mutation_status.is_success()}),
            ))
        }
    }
}

struct TestApp {
    router: Router,
    state: AppState,
    transport: Arc<RecordingTransport>,
    clock: ManualClock,
}

fn create_test_app(mutation_status: StatusCode) -> TestApp {
    let clock = ManualClock::new(T0);
    let storage = Box::new(MemoryStorage::new());
    let store = CacheStore::with_clock(storage, Arc::new(clock.clone()));
    let transport = RecordingTransport::new(mutation_status);
    let state = AppState::new(ResponseCache::new(store), transport.clone(), UPSTREAM);

    TestApp {
        router: create_router(state.clone()),
        state,
        transport,
        clock,
    }
}

async fn send(
    app: &TestApp,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, String, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .router
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let cache_status = response
        .headers()
        .get("x-cache")
        .map(|v| v.to_str().unwrap().to_string())
        .unwrap_or_default();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, cache_status, json)
}

async fn cached_keys(app: &TestApp) -> Vec<String> {
    let mut keys = app
        .state
        .cache
        .read()
        .await
        .store()
        .keys(StorageBackend::Persisted);
    keys.sort();
    keys
}

// == Read-through Caching ==

#[tokio::test]
async fn test_clients_list_cached_after_first_read() {
    let app = create_test_app(StatusCode::CREATED);

    let (status, cache_status, first) = send(&app, "GET", "/api/clientes", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cache_status, "MISS");
    assert_eq!(app.transport.gets(), 1);

    let (status, cache_status, second) = send(&app, "GET", "/api/clientes", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cache_status, "HIT");
    assert_eq!(second, first);
    assert_eq!(app.transport.gets(), 1, "a hit must not reach the upstream");
}

#[tokio::test]
async fn test_clients_list_ttl_is_ten_minutes() {
    let app = create_test_app(StatusCode::CREATED);
    send(&app, "GET", "/api/clientes", None).await;

    app.clock.advance(600_000);
    let (_, cache_status, _) = send(&app, "GET", "/api/clientes", None).await;
    assert_eq!(cache_status, "HIT");

    app.clock.advance(1);
    let (_, cache_status, _) = send(&app, "GET", "/api/clientes", None).await;
    assert_eq!(cache_status, "MISS");
    assert_eq!(app.transport.gets(), 2);
}

#[tokio::test]
async fn test_query_order_does_not_matter() {
    let app = create_test_app(StatusCode::CREATED);

    send(&app, "GET", "/api/Polizas?tipo=1&estatus=2", None).await;
    let (_, cache_status, _) = send(&app, "GET", "/api/Polizas?estatus=2&tipo=1", None).await;

    assert_eq!(cache_status, "HIT");
    assert_eq!(app.transport.gets(), 1);
}

#[tokio::test]
async fn test_different_query_is_a_different_entry() {
    let app = create_test_app(StatusCode::CREATED);

    send(&app, "GET", "/api/Polizas?tipo=1", None).await;
    let (_, cache_status, _) = send(&app, "GET", "/api/Polizas?tipo=2", None).await;

    assert_eq!(cache_status, "MISS");
    assert_eq!(cached_keys(&app).await.len(), 2);
}

#[tokio::test]
async fn test_credentialed_read_is_never_cached() {
    let app = create_test_app(StatusCode::OK);

    for _ in 0..2 {
        let request = Request::builder()
            .uri("/api/User/7")
            .header("authorization", "Bearer abc")
            .body(Body::empty())
            .unwrap();
        let response = app.router.clone().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["x-cache"], "BYPASS");
    }

    assert_eq!(app.transport.gets(), 2);
    assert!(cached_keys(&app).await.is_empty());
}

// == Mutation Invalidation ==

#[tokio::test]
async fn test_client_create_invalidates_cached_list() {
    let app = create_test_app(StatusCode::CREATED);
    send(&app, "GET", "/api/clientes", None).await;
    assert_eq!(cached_keys(&app).await, vec![CLIENTS_KEY.to_string()]);

    let (status, cache_status, _) =
        send(&app, "POST", "/api/clientes", Some(json!({"nombre": "Ana"}))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(cache_status, "BYPASS");
    assert!(cached_keys(&app).await.is_empty());

    let (_, cache_status, _) = send(&app, "GET", "/api/clientes", None).await;
    assert_eq!(cache_status, "MISS");
    assert_eq!(app.transport.gets(), 2);
}

#[tokio::test]
async fn test_policy_update_keeps_client_views() {
    let app = create_test_app(StatusCode::OK);
    send(&app, "GET", "/api/clientes", None).await;
    send(&app, "GET", "/api/Polizas/vigentes", None).await;
    send(&app, "GET", "/api/Polizas/cliente/5", None).await;

    send(&app, "PUT", "/api/Polizas/3", Some(json!({"prima": 1200}))).await;

    assert_eq!(cached_keys(&app).await, vec![CLIENTS_KEY.to_string()]);
}

#[tokio::test]
async fn test_client_delete_cascades_to_policies() {
    let app = create_test_app(StatusCode::OK);
    send(&app, "GET", "/api/clientes", None).await;
    send(&app, "GET", "/api/Polizas/cliente/5", None).await;
    send(&app, "GET", "/api/catalogos/tipos", None).await;

    send(&app, "DELETE", "/api/clientes/5", None).await;

    assert_eq!(
        cached_keys(&app).await,
        vec!["http___localhost_5002_api_catalogos_tipos".to_string()]
    );
}

#[tokio::test]
async fn test_failed_mutation_keeps_cache() {
    let app = create_test_app(StatusCode::BAD_REQUEST);
    send(&app, "GET", "/api/clientes", None).await;

    let (status, _, _) = send(&app, "POST", "/api/clientes", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, cache_status, _) = send(&app, "GET", "/api/clientes", None).await;
    assert_eq!(cache_status, "HIT");
}

// == Cache Management Endpoints ==

#[tokio::test]
async fn test_manual_pattern_invalidation() {
    let app = create_test_app(StatusCode::OK);
    send(&app, "GET", "/api/Polizas/vigentes", None).await;
    send(&app, "GET", "/api/clientes", None).await;

    let (status, _, json) = send(
        &app,
        "POST",
        "/cache/invalidate",
        Some(json!({"pattern": "Polizas", "backend": "persisted"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["removed"], 1);
    assert_eq!(json["backend"], "persisted");
    assert_eq!(cached_keys(&app).await.len(), 1);
}

#[tokio::test]
async fn test_manual_exact_invalidation_is_idempotent() {
    let app = create_test_app(StatusCode::OK);
    send(&app, "GET", "/api/clientes", None).await;
    let body = json!({"keys": [CLIENTS_KEY]});

    let (_, _, first) = send(&app, "POST", "/cache/invalidate", Some(body.clone())).await;
    let (_, _, second) = send(&app, "POST", "/cache/invalidate", Some(body)).await;

    assert_eq!(first["removed"], 1);
    assert_eq!(second["removed"], 0);
}

#[tokio::test]
async fn test_clear_endpoint() {
    let app = create_test_app(StatusCode::OK);
    send(&app, "GET", "/api/clientes", None).await;
    send(&app, "GET", "/api/Polizas/vigentes", None).await;

    let (status, _, json) = send(&app, "DELETE", "/cache?backend=persisted", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["removed"], 2);
    assert!(cached_keys(&app).await.is_empty());
}

#[tokio::test]
async fn test_stats_endpoint_counts_hits_and_misses() {
    let app = create_test_app(StatusCode::OK);
    send(&app, "GET", "/api/clientes", None).await;
    send(&app, "GET", "/api/clientes", None).await;
    send(&app, "GET", "/api/clientes", None).await;

    let (status, _, json) = send(&app, "GET", "/stats", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["hits"], 2);
    assert_eq!(json["misses"], 1);
    assert_eq!(json["persisted_entries"], 1);
    assert!((json["hit_rate"].as_f64().unwrap() - 2.0 / 3.0).abs() < 0.001);
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_test_app(StatusCode::OK);

    let (status, _, json) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
    assert!(json.get("timestamp").is_some());
}
