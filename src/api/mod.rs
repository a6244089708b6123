//! API Module
//!
//! HTTP handlers and routing for the caching gateway.
//!
//! # Endpoints
//! - `ANY /api/*path` - Proxy to the upstream clients/policies API
//! - `GET /stats` - Get cache statistics
//! - `DELETE /cache` - Clear a cache backend
//! - `POST /cache/invalidate` - Invalidate by pattern or keys
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
