//! Policy Cache - response cache for the clients/policies API
//!
//! Caches read responses by request identity with per-endpoint TTLs, keeps
//! them in memory or in a persisted store, and invalidates them by pattern
//! when clients or policies change.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod intercept;
pub mod models;
pub mod mutations;

pub use api::AppState;
pub use cache::{ResponseCache, SharedCache, StorageBackend};
pub use config::Config;
pub use intercept::CachingInterceptor;
pub use mutations::MutationGateway;
