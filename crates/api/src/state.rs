use std::sync::Arc;

use cinecat_core::cache::CacheInvalidator;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: cinecat_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Purges cached person payloads after a merge commits.
    pub invalidator: Arc<dyn CacheInvalidator>,
}
