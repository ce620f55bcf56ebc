//! Cache invalidation port used after a merge commits.
//!
//! The core only knows which keys become stale. How they are purged (and
//! whatever caching policy sits behind them) belongs to the implementor of
//! [`CacheInvalidator`].

use async_trait::async_trait;

use crate::types::DbId;

/// Aggregate key for the paginated people list.
pub const PEOPLE_LIST_KEY: &str = "people-list:v1";

pub fn person_id_key(id: DbId) -> String {
    format!("person:id:{id}:v1")
}

pub fn person_slug_key(slug: &str) -> String {
    format!("person:slug:{slug}:v1")
}

/// Filmography keys for both cached payload versions.
pub fn filmography_keys(id: DbId) -> [String; 2] {
    [
        format!("person:filmography:{id}:v1"),
        format!("person:filmography:{id}:v2"),
    ]
}

/// A key the invalidator could not purge, with the transport's reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyFailure {
    pub key: String,
    pub reason: String,
}

/// Raised when one or more keys could not be purged.
#[derive(Debug, thiserror::Error)]
#[error("failed to invalidate {} cache key(s)", failures.len())]
pub struct InvalidationError {
    pub failures: Vec<KeyFailure>,
}

/// Narrow port for purging cache entries.
///
/// Implementations should attempt every key even when some fail, and
/// report the failed ones in [`InvalidationError::failures`].
#[async_trait]
pub trait CacheInvalidator: Send + Sync {
    async fn invalidate(&self, keys: &[String]) -> Result<(), InvalidationError>;
}

/// Invalidator that drops every request. Used when no cache is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopCacheInvalidator;

#[async_trait]
impl CacheInvalidator for NoopCacheInvalidator {
    async fn invalidate(&self, keys: &[String]) -> Result<(), InvalidationError> {
        tracing::debug!(count = keys.len(), "No cache configured, skipping invalidation");
        Ok(())
    }
}

/// Purge `keys`, logging each failure. Never returns an error.
pub async fn invalidate_best_effort(invalidator: &dyn CacheInvalidator, keys: &[String]) {
    match invalidator.invalidate(keys).await {
        Ok(()) => tracing::debug!(count = keys.len(), "Cache keys invalidated"),
        Err(err) => {
            for failure in &err.failures {
                tracing::warn!(
                    key = %failure.key,
                    reason = %failure.reason,
                    "Failed to invalidate cache key"
                );
            }
        }
    }
}
