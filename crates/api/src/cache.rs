//! HTTP adapter for the cache invalidation port.
//!
//! [`HttpCacheInvalidator`] purges each key with `DELETE {base_url}/{key}`.
//! All keys are sent concurrently and every failure is reported back, so a
//! single unreachable entry never hides the others.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use cinecat_core::cache::{CacheInvalidator, InvalidationError, KeyFailure, NoopCacheInvalidator};
use futures::future::join_all;
use reqwest::StatusCode;

use crate::config::ServerConfig;

/// HTTP request timeout for a single purge.
const PURGE_TIMEOUT: Duration = Duration::from_secs(5);

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Why a single key could not be purged.
#[derive(Debug, thiserror::Error)]
pub enum PurgeError {
    /// The underlying HTTP request failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The purge endpoint returned a non-2xx status other than 404.
    #[error("Purge endpoint returned HTTP {0}")]
    HttpStatus(u16),
}

// ---------------------------------------------------------------------------
// HttpCacheInvalidator
// ---------------------------------------------------------------------------

pub struct HttpCacheInvalidator {
    client: reqwest::Client,
    base_url: String,
}

impl HttpCacheInvalidator {
    pub fn new(base_url: impl Into<String>) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(PURGE_TIMEOUT).build()?;
        Ok(Self::with_client(client, base_url))
    }

    /// Create an invalidator reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn key_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url, key)
    }

    async fn purge(&self, key: &str) -> Result<(), PurgeError> {
        let response = self.client.delete(self.key_url(key)).send().await?;
        let status = response.status();
        // A key that was never cached is already purged.
        if status.is_success() || status == StatusCode::NOT_FOUND {
            return Ok(());
        }
        Err(PurgeError::HttpStatus(status.as_u16()))
    }
}

#[async_trait]
impl CacheInvalidator for HttpCacheInvalidator {
    async fn invalidate(&self, keys: &[String]) -> Result<(), InvalidationError> {
        let results = join_all(keys.iter().map(|key| self.purge(key))).await;

        let failures: Vec<KeyFailure> = keys
            .iter()
            .zip(results)
            .filter_map(|(key, result)| {
                result.err().map(|e| KeyFailure {
                    key: key.clone(),
                    reason: e.to_string(),
                })
            })
            .collect();

        if failures.is_empty() {
            Ok(())
        } else {
            Err(InvalidationError { failures })
        }
    }
}

/// Pick the invalidator for the configured environment.
///
/// Without `CACHE_PURGE_URL` invalidation requests are only logged.
pub fn build_invalidator(config: &ServerConfig) -> Result<Arc<dyn CacheInvalidator>, reqwest::Error> {
    match &config.cache_purge_url {
        Some(url) => {
            tracing::info!(url = %url, "Cache purging enabled");
            Ok(Arc::new(HttpCacheInvalidator::new(url.clone())?))
        }
        None => {
            tracing::info!("No CACHE_PURGE_URL configured, cache invalidation disabled");
            Ok(Arc::new(NoopCacheInvalidator))
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
