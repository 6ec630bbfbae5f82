//! Named cache on a managed Redis-protocol endpoint

use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;

use strata_cache_core::{CacheError, LOG_TARGET, Result};

use super::config::ManagedConfig;
use crate::redis::RedisTier;
use crate::tiered::{ErrorTriage, FarTier};

/// Managed distributed cache far tier
///
/// Scopes keys to the named cache and runs every request on `endpoint`
/// under the configured deadline. Values whose stored shape no longer
/// decodes are expected after deploys and only warned about.
#[derive(Debug)]
pub struct ManagedTier<E = RedisTier> {
    endpoint: E,
    config: ManagedConfig,
}

impl ManagedTier<RedisTier> {
    /// Connect to the named cache
    pub async fn connect(config: ManagedConfig) -> Result<Self> {
        let endpoint = RedisTier::connect(config.endpoint.clone()).await?;
        tracing::debug!(target: LOG_TARGET, cache = %config.cache_name, "created managed cache");
        Ok(Self::with_endpoint(endpoint, config))
    }
}

impl<E: FarTier> ManagedTier<E> {
    /// Address the named cache through an already connected tier
    pub fn with_endpoint(endpoint: E, config: ManagedConfig) -> Self {
        Self { endpoint, config }
    }

    /// Cache settings
    pub fn config(&self) -> &ManagedConfig {
        &self.config
    }

    async fn bounded<T>(&self, request: impl Future<Output = Result<T>>) -> Result<T> {
        tokio::time::timeout(self.config.request_timeout, request)
            .await
            .map_err(|_| CacheError::Timeout)?
    }
}

#[async_trait]
impl<E: FarTier> FarTier for ManagedTier<E> {
    fn name(&self) -> &'static str {
        "managed"
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let key = self.config.scoped_key(key);
        self.bounded(self.endpoint.get(&key)).await
    }

    async fn put(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<()> {
        let key = self.config.scoped_key(key);
        self.bounded(self.endpoint.put(&key, value, ttl)).await
    }

    async fn remove(&self, key: &str) -> Result<bool> {
        let key = self.config.scoped_key(key);
        self.bounded(self.endpoint.remove(&key)).await
    }

    async fn reconnect(&self) -> Result<()> {
        self.bounded(self.endpoint.reconnect()).await
    }

    fn triage(&self, error: &CacheError) -> ErrorTriage {
        classify(error)
    }
}

fn classify(error: &CacheError) -> ErrorTriage {
    match error {
        CacheError::Deserialization(_) | CacheError::Timeout => ErrorTriage::Warn,
        CacheError::Connection(_) => ErrorTriage::Reconnect,
        _ => ErrorTriage::Error,
    }
}
