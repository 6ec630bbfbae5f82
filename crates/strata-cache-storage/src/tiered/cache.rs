//! Tiered cache: local store in front of a far tier

use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use strata_cache_core::{
    CacheError, CacheValue, JsonSerializer, KeyNamer, LOG_TARGET, LookupStats, Result,
    Serializer, SimpleCache, StatsRecorder, retry,
};

use super::reconnect::ReconnectGuard;
use super::tier::{ErrorTriage, FarTier};
use crate::local::LocalTtlStore;

/// Settings of a tiered cache instance
#[derive(Debug, Clone)]
pub struct TieredConfig {
    /// TTL of entries in the local tier
    pub l1_ttl: Duration,
    /// TTL of entries in the far tier
    pub far_ttl: Duration,
    /// Return serialization failures instead of logging them
    pub strict_serialization: bool,
    /// Attempts per scheduled reconnection
    pub reconnect_attempts: u32,
}

impl Default for TieredConfig {
    fn default() -> Self {
        Self {
            l1_ttl: Duration::from_secs(5 * 60),
            far_ttl: Duration::from_secs(60 * 60),
            strict_serialization: false,
            reconnect_attempts: 1,
        }
    }
}

impl TieredConfig {
    /// Set the local tier TTL
    pub fn l1_ttl(mut self, ttl: Duration) -> Self {
        self.l1_ttl = ttl;
        self
    }

    /// Set the far tier TTL
    pub fn far_ttl(mut self, ttl: Duration) -> Self {
        self.far_ttl = ttl;
        self
    }

    /// Enable strict serialization
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict_serialization = strict;
        self
    }

    /// Set reconnection attempts
    pub fn reconnect_attempts(mut self, attempts: u32) -> Self {
        self.reconnect_attempts = attempts;
        self
    }

    /// TTL applied to local copies; never longer than the far tier TTL
    pub fn local_ttl(&self) -> Duration {
        self.l1_ttl.min(self.far_ttl)
    }
}

struct TieredInner {
    l1: LocalTtlStore,
    far: Arc<dyn FarTier>,
    namer: KeyNamer,
    config: TieredConfig,
    serializer: JsonSerializer,
    stats: StatsRecorder,
    reconnect: Arc<ReconnectGuard>,
}

/// Near/far cache
///
/// Reads check the local tier, then the far tier, then compute. Far tier
/// failures of any kind degrade to a miss; unreachable tiers are reconnected
/// in the background, at most one reconnection at a time.
///
/// Cloning creates a new handle to the SAME cache.
#[derive(Clone)]
pub struct TieredCache {
    inner: Arc<TieredInner>,
}

impl TieredCache {
    /// Create a cache over `far` with a fresh local tier
    pub fn new(far: Arc<dyn FarTier>, prefix: Option<&str>, config: TieredConfig) -> Self {
        Self::with_l1(LocalTtlStore::with_defaults(), far, prefix, config)
    }

    /// Create a cache over `far` using `l1` as the local tier
    pub fn with_l1(
        l1: LocalTtlStore,
        far: Arc<dyn FarTier>,
        prefix: Option<&str>,
        config: TieredConfig,
    ) -> Self {
        let stats = StatsRecorder::new(far.name());
        Self {
            inner: Arc::new(TieredInner {
                l1,
                far,
                namer: KeyNamer::new(prefix),
                config,
                serializer: JsonSerializer,
                stats,
                reconnect: Arc::new(ReconnectGuard::new()),
            }),
        }
    }

    /// Backend label of the far tier
    pub fn far_name(&self) -> &'static str {
        self.inner.far.name()
    }

    /// Local tier
    pub fn l1(&self) -> &LocalTtlStore {
        &self.inner.l1
    }

    /// Instance settings
    pub fn config(&self) -> &TieredConfig {
        &self.inner.config
    }

    /// Key namer of this cache
    pub fn namer(&self) -> &KeyNamer {
        &self.inner.namer
    }

    /// Lookup counters
    pub fn stats(&self) -> LookupStats {
        self.inner.stats.snapshot()
    }

    /// Whether a background reconnection is running
    pub fn reconnect_in_flight(&self) -> bool {
        self.inner.reconnect.is_in_flight()
    }

    async fn read_far<T: CacheValue>(&self, canonical: &str) -> Option<T> {
        let inner = &self.inner;
        match inner.far.get(canonical).await {
            Ok(Some(bytes)) => match inner.serializer.deserialize::<T>(&bytes) {
                Ok(value) => Some(value),
                Err(e) => {
                    self.handle_far_error("get", canonical, &e);
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                self.handle_far_error("get", canonical, &e);
                None
            }
        }
    }

    /// Write to the far tier (best effort) and then to the local tier
    async fn store<T: CacheValue>(&self, canonical: &str, value: &T) -> Result<()> {
        let inner = &self.inner;
        match inner.serializer.serialize(value) {
            Ok(bytes) => {
                if let Err(e) = inner.far.put(canonical, bytes, inner.config.far_ttl).await {
                    self.handle_far_error("put", canonical, &e);
                }
            }
            Err(e) if inner.config.strict_serialization => return Err(e),
            Err(e) => {
                tracing::error!(
                    target: LOG_TARGET,
                    backend = inner.far.name(),
                    key = %canonical,
                    error = %e,
                    "unable to serialize value; caching locally only"
                );
            }
        }

        inner.l1.add(canonical, value.clone(), inner.config.local_ttl());
        Ok(())
    }

    fn handle_far_error(&self, op: &'static str, canonical: &str, error: &CacheError) {
        let backend = self.inner.far.name();
        match self.inner.far.triage(error) {
            ErrorTriage::Reconnect => {
                tracing::error!(
                    target: LOG_TARGET,
                    backend,
                    op,
                    key = %canonical,
                    error = %error,
                    "far tier unreachable; treating as a miss and reconnecting"
                );
                self.schedule_reconnect();
            }
            ErrorTriage::Warn => {
                tracing::warn!(target: LOG_TARGET, backend, op, key = %canonical, error = %error, "far tier request failed");
            }
            ErrorTriage::Error => {
                tracing::error!(target: LOG_TARGET, backend, op, key = %canonical, error = %error, "far tier request failed");
            }
        }
    }

    fn schedule_reconnect(&self) {
        let Some(ticket) = self.inner.reconnect.try_acquire() else {
            tracing::debug!(target: LOG_TARGET, backend = self.far_name(), "reconnection already in flight");
            return;
        };

        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            tracing::warn!(
                target: LOG_TARGET,
                backend = self.far_name(),
                "no tokio runtime; skipping reconnection until the next connection error"
            );
            return;
        };

        let far = Arc::clone(&self.inner.far);
        let attempts = self.inner.config.reconnect_attempts;
        handle.spawn(async move {
            let _ticket = ticket;
            let outcome = retry(attempts, || far.reconnect()).await;
            if outcome.succeeded() {
                tracing::info!(target: LOG_TARGET, backend = far.name(), attempts = outcome.attempts, "far tier reconnected");
            } else {
                tracing::error!(
                    target: LOG_TARGET,
                    backend = far.name(),
                    attempts = outcome.attempts,
                    error = ?outcome.last_error,
                    "unable to reconnect far tier; will retry on the next connection error"
                );
            }
        });
    }
}

impl std::fmt::Debug for TieredCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TieredCache")
            .field("far", &self.far_name())
            .field("prefix", &self.inner.namer.prefix())
            .field("config", &self.inner.config)
            .finish()
    }
}

#[async_trait]
impl SimpleCache for TieredCache {
    async fn get_async<T, E, F, Fut>(&self, key: &str, compute: F) -> std::result::Result<T, E>
    where
        T: CacheValue,
        E: From<CacheError> + Send,
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = std::result::Result<T, E>> + Send,
    {
        let inner = &self.inner;
        let canonical = inner.namer.name::<T>(key);

        if let Some(value) = inner.l1.get::<T>(&canonical) {
            inner.stats.record_lookup(true);
            return Ok(value);
        }

        if let Some(value) = self.read_far::<T>(&canonical).await {
            inner.l1.add(&canonical, value.clone(), inner.config.local_ttl());
            inner.stats.record_lookup(true);
            return Ok(value);
        }

        inner.stats.record_lookup(false);
        let value = compute().await?;
        self.store(&canonical, &value).await?;
        Ok(value)
    }

    async fn add<T: CacheValue>(&self, key: &str, value: T) -> Result<()> {
        let canonical = self.inner.namer.name::<T>(key);
        self.store(&canonical, &value).await
    }

    async fn remove<T: CacheValue>(&self, key: &str) -> bool {
        let canonical = self.inner.namer.name::<T>(key);
        self.inner.l1.remove(&canonical);
        match self.inner.far.remove(&canonical).await {
            Ok(_) => true,
            Err(e) => {
                self.handle_far_error("remove", &canonical, &e);
                false
            }
        }
    }

    async fn try_get<T: CacheValue>(&self, key: &str) -> Option<T> {
        let canonical = self.inner.namer.name::<T>(key);
        let value = match self.inner.l1.get::<T>(&canonical) {
            Some(value) => Some(value),
            None => self.read_far::<T>(&canonical).await,
        };
        self.inner.stats.record_lookup(value.is_some());
        value
    }
}
