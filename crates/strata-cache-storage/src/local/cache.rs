//! Local-only cache

use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use strata_cache_core::{
    CacheError, CacheValue, KeyNamer, LookupStats, Result, SimpleCache, StatsRecorder,
};

use super::store::LocalTtlStore;

/// Cache backed only by an in-process [`LocalTtlStore`]
///
/// Every entry written through this cache lives for the same fixed TTL.
#[derive(Debug, Clone)]
pub struct LocalCache {
    store: LocalTtlStore,
    namer: KeyNamer,
    ttl: Duration,
    stats: Arc<StatsRecorder>,
}

impl LocalCache {
    /// Create a cache over a fresh store
    pub fn new(prefix: Option<&str>, ttl: Duration) -> Self {
        Self::with_store(LocalTtlStore::with_defaults(), prefix, ttl)
    }

    /// Create a cache over an existing store
    pub fn with_store(store: LocalTtlStore, prefix: Option<&str>, ttl: Duration) -> Self {
        Self {
            store,
            namer: KeyNamer::new(prefix),
            ttl,
            stats: Arc::new(StatsRecorder::new("local")),
        }
    }

    /// TTL applied to every entry
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Key namer of this cache
    pub fn namer(&self) -> &KeyNamer {
        &self.namer
    }

    /// Underlying store
    pub fn store(&self) -> &LocalTtlStore {
        &self.store
    }

    /// Lookup counters
    pub fn stats(&self) -> LookupStats {
        self.stats.snapshot()
    }

    fn lookup<T: CacheValue>(&self, canonical: &str) -> Option<T> {
        let value = self.store.get::<T>(canonical);
        self.stats.record_lookup(value.is_some());
        value
    }
}

#[async_trait]
impl SimpleCache for LocalCache {
    async fn get_async<T, E, F, Fut>(&self, key: &str, compute: F) -> std::result::Result<T, E>
    where
        T: CacheValue,
        E: From<CacheError> + Send,
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = std::result::Result<T, E>> + Send,
    {
        let canonical = self.namer.name::<T>(key);
        if let Some(value) = self.lookup::<T>(&canonical) {
            return Ok(value);
        }

        let value = compute().await?;
        self.store.add(&canonical, value.clone(), self.ttl);
        Ok(value)
    }

    async fn add<T: CacheValue>(&self, key: &str, value: T) -> Result<()> {
        self.store.add(&self.namer.name::<T>(key), value, self.ttl);
        Ok(())
    }

    async fn remove<T: CacheValue>(&self, key: &str) -> bool {
        self.store.remove(&self.namer.name::<T>(key))
    }

    async fn try_get<T: CacheValue>(&self, key: &str) -> Option<T> {
        self.lookup::<T>(&self.namer.name::<T>(key))
    }
}
