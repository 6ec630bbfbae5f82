//! Cache handed out by the selector

use async_trait::async_trait;
use std::future::Future;

use strata_cache_core::{CacheError, CacheValue, LookupStats, Result, SimpleCache};
use strata_cache_storage::{LocalCache, PassThroughCache, TieredCache};

/// Any cache the selector can build
///
/// Dispatches the [`SimpleCache`] contract to the variant it holds.
#[derive(Debug, Clone)]
pub enum Cache {
    /// Caches nothing
    PassThrough(PassThroughCache),
    /// In-process only
    Local(LocalCache),
    /// Local tier in front of a far tier
    Tiered(TieredCache),
}

impl Cache {
    /// Backend label
    pub fn backend(&self) -> &'static str {
        match self {
            Cache::PassThrough(_) => "passthrough",
            Cache::Local(_) => "local",
            Cache::Tiered(cache) => cache.far_name(),
        }
    }

    /// Whether this cache only lives in process
    pub fn is_local(&self) -> bool {
        matches!(self, Cache::Local(_))
    }

    /// Lookup counters; pass-through caches count nothing
    pub fn stats(&self) -> LookupStats {
        match self {
            Cache::PassThrough(_) => LookupStats::default(),
            Cache::Local(cache) => cache.stats(),
            Cache::Tiered(cache) => cache.stats(),
        }
    }
}

impl From<PassThroughCache> for Cache {
    fn from(cache: PassThroughCache) -> Self {
        Cache::PassThrough(cache)
    }
}

impl From<LocalCache> for Cache {
    fn from(cache: LocalCache) -> Self {
        Cache::Local(cache)
    }
}

impl From<TieredCache> for Cache {
    fn from(cache: TieredCache) -> Self {
        Cache::Tiered(cache)
    }
}

#[async_trait]
impl SimpleCache for Cache {
    async fn get<T, E, F>(&self, key: &str, compute: F) -> std::result::Result<T, E>
    where
        T: CacheValue,
        E: From<CacheError> + Send,
        F: FnOnce() -> std::result::Result<T, E> + Send,
    {
        match self {
            Cache::PassThrough(cache) => cache.get(key, compute).await,
            Cache::Local(cache) => cache.get(key, compute).await,
            Cache::Tiered(cache) => cache.get(key, compute).await,
        }
    }

    async fn get_async<T, E, F, Fut>(&self, key: &str, compute: F) -> std::result::Result<T, E>
    where
        T: CacheValue,
        E: From<CacheError> + Send,
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = std::result::Result<T, E>> + Send,
    {
        match self {
            Cache::PassThrough(cache) => cache.get_async(key, compute).await,
            Cache::Local(cache) => cache.get_async(key, compute).await,
            Cache::Tiered(cache) => cache.get_async(key, compute).await,
        }
    }

    async fn add<T: CacheValue>(&self, key: &str, value: T) -> Result<()> {
        match self {
            Cache::PassThrough(cache) => cache.add(key, value).await,
            Cache::Local(cache) => cache.add(key, value).await,
            Cache::Tiered(cache) => cache.add(key, value).await,
        }
    }

    async fn remove<T: CacheValue>(&self, key: &str) -> bool {
        match self {
            Cache::PassThrough(cache) => cache.remove::<T>(key).await,
            Cache::Local(cache) => cache.remove::<T>(key).await,
            Cache::Tiered(cache) => cache.remove::<T>(key).await,
        }
    }

    async fn try_get<T: CacheValue>(&self, key: &str) -> Option<T> {
        match self {
            Cache::PassThrough(cache) => cache.try_get(key).await,
            Cache::Local(cache) => cache.try_get(key).await,
            Cache::Tiered(cache) => cache.try_get(key).await,
        }
    }
}
