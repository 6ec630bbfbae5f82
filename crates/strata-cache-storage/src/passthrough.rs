//! Cache that caches nothing

use async_trait::async_trait;
use std::future::Future;

use strata_cache_core::{
    CacheError, CacheValue, JsonSerializer, LOG_TARGET, Result, Serializer, SimpleCache,
};

/// Null-object cache: every `get` computes, nothing is ever stored
///
/// The strict flavour encodes each computed value and fails the call when it
/// cannot be encoded, which surfaces values that a far tier would reject.
#[derive(Debug, Clone, Default)]
pub struct PassThroughCache {
    check_serialization: bool,
    serializer: JsonSerializer,
}

impl PassThroughCache {
    /// Pass-through without serialization checks
    pub fn new() -> Self {
        Self::default()
    }

    /// Pass-through that verifies every computed value serializes
    pub fn strict() -> Self {
        Self {
            check_serialization: true,
            serializer: JsonSerializer,
        }
    }

    /// Whether computed values are checked
    pub fn is_strict(&self) -> bool {
        self.check_serialization
    }

    fn check<T: CacheValue>(&self, value: &T) -> Result<()> {
        if !self.check_serialization {
            return Ok(());
        }
        self.serializer.check(value).inspect_err(|e| {
            tracing::warn!(target: LOG_TARGET, type_name = %T::type_name(), error = %e, "value cannot be serialized");
        })
    }
}

#[async_trait]
impl SimpleCache for PassThroughCache {
    async fn get_async<T, E, F, Fut>(&self, _key: &str, compute: F) -> std::result::Result<T, E>
    where
        T: CacheValue,
        E: From<CacheError> + Send,
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = std::result::Result<T, E>> + Send,
    {
        let value = compute().await?;
        self.check(&value)?;
        Ok(value)
    }

    async fn add<T: CacheValue>(&self, _key: &str, _value: T) -> Result<()> {
        Ok(())
    }

    async fn remove<T: CacheValue>(&self, _key: &str) -> bool {
        true
    }

    async fn try_get<T: CacheValue>(&self, _key: &str) -> Option<T> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn test_always_computes() {
        let cache = PassThroughCache::new();
        let calls = AtomicU32::new(0);

        for _ in 0..3 {
            let value: std::result::Result<String, CacheError> = cache
                .get("k", || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok("v".to_string())
                })
                .await;
            assert_eq!(value.unwrap(), "v");
        }
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_stores_nothing() {
        let cache = PassThroughCache::new();
        cache.add("k", 1i32).await.unwrap();

        assert_eq!(cache.try_get::<i32>("k").await, None);
        assert!(cache.remove::<i32>("k").await);
    }

    #[tokio::test]
    async fn test_strict_rejects_unserializable() {
        let cache = PassThroughCache::strict();
        let mut map = HashMap::new();
        map.insert(vec![1u8, 2], 1i32);

        let result: std::result::Result<HashMap<Vec<u8>, i32>, CacheError> =
            cache.get("k", || Ok(map)).await;
        assert!(matches!(result, Err(CacheError::Serialization(_))));
    }

    #[tokio::test]
    async fn test_production_skips_check() {
        let cache = PassThroughCache::new();
        let mut map = HashMap::new();
        map.insert(vec![1u8, 2], 1i32);

        let result: std::result::Result<HashMap<Vec<u8>, i32>, CacheError> =
            cache.get("k", || Ok(map.clone())).await;
        assert_eq!(result.unwrap(), map);
    }
}
