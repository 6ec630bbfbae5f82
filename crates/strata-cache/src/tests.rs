//! Integration tests for selector-built caches

#[cfg(test)]
mod tests {
    use crate::prelude::*;
    use crate::{BackendFactory, FarTier, KeyNamer, LocalCache, LocalConfig, LocalTtlStore, ManualClock, MemoryTier};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    #[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
    struct TestData {
        id: u64,
        name: String,
        value: i32,
    }

    impl TypeName for TestData {
        fn type_name() -> String {
            "TestData".to_string()
        }
    }

    #[derive(Debug, PartialEq)]
    enum AppError {
        Cache(String),
        Upstream(&'static str),
    }

    impl From<CacheError> for AppError {
        fn from(e: CacheError) -> Self {
            AppError::Cache(e.to_string())
        }
    }

    /// Hands out one shared in-memory far tier and records what was asked for
    struct SharedTierFactory {
        tier: MemoryTier,
        requested: Mutex<Vec<BackendKind>>,
    }

    impl SharedTierFactory {
        fn new(tier: MemoryTier) -> Arc<Self> {
            Arc::new(Self {
                tier,
                requested: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl BackendFactory for SharedTierFactory {
        async fn connect(&self, kind: BackendKind, _: &BackendConfig) -> Result<Arc<dyn FarTier>> {
            self.requested.lock().push(kind);
            Ok(Arc::new(self.tier.clone()))
        }
    }

    struct CountingFailingFactory {
        attempts: AtomicU32,
    }

    #[async_trait]
    impl BackendFactory for CountingFailingFactory {
        async fn connect(&self, _: BackendKind, _: &BackendConfig) -> Result<Arc<dyn FarTier>> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            Err(CacheError::Construction("no route to host".into()))
        }
    }

    fn data() -> TestData {
        TestData {
            id: 1,
            name: "test".to_string(),
            value: 42,
        }
    }

    async fn local_cache() -> Cache {
        CacheSelector::new(BackendConfig::new(BackendKind::Local))
            .get_cache(Some("app"), None)
            .await
    }

    #[tokio::test]
    async fn test_add_try_get_round_trip() {
        let cache = local_cache().await;

        cache.add("test_key", data()).await.unwrap();
        assert_eq!(cache.try_get::<TestData>("test_key").await, Some(data()));
    }

    #[tokio::test]
    async fn test_absent_key() {
        let cache = local_cache().await;
        assert_eq!(cache.try_get::<TestData>("nonexistent").await, None);
    }

    #[test]
    fn test_key_naming() {
        let namer = KeyNamer::new(None);
        assert_eq!(namer.name::<String>("somevalue"), "String.somevalue");

        let namer = KeyNamer::new(Some("someKeyPrefix"));
        assert_eq!(
            namer.name::<String>("somevalue"),
            "someKeyPrefix.String.somevalue"
        );
        assert_eq!(
            namer.name::<HashMap<String, serde_json::Value>>("somevalue"),
            "someKeyPrefix.Dictionary<String, Object>.somevalue"
        );
    }

    #[tokio::test]
    async fn test_ttl_expiry_under_frozen_clock() {
        let clock = ManualClock::new();
        let store = LocalTtlStore::with_clock(LocalConfig::default(), Arc::new(clock.clone()));
        let cache = LocalCache::with_store(store, None, Duration::from_secs(5));

        cache.add("k", "v".to_string()).await.unwrap();
        assert!(cache.try_get::<String>("k").await.is_some());

        clock.advance(Duration::from_secs(6));
        assert!(cache.try_get::<String>("k").await.is_none());
    }

    #[tokio::test]
    async fn test_get_computes_once_then_hits() {
        let cache = local_cache().await;
        let calls = AtomicU32::new(0);

        for _ in 0..3 {
            let value: std::result::Result<TestData, AppError> = cache
                .get("data", || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(data())
                })
                .await;
            assert_eq!(value.unwrap(), data());
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.stats().hits, 2);
        assert_eq!(cache.stats().misses, 1);
    }

    #[tokio::test]
    async fn test_fallback_never_reconstructs() {
        let factory = Arc::new(CountingFailingFactory {
            attempts: AtomicU32::new(0),
        });
        let selector = Arc::new(CacheSelector::with_factory(
            BackendConfig::new(BackendKind::ManagedDistributed),
            factory.clone(),
        ));

        let mut handles = Vec::new();
        for i in 0..10 {
            let selector = selector.clone();
            handles.push(tokio::spawn(async move {
                selector.get_cache(Some("app"), Some(Duration::from_secs(i + 1))).await
            }));
        }
        for handle in handles {
            assert!(handle.await.unwrap().is_local());
        }

        let attempts_after_downgrade = factory.attempts.load(Ordering::SeqCst);
        for _ in 0..10 {
            assert!(selector.get_cache(None, None).await.is_local());
        }

        assert!(selector.is_downgraded());
        assert!(attempts_after_downgrade >= 1);
        assert_eq!(factory.attempts.load(Ordering::SeqCst), attempts_after_downgrade);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_add_remove_ends_absent() {
        let cache = local_cache().await;

        let mut handles = Vec::with_capacity(1_000);
        for _ in 0..1_000 {
            let cache = cache.clone();
            handles.push(tokio::spawn(async move {
                for i in 0..100 {
                    cache.add("shared", i).await.unwrap();
                    cache.remove::<i32>("shared").await;
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(cache.try_get::<i32>("shared").await, None);
    }

    #[tokio::test]
    async fn test_compute_error_propagates_and_nothing_is_stored() {
        let tier = MemoryTier::new();
        let selector = CacheSelector::with_factory(
            BackendConfig::new(BackendKind::RemoteKv),
            SharedTierFactory::new(tier.clone()),
        );
        let cache = selector.get_cache(Some("app"), None).await;

        let result: std::result::Result<TestData, AppError> = cache
            .get_async("data", || async { Err(AppError::Upstream("db down")) })
            .await;

        assert_eq!(result, Err(AppError::Upstream("db down")));
        assert!(tier.is_empty());
        assert_eq!(cache.try_get::<TestData>("data").await, None);
    }

    #[tokio::test]
    async fn test_far_connection_error_returns_computed_value() {
        let tier = MemoryTier::new();
        tier.fail_with(CacheError::Connection("connection reset".into()));
        let selector = CacheSelector::with_factory(
            BackendConfig::new(BackendKind::RemoteKv),
            SharedTierFactory::new(tier.clone()),
        );
        let cache = selector.get_cache(Some("app"), None).await;

        let value: std::result::Result<TestData, AppError> =
            cache.get("data", || Ok(data())).await;
        assert_eq!(value.unwrap(), data());
        assert!(!selector.is_downgraded());
    }

    #[tokio::test]
    async fn test_far_hit_is_shared_between_caches() {
        let tier = MemoryTier::new();
        let factory = SharedTierFactory::new(tier.clone());
        let selector = CacheSelector::with_factory(BackendConfig::new(BackendKind::RemoteKv), factory.clone());

        let writer = selector.get_cache(Some("app"), None).await;
        let reader = selector.get_cache(Some("app"), None).await;

        writer.add("data", data()).await.unwrap();
        let value: std::result::Result<TestData, AppError> = reader
            .get("data", || Err(AppError::Upstream("should not compute")))
            .await;
        assert_eq!(value.unwrap(), data());

        let Cache::Tiered(reader) = reader else {
            panic!("expected tiered cache");
        };
        assert_eq!(reader.l1().get::<TestData>("app.TestData.data"), Some(data()));
        assert_eq!(
            *factory.requested.lock(),
            vec![BackendKind::RemoteKv, BackendKind::RemoteKv]
        );
    }

    #[tokio::test]
    async fn test_strict_serialization_surfaces_to_caller() {
        let selector = CacheSelector::with_factory(
            BackendConfig::new(BackendKind::RemoteKv).strict(true),
            SharedTierFactory::new(MemoryTier::new()),
        );
        let cache = selector.get_cache(None, None).await;

        let mut map = HashMap::new();
        map.insert(vec![1u8, 2, 3], 1i32);
        let result: std::result::Result<HashMap<Vec<u8>, i32>, AppError> =
            cache.get("bytes", || Ok(map)).await;

        assert!(matches!(result, Err(AppError::Cache(msg)) if msg.starts_with("serialization error")));
    }

    #[tokio::test]
    async fn test_registry_resolves_through_selector() {
        let tier = MemoryTier::new();
        let selector = Arc::new(CacheSelector::with_factory(
            BackendConfig::new(BackendKind::RemoteKv),
            SharedTierFactory::new(tier.clone()),
        ));
        let registry = CacheRegistry::with_standard_profiles(selector)
            .with_profile("orders", CacheProfile::new().prefix("orders"));

        let cache = registry.resolve("orders").await.unwrap();
        cache.add("1", 10u64).await.unwrap();
        assert!(tier.contains("orders.UInt64.1"));

        let Cache::Tiered(long_term) = registry.resolve(crate::LONG_TERM).await.unwrap() else {
            panic!("expected tiered cache");
        };
        assert_eq!(long_term.config().far_ttl, Duration::from_secs(86_400));
    }

    #[cfg(feature = "derive")]
    mod derived {
        use super::*;

        #[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize, TypeName)]
        struct Order {
            id: u64,
        }

        #[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize, TypeName)]
        struct Page<T> {
            items: Vec<T>,
        }

        #[derive(TypeName)]
        #[type_name(rename = "Customer")]
        #[allow(dead_code)]
        struct CustomerRecord;

        #[derive(CacheKey)]
        struct OrderLookup {
            tenant: String,
            order: u64,
            #[cache_key(skip)]
            #[allow(dead_code)]
            trace: String,
        }

        #[test]
        fn test_derived_type_names() {
            assert_eq!(Order::type_name(), "Order");
            assert_eq!(Page::<Order>::type_name(), "Page<Order>");
            assert_eq!(Page::<HashMap<String, Order>>::type_name(), "Page<Dictionary<String, Order>>");
            assert_eq!(CustomerRecord::type_name(), "Customer");
        }

        #[test]
        fn test_derived_cache_key() {
            let key = OrderLookup {
                tenant: "acme".to_string(),
                order: 7,
                trace: "ignored".to_string(),
            };
            assert_eq!(key.cache_key(), "acme.7");
        }

        #[tokio::test]
        async fn test_derived_types_in_keys() {
            let tier = MemoryTier::new();
            let selector = CacheSelector::with_factory(
                BackendConfig::new(BackendKind::RemoteKv),
                SharedTierFactory::new(tier.clone()),
            );
            let cache = selector.get_cache(Some("shop"), None).await;

            let page = Page {
                items: vec![Order { id: 1 }],
            };
            cache.add("first", page.clone()).await.unwrap();

            assert!(tier.contains("shop.Page<Order>.first"));
            assert_eq!(cache.try_get::<Page<Order>>("first").await, Some(page));
        }
    }
}
