//! Backend selection with permanent downgrade to local caches

use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use strata_cache_core::{CacheError, LOG_TARGET, Result};
use strata_cache_storage::{FarTier, LocalCache, PassThroughCache, TieredCache, TieredConfig};

use crate::cache::Cache;
use crate::config::{BackendConfig, BackendKind};

/// TTL of remote-backed caches requested without one
pub const REMOTE_DEFAULT_TTL: Duration = Duration::from_secs(60 * 60);

/// TTL of local caches requested without one
pub const LOCAL_DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

/// Builds far tiers for remote backend kinds
#[async_trait]
pub trait BackendFactory: Send + Sync {
    /// Connect the far tier of `kind`
    async fn connect(&self, kind: BackendKind, config: &BackendConfig) -> Result<Arc<dyn FarTier>>;
}

/// Factory that connects to the configured services
#[derive(Debug, Clone, Copy, Default)]
pub struct ConnectingFactory;

#[async_trait]
impl BackendFactory for ConnectingFactory {
    async fn connect(&self, kind: BackendKind, config: &BackendConfig) -> Result<Arc<dyn FarTier>> {
        connect_far_tier(kind, config).await
    }
}

#[cfg(feature = "redis")]
async fn connect_far_tier(kind: BackendKind, config: &BackendConfig) -> Result<Arc<dyn FarTier>> {
    use strata_cache_storage::{ManagedConfig, ManagedTier, RedisConfig, RedisTier};

    let endpoint = config.connection_info.as_deref().ok_or_else(|| {
        CacheError::Construction(format!("no connection string configured for {kind}"))
    })?;

    match kind {
        BackendKind::RemoteKv => {
            let redis = RedisConfig::new(endpoint).pool_size(config.pool_size);
            Ok(Arc::new(RedisTier::connect(redis).await?))
        }
        BackendKind::ManagedDistributed => {
            let name = config.cache_name.as_deref().unwrap_or("default");
            let managed = ManagedConfig::new(endpoint, name)
                .pool_size(config.pool_size)
                .request_timeout(config.request_timeout);
            Ok(Arc::new(ManagedTier::connect(managed).await?))
        }
        other => Err(CacheError::Construction(format!("{other} caches have no far tier"))),
    }
}

#[cfg(not(feature = "redis"))]
async fn connect_far_tier(kind: BackendKind, _config: &BackendConfig) -> Result<Arc<dyn FarTier>> {
    Err(CacheError::Construction(format!(
        "{kind} caches need the `redis` feature"
    )))
}

/// Hands out caches of the configured kind
///
/// If a remote backend cannot be constructed, the selector logs it once and
/// from then on hands out local caches only, without retrying the remote
/// backend. Share one selector per process.
pub struct CacheSelector {
    config: BackendConfig,
    factory: Arc<dyn BackendFactory>,
    downgraded: AtomicBool,
}

impl CacheSelector {
    /// Create a selector connecting to real services
    pub fn new(config: BackendConfig) -> Self {
        Self::with_factory(config, Arc::new(ConnectingFactory))
    }

    /// Create a selector configured from the environment
    pub fn from_env() -> Self {
        Self::new(BackendConfig::from_env())
    }

    /// Create a selector building far tiers with `factory`
    pub fn with_factory(config: BackendConfig, factory: Arc<dyn BackendFactory>) -> Self {
        Self {
            config,
            factory,
            downgraded: AtomicBool::new(false),
        }
    }

    /// Configuration in use
    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    /// Whether construction failed and only local caches are handed out
    pub fn is_downgraded(&self) -> bool {
        self.downgraded.load(Ordering::Acquire)
    }

    /// Get a cache with an optional key prefix and TTL
    pub async fn get_cache(&self, prefix: Option<&str>, ttl: Option<Duration>) -> Cache {
        if self.is_downgraded() {
            return downgraded_cache(prefix, ttl);
        }

        match self.config.kind {
            BackendKind::PassThrough => Cache::PassThrough(PassThroughCache::new()),
            BackendKind::Local => {
                let ttl = ttl.or(self.config.default_ttl).unwrap_or(LOCAL_DEFAULT_TTL);
                Cache::Local(LocalCache::new(prefix, ttl))
            }
            kind @ (BackendKind::RemoteKv | BackendKind::ManagedDistributed) => {
                match self.factory.connect(kind, &self.config).await {
                    Ok(far) => {
                        let far_ttl = ttl.or(self.config.default_ttl).unwrap_or(REMOTE_DEFAULT_TTL);
                        let config = TieredConfig::default()
                            .l1_ttl(self.config.l1_ttl)
                            .far_ttl(far_ttl)
                            .strict(self.config.strict_serialization)
                            .reconnect_attempts(self.config.reconnect_attempts);
                        Cache::Tiered(TieredCache::new(far, prefix, config))
                    }
                    Err(e) => {
                        if !self.downgraded.swap(true, Ordering::AcqRel) {
                            tracing::error!(
                                target: LOG_TARGET,
                                backend = %kind,
                                error = %e,
                                "unable to instantiate cache; using local caches from now on"
                            );
                        }
                        downgraded_cache(prefix, ttl)
                    }
                }
            }
        }
    }
}

fn downgraded_cache(prefix: Option<&str>, ttl: Option<Duration>) -> Cache {
    Cache::Local(LocalCache::new(prefix, ttl.unwrap_or(REMOTE_DEFAULT_TTL)))
}

impl std::fmt::Debug for CacheSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheSelector")
            .field("config", &self.config)
            .field("downgraded", &self.is_downgraded())
            .finish()
    }
}
