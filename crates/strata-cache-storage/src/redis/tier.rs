//! Redis far tier over a bb8 pool

use arc_swap::ArcSwap;
use async_trait::async_trait;
use bb8::{Pool, PooledConnection, RunError};
use bb8_redis::RedisConnectionManager;
use redis::{AsyncCommands, RedisError};
use std::sync::Arc;
use std::time::Duration;

use strata_cache_core::{CacheError, LOG_TARGET, Result};

use super::config::RedisConfig;
use crate::tiered::FarTier;

/// Classify a Redis error
fn map_redis_error(e: RedisError) -> CacheError {
    if e.is_timeout() {
        CacheError::Timeout
    } else if e.is_connection_dropped() || e.is_connection_refusal() || e.is_io_error() {
        CacheError::Connection(e.to_string())
    } else {
        CacheError::Backend(e.to_string())
    }
}

fn map_run_error(e: RunError<RedisError>) -> CacheError {
    match e {
        RunError::User(e) => map_redis_error(e),
        RunError::TimedOut => CacheError::Connection("timed out waiting for a connection".into()),
    }
}

/// Redis far tier
///
/// Construction pings the server, so an unreachable server fails fast.
/// Reconnection builds a fresh pool and swaps it in; requests already
/// holding a connection from the old pool finish on it.
pub struct RedisTier {
    pool: ArcSwap<Pool<RedisConnectionManager>>,
    config: RedisConfig,
}

impl RedisTier {
    /// Connect to Redis
    pub async fn connect(config: RedisConfig) -> Result<Self> {
        let pool = build_pool(&config).await.map_err(|e| {
            tracing::error!(target: LOG_TARGET, url = %config.url, error = %e, "unable to connect to redis");
            CacheError::Construction(e.to_string())
        })?;

        Ok(Self {
            pool: ArcSwap::from_pointee(pool),
            config,
        })
    }

    /// Connection settings
    pub fn config(&self) -> &RedisConfig {
        &self.config
    }

    async fn connection(&self) -> Result<PooledConnection<'static, RedisConnectionManager>> {
        let pool = self.pool.load_full();
        pool.get_owned().await.map_err(map_run_error)
    }

    /// Run `PING`
    pub async fn ping(&self) -> Result<()> {
        let mut conn = self.connection().await?;
        redis::cmd("PING")
            .query_async::<String>(&mut *conn)
            .await
            .map_err(map_redis_error)?;
        Ok(())
    }
}

async fn build_pool(config: &RedisConfig) -> Result<Pool<RedisConnectionManager>> {
    let manager = RedisConnectionManager::new(config.url.as_str()).map_err(map_redis_error)?;

    let pool = Pool::builder()
        .max_size(config.pool_size)
        .connection_timeout(config.connection_timeout)
        .build(manager)
        .await
        .map_err(map_redis_error)?;

    let mut conn = pool.get().await.map_err(map_run_error)?;
    redis::cmd("PING")
        .query_async::<String>(&mut *conn)
        .await
        .map_err(map_redis_error)?;
    drop(conn);

    Ok(pool)
}

#[async_trait]
impl FarTier for RedisTier {
    fn name(&self) -> &'static str {
        "redis"
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut conn = self.connection().await?;
        conn.get(key).await.map_err(map_redis_error)
    }

    async fn put(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<()> {
        let mut conn = self.connection().await?;
        let secs = ttl.as_secs().max(1);
        conn.set_ex::<_, _, ()>(key, value, secs)
            .await
            .map_err(map_redis_error)
    }

    async fn remove(&self, key: &str) -> Result<bool> {
        let mut conn = self.connection().await?;
        let removed: i64 = conn.del(key).await.map_err(map_redis_error)?;
        Ok(removed > 0)
    }

    async fn reconnect(&self) -> Result<()> {
        let pool = build_pool(&self.config).await?;
        self.pool.store(Arc::new(pool));
        tracing::info!(target: LOG_TARGET, url = %self.config.url, "redis pool replaced");
        Ok(())
    }
}

impl std::fmt::Debug for RedisTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisTier")
            .field("config", &self.config)
            .finish()
    }
}
