//! In-memory far tier

use arc_swap::ArcSwapOption;
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{Duration, Instant};

use strata_cache_core::{CacheEntry, CacheError, Result};

use super::tier::FarTier;

/// Far tier that keeps bytes in process
///
/// Useful for tests and single-node setups. Failures can be injected with
/// [`MemoryTier::fail_with`]; a successful [`FarTier::reconnect`] clears
/// them. [`MemoryTier::fail_reconnects_with`] makes reconnections fail too.
/// Cloning creates a new handle to the SAME underlying store.
#[derive(Debug, Clone, Default)]
pub struct MemoryTier {
    data: Arc<DashMap<String, CacheEntry<Vec<u8>>>>,
    failure: Arc<ArcSwapOption<CacheError>>,
    reconnect_failure: Arc<ArcSwapOption<CacheError>>,
    reconnect_delay: Duration,
    latency: Duration,
    reconnects: Arc<AtomicU32>,
}

impl MemoryTier {
    /// Create an empty tier
    pub fn new() -> Self {
        Self::default()
    }

    /// Make reconnections take `delay`
    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    /// Make every read, write and delete take `latency`
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Fail every operation with `error` until reconnected or healed
    pub fn fail_with(&self, error: CacheError) {
        self.failure.store(Some(Arc::new(error)));
    }

    /// Stop failing
    pub fn heal(&self) {
        self.failure.store(None);
    }

    /// Fail every reconnection with `error`; `None` lets them succeed again
    pub fn fail_reconnects_with(&self, error: Option<CacheError>) {
        self.reconnect_failure.store(error.map(Arc::new));
    }

    /// Number of reconnection attempts, failed ones included
    pub fn reconnect_count(&self) -> u32 {
        self.reconnects.load(Ordering::SeqCst)
    }

    /// Store raw bytes directly
    pub fn insert_raw(&self, key: &str, value: Vec<u8>) {
        let entry = CacheEntry::new(value, Instant::now(), Duration::from_secs(3600));
        self.data.insert(key.to_string(), entry);
    }

    /// Whether a live entry exists
    pub fn contains(&self, key: &str) -> bool {
        self.data
            .get(key)
            .is_some_and(|entry| !entry.is_expired_at(Instant::now()))
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the tier holds no entries
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    async fn delay(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }

    fn check(&self) -> Result<()> {
        match self.failure.load_full() {
            Some(error) => Err((*error).clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl FarTier for MemoryTier {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.delay().await;
        self.check()?;
        let now = Instant::now();
        Ok(self
            .data
            .get(key)
            .filter(|entry| !entry.is_expired_at(now))
            .map(|entry| entry.value.clone()))
    }

    async fn put(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<()> {
        self.delay().await;
        self.check()?;
        self.data
            .insert(key.to_string(), CacheEntry::new(value, Instant::now(), ttl));
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<bool> {
        self.delay().await;
        self.check()?;
        Ok(self.data.remove(key).is_some())
    }

    async fn reconnect(&self) -> Result<()> {
        if !self.reconnect_delay.is_zero() {
            tokio::time::sleep(self.reconnect_delay).await;
        }
        self.reconnects.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.reconnect_failure.load_full() {
            return Err((*error).clone());
        }
        self.heal();
        Ok(())
    }
}
