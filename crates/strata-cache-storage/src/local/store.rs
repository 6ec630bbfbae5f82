//! In-process expiring map using DashMap

use dashmap::DashMap;
use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, Weak};
use std::time::Duration;

use strata_cache_core::{CacheEntry, Clock, LOG_TARGET, SystemClock};

type ErasedValue = Arc<dyn Any + Send + Sync>;

/// Configuration for the local store
#[derive(Debug, Clone)]
pub struct LocalConfig {
    /// Interval of the background sweep of expired entries
    pub sweep_interval: Duration,
}

impl Default for LocalConfig {
    fn default() -> Self {
        let sweep_interval = if cfg!(debug_assertions) {
            Duration::from_secs(5)
        } else {
            Duration::from_secs(60)
        };
        Self { sweep_interval }
    }
}

impl LocalConfig {
    /// Set the sweep interval
    pub fn sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }
}

struct StoreInner {
    data: DashMap<String, CacheEntry<ErasedValue>>,
    clock: Arc<dyn Clock>,
}

impl StoreInner {
    fn sweep(&self) -> usize {
        let now = self.clock.now();
        let mut removed = 0;
        self.data.retain(|_, entry| {
            let keep = !entry.is_expired_at(now);
            if !keep {
                removed += 1;
            }
            keep
        });
        removed
    }
}

/// In-process time-to-live store
///
/// Values are kept type-erased and handed back by clone. Expired entries are
/// dropped lazily on read and by a background sweep that runs while any
/// handle to the store is alive. There is no per-key locking: concurrent
/// misses on the same key may each compute, and the last write wins.
///
/// Cloning creates a new handle to the SAME underlying store.
#[derive(Clone)]
pub struct LocalTtlStore {
    inner: Arc<StoreInner>,
}

impl LocalTtlStore {
    /// Create a store on the system clock
    pub fn new(config: LocalConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create with default configuration
    pub fn with_defaults() -> Self {
        Self::new(LocalConfig::default())
    }

    /// Create a store reading time from `clock`
    ///
    /// The sweep task is only started when called inside a tokio runtime.
    pub fn with_clock(config: LocalConfig, clock: Arc<dyn Clock>) -> Self {
        let inner = Arc::new(StoreInner {
            data: DashMap::new(),
            clock,
        });

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(run_sweeper(Arc::downgrade(&inner), config.sweep_interval));
            }
            Err(_) => {
                tracing::debug!(target: LOG_TARGET, "no tokio runtime; expired entries are only dropped on read");
            }
        }

        Self { inner }
    }

    /// Get an unexpired value
    ///
    /// A value stored as a different type reads as absent.
    pub fn get<T>(&self, key: &str) -> Option<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        let now = self.inner.clock.now();
        let expired = match self.inner.data.get(key) {
            Some(entry) if !entry.is_expired_at(now) => {
                return entry.value.downcast_ref::<T>().cloned();
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            self.inner
                .data
                .remove_if(key, |_, entry| entry.is_expired_at(now));
        }
        None
    }

    /// Store a value that expires `ttl` from now
    pub fn add<T>(&self, key: &str, value: T, ttl: Duration)
    where
        T: Send + Sync + 'static,
    {
        let entry = CacheEntry::new(Arc::new(value) as ErasedValue, self.inner.clock.now(), ttl);
        self.inner.data.insert(key.to_string(), entry);
    }

    /// Remove a value, returning whether one was present
    pub fn remove(&self, key: &str) -> bool {
        self.inner.data.remove(key).is_some()
    }

    /// Get a value, computing and storing it on a miss
    pub fn get_or_compute<T, F>(&self, key: &str, ttl: Duration, compute: F) -> T
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce() -> T,
    {
        if let Some(value) = self.get(key) {
            return value;
        }
        let value = compute();
        self.add(key, value.clone(), ttl);
        value
    }

    /// Fallible [`LocalTtlStore::get_or_compute`]; nothing is stored on error
    pub fn try_get_or_compute<T, E, F>(&self, key: &str, ttl: Duration, compute: F) -> Result<T, E>
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce() -> Result<T, E>,
    {
        if let Some(value) = self.get(key) {
            return Ok(value);
        }
        let value = compute()?;
        self.add(key, value.clone(), ttl);
        Ok(value)
    }

    /// Drop every expired entry now, returning how many were removed
    pub fn sweep_expired(&self) -> usize {
        self.inner.sweep()
    }

    /// Number of entries, including expired ones not yet swept
    pub fn len(&self) -> usize {
        self.inner.data.len()
    }

    /// Whether the store holds no entries
    pub fn is_empty(&self) -> bool {
        self.inner.data.is_empty()
    }

    /// Remove every entry
    pub fn clear(&self) {
        self.inner.data.clear();
    }
}

impl std::fmt::Debug for LocalTtlStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalTtlStore")
            .field("len", &self.len())
            .finish()
    }
}

async fn run_sweeper(store: Weak<StoreInner>, period: Duration) {
    let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
    loop {
        ticker.tick().await;
        let Some(inner) = store.upgrade() else {
            break;
        };

        match catch_unwind(AssertUnwindSafe(|| inner.sweep())) {
            Ok(0) => {}
            Ok(removed) => {
                tracing::trace!(target: LOG_TARGET, removed, "swept expired entries");
            }
            Err(_) => {
                tracing::error!(target: LOG_TARGET, "error cleaning up local cache");
            }
        }
    }
}
