//! The cache contract shared by every backend

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use std::future::Future;

use super::type_name::TypeName;
use crate::{CacheError, Result};

/// Bound for values that can be cached by any backend
///
/// Values must be cloneable for the local tier, serializable for far tiers,
/// and named for key construction.
pub trait CacheValue: Serialize + DeserializeOwned + TypeName + Clone + Send + Sync + 'static {}

impl<T> CacheValue for T where
    T: Serialize + DeserializeOwned + TypeName + Clone + Send + Sync + 'static
{
}

/// Get-or-compute cache contract
///
/// Keys passed here are caller keys; every implementation turns them into
/// canonical keys with its own prefix and the value's type name. Cache
/// failures never surface through this trait, with two exceptions: errors of
/// the compute function are returned unchanged, and an instance flagged for
/// strict serialization returns values it cannot encode as
/// [`CacheError::Serialization`].
#[async_trait]
pub trait SimpleCache: Send + Sync {
    /// Get a value, computing and storing it on a miss
    ///
    /// Concurrent misses on the same key may each run `compute`.
    async fn get<T, E, F>(&self, key: &str, compute: F) -> std::result::Result<T, E>
    where
        T: CacheValue,
        E: From<CacheError> + Send,
        F: FnOnce() -> std::result::Result<T, E> + Send,
    {
        self.get_async(key, move || std::future::ready(compute()))
            .await
    }

    /// Async equivalent of [`SimpleCache::get`]
    async fn get_async<T, E, F, Fut>(&self, key: &str, compute: F) -> std::result::Result<T, E>
    where
        T: CacheValue,
        E: From<CacheError> + Send,
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = std::result::Result<T, E>> + Send;

    /// Store a value
    ///
    /// Storage failures are logged, not returned; only strict serialization
    /// checks produce an error.
    async fn add<T: CacheValue>(&self, key: &str, value: T) -> Result<()>;

    /// Remove a value
    ///
    /// Returns `false` when the backend reported an error.
    async fn remove<T: CacheValue>(&self, key: &str) -> bool;

    /// Read a value without computing it
    async fn try_get<T: CacheValue>(&self, key: &str) -> Option<T>;
}
