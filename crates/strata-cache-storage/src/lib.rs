//! strata-cache-storage: Cache backends for strata-cache
//!
//! - [`LocalTtlStore`] / [`LocalCache`]: in-process expiring store
//! - [`PassThroughCache`]: caches nothing
//! - [`TieredCache`]: local store in front of a [`FarTier`]
//! - [`RedisTier`] and [`ManagedTier`] (feature `redis`)

pub mod local;
pub mod passthrough;
pub mod tiered;

#[cfg(feature = "redis")]
pub mod managed;
#[cfg(feature = "redis")]
pub mod redis;

pub use local::{LocalCache, LocalConfig, LocalTtlStore};
pub use passthrough::PassThroughCache;
pub use tiered::{
    ErrorTriage, FarTier, MemoryTier, ReconnectGuard, ReconnectTicket, TieredCache, TieredConfig,
};

#[cfg(feature = "redis")]
pub use managed::{ManagedConfig, ManagedTier};
#[cfg(feature = "redis")]
pub use redis::{RedisConfig, RedisTier};
