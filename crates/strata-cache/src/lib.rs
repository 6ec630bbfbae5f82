//! strata-cache: get-or-compute caching with swappable backends
//!
//! # Features
//!
//! - **One contract** ([`SimpleCache`]) over local, Redis and managed caches
//! - **Two tiers**: remote backends sit behind an in-process store
//! - **Caching never fails requests**: backend errors degrade to misses
//! - **Permanent fallback** to local caches when a backend cannot be built
//! - **Typed keys**: the value's type name is part of every key
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use strata_cache::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
//!     let selector = CacheSelector::from_env();
//!     let cache = selector.get_cache(Some("app"), None).await;
//!
//!     let answer: i32 = cache
//!         .get("answer", || Ok::<_, CacheError>(42))
//!         .await?;
//!     println!("Got: {}", answer);
//!
//!     Ok(())
//! }
//! ```

extern crate self as strata_cache;

mod cache;
mod config;
mod registry;
mod selector;

// Re-export core
pub use strata_cache_core::*;

// Re-export storage
pub use strata_cache_storage::{
    ErrorTriage, FarTier, LocalCache, LocalConfig, LocalTtlStore, MemoryTier, PassThroughCache,
    ReconnectGuard, TieredCache, TieredConfig,
};

#[cfg(feature = "redis")]
pub use strata_cache_storage::{ManagedConfig, ManagedTier, RedisConfig, RedisTier};

#[cfg(feature = "derive")]
pub use strata_cache_derive::{CacheKey, TypeName};

pub use cache::Cache;
pub use config::{BackendConfig, BackendKind, EnvSettings, MapSettings, SettingsSource, keys};
pub use registry::{CacheProfile, CacheRegistry, LONG_TERM, SHORT_TERM, STANDARD};
pub use selector::{
    BackendFactory, CacheSelector, ConnectingFactory, LOCAL_DEFAULT_TTL, REMOTE_DEFAULT_TTL,
};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        BackendConfig, BackendKind, Cache, CacheError, CacheKey, CacheProfile, CacheRegistry,
        CacheSelector, CacheValue, Result, SimpleCache, TypeName,
    };
}

#[cfg(test)]
mod tests;
