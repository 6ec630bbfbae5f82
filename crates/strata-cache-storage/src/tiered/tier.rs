//! Far tier abstraction

use async_trait::async_trait;
use std::time::Duration;

use strata_cache_core::{CacheError, Result};

/// How a far tier error is handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorTriage {
    /// Tier is unreachable: log and schedule a reconnection
    Reconnect,
    /// Expected under normal operation: log at warn
    Warn,
    /// Anything else: log at error
    Error,
}

/// Remote store sitting behind the local tier
///
/// Far tiers move opaque bytes; encoding happens in the tiered cache. Keys
/// are canonical keys.
#[async_trait]
pub trait FarTier: Send + Sync + 'static {
    /// Backend label used in logs and stats
    fn name(&self) -> &'static str;

    /// Read raw bytes
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Write raw bytes that expire after `ttl`
    async fn put(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<()>;

    /// Delete a key, returning whether it existed
    async fn remove(&self, key: &str) -> Result<bool>;

    /// Replace the connection to the backend
    async fn reconnect(&self) -> Result<()>;

    /// Classify an error raised while talking to this tier
    fn triage(&self, error: &CacheError) -> ErrorTriage {
        match error {
            CacheError::Connection(_) => ErrorTriage::Reconnect,
            CacheError::Timeout => ErrorTriage::Warn,
            _ => ErrorTriage::Error,
        }
    }
}
