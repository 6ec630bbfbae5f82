//! Configuration for the managed cache far tier

use std::time::Duration;

use crate::redis::RedisConfig;

/// Address of a named cache on a managed endpoint
#[derive(Debug, Clone)]
pub struct ManagedConfig {
    /// Connection settings of the endpoint
    pub endpoint: RedisConfig,
    /// Name of the cache; entries live under `{cache_name}:{key}`
    pub cache_name: String,
    /// Deadline of every request
    pub request_timeout: Duration,
}

impl ManagedConfig {
    /// Create config for `cache_name` on `endpoint`
    pub fn new(endpoint: impl Into<String>, cache_name: impl Into<String>) -> Self {
        Self {
            endpoint: RedisConfig::new(endpoint),
            cache_name: cache_name.into(),
            request_timeout: Duration::from_secs(10),
        }
    }

    /// Set the request deadline
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set the endpoint pool size
    pub fn pool_size(mut self, size: u32) -> Self {
        self.endpoint = self.endpoint.pool_size(size);
        self
    }

    /// Address of `key` inside the named cache
    pub fn scoped_key(&self, key: &str) -> String {
        format!("{}:{}", self.cache_name, key)
    }
}
