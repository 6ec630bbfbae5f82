//! Named cache profiles

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use strata_cache_core::{CacheError, Result};

use crate::cache::Cache;
use crate::selector::CacheSelector;

/// Profile name of short-lived caches (1 minute)
pub const SHORT_TERM: &str = "short_term";
/// Profile name of caches using the configured default TTL
pub const STANDARD: &str = "standard";
/// Profile name of long-lived caches (24 hours)
pub const LONG_TERM: &str = "long_term";

/// Prefix and TTL of a named cache
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheProfile {
    /// Key prefix
    pub prefix: Option<String>,
    /// TTL; `None` uses the selector's defaults
    pub ttl: Option<Duration>,
}

impl CacheProfile {
    /// Profile without prefix or TTL
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the key prefix
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Set the TTL
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }
}

/// Named profiles resolved through a shared [`CacheSelector`]
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use strata_cache::prelude::*;
///
/// # async fn run() -> strata_cache::Result<()> {
/// let selector = Arc::new(CacheSelector::from_env());
/// let registry = CacheRegistry::with_standard_profiles(selector)
///     .with_profile("sessions", CacheProfile::new().prefix("sessions"));
///
/// let cache = registry.resolve("sessions").await?;
/// cache.add("abc", "user-1".to_string()).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct CacheRegistry {
    selector: Arc<CacheSelector>,
    profiles: HashMap<String, CacheProfile>,
}

impl CacheRegistry {
    /// Create a registry without profiles
    pub fn new(selector: Arc<CacheSelector>) -> Self {
        Self {
            selector,
            profiles: HashMap::new(),
        }
    }

    /// Create a registry with the `short_term`, `standard` and `long_term` profiles
    pub fn with_standard_profiles(selector: Arc<CacheSelector>) -> Self {
        Self::new(selector)
            .with_profile(SHORT_TERM, CacheProfile::new().ttl(Duration::from_secs(60)))
            .with_profile(STANDARD, CacheProfile::new())
            .with_profile(LONG_TERM, CacheProfile::new().ttl(Duration::from_secs(24 * 60 * 60)))
    }

    /// Add or replace a profile
    pub fn with_profile(mut self, name: impl Into<String>, profile: CacheProfile) -> Self {
        self.register(name, profile);
        self
    }

    /// Add or replace a profile, returning the one it replaced
    pub fn register(&mut self, name: impl Into<String>, profile: CacheProfile) -> Option<CacheProfile> {
        self.profiles.insert(name.into(), profile)
    }

    /// Look up a profile
    pub fn profile(&self, name: &str) -> Option<&CacheProfile> {
        self.profiles.get(name)
    }

    /// Registered profile names
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(String::as_str)
    }

    /// Selector profiles are resolved through
    pub fn selector(&self) -> &Arc<CacheSelector> {
        &self.selector
    }

    /// Build the cache of a named profile
    pub async fn resolve(&self, name: &str) -> Result<Cache> {
        let profile = self
            .profiles
            .get(name)
            .ok_or_else(|| CacheError::NotFound(format!("cache profile {name}")))?;
        Ok(self
            .selector
            .get_cache(profile.prefix.as_deref(), profile.ttl)
            .await)
    }
}
