//! Backend configuration
//!
//! Settings are read once at startup through a [`SettingsSource`].

use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

use strata_cache_core::LOG_TARGET;

/// Setting names
pub mod keys {
    /// Backend kind: `redis`, `managed` (or `azure`), `passthrough`; anything else is local
    pub const CACHE_SYSTEM: &str = "cacheSystem";
    /// Redis connection string
    pub const REDIS_CONNECTION_STRING: &str = "redisCacheConnectionString";
    /// Name of the managed cache
    pub const MANAGED_CACHE_NAME: &str = "managedCacheName";
    /// Older name of [`MANAGED_CACHE_NAME`]
    pub const LEGACY_MANAGED_CACHE_NAME: &str = "azureCacheName";
    /// Managed cache endpoint; falls back to the Redis connection string
    pub const MANAGED_CONNECTION_STRING: &str = "managedCacheConnectionString";
    /// Default TTL in seconds
    pub const DEFAULT_TTL_SECS: &str = "cacheDefaultTtlSecs";
    /// Local tier TTL of tiered caches, in seconds
    pub const L1_TTL_SECS: &str = "cacheL1TtlSecs";
    /// Managed cache request deadline, in seconds
    pub const REQUEST_TIMEOUT_SECS: &str = "cacheRequestTimeoutSecs";
    /// `true` to return serialization failures to callers
    pub const STRICT_SERIALIZATION: &str = "cacheStrictSerialization";
}

/// Source of named configuration values
pub trait SettingsSource: Send + Sync {
    /// Look up a setting
    fn get_setting(&self, name: &str) -> Option<String>;
}

/// Settings read from environment variables
///
/// `cacheSystem` is looked up as `CACHE_SYSTEM`, then as `cacheSystem`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvSettings;

impl EnvSettings {
    /// Environment variable name for a setting
    pub fn var_name(name: &str) -> String {
        let mut var = String::with_capacity(name.len() + 4);
        for (i, c) in name.chars().enumerate() {
            if c.is_ascii_uppercase() && i > 0 {
                var.push('_');
            }
            var.push(c.to_ascii_uppercase());
        }
        var
    }
}

impl SettingsSource for EnvSettings {
    fn get_setting(&self, name: &str) -> Option<String> {
        std::env::var(Self::var_name(name))
            .or_else(|_| std::env::var(name))
            .ok()
    }
}

/// Settings held in memory
#[derive(Debug, Clone, Default)]
pub struct MapSettings {
    values: HashMap<String, String>,
}

impl MapSettings {
    /// Create empty settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a setting
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MapSettings {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl SettingsSource for MapSettings {
    fn get_setting(&self, name: &str) -> Option<String> {
        self.values.get(name).cloned()
    }
}

/// Which backend caches are built on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendKind {
    /// Nothing is cached
    PassThrough,
    /// In-process store only
    #[default]
    Local,
    /// Local tier in front of Redis
    RemoteKv,
    /// Local tier in front of a managed distributed cache
    ManagedDistributed,
}

impl BackendKind {
    /// Whether caches of this kind talk to a remote service
    pub fn is_remote(&self) -> bool {
        matches!(self, BackendKind::RemoteKv | BackendKind::ManagedDistributed)
    }

    /// Lowercase label
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::PassThrough => "passthrough",
            BackendKind::Local => "local",
            BackendKind::RemoteKv => "redis",
            BackendKind::ManagedDistributed => "managed",
        }
    }
}

impl FromStr for BackendKind {
    type Err = std::convert::Infallible;

    /// Case-insensitive; unknown values select [`BackendKind::Local`]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "redis" => BackendKind::RemoteKv,
            "managed" | "azure" => BackendKind::ManagedDistributed,
            "passthrough" => BackendKind::PassThrough,
            _ => BackendKind::Local,
        })
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration for cache construction
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Backend kind
    pub kind: BackendKind,
    /// Connection string of the remote service
    pub connection_info: Option<String>,
    /// Name of the managed cache
    pub cache_name: Option<String>,
    /// TTL used when a cache is requested without one
    pub default_ttl: Option<Duration>,
    /// Local tier TTL of tiered caches
    pub l1_ttl: Duration,
    /// Managed cache request deadline
    pub request_timeout: Duration,
    /// Remote connection pool size
    pub pool_size: u32,
    /// Attempts per background reconnection
    pub reconnect_attempts: u32,
    /// Return serialization failures to callers
    pub strict_serialization: bool,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            kind: BackendKind::Local,
            connection_info: None,
            cache_name: None,
            default_ttl: None,
            l1_ttl: Duration::from_secs(5 * 60),
            request_timeout: Duration::from_secs(10),
            pool_size: 10,
            reconnect_attempts: 1,
            strict_serialization: false,
        }
    }
}

impl BackendConfig {
    /// Create config for a backend kind
    pub fn new(kind: BackendKind) -> Self {
        Self {
            kind,
            ..Default::default()
        }
    }

    /// Read configuration from `source`
    ///
    /// Malformed numbers and flags are logged and replaced by defaults.
    pub fn from_settings(source: &dyn SettingsSource) -> Self {
        let defaults = Self::default();
        let kind = source
            .get_setting(keys::CACHE_SYSTEM)
            .map(|s| s.parse::<BackendKind>().unwrap_or_default())
            .unwrap_or_default();

        let connection_info = match kind {
            BackendKind::ManagedDistributed => source
                .get_setting(keys::MANAGED_CONNECTION_STRING)
                .or_else(|| source.get_setting(keys::REDIS_CONNECTION_STRING)),
            _ => source.get_setting(keys::REDIS_CONNECTION_STRING),
        };

        let cache_name = source
            .get_setting(keys::MANAGED_CACHE_NAME)
            .or_else(|| source.get_setting(keys::LEGACY_MANAGED_CACHE_NAME));

        let config = Self {
            kind,
            connection_info: non_blank(connection_info),
            cache_name: non_blank(cache_name),
            default_ttl: secs_setting(source, keys::DEFAULT_TTL_SECS),
            l1_ttl: secs_setting(source, keys::L1_TTL_SECS).unwrap_or(defaults.l1_ttl),
            request_timeout: secs_setting(source, keys::REQUEST_TIMEOUT_SECS)
                .unwrap_or(defaults.request_timeout),
            strict_serialization: bool_setting(source, keys::STRICT_SERIALIZATION)
                .unwrap_or(defaults.strict_serialization),
            ..defaults
        };

        tracing::debug!(target: LOG_TARGET, kind = %config.kind, "cache configuration loaded");
        config
    }

    /// Read configuration from the environment
    pub fn from_env() -> Self {
        Self::from_settings(&EnvSettings)
    }

    /// Set connection string
    pub fn connection_info(mut self, info: impl Into<String>) -> Self {
        self.connection_info = Some(info.into());
        self
    }

    /// Set managed cache name
    pub fn cache_name(mut self, name: impl Into<String>) -> Self {
        self.cache_name = Some(name.into());
        self
    }

    /// Set default TTL
    pub fn default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = Some(ttl);
        self
    }

    /// Set local tier TTL
    pub fn l1_ttl(mut self, ttl: Duration) -> Self {
        self.l1_ttl = ttl;
        self
    }

    /// Set managed request deadline
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set remote pool size
    pub fn pool_size(mut self, size: u32) -> Self {
        self.pool_size = size;
        self
    }

    /// Set attempts per reconnection
    pub fn reconnect_attempts(mut self, attempts: u32) -> Self {
        self.reconnect_attempts = attempts;
        self
    }

    /// Enable strict serialization
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict_serialization = strict;
        self
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn secs_setting(source: &dyn SettingsSource, name: &str) -> Option<Duration> {
    let raw = non_blank(source.get_setting(name))?;
    match raw.trim().parse::<u64>() {
        Ok(secs) => Some(Duration::from_secs(secs)),
        Err(e) => {
            tracing::warn!(target: LOG_TARGET, setting = name, value = %raw, error = %e, "ignoring malformed setting");
            None
        }
    }
}

fn bool_setting(source: &dyn SettingsSource, name: &str) -> Option<bool> {
    let raw = non_blank(source.get_setting(name))?;
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => {
            tracing::warn!(target: LOG_TARGET, setting = name, value = %raw, "ignoring malformed setting");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_parsing() {
        assert_eq!("redis".parse::<BackendKind>().unwrap(), BackendKind::RemoteKv);
        assert_eq!("Redis".parse::<BackendKind>().unwrap(), BackendKind::RemoteKv);
        assert_eq!("AZURE".parse::<BackendKind>().unwrap(), BackendKind::ManagedDistributed);
        assert_eq!("managed".parse::<BackendKind>().unwrap(), BackendKind::ManagedDistributed);
        assert_eq!("passthrough".parse::<BackendKind>().unwrap(), BackendKind::PassThrough);
        assert_eq!("memcached".parse::<BackendKind>().unwrap(), BackendKind::Local);
        assert_eq!("".parse::<BackendKind>().unwrap(), BackendKind::Local);
    }

    #[test]
    fn test_empty_settings_are_local() {
        let config = BackendConfig::from_settings(&MapSettings::new());
        assert_eq!(config.kind, BackendKind::Local);
        assert_eq!(config.default_ttl, None);
        assert_eq!(config.l1_ttl, Duration::from_secs(300));
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert!(!config.strict_serialization);
    }

    #[test]
    fn test_from_settings() {
        let settings = MapSettings::new()
            .with(keys::CACHE_SYSTEM, "Redis")
            .with(keys::REDIS_CONNECTION_STRING, "localhost:6379")
            .with(keys::DEFAULT_TTL_SECS, "120")
            .with(keys::L1_TTL_SECS, "30")
            .with(keys::STRICT_SERIALIZATION, "true");

        let config = BackendConfig::from_settings(&settings);
        assert_eq!(config.kind, BackendKind::RemoteKv);
        assert_eq!(config.connection_info.as_deref(), Some("localhost:6379"));
        assert_eq!(config.default_ttl, Some(Duration::from_secs(120)));
        assert_eq!(config.l1_ttl, Duration::from_secs(30));
        assert!(config.strict_serialization);
    }

    #[test]
    fn test_managed_settings() {
        let settings: MapSettings = [
            (keys::CACHE_SYSTEM, "azure"),
            (keys::REDIS_CONNECTION_STRING, "cache.example.net:6380"),
            (keys::LEGACY_MANAGED_CACHE_NAME, "orders"),
        ]
        .into_iter()
        .collect();

        let config = BackendConfig::from_settings(&settings);
        assert_eq!(config.kind, BackendKind::ManagedDistributed);
        assert_eq!(config.connection_info.as_deref(), Some("cache.example.net:6380"));
        assert_eq!(config.cache_name.as_deref(), Some("orders"));
    }

    #[test]
    fn test_malformed_values_fall_back() {
        let settings = MapSettings::new()
            .with(keys::DEFAULT_TTL_SECS, "soon")
            .with(keys::STRICT_SERIALIZATION, "maybe")
            .with(keys::REDIS_CONNECTION_STRING, "   ");

        let config = BackendConfig::from_settings(&settings);
        assert_eq!(config.default_ttl, None);
        assert!(!config.strict_serialization);
        assert_eq!(config.connection_info, None);
    }

    #[test]
    fn test_env_var_names() {
        assert_eq!(EnvSettings::var_name("cacheSystem"), "CACHE_SYSTEM");
        assert_eq!(
            EnvSettings::var_name("redisCacheConnectionString"),
            "REDIS_CACHE_CONNECTION_STRING"
        );
    }
}
