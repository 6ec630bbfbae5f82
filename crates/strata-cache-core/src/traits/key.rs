//! Key naming
//!
//! Canonical keys have the shape `[prefix.]TypeName.callerKey`. The format is
//! shared with other processes using the same remote backend, so it must not
//! change.

use std::fmt::Display;

use super::type_name::TypeName;

/// Build the canonical cache key for a caller key
///
/// A blank prefix is treated the same as no prefix.
pub fn name(prefix: Option<&str>, type_name: &str, key: &str) -> String {
    match prefix {
        Some(p) if !p.trim().is_empty() => format!("{}.{}.{}", p, type_name, key),
        _ => format!("{}.{}", type_name, key),
    }
}

/// Key namer bound to one cache instance's prefix
#[derive(Debug, Clone, Default)]
pub struct KeyNamer {
    prefix: Option<String>,
}

impl KeyNamer {
    /// Create a namer with an optional prefix
    pub fn new(prefix: Option<&str>) -> Self {
        Self {
            prefix: prefix.map(str::to_string),
        }
    }

    /// The configured prefix
    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// Canonical key for a value of type `T`
    pub fn name<T: TypeName + ?Sized>(&self, key: &str) -> String {
        name(self.prefix(), &T::type_name(), key)
    }
}

/// Trait for values that can be rendered as a caller key
///
/// Tuples render their parts joined with `.`.
pub trait CacheKey {
    /// Generate the key string
    fn cache_key(&self) -> String;
}

impl CacheKey for String {
    fn cache_key(&self) -> String {
        self.clone()
    }
}

impl CacheKey for &str {
    fn cache_key(&self) -> String {
        self.to_string()
    }
}

impl<T1: Display, T2: Display> CacheKey for (T1, T2) {
    fn cache_key(&self) -> String {
        format!("{}.{}", self.0, self.1)
    }
}

impl<T1: Display, T2: Display, T3: Display> CacheKey for (T1, T2, T3) {
    fn cache_key(&self) -> String {
        format!("{}.{}.{}", self.0, self.1, self.2)
    }
}

impl<T1: Display, T2: Display, T3: Display, T4: Display> CacheKey for (T1, T2, T3, T4) {
    fn cache_key(&self) -> String {
        format!("{}.{}.{}.{}", self.0, self.1, self.2, self.3)
    }
}

/// Join any number of key parts with `.`
pub fn compose_key<I, S>(parts: I) -> String
where
    I: IntoIterator<Item = S>,
    S: Display,
{
    parts
        .into_iter()
        .map(|p| p.to_string())
        .collect::<Vec<_>>()
        .join(".")
}
