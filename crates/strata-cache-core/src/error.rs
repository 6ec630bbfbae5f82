//! Error types for cache operations

use thiserror::Error;

/// Main error type for all cache operations
///
/// Errors raised by a caller's compute function are not represented here;
/// they travel through the cache untouched in the caller's own error type.
#[derive(Error, Debug, Clone)]
pub enum CacheError {
    /// Key or profile not found
    #[error("not found: {0}")]
    NotFound(String),

    /// Serialization failed
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Deserialization failed
    #[error("deserialization error: {0}")]
    Deserialization(String),

    /// Backend unreachable
    #[error("connection error: {0}")]
    Connection(String),

    /// Backend operation failed
    #[error("backend error: {0}")]
    Backend(String),

    /// Backend could not be instantiated
    #[error("construction error: {0}")]
    Construction(String),

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),

    /// Timeout
    #[error("operation timed out")]
    Timeout,
}

impl CacheError {
    /// Whether this error means the far tier is unreachable
    pub fn is_connection(&self) -> bool {
        matches!(self, CacheError::Connection(_))
    }
}

/// Result type alias for cache operations
pub type Result<T> = std::result::Result<T, CacheError>;
