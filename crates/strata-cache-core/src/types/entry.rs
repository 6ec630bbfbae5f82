//! Cache entry type

use std::time::{Duration, Instant};

/// A cached value and the instant it stops being valid
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    /// The cached value
    pub value: T,
    /// When the entry expires
    pub expires_at: Instant,
}

impl<T> CacheEntry<T> {
    /// Create an entry that expires `ttl` after `now`
    pub fn new(value: T, now: Instant, ttl: Duration) -> Self {
        Self {
            value,
            expires_at: now + ttl,
        }
    }

    /// Check if entry has expired at `now`
    pub fn is_expired_at(&self, now: Instant) -> bool {
        now > self.expires_at
    }

    /// Get remaining TTL
    pub fn ttl_remaining(&self, now: Instant) -> Option<Duration> {
        self.expires_at.checked_duration_since(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_entry() {
        let now = Instant::now();
        let entry = CacheEntry::new("test".to_string(), now, Duration::from_secs(5));
        assert_eq!(entry.value, "test");
        assert!(!entry.is_expired_at(now));
        assert_eq!(entry.ttl_remaining(now), Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_expiry_boundary() {
        let now = Instant::now();
        let entry = CacheEntry::new(1, now, Duration::from_secs(5));
        assert!(!entry.is_expired_at(now + Duration::from_secs(5)));
        assert!(entry.is_expired_at(now + Duration::from_secs(6)));
        assert!(entry.ttl_remaining(now + Duration::from_secs(6)).is_none());
    }
}
