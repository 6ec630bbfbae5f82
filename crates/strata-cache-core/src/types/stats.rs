//! Lookup statistics

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::LOG_TARGET;

/// Snapshot of a cache instance's lookup counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LookupStats {
    /// Number of lookups that found a value
    pub hits: u64,
    /// Number of lookups that did not
    pub misses: u64,
}

impl LookupStats {
    /// Calculate hit ratio (0.0 to 1.0)
    pub fn hit_ratio(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    /// Total lookups (hits + misses)
    pub fn total(&self) -> u64 {
        self.hits + self.misses
    }
}

/// Emission cadence: every 100 lookups below 10 000, every 1 000 after
pub fn emit_interval(total: u64) -> u64 {
    if total < 10_000 { 100 } else { 1_000 }
}

/// Hit/miss counters with periodic diagnostic logging
///
/// One recorder per cache instance. Counters only grow.
#[derive(Debug)]
pub struct StatsRecorder {
    backend: &'static str,
    hits: AtomicU64,
    misses: AtomicU64,
    lookups: AtomicU64,
}

impl StatsRecorder {
    /// Create a recorder labelled with the backend it counts for
    pub fn new(backend: &'static str) -> Self {
        Self {
            backend,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            lookups: AtomicU64::new(0),
        }
    }

    /// Record one lookup and maybe emit a summary
    ///
    /// Every lookup gets its own running total, so each summary is emitted
    /// by exactly one caller. Returns whether this call emitted it.
    pub fn record_lookup(&self, present: bool) -> bool {
        if present {
            self.hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
        }

        #[cfg(feature = "metrics")]
        {
            let name = if present {
                "strata_cache_hits_total"
            } else {
                "strata_cache_misses_total"
            };
            metrics::counter!(name, "backend" => self.backend).increment(1);
        }

        let total = self.lookups.fetch_add(1, Ordering::Relaxed) + 1;
        self.maybe_emit(total)
    }

    /// Emit a summary if `total` falls on the sampling cadence
    ///
    /// Returns whether a summary was emitted.
    pub fn maybe_emit(&self, total: u64) -> bool {
        if total == 0 || total % emit_interval(total) != 0 {
            return false;
        }

        let emitted = catch_unwind(AssertUnwindSafe(|| {
            let stats = self.snapshot();
            tracing::debug!(
                target: LOG_TARGET,
                backend = self.backend,
                lookups = total,
                hits = stats.hits,
                misses = stats.misses,
                hit_ratio = stats.hit_ratio(),
                "cache stats"
            );
        }));

        match emitted {
            Ok(()) => true,
            Err(_) => {
                tracing::warn!(target: LOG_TARGET, backend = self.backend, "failed to emit cache stats");
                false
            }
        }
    }

    /// Current counter values
    pub fn snapshot(&self) -> LookupStats {
        LookupStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    /// Backend label
    pub fn backend(&self) -> &'static str {
        self.backend
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_default_stats() {
        let stats = LookupStats::default();
        assert_eq!(stats.total(), 0);
        assert_eq!(stats.hit_ratio(), 0.0);
    }

    #[test]
    fn test_hit_ratio() {
        let stats = LookupStats { hits: 80, misses: 20 };
        assert!((stats.hit_ratio() - 0.8).abs() < f64::EPSILON);
        assert_eq!(stats.total(), 100);
    }

    #[test]
    fn test_record_lookup() {
        let recorder = StatsRecorder::new("local");
        recorder.record_lookup(true);
        recorder.record_lookup(true);
        recorder.record_lookup(false);

        assert_eq!(recorder.snapshot(), LookupStats { hits: 2, misses: 1 });
    }

    #[test]
    fn test_emit_cadence() {
        assert_eq!(emit_interval(0), 100);
        assert_eq!(emit_interval(9_999), 100);
        assert_eq!(emit_interval(10_000), 1_000);

        let recorder = StatsRecorder::new("local");
        assert!(!recorder.maybe_emit(0));
        assert!(!recorder.maybe_emit(50));
        assert!(recorder.maybe_emit(100));
        assert!(recorder.maybe_emit(9_900));
        assert!(!recorder.maybe_emit(10_100));
        assert!(recorder.maybe_emit(11_000));
    }

    #[test]
    fn test_concurrent_counting() {
        let recorder = Arc::new(StatsRecorder::new("local"));
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let recorder = recorder.clone();
                std::thread::spawn(move || {
                    for _ in 0..1_000 {
                        recorder.record_lookup(i % 2 == 0);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let stats = recorder.snapshot();
        assert_eq!(stats.hits, 4_000);
        assert_eq!(stats.misses, 4_000);
    }

    #[test]
    fn test_concurrent_emission_once_per_interval() {
        let recorder = Arc::new(StatsRecorder::new("local"));
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let recorder = recorder.clone();
                std::thread::spawn(move || {
                    (0..2_500)
                        .filter(|_| recorder.record_lookup(i % 3 == 0))
                        .count()
                })
            })
            .collect();
        let emitted: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();

        // every 100 through 9_900, then every 1_000 through 20_000
        assert_eq!(recorder.snapshot().total(), 20_000);
        assert_eq!(emitted, 99 + 11);
    }
}
