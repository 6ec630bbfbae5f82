//! Single in-flight reconnection flag

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Allows at most one reconnection at a time
///
/// The flag is the only mutual exclusion used by the tiered cache. It is
/// released when the [`ReconnectTicket`] is dropped, so a panicking
/// reconnection never leaves it stuck.
#[derive(Debug, Default)]
pub struct ReconnectGuard {
    in_flight: AtomicBool,
}

impl ReconnectGuard {
    /// Create a released guard
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the guard, or `None` if a reconnection is already running
    pub fn try_acquire(self: &Arc<Self>) -> Option<ReconnectTicket> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| ReconnectTicket {
                guard: Arc::clone(self),
            })
    }

    /// Whether a reconnection is running
    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }
}

/// Proof of a claimed [`ReconnectGuard`]; releases it on drop
#[derive(Debug)]
pub struct ReconnectTicket {
    guard: Arc<ReconnectGuard>,
}

impl Drop for ReconnectTicket {
    fn drop(&mut self) {
        self.guard.in_flight.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_ticket() {
        let guard = Arc::new(ReconnectGuard::new());
        let ticket = guard.try_acquire();
        assert!(ticket.is_some());
        assert!(guard.is_in_flight());
        assert!(guard.try_acquire().is_none());

        drop(ticket);
        assert!(!guard.is_in_flight());
        assert!(guard.try_acquire().is_some());
    }

    #[test]
    fn test_concurrent_acquire() {
        let guard = Arc::new(ReconnectGuard::new());
        let barrier = Arc::new(std::sync::Barrier::new(16));

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let guard = guard.clone();
                let barrier = barrier.clone();
                std::thread::spawn(move || {
                    barrier.wait();
                    guard.try_acquire()
                })
            })
            .collect();

        let tickets: Vec<_> = handles
            .into_iter()
            .filter_map(|h| h.join().unwrap())
            .collect();
        assert_eq!(tickets.len(), 1);
    }
}
