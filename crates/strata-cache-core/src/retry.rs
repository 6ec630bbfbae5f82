//! Explicit retry loop
//!
//! Retries are modelled as a loop that reports how it went instead of
//! relying on errors for control flow.

use std::future::Future;

use crate::CacheError;

/// Outcome of a retried operation
#[derive(Debug, Clone)]
pub struct RetryOutcome<T> {
    /// Value of the first successful attempt
    pub value: Option<T>,
    /// Number of attempts made
    pub attempts: u32,
    /// Error of the last failed attempt
    pub last_error: Option<CacheError>,
}

impl<T> RetryOutcome<T> {
    /// Whether any attempt succeeded
    pub fn succeeded(&self) -> bool {
        self.value.is_some()
    }
}

/// Run `op` until it succeeds or `max_attempts` attempts were made
///
/// At least one attempt is always made.
pub async fn retry<T, F, Fut>(max_attempts: u32, mut op: F) -> RetryOutcome<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, CacheError>>,
{
    let max_attempts = max_attempts.max(1);
    let mut attempts = 0;
    let mut last_error = None;

    while attempts < max_attempts {
        attempts += 1;
        match op().await {
            Ok(value) => {
                return RetryOutcome {
                    value: Some(value),
                    attempts,
                    last_error,
                };
            }
            Err(e) => last_error = Some(e),
        }
    }

    RetryOutcome {
        value: None,
        attempts,
        last_error,
    }
}
