//! strata-cache-core: Core traits and types for the strata-cache library
//!
//! This crate provides the foundational types and traits shared by every
//! strata-cache backend: the cache contract, key naming, lookup statistics,
//! serialization and the error taxonomy.

mod clock;
mod error;
mod retry;
mod traits;
mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{CacheError, Result};
pub use retry::{RetryOutcome, retry};
pub use traits::*;
pub use types::*;

/// Tracing target used by every strata-cache crate
pub const LOG_TARGET: &str = "strata_cache";
