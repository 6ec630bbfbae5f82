//! Managed distributed cache far tier

mod config;
mod tier;

pub use config::ManagedConfig;
pub use tier::ManagedTier;
