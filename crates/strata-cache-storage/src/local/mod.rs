//! In-process expiring store and the cache built on it

mod cache;
mod store;

pub use cache::LocalCache;
pub use store::{LocalConfig, LocalTtlStore};
