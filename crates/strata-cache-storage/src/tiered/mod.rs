//! Near/far two-tier cache

mod cache;
mod memory;
mod reconnect;
mod tier;

pub use cache::{TieredCache, TieredConfig};
pub use memory::MemoryTier;
pub use reconnect::{ReconnectGuard, ReconnectTicket};
pub use tier::{ErrorTriage, FarTier};
