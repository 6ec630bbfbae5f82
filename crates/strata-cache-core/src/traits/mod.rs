//! Core traits for cache operations

mod cache;
mod key;
mod serializer;
mod type_name;

pub use cache::{CacheValue, SimpleCache};
pub use key::{CacheKey, KeyNamer, compose_key, name};
pub use serializer::{JsonSerializer, Serializer};
pub use type_name::{TypeName, generic_type_name};

#[cfg(feature = "msgpack")]
pub use serializer::MsgPackSerializer;

#[cfg(feature = "bincode")]
pub use serializer::BincodeSerializer;
