//! Keyword→metrics cache with Redis-primary, on-disk-FIFO-fallback
//! semantics, per spec §4.1.

mod backend;
mod cache;
mod fifo_backend;
mod redis_backend;

pub use backend::CacheBackend;
pub use cache::{Cache, RedisConfig};
pub use fifo_backend::FifoBackend;
pub use redis_backend::RedisBackend;
