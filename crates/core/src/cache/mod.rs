//! Key/value cache with per-entry TTL.
//!
//! The pricing service talks to [`CacheStore`] only. Two adapters are provided:
//! - [`InMemoryCache`] for single-process deployments and tests
//! - [`RedisCache`] for a shared cache backed by Redis

pub mod cache_traits;
pub mod memory_cache;
pub mod redis_cache;

pub use cache_traits::CacheStore;
pub use memory_cache::InMemoryCache;
pub use redis_cache::RedisCache;
