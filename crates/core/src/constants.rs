use std::time::Duration;

/// Prefix of every price cache key.
pub const PRICE_CACHE_KEY_PREFIX: &str = "price";

/// Default lifetime of a cached price.
pub const DEFAULT_PRICE_CACHE_TTL: Duration = Duration::from_secs(30);

/// How often the in-memory cache sweeps out expired entries.
pub const CACHE_PURGE_INTERVAL: Duration = Duration::from_secs(60);
