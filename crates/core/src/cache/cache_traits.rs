use std::time::Duration;

use async_trait::async_trait;

use crate::errors::Result;

/// Opaque string key/value store with per-entry expiry.
///
/// Implementations must be safe to share between concurrent requests.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Store `value` under `key`, replacing any previous entry.
    /// A zero `ttl` stores the entry without expiry.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()>;

    /// Fetch the live value for `key`; `None` when absent or expired.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Remove `key`. Removing a missing key is not an error.
    async fn del(&self, key: &str) -> Result<()>;
}
