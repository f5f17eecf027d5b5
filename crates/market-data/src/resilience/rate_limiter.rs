//! Token bucket rate limiter for outbound price provider calls.
//!
//! A single `RateLimiter` is owned by the process and shared (via `Arc`) by
//! every outbound call, so concurrent per-chain requests draw from the same
//! bucket. Buckets are keyed by provider id and run on tokio's clock.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use log::{debug, warn};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::errors::MarketDataError;
use crate::models::ProviderId;

/// Default rate limit: one request every two seconds.
const DEFAULT_REQUESTS_PER_MINUTE: u32 = 30;

/// Default bucket capacity (no bursting).
const DEFAULT_BUCKET_CAPACITY: f64 = 1.0;

/// Rate limiter configuration for a provider.
#[derive(Clone, Debug, PartialEq)]
pub struct RateLimitConfig {
    /// Maximum requests per minute.
    pub requests_per_minute: u32,
    /// Maximum burst capacity.
    pub burst_capacity: f64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_minute: DEFAULT_REQUESTS_PER_MINUTE,
            burst_capacity: DEFAULT_BUCKET_CAPACITY,
        }
    }
}

#[derive(Debug)]
struct TokenBucket {
    tokens: f64,
    capacity: f64,
    /// Tokens per second.
    refill_rate: f64,
    refilled_at: Instant,
}

impl TokenBucket {
    /// A full bucket.
    fn new(config: &RateLimitConfig, now: Instant) -> Self {
        let capacity = config.burst_capacity.max(1.0);
        Self {
            tokens: capacity,
            capacity,
            refill_rate: f64::from(config.requests_per_minute.max(1)) / 60.0,
            refilled_at: now,
        }
    }

    /// Take one token, or report how long until one is available.
    fn take(&mut self, now: Instant) -> Result<(), Duration> {
        let elapsed = now.saturating_duration_since(self.refilled_at).as_secs_f64();
        self.tokens = (self.tokens + elapsed * self.refill_rate).min(self.capacity);
        self.refilled_at = now;

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            Ok(())
        } else {
            Err(Duration::from_secs_f64(
                (1.0 - self.tokens) / self.refill_rate,
            ))
        }
    }
}

/// Thread-safe token bucket rate limiter.
///
/// Providers without a registered configuration get the default bucket (one
/// call every two seconds).
#[derive(Debug, Default)]
pub struct RateLimiter {
    configs: Mutex<HashMap<String, RateLimitConfig>>,
    buckets: Mutex<HashMap<String, TokenBucket>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock<'a, T>(mutex: &'a Mutex<T>, what: &str) -> MutexGuard<'a, T> {
        mutex.lock().unwrap_or_else(|poisoned| {
            warn!("Rate limiter {} mutex was poisoned, recovering", what);
            poisoned.into_inner()
        })
    }

    /// Register the limits for `provider`, starting it with a full bucket.
    pub fn configure(&self, provider: &ProviderId, config: RateLimitConfig) {
        Self::lock(&self.configs, "configs").insert(provider.to_string(), config);
        Self::lock(&self.buckets, "buckets").remove(provider.as_ref());
    }

    /// Take a token or return the wait until the next one.
    fn take(&self, provider: &ProviderId) -> Result<(), Duration> {
        let now = Instant::now();
        let config = Self::lock(&self.configs, "configs")
            .get(provider.as_ref())
            .cloned()
            .unwrap_or_default();

        Self::lock(&self.buckets, "buckets")
            .entry(provider.to_string())
            .or_insert_with(|| TokenBucket::new(&config, now))
            .take(now)
    }

    /// Wait until a token is available for `provider`.
    ///
    /// Returns [`MarketDataError::Cancelled`] as soon as `cancel` fires while
    /// waiting. The internal lock is never held across the wait.
    pub async fn acquire(
        &self,
        provider: &ProviderId,
        cancel: &CancellationToken,
    ) -> Result<(), MarketDataError> {
        loop {
            if cancel.is_cancelled() {
                return Err(MarketDataError::Cancelled);
            }

            let wait = match self.take(provider) {
                Ok(()) => {
                    debug!("Rate limiter: acquired token for '{}'", provider);
                    return Ok(());
                }
                Err(wait) => wait,
            };

            debug!("Rate limiter: waiting {:?} for '{}'", wait, provider);
            tokio::select! {
                _ = cancel.cancelled() => return Err(MarketDataError::Cancelled),
                _ = tokio::time::sleep(wait) => {}
            }
        }
    }
}
