//! Resilience primitives shared by outbound provider calls.
//!
//! - Rate limiting with a process-wide token bucket per provider
//! - Bounded retry with exponential backoff and cancellation

mod rate_limiter;
mod retry;

pub use rate_limiter::{RateLimitConfig, RateLimiter};
pub use retry::{retry, RetryPolicy};
