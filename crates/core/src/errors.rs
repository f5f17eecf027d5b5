//! Core error types for the Tokenfolio application.
//!
//! This module defines backend-agnostic error types. Cache-backend errors
//! (Redis, ...) are converted to these types by the cache adapters.

use thiserror::Error;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the pricing and portfolio services.
#[derive(Error, Debug)]
pub enum Error {
    /// Every price provider failed for the request. Callers get one aggregate
    /// error and should show a generic "pricing unavailable" outcome.
    #[error("Pricing unavailable: {0}")]
    PricingUnavailable(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Input validation failed: {0}")]
    Validation(String),

    #[error("Cache operation failed: {0}")]
    Cache(String),

    /// The caller's cancellation token fired before the operation completed.
    #[error("Operation cancelled")]
    Cancelled,

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl From<redis::RedisError> for Error {
    fn from(err: redis::RedisError) -> Self {
        Error::Cache(err.to_string())
    }
}
