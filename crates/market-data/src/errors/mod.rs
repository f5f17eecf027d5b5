//! Error types for the market data crate.
//!
//! This module provides [`MarketDataError`], the error returned by every price
//! provider, the rate limiter and the retry executor.

use thiserror::Error;

/// Errors that can occur during market data operations.
#[derive(Error, Debug)]
pub enum MarketDataError {
    /// The provider rate limited the request (HTTP 429).
    #[error("Rate limited: {provider}")]
    RateLimited {
        /// The provider that rate limited the request
        provider: String,
    },

    /// The request to the provider timed out.
    #[error("Timeout: {provider}")]
    Timeout {
        /// The provider that timed out
        provider: String,
    },

    /// A provider-specific error occurred: transport failure, non-2xx status
    /// or a body that could not be decoded.
    #[error("Provider error: {provider} - {message}")]
    ProviderError {
        /// The provider that returned the error
        provider: String,
        /// The error message from the provider
        message: String,
    },

    /// The caller's cancellation token fired while the operation was waiting.
    /// Never retried and never routed to a fallback provider.
    #[error("Operation cancelled")]
    Cancelled,
}

impl MarketDataError {
    /// Returns true when the error was caused by caller cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Provider that produced the error, if any.
    pub fn provider(&self) -> Option<&str> {
        match self {
            Self::RateLimited { provider }
            | Self::Timeout { provider }
            | Self::ProviderError { provider, .. } => Some(provider),
            Self::Cancelled => None,
        }
    }
}
