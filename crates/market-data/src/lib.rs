//! Tokenfolio Market Data Crate
//!
//! This crate provides provider-agnostic USD price fetching for on-chain
//! assets.
//!
//! # Overview
//!
//! The market data crate supports:
//! - Canonical asset identity across chains ([`AssetRef`])
//! - Multiple providers behind one trait ([`PriceProvider`])
//! - Process-wide rate limiting and bounded retry with backoff
//! - Cooperative cancellation of every wait point
//!
//! # Architecture
//!
//! ```text
//! +------------------+     +------------------+
//! |   Domain Layer   | --> |    AssetRef      |  (canonical identity)
//! +------------------+     +------------------+
//!                                  |
//!                                  v
//!                          +------------------+
//!                          |  PriceProvider   |  (CoinGecko, Deterministic)
//!                          +------------------+
//!                                  |
//!                     +------------+------------+
//!                     v                         v
//!             +---------------+         +---------------+
//!             |  RateLimiter  |         |  retry()      |
//!             +---------------+         +---------------+
//!                                  |
//!                                  v
//!                          +------------------+
//!                          |    PriceMap      |  (AssetRef -> USD)
//!                          +------------------+
//! ```
//!
//! # Core Types
//!
//! - [`AssetRef`] - Chain + contract address, normalized on construction
//! - [`PriceMap`] - Resolved USD prices; unresolved assets are absent
//! - [`RateLimiter`] - Token bucket limiter shared by all outbound calls
//! - [`RetryPolicy`] - Retry budget and exponential backoff bounds

pub mod errors;
pub mod models;
pub mod provider;
pub mod resilience;

// Re-export all public types from models
pub use models::{AssetRef, Chain, PriceMap, ProviderId};

// Re-export provider types
pub use provider::coingecko::{CoinGeckoConfig, CoinGeckoProvider};
pub use provider::deterministic::DeterministicProvider;
pub use provider::PriceProvider;

// Re-export resilience types
pub use resilience::{retry, RateLimitConfig, RateLimiter, RetryPolicy};

pub use errors::MarketDataError;
