//! Tokenfolio Core - price resolution and portfolio valuation.
//!
//! This crate owns the cache-aside pricing engine, the wallet holdings store
//! and the valuation service. It is transport-agnostic: the HTTP server in
//! `apps/server` is a thin layer over the traits defined here, and price
//! sources come from the `tokenfolio-market-data` crate.

pub mod cache;
pub mod constants;
pub mod errors;
pub mod portfolio;
pub mod pricing;

// Re-export common types from the portfolio and pricing modules
pub use portfolio::*;
pub use pricing::{price_cache_key, PricingService, PricingServiceTrait};

// Re-export error types
pub use errors::Error;
pub use errors::Result;
