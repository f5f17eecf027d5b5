//! Price provider abstractions and implementations.
//!
//! This module contains:
//! - The `PriceProvider` trait that all providers implement
//! - The CoinGecko provider, used as the primary remote source
//! - The deterministic provider, used as a never-failing fallback
//!
//! Providers are selected statically when the pricing service is built; the
//! service only ever talks to `Arc<dyn PriceProvider>`.

mod traits;

pub mod coingecko;
pub mod deterministic;

pub use traits::PriceProvider;
