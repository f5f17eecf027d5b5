//! Price resolution.
//!
//! ```text
//! resolve_prices(assets)
//!     → CacheStore (hits)
//!     → primary PriceProvider (misses, retried internally)
//!     → fallback PriceProvider (only if primary hard-fails)
//!     → CacheStore write-back (detached)
//! ```

pub mod pricing_service;
pub mod pricing_traits;


pub use pricing_service::{price_cache_key, PricingService};
pub use pricing_traits::PricingServiceTrait;
