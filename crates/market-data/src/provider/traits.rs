//! Price provider trait definitions.
//!
//! This module defines the core `PriceProvider` trait that all price sources
//! implement.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::errors::MarketDataError;
use crate::models::{AssetRef, PriceMap};

/// Trait for USD price providers.
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use tokenfolio_market_data::provider::PriceProvider;
///
/// struct FixedProvider;
///
/// #[async_trait]
/// impl PriceProvider for FixedProvider {
///     fn id(&self) -> &'static str {
///         "FIXED"
///     }
///
///     async fn get_prices(
///         &self,
///         assets: &[AssetRef],
///         _cancel: &CancellationToken,
///     ) -> Result<PriceMap, MarketDataError> {
///         Ok(assets.iter().map(|a| (a.clone(), Decimal::ONE)).collect())
///     }
/// }
/// ```
#[async_trait]
pub trait PriceProvider: Send + Sync {
    /// Unique identifier for this provider.
    ///
    /// Should be a constant string like "COINGECKO". Used for logging and
    /// rate limiter buckets.
    fn id(&self) -> &'static str;

    /// Fetch USD prices for a batch of assets.
    ///
    /// Assets the provider cannot price are omitted from the returned map;
    /// that is not an error. An `Err` means the call itself failed (after any
    /// internal retries) and no partial result is available.
    async fn get_prices(
        &self,
        assets: &[AssetRef],
        cancel: &CancellationToken,
    ) -> Result<PriceMap, MarketDataError>;
}
