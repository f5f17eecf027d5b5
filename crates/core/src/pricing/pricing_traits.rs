use async_trait::async_trait;
use tokenfolio_market_data::{AssetRef, PriceMap};
use tokio_util::sync::CancellationToken;

use crate::errors::Result;

#[async_trait]
pub trait PricingServiceTrait: Send + Sync {
    /// Resolve USD prices for `assets`.
    ///
    /// Assets no provider could price are absent from the map. Fails with
    /// `PricingUnavailable` only when both providers hard-fail, and with
    /// `Cancelled` when `cancel` fires at any wait point.
    async fn resolve_prices(
        &self,
        assets: &[AssetRef],
        cancel: &CancellationToken,
    ) -> Result<PriceMap>;

    /// Drop cached prices for `assets` so the next resolution hits a provider.
    ///
    /// Fails with `Cancelled` when `cancel` fires before every delete completes.
    async fn evict_prices(&self, assets: &[AssetRef], cancel: &CancellationToken) -> Result<()>;
}
