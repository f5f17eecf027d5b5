use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use super::valuation_model::PortfolioView;
use crate::errors::Result;
use crate::portfolio::holdings::Portfolio;

#[async_trait]
pub trait ValuationServiceTrait: Send + Sync {
    /// Prices every holding of `portfolio` with a single batched lookup.
    async fn value(&self, portfolio: &Portfolio, cancel: &CancellationToken)
        -> Result<PortfolioView>;

    /// Loads the wallet's portfolio and values it.
    ///
    /// An unknown wallet is `Error::NotFound` and no prices are requested.
    async fn value_portfolio(
        &self,
        wallet: &str,
        cancel: &CancellationToken,
    ) -> Result<PortfolioView>;
}
