//! Holdings repository and service traits.

use async_trait::async_trait;
use tokenfolio_market_data::AssetRef;

use super::holdings_model::{Holding, Portfolio};
use crate::errors::Result;

/// Storage contract for wallet portfolios.
#[async_trait]
pub trait HoldingsRepositoryTrait: Send + Sync {
    /// Loads the portfolio of a wallet.
    ///
    /// `wallet` is matched after [`normalize_wallet`](super::normalize_wallet).
    /// Returns `Error::NotFound` when the wallet has no portfolio.
    fn get(&self, wallet: &str) -> Result<Portfolio>;

    /// Inserts or replaces the portfolio keyed by the normalized `portfolio.wallet`.
    async fn save(&self, portfolio: Portfolio) -> Result<Portfolio>;
}

/// Business operations on a wallet's holdings.
#[async_trait]
pub trait HoldingsServiceTrait: Send + Sync {
    fn get_portfolio(&self, wallet: &str) -> Result<Portfolio>;

    /// Adds a holding, creating the portfolio for an unknown wallet.
    async fn add_holding(&self, wallet: &str, holding: Holding) -> Result<Portfolio>;

    /// Replaces the amount of an existing holding.
    async fn update_holding(&self, wallet: &str, holding: Holding) -> Result<Portfolio>;

    /// Removes a holding. Removing an asset the wallet does not hold is a no-op.
    async fn remove_holding(&self, wallet: &str, asset: &AssetRef) -> Result<Portfolio>;
}
