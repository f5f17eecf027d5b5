//! Portfolio valuation views.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One holding priced in USD.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HoldingView {
    pub chain: String,
    pub contract_address: String,
    pub amount: Decimal,
    /// `None` when no provider could price the asset.
    pub price_usd: Option<Decimal>,
    /// `amount * price_usd`, zero when the price is unknown.
    pub value_usd: Decimal,
}

/// Read-only valuation of a wallet. Never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioView {
    pub wallet: String,
    pub holdings: Vec<HoldingView>,
    pub total_value_usd: Decimal,
}

impl PortfolioView {
    /// Number of holdings that could not be priced.
    pub fn unpriced_count(&self) -> usize {
        self.holdings
            .iter()
            .filter(|h| h.price_usd.is_none())
            .count()
    }
}
