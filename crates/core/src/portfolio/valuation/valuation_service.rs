use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, warn};
use rust_decimal::Decimal;
use tokio_util::sync::CancellationToken;

use super::valuation_model::{HoldingView, PortfolioView};
use super::valuation_traits::ValuationServiceTrait;
use crate::errors::{Error, Result};
use crate::portfolio::holdings::{HoldingsRepositoryTrait, Portfolio};
use crate::pricing::PricingServiceTrait;

fn overflow(wallet: &str) -> Error {
    Error::Unexpected(format!("USD value of '{}' overflows", wallet))
}

pub struct ValuationService {
    pricing_service: Arc<dyn PricingServiceTrait>,
    holdings_repository: Arc<dyn HoldingsRepositoryTrait>,
}

impl ValuationService {
    pub fn new(
        pricing_service: Arc<dyn PricingServiceTrait>,
        holdings_repository: Arc<dyn HoldingsRepositoryTrait>,
    ) -> Self {
        Self {
            pricing_service,
            holdings_repository,
        }
    }
}

#[async_trait]
impl ValuationServiceTrait for ValuationService {
    async fn value(
        &self,
        portfolio: &Portfolio,
        cancel: &CancellationToken,
    ) -> Result<PortfolioView> {
        let assets = portfolio.assets();
        let prices = if assets.is_empty() {
            Default::default()
        } else {
            self.pricing_service.resolve_prices(&assets, cancel).await?
        };

        let mut total_value_usd = Decimal::ZERO;
        let mut holdings = Vec::with_capacity(portfolio.holdings.len());
        for holding in &portfolio.holdings {
            let price_usd = prices.get(&holding.asset_ref()).copied();
            let value_usd = match price_usd {
                Some(price) => holding
                    .amount
                    .checked_mul(price)
                    .ok_or_else(|| overflow(&portfolio.wallet))?,
                None => Decimal::ZERO,
            };
            total_value_usd = total_value_usd
                .checked_add(value_usd)
                .ok_or_else(|| overflow(&portfolio.wallet))?;
            holdings.push(HoldingView {
                chain: holding.chain.clone(),
                contract_address: holding.contract_address.clone(),
                amount: holding.amount,
                price_usd,
                value_usd,
            });
        }

        let view = PortfolioView {
            wallet: portfolio.wallet.clone(),
            holdings,
            total_value_usd,
        };

        let unpriced = view.unpriced_count();
        if unpriced > 0 {
            warn!(
                "{} of {} holdings in '{}' have no price",
                unpriced,
                view.holdings.len(),
                view.wallet
            );
        }
        debug!("Valued '{}' at {} USD", view.wallet, view.total_value_usd);

        Ok(view)
    }

    async fn value_portfolio(
        &self,
        wallet: &str,
        cancel: &CancellationToken,
    ) -> Result<PortfolioView> {
        let portfolio = self.holdings_repository.get(wallet)?;
        self.value(&portfolio, cancel).await
    }
}
