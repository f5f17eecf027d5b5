use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use log::debug;

use super::holdings_model::{normalize_wallet, Portfolio};
use super::holdings_traits::HoldingsRepositoryTrait;
use crate::errors::{Error, Result};

/// Process-local portfolio store, keyed by normalized wallet.
#[derive(Debug, Default)]
pub struct InMemoryHoldingsRepository {
    portfolios: RwLock<HashMap<String, Portfolio>>,
}

impl InMemoryHoldingsRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a repository pre-populated with the given portfolios.
    pub fn with_portfolios(portfolios: impl IntoIterator<Item = Portfolio>) -> Self {
        let portfolios = portfolios
            .into_iter()
            .map(|mut p| {
                p.wallet = normalize_wallet(&p.wallet).to_string();
                (p.wallet.clone(), p)
            })
            .collect();
        Self {
            portfolios: RwLock::new(portfolios),
        }
    }
}

#[async_trait]
impl HoldingsRepositoryTrait for InMemoryHoldingsRepository {
    fn get(&self, wallet: &str) -> Result<Portfolio> {
        let wallet = normalize_wallet(wallet);
        self.portfolios
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(wallet)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("Portfolio for wallet '{}'", wallet)))
    }

    async fn save(&self, mut portfolio: Portfolio) -> Result<Portfolio> {
        portfolio.wallet = normalize_wallet(&portfolio.wallet).to_string();
        debug!(
            "Saving portfolio '{}' with {} holdings",
            portfolio.wallet,
            portfolio.holdings.len()
        );
        self.portfolios
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(portfolio.wallet.clone(), portfolio.clone());
        Ok(portfolio)
    }
}
