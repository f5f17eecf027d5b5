use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, info};
use rust_decimal::Decimal;
use tokenfolio_market_data::AssetRef;
use tokio::sync::Mutex;

use super::holdings_model::{normalize_wallet, Holding, Portfolio};
use super::holdings_traits::{HoldingsRepositoryTrait, HoldingsServiceTrait};
use crate::errors::{Error, Result};

pub struct HoldingsService {
    repository: Arc<dyn HoldingsRepositoryTrait>,
    // Serializes read-modify-write cycles against the repository.
    write_lock: Mutex<()>,
}

impl HoldingsService {
    pub fn new(repository: Arc<dyn HoldingsRepositoryTrait>) -> Self {
        Self {
            repository,
            write_lock: Mutex::new(()),
        }
    }

    fn validate_wallet(wallet: &str) -> Result<&str> {
        let wallet = normalize_wallet(wallet);
        if wallet.is_empty() {
            return Err(Error::Validation("Wallet must not be empty".to_string()));
        }
        Ok(wallet)
    }

    /// Checks the holding and returns it in normalized form.
    fn validate_holding(holding: Holding) -> Result<Holding> {
        if holding.chain.trim().is_empty() {
            return Err(Error::Validation("Chain must not be empty".to_string()));
        }
        if holding.amount < Decimal::ZERO {
            return Err(Error::Validation(format!(
                "Amount must not be negative, got {}",
                holding.amount
            )));
        }
        Ok(Holding::new(
            &holding.chain,
            &holding.contract_address,
            holding.amount,
        ))
    }
}

#[async_trait]
impl HoldingsServiceTrait for HoldingsService {
    fn get_portfolio(&self, wallet: &str) -> Result<Portfolio> {
        self.repository.get(Self::validate_wallet(wallet)?)
    }

    async fn add_holding(&self, wallet: &str, holding: Holding) -> Result<Portfolio> {
        let wallet = Self::validate_wallet(wallet)?;
        let holding = Self::validate_holding(holding)?;
        let asset = holding.asset_ref();

        let _guard = self.write_lock.lock().await;
        let mut portfolio = match self.repository.get(wallet) {
            Ok(portfolio) => portfolio,
            Err(Error::NotFound(_)) => {
                info!("Creating portfolio for wallet '{}'", wallet);
                Portfolio::new(wallet)
            }
            Err(e) => return Err(e),
        };

        if portfolio.find(&asset).is_some() {
            return Err(Error::ConstraintViolation(format!(
                "Wallet '{}' already holds {}",
                wallet, asset
            )));
        }

        debug!("Adding {} of {} to '{}'", holding.amount, asset, wallet);
        portfolio.holdings.push(holding);
        self.repository.save(portfolio).await
    }

    async fn update_holding(&self, wallet: &str, holding: Holding) -> Result<Portfolio> {
        let wallet = Self::validate_wallet(wallet)?;
        let holding = Self::validate_holding(holding)?;
        let asset = holding.asset_ref();

        let _guard = self.write_lock.lock().await;
        let mut portfolio = self.repository.get(wallet)?;
        let index = portfolio.position(&asset).ok_or_else(|| {
            Error::NotFound(format!("Holding {} in wallet '{}'", asset, wallet))
        })?;

        portfolio.holdings[index].amount = holding.amount;
        self.repository.save(portfolio).await
    }

    async fn remove_holding(&self, wallet: &str, asset: &AssetRef) -> Result<Portfolio> {
        let wallet = Self::validate_wallet(wallet)?;

        let _guard = self.write_lock.lock().await;
        let mut portfolio = self.repository.get(wallet)?;
        let before = portfolio.holdings.len();
        portfolio.holdings.retain(|h| !h.is_same_asset(asset));

        if portfolio.holdings.len() == before {
            debug!("Wallet '{}' does not hold {}, nothing to remove", wallet, asset);
            return Ok(portfolio);
        }
        self.repository.save(portfolio).await
    }
}
