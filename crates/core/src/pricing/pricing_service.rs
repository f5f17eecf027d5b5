use std::collections::HashSet;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;
use log::{debug, error, info, warn};
use rust_decimal::Decimal;
use tokenfolio_market_data::{AssetRef, MarketDataError, PriceMap, PriceProvider};
use tokio_util::sync::CancellationToken;

use super::PricingServiceTrait;
use crate::cache::CacheStore;
use crate::constants::PRICE_CACHE_KEY_PREFIX;
use crate::errors::{Error, Result};

/// Cache key for an asset: `price:<chain>:<contract>`.
///
/// Both components are percent-encoded so distinct assets can never share a
/// key, even when a chain name contains `:`. The contract address is already
/// lower-case on every `AssetRef`.
pub fn price_cache_key(asset: &AssetRef) -> String {
    format!(
        "{}:{}:{}",
        PRICE_CACHE_KEY_PREFIX,
        urlencoding::encode(asset.chain()),
        urlencoding::encode(asset.contract_address())
    )
}

/// Cache-aside price resolution over a primary and a fallback provider.
#[derive(Clone)]
pub struct PricingService {
    cache: Arc<dyn CacheStore>,
    primary: Arc<dyn PriceProvider>,
    fallback: Arc<dyn PriceProvider>,
    cache_ttl: Duration,
}

impl PricingService {
    pub fn new(
        cache: Arc<dyn CacheStore>,
        primary: Arc<dyn PriceProvider>,
        fallback: Arc<dyn PriceProvider>,
        cache_ttl: Duration,
    ) -> Self {
        Self {
            cache,
            primary,
            fallback,
            cache_ttl,
        }
    }

    /// Look every asset up in the cache.
    ///
    /// Returns the parsed hits and the assets still pending. Backend errors and
    /// unparseable values count as misses.
    async fn lookup_cached(
        &self,
        assets: &[&AssetRef],
        cancel: &CancellationToken,
    ) -> Result<(PriceMap, Vec<AssetRef>)> {
        let lookups = assets.iter().map(|asset| async move {
            let key = price_cache_key(asset);
            let cached = match self.cache.get(&key).await {
                Ok(value) => value,
                Err(e) => {
                    warn!("Cache lookup failed for '{}': {}. Treating as miss", key, e);
                    None
                }
            };

            let price = cached.and_then(|raw| match Decimal::from_str(raw.trim()) {
                Ok(price) => Some(price),
                Err(_) => {
                    debug!("Unparseable cached price '{}' for '{}'", raw, key);
                    None
                }
            });
            (*asset, price)
        });

        let results = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(Error::Cancelled),
            results = join_all(lookups) => results,
        };

        let mut prices = PriceMap::with_capacity(results.len());
        let mut pending = Vec::new();
        for (asset, price) in results {
            match price {
                Some(price) => {
                    prices.insert(asset.clone(), price);
                }
                None => pending.push(asset.clone()),
            }
        }

        Ok((prices, pending))
    }

    /// Primary first; fallback only when the primary call itself fails.
    async fn fetch_from_providers(
        &self,
        pending: &[AssetRef],
        cancel: &CancellationToken,
    ) -> Result<PriceMap> {
        let primary_error = match self.primary.get_prices(pending, cancel).await {
            Ok(prices) => {
                if prices.len() < pending.len() {
                    debug!(
                        "Provider '{}' resolved {}/{} assets",
                        self.primary.id(),
                        prices.len(),
                        pending.len()
                    );
                }
                return Ok(prices);
            }
            Err(MarketDataError::Cancelled) => return Err(Error::Cancelled),
            Err(e) => e,
        };

        warn!(
            "Primary provider '{}' failed: {}. Falling back to '{}'",
            self.primary.id(),
            primary_error,
            self.fallback.id()
        );

        match self.fallback.get_prices(pending, cancel).await {
            Ok(prices) => Ok(prices),
            Err(MarketDataError::Cancelled) => Err(Error::Cancelled),
            Err(fallback_error) => {
                error!(
                    "Fallback provider '{}' failed: {}",
                    self.fallback.id(),
                    fallback_error
                );
                Err(Error::PricingUnavailable(format!(
                    "{}: {}; {}: {}",
                    self.primary.id(),
                    primary_error,
                    self.fallback.id(),
                    fallback_error
                )))
            }
        }
    }

    /// Write freshly fetched prices to the cache.
    ///
    /// Completes before the caller gets its answer, so a repeat request sees
    /// the entries. Failed writes are logged and never fail the resolution.
    async fn write_back(&self, prices: &PriceMap) {
        let writes = prices.iter().map(|(asset, price)| async move {
            let key = price_cache_key(asset);
            if let Err(e) = self.cache.set(&key, &price.to_string(), self.cache_ttl).await {
                warn!("Failed to cache price for '{}': {}", key, e);
            }
        });
        join_all(writes).await;
    }
}

#[async_trait]
impl PricingServiceTrait for PricingService {
    async fn resolve_prices(
        &self,
        assets: &[AssetRef],
        cancel: &CancellationToken,
    ) -> Result<PriceMap> {
        let mut seen = HashSet::with_capacity(assets.len());
        let distinct: Vec<&AssetRef> = assets.iter().filter(|a| seen.insert(*a)).collect();

        if distinct.is_empty() {
            return Ok(PriceMap::new());
        }

        let (mut prices, pending) = self.lookup_cached(&distinct, cancel).await?;

        if pending.is_empty() {
            debug!("All {} prices served from cache", prices.len());
            return Ok(prices);
        }

        info!(
            "Resolving {} prices ({} cached, {} pending)",
            distinct.len(),
            prices.len(),
            pending.len()
        );

        let mut fetched = self.fetch_from_providers(&pending, cancel).await?;

        let requested: HashSet<&AssetRef> = pending.iter().collect();
        fetched.retain(|asset, _| requested.contains(asset));

        self.write_back(&fetched).await;
        prices.extend(fetched);

        Ok(prices)
    }

    async fn evict_prices(&self, assets: &[AssetRef], cancel: &CancellationToken) -> Result<()> {
        let deletes = assets
            .iter()
            .map(|asset| async move { self.cache.del(&price_cache_key(asset)).await });

        let results = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(Error::Cancelled),
            results = join_all(deletes) => results,
        };
        for result in results {
            result?;
        }

        debug!("Evicted {} cached prices", assets.len());
        Ok(())
    }
}
