//! CoinGecko price provider.
//!
//! Fetches USD token prices from the `/simple/token_price/{platform}` endpoint.
//! The endpoint accepts a single platform (chain) per call, so requested assets
//! are grouped by chain and one call is issued per group. Groups are fetched
//! concurrently; every call waits on the shared rate limiter first and is
//! wrapped in the retry executor.
//!
//! API documentation: https://docs.coingecko.com/reference/simple-token-price

mod models;

use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::try_join_all;
use log::{debug, warn};
use reqwest::Client;
use tokio_util::sync::CancellationToken;

use crate::errors::MarketDataError;
use crate::models::{AssetRef, PriceMap, ProviderId};
use crate::provider::PriceProvider;
use crate::resilience::{retry, RateLimitConfig, RateLimiter, RetryPolicy};

use models::TokenPriceResponse;

/// Provider ID constant
const PROVIDER_ID: &str = "COINGECKO";

/// Public API base URL
pub const DEFAULT_BASE_URL: &str = "https://api.coingecko.com/api/v3";

/// Header carrying the demo-plan API key
const API_KEY_HEADER: &str = "x-cg-demo-api-key";

/// Default HTTP request timeout
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection settings for the CoinGecko API.
#[derive(Clone, Debug)]
pub struct CoinGeckoConfig {
    /// Optional demo API key; requests are anonymous without it.
    pub api_key: Option<String>,
    /// API root, without trailing slash.
    pub base_url: String,
    /// Upstream quota. Defaults to one call every two seconds.
    pub rate_limit: RateLimitConfig,
    /// Per-request HTTP timeout.
    pub timeout: Duration,
}

impl Default for CoinGeckoConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            rate_limit: RateLimitConfig::default(),
            timeout: REQUEST_TIMEOUT,
        }
    }
}

/// CoinGecko provider for on-chain token prices.
///
/// # Example
///
/// ```ignore
/// use std::sync::Arc;
/// use tokenfolio_market_data::provider::coingecko::{CoinGeckoConfig, CoinGeckoProvider};
/// use tokenfolio_market_data::RateLimiter;
///
/// let limiter = Arc::new(RateLimiter::new());
/// let provider = CoinGeckoProvider::new(CoinGeckoConfig::default(), limiter);
/// ```
pub struct CoinGeckoProvider {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    rate_limiter: Arc<RateLimiter>,
    retry_policy: RetryPolicy,
}

impl CoinGeckoProvider {
    /// Create a provider that draws from `rate_limiter`.
    ///
    /// The limiter bucket for this provider is (re)configured from `config.rate_limit`.
    pub fn new(config: CoinGeckoConfig, rate_limiter: Arc<RateLimiter>) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        rate_limiter.configure(&Self::provider_id(), config.rate_limit);

        Self {
            client,
            api_key: config.api_key.filter(|key| !key.trim().is_empty()),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            rate_limiter,
            retry_policy: RetryPolicy::default(),
        }
    }

    /// Override the retry policy used for each chain call.
    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    fn provider_id() -> ProviderId {
        Cow::Borrowed(PROVIDER_ID)
    }

    /// Group assets by chain. Native assets are dropped since the token price
    /// endpoint cannot price them; duplicate addresses collapse.
    fn group_by_chain(assets: &[AssetRef]) -> BTreeMap<&str, BTreeSet<&str>> {
        let mut groups: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
        for asset in assets {
            if asset.is_native() {
                debug!("Skipping native asset {} for CoinGecko", asset);
                continue;
            }
            groups
                .entry(asset.chain())
                .or_default()
                .insert(asset.contract_address());
        }
        groups
    }

    /// Fetch all prices for one chain, retrying the outbound call.
    async fn fetch_chain(
        &self,
        chain: &str,
        contracts: &BTreeSet<&str>,
        cancel: &CancellationToken,
    ) -> Result<PriceMap, MarketDataError> {
        let joined = contracts.iter().copied().collect::<Vec<_>>().join(",");
        let joined = joined.as_str();

        let response = retry(&self.retry_policy, cancel, || {
            self.fetch_token_prices(chain, joined, cancel)
        })
        .await?;

        let usd_prices = response.usd_prices();
        let prices: PriceMap = contracts
            .iter()
            .filter_map(|contract| {
                usd_prices
                    .get(*contract)
                    .map(|price| (AssetRef::new(chain, contract), *price))
            })
            .collect();

        if prices.len() < contracts.len() {
            debug!(
                "CoinGecko resolved {}/{} assets on '{}'",
                prices.len(),
                contracts.len(),
                chain
            );
        }

        Ok(prices)
    }

    /// One rate-limited call to the token price endpoint, aborted on cancel.
    async fn fetch_token_prices(
        &self,
        chain: &str,
        contract_addresses: &str,
        cancel: &CancellationToken,
    ) -> Result<TokenPriceResponse, MarketDataError> {
        self.rate_limiter
            .acquire(&Self::provider_id(), cancel)
            .await?;

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(MarketDataError::Cancelled),
            result = self.send_request(chain, contract_addresses) => result,
        }
    }

    async fn send_request(
        &self,
        chain: &str,
        contract_addresses: &str,
    ) -> Result<TokenPriceResponse, MarketDataError> {
        let url = format!("{}/simple/token_price/{}", self.base_url, chain);

        let mut request = self.client.get(&url).query(&[
            ("contract_addresses", contract_addresses),
            ("vs_currencies", "usd"),
        ]);

        if let Some(api_key) = &self.api_key {
            request = request.header(API_KEY_HEADER, api_key);
        }

        debug!("CoinGecko request: {} ({})", url, contract_addresses);

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                MarketDataError::Timeout {
                    provider: PROVIDER_ID.to_string(),
                }
            } else {
                MarketDataError::ProviderError {
                    provider: PROVIDER_ID.to_string(),
                    message: format!("Request failed: {}", e),
                }
            }
        })?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            warn!("CoinGecko rate limited the request for '{}'", chain);
            return Err(MarketDataError::RateLimited {
                provider: PROVIDER_ID.to_string(),
            });
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: format!("HTTP {} - {}", status, body),
            });
        }

        response
            .json::<TokenPriceResponse>()
            .await
            .map_err(|e| MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: format!("Failed to decode response: {}", e),
            })
    }
}

#[async_trait]
impl PriceProvider for CoinGeckoProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    async fn get_prices(
        &self,
        assets: &[AssetRef],
        cancel: &CancellationToken,
    ) -> Result<PriceMap, MarketDataError> {
        let groups = Self::group_by_chain(assets);

        let per_chain = try_join_all(
            groups
                .iter()
                .map(|(chain, contracts)| self.fetch_chain(chain, contracts, cancel)),
        )
        .await?;

        Ok(per_chain.into_iter().flatten().collect())
    }
}

#[cfg(test)]
mod tests;
