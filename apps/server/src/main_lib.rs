use std::sync::Arc;

use anyhow::Context;
use tokenfolio_core::{
    cache::{CacheStore, InMemoryCache, RedisCache},
    constants::CACHE_PURGE_INTERVAL,
    portfolio::{
        holdings::{
            HoldingsRepositoryTrait, HoldingsService, HoldingsServiceTrait,
            InMemoryHoldingsRepository,
        },
        valuation::{ValuationService, ValuationServiceTrait},
    },
    pricing::{PricingService, PricingServiceTrait},
};
use tokenfolio_market_data::{
    CoinGeckoConfig, CoinGeckoProvider, DeterministicProvider, PriceProvider, RateLimitConfig,
    RateLimiter,
};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::Config;

pub struct AppState {
    pub pricing_service: Arc<dyn PricingServiceTrait>,
    pub holdings_service: Arc<dyn HoldingsServiceTrait>,
    pub valuation_service: Arc<dyn ValuationServiceTrait>,
}

pub fn init_tracing() {
    let log_format = std::env::var("TF_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

async fn build_cache(config: &Config) -> anyhow::Result<Arc<dyn CacheStore>> {
    match &config.redis_url {
        Some(url) => {
            let cache = RedisCache::connect(url)
                .await
                .context("Failed to initialize Redis price cache")?;
            tracing::info!("Using Redis price cache");
            Ok(Arc::new(cache))
        }
        None => {
            tracing::info!("REDIS_URL not set, using in-memory price cache");
            let cache = Arc::new(InMemoryCache::new());
            cache.spawn_purge_task(CACHE_PURGE_INTERVAL);
            Ok(cache)
        }
    }
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let cache = build_cache(config).await?;

    // One limiter for every outbound provider call in this process.
    let rate_limiter = Arc::new(RateLimiter::new());
    let primary: Arc<dyn PriceProvider> = Arc::new(CoinGeckoProvider::new(
        CoinGeckoConfig {
            api_key: config.coingecko_api_key.clone(),
            base_url: config.coingecko_base_url.clone(),
            rate_limit: RateLimitConfig {
                requests_per_minute: config.coingecko_requests_per_minute,
                ..RateLimitConfig::default()
            },
            ..CoinGeckoConfig::default()
        },
        rate_limiter,
    ));
    let fallback: Arc<dyn PriceProvider> = Arc::new(DeterministicProvider::new());
    tracing::info!(
        "Price providers: primary={} fallback={} (cache ttl {:?})",
        primary.id(),
        fallback.id(),
        config.cache_ttl
    );

    let pricing_service: Arc<dyn PricingServiceTrait> = Arc::new(PricingService::new(
        cache,
        primary,
        fallback,
        config.cache_ttl,
    ));

    let holdings_repository: Arc<dyn HoldingsRepositoryTrait> =
        Arc::new(InMemoryHoldingsRepository::new());
    let holdings_service: Arc<dyn HoldingsServiceTrait> =
        Arc::new(HoldingsService::new(holdings_repository.clone()));
    let valuation_service: Arc<dyn ValuationServiceTrait> = Arc::new(ValuationService::new(
        pricing_service.clone(),
        holdings_repository,
    ));

    Ok(Arc::new(AppState {
        pricing_service,
        holdings_service,
        valuation_service,
    }))
}
