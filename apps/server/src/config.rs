use std::{net::SocketAddr, str::FromStr, time::Duration};

use anyhow::Context;
use tokenfolio_core::constants::DEFAULT_PRICE_CACHE_TTL;
use tokenfolio_market_data::provider::coingecko::DEFAULT_BASE_URL;

pub struct Config {
    pub listen_addr: SocketAddr,
    pub cors_allow: Vec<String>,
    pub request_timeout: Duration,
    pub coingecko_api_key: Option<String>,
    pub coingecko_base_url: String,
    pub coingecko_requests_per_minute: u32,
    /// In-memory cache when unset.
    pub redis_url: Option<String>,
    pub cache_ttl: Duration,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let listen_addr: SocketAddr = parse_var("TF_LISTEN_ADDR", "0.0.0.0:8080")?;
        let cors_allow = std::env::var("TF_CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|_| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let timeout_ms: u64 = parse_var("TF_REQUEST_TIMEOUT_MS", "30000")?;
        let coingecko_requests_per_minute: u32 = parse_var("COINGECKO_REQUESTS_PER_MINUTE", "30")?;
        if coingecko_requests_per_minute == 0 {
            anyhow::bail!("COINGECKO_REQUESTS_PER_MINUTE must be positive");
        }
        let cache_ttl_secs: u64 = parse_var(
            "CACHE_TTL_SECONDS",
            &DEFAULT_PRICE_CACHE_TTL.as_secs().to_string(),
        )?;

        Ok(Self {
            listen_addr,
            cors_allow,
            request_timeout: Duration::from_millis(timeout_ms),
            coingecko_api_key: optional_var("COINGECKO_API_KEY"),
            coingecko_base_url: optional_var("COINGECKO_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            coingecko_requests_per_minute,
            redis_url: optional_var("REDIS_URL"),
            cache_ttl: Duration::from_secs(cache_ttl_secs),
        })
    }
}

fn optional_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_var<T>(name: &str, default: &str) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw = optional_var(name).unwrap_or_else(|| default.to_string());
    raw.parse()
        .with_context(|| format!("Invalid {}: '{}'", name, raw))
}
