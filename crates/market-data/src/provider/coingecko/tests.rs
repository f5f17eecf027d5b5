use super::*;
use rust_decimal_macros::dec;
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fast_provider(server: &MockServer, retry_policy: RetryPolicy) -> CoinGeckoProvider {
    let config = CoinGeckoConfig {
        api_key: Some("test-key".to_string()),
        base_url: server.uri(),
        rate_limit: RateLimitConfig {
            requests_per_minute: 6000,
            burst_capacity: 10.0,
        },
        timeout: Duration::from_secs(5),
    };
    CoinGeckoProvider::new(config, Arc::new(RateLimiter::new())).with_retry_policy(retry_policy)
}

#[tokio::test]
async fn test_parses_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/simple/token_price/ethereum"))
        .and(query_param("contract_addresses", "0xabc"))
        .and(query_param("vs_currencies", "usd"))
        .and(header("x-cg-demo-api-key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "0xABC": { "usd": 123.45 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = fast_provider(&server, RetryPolicy::immediate(0));
    let asset = AssetRef::new("ethereum", "0xAbC");

    let prices = provider
        .get_prices(&[asset.clone()], &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(prices.len(), 1);
    assert_eq!(prices[&asset], dec!(123.45));
}

#[tokio::test]
async fn test_one_call_per_chain() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/simple/token_price/ethereum"))
        .and(query_param("contract_addresses", "0x1,0x2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "0x1": { "usd": 1.0 },
            "0x2": { "usd": "2.5" }
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/simple/token_price/polygon-pos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "0x3": { "usd": 3 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = fast_provider(&server, RetryPolicy::immediate(0));
    let assets = vec![
        AssetRef::new("ethereum", "0x2"),
        AssetRef::new("polygon-pos", "0x3"),
        AssetRef::new("ethereum", "0x1"),
        AssetRef::new("ethereum", "0x1"),
    ];

    let prices = provider
        .get_prices(&assets, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(prices.len(), 3);
    assert_eq!(prices[&AssetRef::new("ethereum", "0x1")], dec!(1));
    assert_eq!(prices[&AssetRef::new("ethereum", "0x2")], dec!(2.5));
    assert_eq!(prices[&AssetRef::new("polygon-pos", "0x3")], dec!(3));
}

#[tokio::test]
async fn test_unresolved_assets_are_omitted() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/simple/token_price/ethereum"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "0xknown": { "usd": 10 },
            "0xbroken": { "usd": "not-a-number" }
        })))
        .mount(&server)
        .await;

    let provider = fast_provider(&server, RetryPolicy::immediate(0));
    let known = AssetRef::new("ethereum", "0xknown");
    let assets = vec![
        known.clone(),
        AssetRef::new("ethereum", "0xbroken"),
        AssetRef::new("ethereum", "0xmissing"),
    ];

    let prices = provider
        .get_prices(&assets, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(prices.len(), 1);
    assert_eq!(prices[&known], dec!(10));
}

#[tokio::test]
async fn test_server_error_fails_after_retries() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/simple/token_price/ethereum"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(3)
        .mount(&server)
        .await;

    let provider = fast_provider(&server, RetryPolicy::immediate(2));

    let result = provider
        .get_prices(&[AssetRef::new("ethereum", "0xabc")], &CancellationToken::new())
        .await;

    match result {
        Err(MarketDataError::ProviderError { provider, message }) => {
            assert_eq!(provider, "COINGECKO");
            assert!(message.contains("500"));
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[tokio::test]
async fn test_rate_limited_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429))
        .expect(1)
        .mount(&server)
        .await;

    let provider = fast_provider(&server, RetryPolicy::immediate(0));

    let result = provider
        .get_prices(&[AssetRef::new("ethereum", "0xabc")], &CancellationToken::new())
        .await;

    assert!(matches!(result, Err(MarketDataError::RateLimited { .. })));
}

#[tokio::test]
async fn test_malformed_body_is_provider_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let provider = fast_provider(&server, RetryPolicy::immediate(0));

    let result = provider
        .get_prices(&[AssetRef::new("ethereum", "0xabc")], &CancellationToken::new())
        .await;

    assert!(matches!(result, Err(MarketDataError::ProviderError { .. })));
}

#[tokio::test]
async fn test_recovers_on_retry() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "0xabc": { "usd": 7 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = fast_provider(&server, RetryPolicy::immediate(3));
    let asset = AssetRef::new("ethereum", "0xabc");

    let prices = provider
        .get_prices(&[asset.clone()], &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(prices[&asset], dec!(7));
}

#[tokio::test]
async fn test_native_assets_are_not_sent_upstream() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let provider = fast_provider(&server, RetryPolicy::immediate(0));

    let prices = provider
        .get_prices(&[AssetRef::native("ethereum")], &CancellationToken::new())
        .await
        .unwrap();

    assert!(prices.is_empty());
}

#[tokio::test]
async fn test_cancelled_before_call() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let provider = fast_provider(&server, RetryPolicy::immediate(3));
    let cancel = CancellationToken::new();
    cancel.cancel();

    let result = provider
        .get_prices(&[AssetRef::new("ethereum", "0xabc")], &cancel)
        .await;

    assert!(matches!(result, Err(MarketDataError::Cancelled)));
}

#[test]
fn test_provider_id() {
    let provider = CoinGeckoProvider::new(CoinGeckoConfig::default(), Arc::new(RateLimiter::new()));
    assert_eq!(provider.id(), "COINGECKO");
}

/// Records when each request reached the server.
struct RecordArrival {
    arrivals: Arc<std::sync::Mutex<Vec<std::time::Instant>>>,
    body: serde_json::Value,
}

impl wiremock::Respond for RecordArrival {
    fn respond(&self, _request: &wiremock::Request) -> ResponseTemplate {
        self.arrivals
            .lock()
            .unwrap()
            .push(std::time::Instant::now());
        ResponseTemplate::new(200).set_body_json(self.body.clone())
    }
}

#[tokio::test]
async fn test_default_limit_spaces_concurrent_chain_calls() {
    let server = MockServer::start().await;
    let arrivals = Arc::new(std::sync::Mutex::new(Vec::new()));
    Mock::given(method("GET"))
        .and(path("/simple/token_price/ethereum"))
        .respond_with(RecordArrival {
            arrivals: Arc::clone(&arrivals),
            body: json!({ "0x1": { "usd": 1 } }),
        })
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/simple/token_price/polygon-pos"))
        .respond_with(RecordArrival {
            arrivals: Arc::clone(&arrivals),
            body: json!({ "0x2": { "usd": 2 } }),
        })
        .expect(1)
        .mount(&server)
        .await;

    // Default limits: 30 requests per minute, burst of one.
    let config = CoinGeckoConfig {
        api_key: None,
        base_url: server.uri(),
        rate_limit: RateLimitConfig::default(),
        timeout: Duration::from_secs(5),
    };
    let provider = CoinGeckoProvider::new(config, Arc::new(RateLimiter::new()))
        .with_retry_policy(RetryPolicy::immediate(0));
    let assets = vec![
        AssetRef::new("ethereum", "0x1"),
        AssetRef::new("polygon-pos", "0x2"),
    ];

    let prices = provider
        .get_prices(&assets, &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(prices.len(), 2);

    let arrivals = arrivals.lock().unwrap().clone();
    assert_eq!(arrivals.len(), 2);
    let gap = arrivals[1].duration_since(arrivals[0]);
    assert!(
        gap >= Duration::from_millis(1900),
        "second chain call arrived after only {:?}",
        gap
    );
}
