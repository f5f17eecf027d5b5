//! CoinGecko API response models.

use std::collections::HashMap;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;

/// Response of `/simple/token_price/{platform}`.
///
/// Keys are contract addresses (CoinGecko lower-cases them, but that is not
/// guaranteed), values are objects keyed by vs-currency:
///
/// ```json
/// { "0xa0b8...eb48": { "usd": 0.9998 } }
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(transparent)]
pub(crate) struct TokenPriceResponse(pub HashMap<String, Value>);

impl TokenPriceResponse {
    /// USD prices keyed by lower-cased contract address.
    ///
    /// Entries without a usable `usd` value are skipped.
    pub fn usd_prices(&self) -> HashMap<String, Decimal> {
        self.0
            .iter()
            .filter_map(|(address, quote)| {
                let price = parse_usd(quote.get("usd")?)?;
                Some((address.to_ascii_lowercase(), price))
            })
            .collect()
    }
}

/// Accepts a JSON number or a numeric string; rejects negatives and NaN.
fn parse_usd(value: &Value) -> Option<Decimal> {
    let price = match value {
        Value::Number(number) => {
            let float = number.as_f64()?;
            Decimal::try_from(float).ok()?
        }
        Value::String(text) => {
            let text = text.trim();
            Decimal::from_str(text)
                .or_else(|_| Decimal::from_scientific(text))
                .ok()?
        }
        _ => return None,
    };

    if price.is_sign_negative() {
        None
    } else {
        Some(price.normalize())
    }
}
