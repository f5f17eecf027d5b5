use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tokenfolio_market_data::AssetRef;

/// Canonical form of a wallet identifier: surrounding whitespace is dropped.
pub fn normalize_wallet(wallet: &str) -> &str {
    wallet.trim()
}

/// A token position held by a wallet.
///
/// Deserialized holdings are normalized like [`Holding::new`].
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase", from = "HoldingRecord")]
pub struct Holding {
    pub chain: String,
    /// Empty for the chain's native asset.
    #[serde(default)]
    pub contract_address: String,
    pub amount: Decimal,
}

/// Wire shape of a holding, before normalization.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct HoldingRecord {
    chain: String,
    #[serde(default)]
    contract_address: String,
    amount: Decimal,
}

impl From<HoldingRecord> for Holding {
    fn from(record: HoldingRecord) -> Self {
        Holding::new(&record.chain, &record.contract_address, record.amount)
    }
}

impl Holding {
    /// Builds a holding with the same normalization as [`AssetRef::new`].
    pub fn new(chain: &str, contract_address: &str, amount: Decimal) -> Self {
        let asset = AssetRef::new(chain, contract_address);
        Self {
            chain: asset.chain().to_string(),
            contract_address: asset.contract_address().to_string(),
            amount,
        }
    }

    pub fn asset_ref(&self) -> AssetRef {
        AssetRef::new(&self.chain, &self.contract_address)
    }

    pub fn is_same_asset(&self, asset: &AssetRef) -> bool {
        self.asset_ref() == *asset
    }
}

/// All holdings of one wallet, in insertion order.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Portfolio {
    pub wallet: String,
    pub holdings: Vec<Holding>,
}

impl Portfolio {
    pub fn new(wallet: &str) -> Self {
        Self {
            wallet: normalize_wallet(wallet).to_string(),
            holdings: Vec::new(),
        }
    }

    pub fn with_holdings(wallet: &str, holdings: Vec<Holding>) -> Self {
        Self {
            wallet: normalize_wallet(wallet).to_string(),
            holdings,
        }
    }

    pub fn find(&self, asset: &AssetRef) -> Option<&Holding> {
        self.holdings.iter().find(|h| h.is_same_asset(asset))
    }

    pub fn position(&self, asset: &AssetRef) -> Option<usize> {
        self.holdings.iter().position(|h| h.is_same_asset(asset))
    }

    /// Distinct assets held, first occurrence wins.
    pub fn assets(&self) -> Vec<AssetRef> {
        let mut seen = HashSet::with_capacity(self.holdings.len());
        self.holdings
            .iter()
            .map(Holding::asset_ref)
            .filter(|asset| seen.insert(asset.clone()))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.holdings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_holding_normalizes_address() {
        let holding = Holding::new(" ethereum ", " 0xABC ", dec!(1));

        assert_eq!(holding.chain, "ethereum");
        assert_eq!(holding.contract_address, "0xabc");
        assert!(holding.is_same_asset(&AssetRef::new("ethereum", "0xAbC")));
    }

    #[test]
    fn test_assets_are_distinct_and_ordered() {
        let portfolio = Portfolio::with_holdings(
            "0xwallet",
            vec![
                Holding::new("polygon", "0x2", dec!(1)),
                Holding::new("ethereum", "0x1", dec!(1)),
                Holding {
                    chain: "polygon".to_string(),
                    contract_address: "0X2".to_string(),
                    amount: dec!(3),
                },
            ],
        );

        assert_eq!(
            portfolio.assets(),
            vec![
                AssetRef::new("polygon", "0x2"),
                AssetRef::new("ethereum", "0x1")
            ]
        );
    }

    #[test]
    fn test_holding_deserializes_camel_case() {
        let holding: Holding = serde_json::from_str(
            r#"{"chain":"ethereum","contractAddress":"0xabc","amount":2.5}"#,
        )
        .unwrap();

        assert_eq!(holding.amount, dec!(2.5));
        assert_eq!(holding.contract_address, "0xabc");
    }

    #[test]
    fn test_deserialized_holding_is_normalized() {
        let holding: Holding = serde_json::from_str(
            r#"{"chain":" ethereum ","contractAddress":" 0xABC ","amount":1}"#,
        )
        .unwrap();

        assert_eq!(holding, Holding::new("ethereum", "0xabc", dec!(1)));

        let native: Holding =
            serde_json::from_str(r#"{"chain":"ethereum","amount":1}"#).unwrap();
        assert_eq!(native.contract_address, "");
    }

    #[test]
    fn test_portfolio_wallet_is_trimmed() {
        assert_eq!(Portfolio::new("  0xwallet ").wallet, "0xwallet");
        assert_eq!(normalize_wallet("\t0xw\n"), "0xw");
    }
}
