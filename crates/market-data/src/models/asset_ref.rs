use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::types::Chain;

/// Provider-agnostic identifier of a priceable on-chain asset.
///
/// The contract address is trimmed and lower-cased on construction, so two
/// references that only differ in address case compare (and hash) equal.
/// An empty contract address denotes the chain's native asset.
#[derive(Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawAssetRef")]
pub struct AssetRef {
    chain: Chain,
    contract_address: Arc<str>,
}

/// Wire shape of an [`AssetRef`] before normalization.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAssetRef {
    chain: String,
    #[serde(default)]
    contract_address: String,
}

impl From<RawAssetRef> for AssetRef {
    fn from(raw: RawAssetRef) -> Self {
        AssetRef::new(&raw.chain, &raw.contract_address)
    }
}

impl AssetRef {
    pub fn new(chain: &str, contract_address: &str) -> Self {
        Self {
            chain: Arc::from(chain.trim()),
            contract_address: Arc::from(contract_address.trim().to_ascii_lowercase()),
        }
    }

    /// Reference to the native asset of `chain` (ETH on ethereum, MATIC on polygon, ...).
    pub fn native(chain: &str) -> Self {
        Self::new(chain, "")
    }

    pub fn chain(&self) -> &str {
        &self.chain
    }

    pub fn contract_address(&self) -> &str {
        &self.contract_address
    }

    pub fn is_native(&self) -> bool {
        self.contract_address.is_empty()
    }
}

impl fmt::Display for AssetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.chain, self.contract_address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_contract_address_is_lowercased() {
        let asset = AssetRef::new("ethereum", "0xABCdef");
        assert_eq!(asset.contract_address(), "0xabcdef");
        assert_eq!(asset, AssetRef::new("ethereum", "0xabcdef"));
    }

    #[test]
    fn test_mixed_case_refs_collapse_in_sets() {
        let set: HashSet<AssetRef> = [
            AssetRef::new("ethereum", "0xABC"),
            AssetRef::new("ethereum", "0xabc"),
            AssetRef::new("polygon", "0xabc"),
        ]
        .into_iter()
        .collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_native_asset() {
        let eth = AssetRef::native("ethereum");
        assert!(eth.is_native());
        assert_eq!(eth.to_string(), "ethereum:");
    }

    #[test]
    fn test_deserialize_normalizes() {
        let asset: AssetRef =
            serde_json::from_str(r#"{"chain":" ethereum ","contractAddress":"0xDEAD"}"#).unwrap();
        assert_eq!(asset.chain(), "ethereum");
        assert_eq!(asset.contract_address(), "0xdead");

        let native: AssetRef = serde_json::from_str(r#"{"chain":"polygon"}"#).unwrap();
        assert!(native.is_native());
    }
}
