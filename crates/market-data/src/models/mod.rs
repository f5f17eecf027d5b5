//! Market data models
//!
//! This module contains the core data types for price resolution:
//! - `asset_ref` - Canonical on-chain asset identity (AssetRef)
//! - `types` - Type aliases for common identifiers (ProviderId, Chain, PriceMap)

mod asset_ref;
mod types;

pub use asset_ref::AssetRef;
pub use types::{Chain, PriceMap, ProviderId};
