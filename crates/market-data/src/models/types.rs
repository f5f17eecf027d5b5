use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Arc;

use rust_decimal::Decimal;

use super::asset_ref::AssetRef;

/// Provider identifier - mostly static constants
pub type ProviderId = Cow<'static, str>;

/// Chain identifier as understood by the upstream provider (e.g. "ethereum")
pub type Chain = Arc<str>;

/// USD prices keyed by asset. Assets nobody could price are absent, never zero.
pub type PriceMap = HashMap<AssetRef, Decimal>;
