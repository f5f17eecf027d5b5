//! Wallet portfolios: the holdings store and live USD valuation.

pub mod holdings;
pub mod valuation;

pub use holdings::*;
pub use valuation::*;
