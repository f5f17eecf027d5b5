pub mod valuation_model;
pub mod valuation_service;
pub mod valuation_traits;


pub use valuation_model::{HoldingView, PortfolioView};
pub use valuation_service::ValuationService;
pub use valuation_traits::ValuationServiceTrait;
