pub mod holdings_model;
pub mod holdings_repository;
pub mod holdings_service;
pub mod holdings_traits;

pub use holdings_model::{normalize_wallet, Holding, Portfolio};
pub use holdings_repository::InMemoryHoldingsRepository;
pub use holdings_service::HoldingsService;
pub use holdings_traits::{HoldingsRepositoryTrait, HoldingsServiceTrait};
