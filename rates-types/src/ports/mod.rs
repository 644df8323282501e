//! Port traits (interfaces for adapters).
//!
//! These are the contracts that adapters must implement.
//! The importer depends on these traits, not concrete implementations.

mod provider;
mod repository;

pub use provider::ExchangeRateProvider;
pub use repository::{CurrencyRepository, ExchangeRateManager, ExchangeRateRepository};
