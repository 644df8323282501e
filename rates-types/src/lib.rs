//! # Rates Types
//!
//! Domain types and port traits for the exchange rates sync.
//! This crate has ZERO external IO dependencies - only data structures,
//! validation rules, and trait definitions.
//!
//! ## Architecture
//!
//! This crate represents the **innermost core** of the hexagonal architecture:
//! - `domain/` - Pure domain types (Currency, ExchangeRate, ChangeSet)
//! - `ports/` - Trait definitions that adapters must implement
//! - `error/` - Domain, provider and repository error types

pub mod domain;
pub mod error;
pub mod ports;

// Re-export commonly used types
pub use domain::{
    ChangeSet, Currency, CurrencyCode, CurrencyPair, ExchangeRate, ExchangeRateId, FlushSummary,
    validate_ratio,
};
pub use error::{DomainError, ProviderError, RepoError};
pub use ports::{
    CurrencyRepository, ExchangeRateManager, ExchangeRateProvider, ExchangeRateRepository,
};
