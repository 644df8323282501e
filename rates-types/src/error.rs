//! Error types for the exchange rates sync.

use crate::domain::CurrencyCode;

/// Domain-level errors (validation rule violations).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DomainError {
    #[error("Invalid currency code: {0:?}")]
    InvalidCurrencyCode(String),

    #[error("Exchange rate needs two distinct currencies, got {0} twice")]
    SameCurrencyPair(CurrencyCode),

    #[error("Ratio must be a positive finite number, got {0}")]
    InvalidRatio(f64),
}

/// Errors returned by an exchange rate provider.
///
/// The importer treats every variant the same way: the pair is skipped.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("Unsupported currency: {0}")]
    UnsupportedCurrency(CurrencyCode),

    #[error("Rate not available for {0} -> {1}")]
    RateNotAvailable(CurrencyCode, CurrencyCode),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Provider returned an unusable ratio {ratio} for {source_code} -> {target_code}")]
    InvalidRatio {
        source_code: CurrencyCode,
        target_code: CurrencyCode,
        ratio: f64,
    },
}

/// Repository-level errors (data access failures).
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Transaction error: {0}")]
    Transaction(String),

    #[error("Entity not found")]
    NotFound,

    #[error("Conflict: {0}")]
    Conflict(String),
}
