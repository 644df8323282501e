//! Exchange rate domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::currency::{Currency, CurrencyCode};
use crate::error::DomainError;

/// Unique identifier for an ExchangeRate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExchangeRateId(Uuid);

impl ExchangeRateId {
    /// Creates a new random ExchangeRateId.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ExchangeRateId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ExchangeRateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ExchangeRateId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Ordered (source, target) pair of currency codes. This is the identity of an exchange rate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CurrencyPair {
    pub source: CurrencyCode,
    pub target: CurrencyCode,
}

impl CurrencyPair {
    pub fn new(source: CurrencyCode, target: CurrencyCode) -> Self {
        Self { source, target }
    }
}

impl std::fmt::Display for CurrencyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.source, self.target)
    }
}

/// Checks that a ratio can be stored on an exchange rate.
pub fn validate_ratio(ratio: f64) -> Result<f64, DomainError> {
    if ratio.is_finite() && ratio > 0.0 {
        Ok(ratio)
    } else {
        Err(DomainError::InvalidRatio(ratio))
    }
}

/// How many units of the target currency one unit of the source currency buys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeRate {
    /// Unique identifier
    pub id: ExchangeRateId,
    pub source_currency: Currency,
    pub target_currency: Currency,
    pub ratio: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ExchangeRate {
    /// Creates a new exchange rate between two distinct currencies.
    ///
    /// # Validation
    /// - Source and target must differ
    /// - Ratio must be finite and strictly positive
    pub fn new(
        source_currency: Currency,
        target_currency: Currency,
        ratio: f64,
    ) -> Result<Self, DomainError> {
        if source_currency.code == target_currency.code {
            return Err(DomainError::SameCurrencyPair(source_currency.code));
        }
        let ratio = validate_ratio(ratio)?;
        let now = Utc::now();

        Ok(Self {
            id: ExchangeRateId::new(),
            source_currency,
            target_currency,
            ratio,
            created_at: now,
            updated_at: now,
        })
    }

    /// Creates an exchange rate with all fields specified (for database reconstruction).
    pub fn from_parts(
        id: ExchangeRateId,
        source_currency: Currency,
        target_currency: Currency,
        ratio: f64,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            source_currency,
            target_currency,
            ratio,
            created_at,
            updated_at,
        }
    }

    /// Replaces the ratio and bumps `updated_at`.
    pub fn set_ratio(&mut self, ratio: f64) -> Result<(), DomainError> {
        self.ratio = validate_ratio(ratio)?;
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn pair(&self) -> CurrencyPair {
        CurrencyPair::new(
            self.source_currency.code.clone(),
            self.target_currency.code.clone(),
        )
    }
}
