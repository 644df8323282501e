//! Exchange rate provider port.
//!
//! This trait defines the interface for exchange rate sources.
//! Implementations can be HTTP clients, fixed tables, mock providers, etc.

use std::sync::Arc;

use crate::CurrencyCode;
use crate::error::ProviderError;

/// Port trait for exchange rate providers.
#[async_trait::async_trait]
pub trait ExchangeRateProvider: Send + Sync {
    /// Get the ratio from one currency to another.
    /// Returns how many units of `target` you get for 1 unit of `source`.
    async fn get_ratio(
        &self,
        source: &CurrencyCode,
        target: &CurrencyCode,
    ) -> Result<f64, ProviderError>;
}

#[async_trait::async_trait]
impl<T: ExchangeRateProvider + ?Sized> ExchangeRateProvider for Arc<T> {
    async fn get_ratio(
        &self,
        source: &CurrencyCode,
        target: &CurrencyCode,
    ) -> Result<f64, ProviderError> {
        (**self).get_ratio(source, target).await
    }
}
