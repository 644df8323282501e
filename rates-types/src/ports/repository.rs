//! Repository port traits.
//!
//! Adapters (SQLite, InMemory) implement all three; they are split so the
//! importer only asks for what it uses.

use std::sync::Arc;

use crate::domain::{ChangeSet, Currency, CurrencyCode, ExchangeRate, FlushSummary};
use crate::error::RepoError;

/// Source of the currencies configured in the shop.
#[async_trait::async_trait]
pub trait CurrencyRepository: Send + Sync {
    /// Lists all currencies in registration order.
    async fn find_all(&self) -> Result<Vec<Currency>, RepoError>;

    /// Registers a currency. Registering an existing code is a `Conflict`.
    async fn add(&self, code: CurrencyCode) -> Result<Currency, RepoError>;
}

/// Read access to stored exchange rates.
#[async_trait::async_trait]
pub trait ExchangeRateRepository: Send + Sync {
    /// Finds the rate stored for the ordered pair (source, target).
    ///
    /// (target, source) is a different record and is never returned here.
    async fn find_one_with_currency_pair(
        &self,
        source: &CurrencyCode,
        target: &CurrencyCode,
    ) -> Result<Option<ExchangeRate>, RepoError>;

    /// Lists all stored rates.
    async fn list(&self) -> Result<Vec<ExchangeRate>, RepoError>;
}

/// Write side for exchange rates.
#[async_trait::async_trait]
pub trait ExchangeRateManager: Send + Sync {
    /// Writes every staged and dirty record. MUST be atomic.
    async fn flush(&self, changes: ChangeSet) -> Result<FlushSummary, RepoError>;
}

// ─────────────────────────────────────────────────────────────────────────────
// Shared adapters
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl<T: CurrencyRepository + ?Sized> CurrencyRepository for Arc<T> {
    async fn find_all(&self) -> Result<Vec<Currency>, RepoError> {
        (**self).find_all().await
    }

    async fn add(&self, code: CurrencyCode) -> Result<Currency, RepoError> {
        (**self).add(code).await
    }
}

#[async_trait::async_trait]
impl<T: ExchangeRateRepository + ?Sized> ExchangeRateRepository for Arc<T> {
    async fn find_one_with_currency_pair(
        &self,
        source: &CurrencyCode,
        target: &CurrencyCode,
    ) -> Result<Option<ExchangeRate>, RepoError> {
        (**self).find_one_with_currency_pair(source, target).await
    }

    async fn list(&self) -> Result<Vec<ExchangeRate>, RepoError> {
        (**self).list().await
    }
}

#[async_trait::async_trait]
impl<T: ExchangeRateManager + ?Sized> ExchangeRateManager for Arc<T> {
    async fn flush(&self, changes: ChangeSet) -> Result<FlushSummary, RepoError> {
        (**self).flush(changes).await
    }
}
