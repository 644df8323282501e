//! Exchange Rates Importer
//!
//! Orchestrates the ports to refresh every stored rate.
//! Contains NO infrastructure logic - pure orchestration.

use std::collections::HashSet;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, info, warn};

use rates_types::{
    ChangeSet, CurrencyCode, CurrencyPair, CurrencyRepository, ExchangeRate,
    ExchangeRateManager, ExchangeRateProvider, ExchangeRateRepository, ProviderError, RepoError,
    validate_ratio,
};

/// Errors that abort an import run.
///
/// Provider failures never show up here: they only skip their pair.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("Repository error: {0}")]
    Repository(#[from] RepoError),
}

/// A pair the provider could not price.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedPair {
    pub pair: CurrencyPair,
    pub reason: String,
}

/// Outcome of one import run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportReport {
    /// Pairs considered (each unordered pair once).
    pub pairs: usize,
    pub created: usize,
    pub updated: usize,
    pub skipped: Vec<SkippedPair>,
    /// Whether the changes were flushed. False when no pair succeeded.
    pub flushed: bool,
}

impl ImportReport {
    /// Pairs whose rate was created or updated.
    pub fn succeeded(&self) -> usize {
        self.created + self.updated
    }
}

/// Anything that can run an exchange rates import.
#[async_trait]
pub trait Importer: Send + Sync {
    async fn import(&self) -> Result<ImportReport, ImportError>;
}

/// Refreshes the rate of every unordered pair of configured currencies.
///
/// Generic over every port - the adapters are injected at compile time.
/// Pairs follow the order the currency repository returns: for currencies
/// `[A, B, C]` the rates touched are (A, B), (A, C), (B, C), never the reverse.
pub struct ExchangeRatesImporter<C, M, P, R> {
    currencies: C,
    manager: M,
    provider: P,
    rates: R,
}

impl<C, M, P, R> ExchangeRatesImporter<C, M, P, R>
where
    C: CurrencyRepository,
    M: ExchangeRateManager,
    P: ExchangeRateProvider,
    R: ExchangeRateRepository,
{
    pub fn new(currencies: C, manager: M, provider: P, rates: R) -> Self {
        Self {
            currencies,
            manager,
            provider,
            rates,
        }
    }

    /// Runs one import.
    ///
    /// Currencies listed twice are paired once, at their first position.
    /// At most one flush happens, and only if at least one pair succeeded.
    pub async fn import(&self) -> Result<ImportReport, ImportError> {
        let mut currencies = self.currencies.find_all().await?;
        let mut seen = HashSet::new();
        currencies.retain(|c| seen.insert(c.code.clone()));
        let mut report = ImportReport::default();

        if currencies.len() < 2 {
            info!(
                currencies = currencies.len(),
                "Not enough currencies configured, nothing to import"
            );
            return Ok(report);
        }

        let mut changes = ChangeSet::new();

        for (i, source) in currencies.iter().enumerate() {
            for target in &currencies[i + 1..] {
                report.pairs += 1;

                let ratio = match self.fetch_ratio(&source.code, &target.code).await {
                    Ok(ratio) => ratio,
                    Err(e) => {
                        warn!(
                            source = %source.code,
                            target = %target.code,
                            error = %e,
                            "Provider failed, skipping pair"
                        );
                        report.skipped.push(SkippedPair {
                            pair: CurrencyPair::new(source.code.clone(), target.code.clone()),
                            reason: e.to_string(),
                        });
                        continue;
                    }
                };

                match self
                    .rates
                    .find_one_with_currency_pair(&source.code, &target.code)
                    .await?
                {
                    Some(mut rate) => {
                        debug!(pair = %rate.pair(), old = rate.ratio, new = ratio, "Updating rate");
                        rate.set_ratio(ratio).map_err(RepoError::from)?;
                        changes.mark_dirty(rate);
                        report.updated += 1;
                    }
                    None => {
                        let rate = ExchangeRate::new(source.clone(), target.clone(), ratio)
                            .map_err(RepoError::from)?;
                        debug!(pair = %rate.pair(), ratio, "Creating rate");
                        changes.stage(rate);
                        report.created += 1;
                    }
                }
            }
        }

        if changes.is_empty() {
            info!(pairs = report.pairs, "No rate could be fetched, nothing flushed");
            return Ok(report);
        }

        let summary = self.manager.flush(changes).await?;
        report.flushed = true;

        info!(
            pairs = report.pairs,
            inserted = summary.inserted,
            updated = summary.updated,
            skipped = report.skipped.len(),
            "Exchange rates imported"
        );

        Ok(report)
    }

    async fn fetch_ratio(
        &self,
        source: &CurrencyCode,
        target: &CurrencyCode,
    ) -> Result<f64, ProviderError> {
        let ratio = self.provider.get_ratio(source, target).await?;
        validate_ratio(ratio).map_err(|_| ProviderError::InvalidRatio {
            source_code: source.clone(),
            target_code: target.clone(),
            ratio,
        })
    }
}

#[async_trait]
impl<C, M, P, R> Importer for ExchangeRatesImporter<C, M, P, R>
where
    C: CurrencyRepository,
    M: ExchangeRateManager,
    P: ExchangeRateProvider,
    R: ExchangeRateRepository,
{
    async fn import(&self) -> Result<ImportReport, ImportError> {
        ExchangeRatesImporter::import(self).await
    }
}
