//! In-memory repository adapter, for tests and dry runs.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::Mutex;

use rates_types::{
    ChangeSet, Currency, CurrencyCode, CurrencyPair, CurrencyRepository, ExchangeRate,
    ExchangeRateManager, ExchangeRateRepository, FlushSummary, RepoError,
};

/// In-memory repository keyed by the ordered currency pair.
#[derive(Default)]
pub struct InMemoryRepo {
    currencies: Mutex<Vec<Currency>>,
    rates: DashMap<CurrencyPair, ExchangeRate>,
    // Serializes flushes so validation and writes see the same state.
    flush_lock: Mutex<()>,
    flushes: AtomicUsize,
}

impl InMemoryRepo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a repository with the given currencies registered in order.
    pub fn with_currencies<I>(codes: I) -> Self
    where
        I: IntoIterator<Item = CurrencyCode>,
    {
        let currencies = codes.into_iter().map(Currency::new).collect();
        Self {
            currencies: Mutex::new(currencies),
            ..Self::default()
        }
    }

    /// Inserts a rate directly, bypassing the change set.
    pub fn insert_rate(&self, rate: ExchangeRate) {
        self.rates.insert(rate.pair(), rate);
    }

    /// Number of successful flushes so far.
    pub fn flush_count(&self) -> usize {
        self.flushes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CurrencyRepository for InMemoryRepo {
    async fn find_all(&self) -> Result<Vec<Currency>, RepoError> {
        Ok(self.currencies.lock().await.clone())
    }

    async fn add(&self, code: CurrencyCode) -> Result<Currency, RepoError> {
        let mut currencies = self.currencies.lock().await;
        if currencies.iter().any(|c| c.code == code) {
            return Err(RepoError::Conflict(format!("Currency {code} already exists")));
        }
        let currency = Currency::new(code);
        currencies.push(currency.clone());
        Ok(currency)
    }
}

#[async_trait]
impl ExchangeRateRepository for InMemoryRepo {
    async fn find_one_with_currency_pair(
        &self,
        source: &CurrencyCode,
        target: &CurrencyCode,
    ) -> Result<Option<ExchangeRate>, RepoError> {
        let key = CurrencyPair::new(source.clone(), target.clone());
        Ok(self.rates.get(&key).map(|entry| entry.value().clone()))
    }

    async fn list(&self) -> Result<Vec<ExchangeRate>, RepoError> {
        let mut rates: Vec<ExchangeRate> =
            self.rates.iter().map(|entry| entry.value().clone()).collect();
        rates.sort_by(|a, b| {
            (&a.source_currency.code, &a.target_currency.code)
                .cmp(&(&b.source_currency.code, &b.target_currency.code))
        });
        Ok(rates)
    }
}

#[async_trait]
impl ExchangeRateManager for InMemoryRepo {
    async fn flush(&self, changes: ChangeSet) -> Result<FlushSummary, RepoError> {
        let _guard = self.flush_lock.lock().await;
        let (staged, dirty) = changes.into_parts();

        // Validate everything before writing anything.
        let mut seen = std::collections::HashSet::new();
        for rate in &staged {
            let pair = rate.pair();
            if self.rates.contains_key(&pair) || !seen.insert(pair.clone()) {
                return Err(RepoError::Conflict(format!(
                    "Exchange rate {pair} already exists"
                )));
            }
        }
        for rate in &dirty {
            let known = self
                .rates
                .get(&rate.pair())
                .is_some_and(|stored| stored.id == rate.id);
            if !known {
                return Err(RepoError::NotFound);
            }
        }

        let summary = FlushSummary {
            inserted: staged.len(),
            updated: dirty.len(),
        };
        for rate in staged.into_iter().chain(dirty) {
            self.rates.insert(rate.pair(), rate);
        }
        self.flushes.fetch_add(1, Ordering::SeqCst);

        Ok(summary)
    }
}
