//! ExchangeRatesImporter unit tests.

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use rates_types::{
        ChangeSet, Currency, CurrencyCode, CurrencyRepository, ExchangeRate, ExchangeRateManager,
        ExchangeRateProvider, ExchangeRateRepository, FlushSummary, ProviderError, RepoError,
    };

    use crate::{ExchangeRatesImporter, ImportError, Importer};

    fn code(s: &str) -> CurrencyCode {
        s.parse().unwrap()
    }

    fn currency(s: &str) -> Currency {
        Currency::new(code(s))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Recording mocks
    // ─────────────────────────────────────────────────────────────────────────

    /// Currency repository returning a fixed list.
    pub struct MockCurrencies {
        currencies: Vec<Currency>,
    }

    impl MockCurrencies {
        pub fn new(codes: &[&str]) -> Self {
            Self {
                currencies: codes.iter().map(|c| currency(c)).collect(),
            }
        }
    }

    #[async_trait]
    impl CurrencyRepository for MockCurrencies {
        async fn find_all(&self) -> Result<Vec<Currency>, RepoError> {
            Ok(self.currencies.clone())
        }

        async fn add(&self, _code: CurrencyCode) -> Result<Currency, RepoError> {
            unimplemented!("the importer never registers currencies")
        }
    }

    /// Provider answering from a table; anything not in it fails.
    pub struct MockProvider {
        ratios: HashMap<(String, String), f64>,
        calls: Mutex<Vec<(String, String)>>,
    }

    impl MockProvider {
        pub fn new(ratios: &[(&str, &str, f64)]) -> Self {
            Self {
                ratios: ratios
                    .iter()
                    .map(|(s, t, r)| ((s.to_string(), t.to_string()), *r))
                    .collect(),
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn calls(&self) -> Vec<(String, String)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ExchangeRateProvider for MockProvider {
        async fn get_ratio(
            &self,
            source: &CurrencyCode,
            target: &CurrencyCode,
        ) -> Result<f64, ProviderError> {
            let key = (source.to_string(), target.to_string());
            self.calls.lock().unwrap().push(key.clone());
            self.ratios
                .get(&key)
                .copied()
                .ok_or_else(|| ProviderError::ServiceUnavailable("provider is down".into()))
        }
    }

    /// Rate repository with preloaded records; records every lookup.
    pub struct MockRates {
        rates: HashMap<(String, String), ExchangeRate>,
        lookups: Mutex<Vec<(String, String)>>,
        fail: bool,
    }

    impl MockRates {
        pub fn empty() -> Self {
            Self {
                rates: HashMap::new(),
                lookups: Mutex::new(Vec::new()),
                fail: false,
            }
        }

        pub fn with(mut self, source: &str, target: &str, ratio: f64) -> Self {
            let rate = ExchangeRate::new(currency(source), currency(target), ratio).unwrap();
            self.rates
                .insert((source.to_string(), target.to_string()), rate);
            self
        }

        pub fn failing() -> Self {
            Self {
                fail: true,
                ..Self::empty()
            }
        }

        pub fn lookups(&self) -> Vec<(String, String)> {
            self.lookups.lock().unwrap().clone()
        }

        pub fn get(&self, source: &str, target: &str) -> &ExchangeRate {
            &self.rates[&(source.to_string(), target.to_string())]
        }
    }

    #[async_trait]
    impl ExchangeRateRepository for MockRates {
        async fn find_one_with_currency_pair(
            &self,
            source: &CurrencyCode,
            target: &CurrencyCode,
        ) -> Result<Option<ExchangeRate>, RepoError> {
            let key = (source.to_string(), target.to_string());
            self.lookups.lock().unwrap().push(key.clone());
            if self.fail {
                return Err(RepoError::Database("connection lost".into()));
            }
            Ok(self.rates.get(&key).cloned())
        }

        async fn list(&self) -> Result<Vec<ExchangeRate>, RepoError> {
            Ok(self.rates.values().cloned().collect())
        }
    }

    /// Manager recording every flushed change set.
    pub struct MockManager {
        flushed: Mutex<Vec<ChangeSet>>,
        fail: bool,
    }

    impl MockManager {
        pub fn new() -> Self {
            Self {
                flushed: Mutex::new(Vec::new()),
                fail: false,
            }
        }

        pub fn failing() -> Self {
            Self {
                fail: true,
                ..Self::new()
            }
        }

        pub fn flushes(&self) -> Vec<ChangeSet> {
            self.flushed.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ExchangeRateManager for MockManager {
        async fn flush(&self, changes: ChangeSet) -> Result<FlushSummary, RepoError> {
            if self.fail {
                return Err(RepoError::Transaction("commit failed".into()));
            }
            let summary = FlushSummary {
                inserted: changes.staged().len(),
                updated: changes.dirty().len(),
            };
            self.flushed.lock().unwrap().push(changes);
            Ok(summary)
        }
    }

    struct Fixture {
        provider: Arc<MockProvider>,
        rates: Arc<MockRates>,
        manager: Arc<MockManager>,
        importer: ExchangeRatesImporter<
            MockCurrencies,
            Arc<MockManager>,
            Arc<MockProvider>,
            Arc<MockRates>,
        >,
    }

    fn fixture(
        codes: &[&str],
        provider: MockProvider,
        rates: MockRates,
        manager: MockManager,
    ) -> Fixture {
        let provider = Arc::new(provider);
        let rates = Arc::new(rates);
        let manager = Arc::new(manager);
        let importer = ExchangeRatesImporter::new(
            MockCurrencies::new(codes),
            manager.clone(),
            provider.clone(),
            rates.clone(),
        );
        Fixture {
            provider,
            rates,
            manager,
            importer,
        }
    }

    fn pairs(list: &[(&str, &str)]) -> Vec<(String, String)> {
        list.iter()
            .map(|(s, t)| (s.to_string(), t.to_string()))
            .collect()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Tests
    // ─────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_no_currencies_does_nothing() {
        let f = fixture(&[], MockProvider::new(&[]), MockRates::empty(), MockManager::new());

        let report = f.importer.import().await.unwrap();

        assert_eq!(report.pairs, 0);
        assert!(!report.flushed);
        assert!(f.provider.calls().is_empty());
        assert!(f.rates.lookups().is_empty());
        assert!(f.manager.flushes().is_empty());
    }

    #[tokio::test]
    async fn test_one_currency_does_nothing() {
        let f = fixture(
            &["EUR"],
            MockProvider::new(&[]),
            MockRates::empty(),
            MockManager::new(),
        );

        let report = f.importer.import().await.unwrap();

        assert_eq!(report.pairs, 0);
        assert!(f.provider.calls().is_empty());
        assert!(f.rates.lookups().is_empty());
        assert!(f.manager.flushes().is_empty());
    }

    #[tokio::test]
    async fn test_updates_existing_rate_from_provider() {
        let f = fixture(
            &["EUR", "CHF"],
            MockProvider::new(&[("EUR", "CHF", 1.17)]),
            MockRates::empty().with("EUR", "CHF", 1.05),
            MockManager::new(),
        );
        let existing_id = f.rates.get("EUR", "CHF").id;

        let report = f.importer.import().await.unwrap();

        assert_eq!(report.updated, 1);
        assert_eq!(report.created, 0);
        assert!(report.flushed);

        let flushes = f.manager.flushes();
        assert_eq!(flushes.len(), 1);
        assert!(flushes[0].staged().is_empty());
        let dirty = flushes[0].dirty();
        assert_eq!(dirty.len(), 1);
        assert_eq!(dirty[0].id, existing_id);
        assert_eq!(dirty[0].ratio, 1.17);
    }

    #[tokio::test]
    async fn test_creates_rate_if_missing() {
        let f = fixture(
            &["EUR", "CHF"],
            MockProvider::new(&[("EUR", "CHF", 1.17)]),
            MockRates::empty(),
            MockManager::new(),
        );

        let report = f.importer.import().await.unwrap();

        assert_eq!(report.created, 1);
        assert_eq!(report.updated, 0);

        let flushes = f.manager.flushes();
        assert_eq!(flushes.len(), 1);
        assert!(flushes[0].dirty().is_empty());
        let staged = flushes[0].staged();
        assert_eq!(staged.len(), 1);
        assert_eq!(staged[0].source_currency.code.as_str(), "EUR");
        assert_eq!(staged[0].target_currency.code.as_str(), "CHF");
        assert_eq!(staged[0].ratio, 1.17);
    }

    #[tokio::test]
    async fn test_three_currencies_visit_each_pair_once_in_order() {
        let f = fixture(
            &["EUR", "PLN", "CHF"],
            MockProvider::new(&[
                ("EUR", "PLN", 4.16),
                ("EUR", "CHF", 1.17),
                ("PLN", "CHF", 0.28),
            ]),
            MockRates::empty()
                .with("EUR", "PLN", 4.0)
                .with("EUR", "CHF", 1.0)
                .with("PLN", "CHF", 0.25),
            MockManager::new(),
        );

        let report = f.importer.import().await.unwrap();

        let expected = pairs(&[("EUR", "PLN"), ("EUR", "CHF"), ("PLN", "CHF")]);
        assert_eq!(f.provider.calls(), expected);
        assert_eq!(f.rates.lookups(), expected);
        assert_eq!(report.pairs, 3);
        assert_eq!(report.updated, 3);

        let flushes = f.manager.flushes();
        assert_eq!(flushes.len(), 1);
        let ratios: Vec<(String, f64)> = flushes[0]
            .dirty()
            .iter()
            .map(|r| (r.pair().to_string(), r.ratio))
            .collect();
        assert_eq!(
            ratios,
            [
                ("EUR/PLN".to_string(), 4.16),
                ("EUR/CHF".to_string(), 1.17),
                ("PLN/CHF".to_string(), 0.28),
            ]
        );
    }

    #[tokio::test]
    async fn test_provider_failure_skips_pair() {
        let f = fixture(
            &["EUR", "CHF"],
            MockProvider::new(&[]),
            MockRates::empty().with("EUR", "CHF", 1.05),
            MockManager::new(),
        );

        let report = f.importer.import().await.unwrap();

        assert_eq!(f.provider.calls(), pairs(&[("EUR", "CHF")]));
        assert!(f.rates.lookups().is_empty());
        assert!(f.manager.flushes().is_empty());
        assert!(!report.flushed);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].pair.to_string(), "EUR/CHF");
    }

    #[tokio::test]
    async fn test_partial_provider_failure_flushes_the_rest() {
        let f = fixture(
            &["EUR", "PLN", "CHF"],
            MockProvider::new(&[("EUR", "PLN", 4.16), ("PLN", "CHF", 0.28)]),
            MockRates::empty(),
            MockManager::new(),
        );

        let report = f.importer.import().await.unwrap();

        assert_eq!(f.rates.lookups(), pairs(&[("EUR", "PLN"), ("PLN", "CHF")]));
        assert_eq!(report.created, 2);
        assert_eq!(report.succeeded(), 2);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].pair.to_string(), "EUR/CHF");

        let flushes = f.manager.flushes();
        assert_eq!(flushes.len(), 1);
        assert_eq!(flushes[0].len(), 2);
    }

    #[tokio::test]
    async fn test_unusable_ratio_is_skipped() {
        let f = fixture(
            &["EUR", "PLN", "CHF"],
            MockProvider::new(&[
                ("EUR", "PLN", 0.0),
                ("EUR", "CHF", f64::NAN),
                ("PLN", "CHF", -0.28),
            ]),
            MockRates::empty(),
            MockManager::new(),
        );

        let report = f.importer.import().await.unwrap();

        assert_eq!(report.skipped.len(), 3);
        assert!(f.rates.lookups().is_empty());
        assert!(f.manager.flushes().is_empty());
    }

    #[tokio::test]
    async fn test_lookup_error_aborts_without_flush() {
        let f = fixture(
            &["EUR", "CHF"],
            MockProvider::new(&[("EUR", "CHF", 1.17)]),
            MockRates::failing(),
            MockManager::new(),
        );

        let result = f.importer.import().await;

        assert!(matches!(
            result,
            Err(ImportError::Repository(RepoError::Database(_)))
        ));
        assert!(f.manager.flushes().is_empty());
    }

    #[tokio::test]
    async fn test_flush_error_is_reported() {
        let f = fixture(
            &["EUR", "CHF"],
            MockProvider::new(&[("EUR", "CHF", 1.17)]),
            MockRates::empty(),
            MockManager::failing(),
        );

        let result = f.importer.import().await;

        assert!(matches!(
            result,
            Err(ImportError::Repository(RepoError::Transaction(_)))
        ));
    }

    #[tokio::test]
    async fn test_import_errors_always_come_from_the_store() {
        let f = fixture(
            &["EUR", "CHF"],
            MockProvider::new(&[("EUR", "CHF", 1.17)]),
            MockRates::failing(),
            MockManager::new(),
        );

        let err = f.importer.import().await.unwrap_err();

        // Exhaustive: a new variant must be handled here.
        match &err {
            ImportError::Repository(cause) => {
                assert_eq!(err.to_string(), format!("Repository error: {cause}"))
            }
        }
    }

    #[tokio::test]
    async fn test_duplicate_codes_are_paired_once() {
        let f = fixture(
            &["EUR", "CHF", "EUR"],
            MockProvider::new(&[("EUR", "CHF", 1.17)]),
            MockRates::empty(),
            MockManager::new(),
        );

        let report = f.importer.import().await.unwrap();

        assert_eq!(f.provider.calls(), pairs(&[("EUR", "CHF")]));
        assert_eq!(report.pairs, 1);
        assert_eq!(f.manager.flushes()[0].staged().len(), 1);
    }

    #[tokio::test]
    async fn test_same_currency_twice_does_nothing() {
        let f = fixture(
            &["EUR", "EUR"],
            MockProvider::new(&[]),
            MockRates::empty(),
            MockManager::new(),
        );

        let report = f.importer.import().await.unwrap();

        assert_eq!(report.pairs, 0);
        assert!(f.provider.calls().is_empty());
        assert!(f.manager.flushes().is_empty());
    }

    #[tokio::test]
    async fn test_usable_through_importer_trait() {
        let f = fixture(
            &["EUR", "CHF"],
            MockProvider::new(&[("EUR", "CHF", 1.17)]),
            MockRates::empty(),
            MockManager::new(),
        );
        let importer: &dyn Importer = &f.importer;

        let report = importer.import().await.unwrap();

        assert!(report.flushed);
        assert_eq!(f.manager.flushes().len(), 1);
    }
}
