//! Fixed-table exchange rate provider.
//!
//! Every currency carries its value in US dollars; the ratio between two
//! currencies is the quotient of their dollar values. The reference table is
//! declared with a macro so adding a currency is one line:
//! ```ignore
//! reference_rates! {
//!     // ... existing currencies ...
//!     SEK => 0.095,
//! }
//! ```
//!
//! # Example
//! ```ignore
//! let provider = FixedRateProvider::reference().with_rate("SEK".parse()?, 0.095);
//! let ratio = provider.get_ratio(&"EUR".parse()?, &"SEK".parse()?).await?;
//! ```

use std::collections::HashMap;

use async_trait::async_trait;
use rates_types::{CurrencyCode, ExchangeRateProvider, ProviderError};

// ─────────────────────────────────────────────────────────────────────────────
// Reference table
// ─────────────────────────────────────────────────────────────────────────────

/// Defines `REFERENCE_USD_VALUES`: `(code, value of one unit in USD)`.
macro_rules! reference_rates {
    ( $( $code:ident => $usd:expr ),* $(,)? ) => {
        pub const REFERENCE_USD_VALUES: &[(&str, f64)] = &[
            $( (stringify!($code), $usd) ),*
        ];
    };
}

reference_rates! {
    USD => 1.0,
    EUR => 1.087,
    GBP => 1.266,
    CHF => 1.272,
    PLN => 0.2613,
    INR => 0.01203,
    JPY => 0.0067,
}

/// Provider answering from an in-memory table of USD values.
#[derive(Debug, Clone)]
pub struct FixedRateProvider {
    usd_values: HashMap<CurrencyCode, f64>,
}

impl FixedRateProvider {
    /// An empty table; every lookup fails until rates are added.
    pub fn empty() -> Self {
        Self {
            usd_values: HashMap::new(),
        }
    }

    /// The built-in reference table.
    pub fn reference() -> Self {
        let usd_values = REFERENCE_USD_VALUES
            .iter()
            .filter_map(|(code, usd)| CurrencyCode::new(code).ok().map(|code| (code, *usd)))
            .collect();
        Self { usd_values }
    }

    /// Adds or overrides the USD value of a currency.
    pub fn with_rate(mut self, code: CurrencyCode, usd_value: f64) -> Self {
        self.usd_values.insert(code, usd_value);
        self
    }

    fn usd_value(&self, code: &CurrencyCode) -> Result<f64, ProviderError> {
        self.usd_values
            .get(code)
            .copied()
            .ok_or_else(|| ProviderError::UnsupportedCurrency(code.clone()))
    }
}

impl Default for FixedRateProvider {
    fn default() -> Self {
        Self::reference()
    }
}

#[async_trait]
impl ExchangeRateProvider for FixedRateProvider {
    async fn get_ratio(
        &self,
        source: &CurrencyCode,
        target: &CurrencyCode,
    ) -> Result<f64, ProviderError> {
        let source_usd = self.usd_value(source)?;
        let target_usd = self.usd_value(target)?;

        if source == target {
            return Ok(1.0);
        }
        if target_usd <= 0.0 {
            return Err(ProviderError::RateNotAvailable(
                source.clone(),
                target.clone(),
            ));
        }

        Ok(source_usd / target_usd)
    }
}
