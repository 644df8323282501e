//! Domain models for the exchange rates sync.

pub mod changes;
pub mod currency;
pub mod exchange_rate;

pub use changes::{ChangeSet, FlushSummary};
pub use currency::{Currency, CurrencyCode};
pub use exchange_rate::{CurrencyPair, ExchangeRate, ExchangeRateId, validate_ratio};
