//! Database row types and their mapping to domain types.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use rates_types::{Currency, CurrencyCode, ExchangeRate, ExchangeRateId, RepoError};

// ─────────────────────────────────────────────────────────────────────────────
// Database row structs (derive FromRow for automatic mapping)
// ─────────────────────────────────────────────────────────────────────────────

/// Currency row from database.
#[derive(FromRow)]
pub struct DbCurrency {
    pub code: String,
    pub created_at: String,
}

/// Exchange rate row joined with both of its currencies.
#[derive(FromRow)]
pub struct DbExchangeRate {
    pub id: String,
    pub source_currency: String,
    pub source_created_at: String,
    pub target_currency: String,
    pub target_created_at: String,
    pub ratio: f64,
    pub created_at: String,
    pub updated_at: String,
}

/// Column list matching [`DbExchangeRate`]; callers alias `exchange_rates` as `r`.
pub const EXCHANGE_RATE_COLUMNS: &str = "r.id, r.source_currency, s.created_at AS source_created_at, \
     r.target_currency, t.created_at AS target_created_at, r.ratio, r.created_at, r.updated_at";

// ─────────────────────────────────────────────────────────────────────────────
// Conversions
// ─────────────────────────────────────────────────────────────────────────────

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, RepoError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepoError::Database(format!("Invalid timestamp {value:?}: {e}")))
}

fn parse_currency(code: &str, created_at: &str) -> Result<Currency, RepoError> {
    let code = CurrencyCode::new(code)?;
    Ok(Currency::from_parts(code, parse_timestamp(created_at)?))
}

impl DbCurrency {
    pub fn into_domain(self) -> Result<Currency, RepoError> {
        parse_currency(&self.code, &self.created_at)
    }
}

impl DbExchangeRate {
    pub fn into_domain(self) -> Result<ExchangeRate, RepoError> {
        let id: ExchangeRateId = self
            .id
            .parse()
            .map_err(|e| RepoError::Database(format!("Invalid exchange rate id: {e}")))?;

        Ok(ExchangeRate::from_parts(
            id,
            parse_currency(&self.source_currency, &self.source_created_at)?,
            parse_currency(&self.target_currency, &self.target_created_at)?,
            self.ratio,
            parse_timestamp(&self.created_at)?,
            parse_timestamp(&self.updated_at)?,
        ))
    }
}
