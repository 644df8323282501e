//! SQLite repository adapter.
#![allow(clippy::collapsible_if)]

use async_trait::async_trait;
use sqlx::SqlitePool;
use sqlx::sqlite::SqliteConnectOptions;
use std::str::FromStr;
use tracing::debug;

use rates_types::{
    ChangeSet, Currency, CurrencyCode, CurrencyRepository, ExchangeRate, ExchangeRateManager,
    ExchangeRateRepository, FlushSummary, RepoError,
};

use crate::types::{DbCurrency, DbExchangeRate, EXCHANGE_RATE_COLUMNS};

const SCHEMA: &str = include_str!("../migrations/0001_create_tables.sql");

fn db_err(e: sqlx::Error) -> RepoError {
    RepoError::Database(e.to_string())
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.is_unique_violation())
}

// ─────────────────────────────────────────────────────────────────────────────
// SQLite Repository
// ─────────────────────────────────────────────────────────────────────────────

/// SQLite repository implementation.
pub struct SqliteRepo {
    pool: SqlitePool,
}

impl SqliteRepo {
    /// Creates a new SQLite repository with automatic migration.
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        // Ensure on-disk SQLite target directory exists (no-op for in-memory).
        if let Some(path) = database_url.strip_prefix("sqlite://") {
            let path = path.split('?').next().unwrap_or(path);
            if path != ":memory:" {
                if let Some(parent) = std::path::Path::new(path).parent() {
                    if !parent.as_os_str().is_empty() {
                        tokio::fs::create_dir_all(parent).await?;
                    }
                }
            }
        }

        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePool::connect_with(options).await?;

        sqlx::raw_sql(SCHEMA).execute(&pool).await?;

        Ok(Self { pool })
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Currency repository
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl CurrencyRepository for SqliteRepo {
    async fn find_all(&self) -> Result<Vec<Currency>, RepoError> {
        let rows: Vec<DbCurrency> =
            sqlx::query_as(r#"SELECT code, created_at FROM currencies ORDER BY rowid ASC"#)
                .fetch_all(&self.pool)
                .await
                .map_err(db_err)?;

        rows.into_iter().map(DbCurrency::into_domain).collect()
    }

    async fn add(&self, code: CurrencyCode) -> Result<Currency, RepoError> {
        let currency = Currency::new(code);

        sqlx::query(r#"INSERT INTO currencies (code, created_at) VALUES (?, ?)"#)
            .bind(currency.code.as_str())
            .bind(currency.created_at.to_rfc3339())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    RepoError::Conflict(format!("Currency {} already exists", currency.code))
                } else {
                    db_err(e)
                }
            })?;

        Ok(currency)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Exchange rate repository
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl ExchangeRateRepository for SqliteRepo {
    async fn find_one_with_currency_pair(
        &self,
        source: &CurrencyCode,
        target: &CurrencyCode,
    ) -> Result<Option<ExchangeRate>, RepoError> {
        let sql = format!(
            r#"SELECT {EXCHANGE_RATE_COLUMNS}
               FROM exchange_rates r
               JOIN currencies s ON s.code = r.source_currency
               JOIN currencies t ON t.code = r.target_currency
               WHERE r.source_currency = ? AND r.target_currency = ?"#
        );

        let row: Option<DbExchangeRate> = sqlx::query_as(&sql)
            .bind(source.as_str())
            .bind(target.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;

        row.map(DbExchangeRate::into_domain).transpose()
    }

    async fn list(&self) -> Result<Vec<ExchangeRate>, RepoError> {
        let sql = format!(
            r#"SELECT {EXCHANGE_RATE_COLUMNS}
               FROM exchange_rates r
               JOIN currencies s ON s.code = r.source_currency
               JOIN currencies t ON t.code = r.target_currency
               ORDER BY r.source_currency, r.target_currency"#
        );

        let rows: Vec<DbExchangeRate> = sqlx::query_as(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        rows.into_iter().map(DbExchangeRate::into_domain).collect()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Exchange rate manager (MUST be atomic)
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl ExchangeRateManager for SqliteRepo {
    async fn flush(&self, changes: ChangeSet) -> Result<FlushSummary, RepoError> {
        let (staged, dirty) = changes.into_parts();
        let mut summary = FlushSummary::default();

        let mut db_tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepoError::Transaction(e.to_string()))?;

        for rate in &staged {
            sqlx::query(
                r#"INSERT INTO exchange_rates (id, source_currency, target_currency, ratio, created_at, updated_at)
                   VALUES (?, ?, ?, ?, ?, ?)"#,
            )
            .bind(rate.id.to_string())
            .bind(rate.source_currency.code.as_str())
            .bind(rate.target_currency.code.as_str())
            .bind(rate.ratio)
            .bind(rate.created_at.to_rfc3339())
            .bind(rate.updated_at.to_rfc3339())
            .execute(&mut *db_tx)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    RepoError::Conflict(format!("Exchange rate {} already exists", rate.pair()))
                } else {
                    db_err(e)
                }
            })?;
            summary.inserted += 1;
        }

        for rate in &dirty {
            let result = sqlx::query(
                r#"UPDATE exchange_rates SET ratio = ?, updated_at = ? WHERE id = ?"#,
            )
            .bind(rate.ratio)
            .bind(rate.updated_at.to_rfc3339())
            .bind(rate.id.to_string())
            .execute(&mut *db_tx)
            .await
            .map_err(db_err)?;

            if result.rows_affected() == 0 {
                return Err(RepoError::NotFound);
            }
            summary.updated += 1;
        }

        db_tx
            .commit()
            .await
            .map_err(|e| RepoError::Transaction(e.to_string()))?;

        debug!(
            inserted = summary.inserted,
            updated = summary.updated,
            "Flushed exchange rates"
        );

        Ok(summary)
    }
}
