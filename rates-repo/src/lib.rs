//! # Rates Repository
//!
//! Concrete repository implementations (adapters) for the exchange rates sync.
//! Each adapter implements all three repository ports:
//! `CurrencyRepository`, `ExchangeRateRepository` and `ExchangeRateManager`.

#[cfg(not(any(feature = "sqlite", feature = "memory")))]
compile_error!("Enable a repo feature: `sqlite` or `memory`.");

#[cfg(feature = "memory")]
pub mod memory;
#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "sqlite")]
mod types;


// Re-export individual repos for direct use
#[cfg(feature = "memory")]
pub use memory::InMemoryRepo;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteRepo;

/// Build and initialize a SQLite repository from a database URL.
///
/// This function:
/// 1. Creates the parent directory of an on-disk database
/// 2. Connects to the database
/// 3. Runs migrations to create tables
///
/// # Examples
///
/// ```ignore
/// let repo = build_repo("sqlite://exchange-rates.db?mode=rwc").await?;
/// let repo = build_repo("sqlite::memory:").await?;
/// ```
#[cfg(feature = "sqlite")]
pub async fn build_repo(database_url: &str) -> anyhow::Result<SqliteRepo> {
    SqliteRepo::new(database_url).await
}
