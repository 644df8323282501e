//! # Exchange Rates CLI
//!
//! Binary that wires together all the components:
//! - Load configuration from environment and flags
//! - Initialize logging
//! - Open the SQLite repository
//! - Pick the rate provider
//! - Run the requested command

mod config;

use std::io::Write;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use config::{Config, LogFormat, ProviderKind};
use rates_importer::{ExchangeRatesImporter, Importer};
use rates_providers::{FixedRateProvider, HttpRateProvider};
use rates_repo::{SqliteRepo, build_repo};
use rates_types::{CurrencyCode, CurrencyRepository, ExchangeRateProvider, ExchangeRateRepository};

#[derive(Parser)]
#[command(name = "exchange-rates")]
#[command(author, version, about = "Keeps the shop's exchange rates in sync", long_about = None)]
struct Cli {
    #[command(flatten)]
    config: Config,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch fresh ratios for every currency pair and store them
    Import,
    /// Currency operations
    Currency {
        #[command(subcommand)]
        action: CurrencyCommands,
    },
    /// Exchange rate operations
    Rate {
        #[command(subcommand)]
        action: RateCommands,
    },
}

#[derive(Subcommand)]
enum CurrencyCommands {
    /// Register currencies (registration order is the pairing order)
    Add {
        /// Currency codes, e.g. EUR CHF PLN
        #[arg(required = true)]
        codes: Vec<String>,
    },
    /// List configured currencies
    List,
}

#[derive(Subcommand)]
enum RateCommands {
    /// List all stored exchange rates
    List,
    /// Show the stored rate for an ordered pair
    Get {
        /// Source currency code
        source: String,
        /// Target currency code
        target: String,
    },
}

fn parse_currency(s: &str) -> Result<CurrencyCode> {
    s.parse()
        .map_err(|_| anyhow::anyhow!("Invalid currency code: {}", s))
}

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,rates_importer=debug,rates_cli=debug".into());
    let registry = tracing_subscriber::registry().with(filter);

    // Logs go to stderr so command output on stdout stays machine-readable.
    match format {
        LogFormat::Text => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init(),
    }
}

fn build_provider(config: &Config) -> Result<Arc<dyn ExchangeRateProvider>> {
    match config.provider {
        ProviderKind::Fixed => Ok(Arc::new(FixedRateProvider::reference())),
        ProviderKind::Http => {
            let mut provider = HttpRateProvider::new(&config.api_url, config.timeout())?;
            if let Some(key) = config.api_key() {
                provider = provider.with_api_key(key);
            }
            Ok(Arc::new(provider))
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = cli.config;

    init_tracing(config.log_format);
    tracing::debug!("Using database: {}", config.database_url);

    // Build repository (handles connection and migration)
    let repo: Arc<SqliteRepo> = Arc::new(build_repo(&config.database_url).await?);
    let provider = build_provider(&config)?;
    tracing::debug!(provider = ?config.provider, "Rates provider ready");

    let result = run(cli.command, repo.clone(), provider, &mut std::io::stdout()).await;

    repo.pool().close().await;
    result
}

/// Executes one command, writing its JSON output to `out`.
async fn run(
    command: Commands,
    repo: Arc<SqliteRepo>,
    provider: Arc<dyn ExchangeRateProvider>,
    out: &mut dyn Write,
) -> Result<()> {
    match command {
        Commands::Import => {
            tracing::info!("Importing exchange rates");
            let importer =
                ExchangeRatesImporter::new(repo.clone(), repo.clone(), provider, repo.clone());
            let report = run_import(&importer).await?;
            writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;
        }

        Commands::Currency { action } => match action {
            CurrencyCommands::Add { codes } => {
                let codes = codes
                    .iter()
                    .map(|c| parse_currency(c))
                    .collect::<Result<Vec<_>>>()?;
                for code in codes {
                    let currency = repo.add(code).await?;
                    writeln!(out, "{}", serde_json::to_string_pretty(&currency)?)?;
                }
            }
            CurrencyCommands::List => {
                let currencies = repo.find_all().await?;
                writeln!(out, "{}", serde_json::to_string_pretty(&currencies)?)?;
            }
        },

        Commands::Rate { action } => match action {
            RateCommands::List => {
                let rates = repo.list().await?;
                writeln!(out, "{}", serde_json::to_string_pretty(&rates)?)?;
            }
            RateCommands::Get { source, target } => {
                let source = parse_currency(&source)?;
                let target = parse_currency(&target)?;
                let rate = repo
                    .find_one_with_currency_pair(&source, &target)
                    .await?
                    .ok_or_else(|| anyhow::anyhow!("Exchange rate {source}/{target} not found"))?;
                writeln!(out, "{}", serde_json::to_string_pretty(&rate)?)?;
            }
        },
    }

    Ok(())
}

async fn run_import(importer: &dyn Importer) -> Result<rates_importer::ImportReport> {
    let report = importer.import().await?;
    if !report.skipped.is_empty() {
        tracing::warn!(
            skipped = report.skipped.len(),
            "Some currency pairs could not be priced"
        );
    }
    Ok(report)
}
