//! Configuration from flags and environment.
//!
//! Every setting can be given as a flag or through its environment variable
//! (a `.env` file is loaded first). Flags win over the environment.

use std::str::FromStr;
use std::time::Duration;

use clap::Args;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://exchange-rates.db?mode=rwc";
pub const DEFAULT_API_URL: &str = "https://api.frankfurter.app";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Which exchange rate provider the importer talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Fixed,
    Http,
}

impl FromStr for ProviderKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fixed" => Ok(Self::Fixed),
            "http" => Ok(Self::Http),
            other => anyhow::bail!("Unknown rates provider: {other}. Supported: fixed, http"),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => anyhow::bail!("Unknown log format: {other}. Supported: text, json"),
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone, Args)]
pub struct Config {
    /// Database URL
    #[arg(long, env = "DATABASE_URL", default_value = DEFAULT_DATABASE_URL)]
    pub database_url: String,

    /// Rates provider: fixed or http
    #[arg(long, env = "RATES_PROVIDER", default_value = "fixed")]
    pub provider: ProviderKind,

    /// Base URL of the HTTP rates API
    #[arg(long, env = "RATES_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Access key for the HTTP rates API
    #[arg(long, env = "RATES_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// HTTP request timeout in seconds
    #[arg(long, env = "RATES_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    /// Log format: text or json
    #[arg(long, env = "LOG_FORMAT", default_value = "text")]
    pub log_format: LogFormat,
}

impl Config {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// The API key, if one was given and is not blank.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|key| !key.trim().is_empty())
    }
}
