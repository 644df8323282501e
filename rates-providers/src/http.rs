//! HTTP exchange rate provider.
//!
//! Talks to the `latest` endpoint shared by Frankfurter, exchangerate.host and Fixer:
//! `GET {base_url}/latest?base=EUR&symbols=CHF` answering
//! `{"base": "EUR", "rates": {"CHF": 1.17}}`.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use rates_types::{CurrencyCode, ExchangeRateProvider, ProviderError};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, error};

#[derive(Debug, Deserialize)]
struct LatestResponse {
    #[serde(default)]
    base: Option<String>,
    #[serde(default)]
    rates: HashMap<String, f64>,
}

/// Exchange rate provider backed by a JSON HTTP API.
pub struct HttpRateProvider {
    base_url: String,
    api_key: Option<String>,
    http: Client,
}

impl HttpRateProvider {
    /// Creates a provider with the given request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ProviderError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::ServiceUnavailable(e.to_string()))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: None,
            http,
        })
    }

    /// Sets the access key sent as the `access_key` query parameter.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl ExchangeRateProvider for HttpRateProvider {
    async fn get_ratio(
        &self,
        source: &CurrencyCode,
        target: &CurrencyCode,
    ) -> Result<f64, ProviderError> {
        let mut query = vec![("base", source.as_str()), ("symbols", target.as_str())];
        if let Some(key) = &self.api_key {
            query.push(("access_key", key.as_str()));
        }

        let url = format!("{}/latest", self.base_url);
        debug!(%url, %source, %target, "Requesting exchange rate");

        let resp = self
            .http
            .get(&url)
            .query(&query)
            .send()
            .await
            .map_err(|e| ProviderError::ServiceUnavailable(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(ProviderError::ServiceUnavailable(format!(
                "{} - {}",
                status.as_u16(),
                message
            )));
        }

        let body = resp
            .text()
            .await
            .map_err(|e| ProviderError::ServiceUnavailable(e.to_string()))?;

        let latest: LatestResponse = match serde_json::from_str(&body) {
            Ok(data) => data,
            Err(e) => {
                error!(error = ?e, response = %body, "Failed to parse rates response");
                return Err(ProviderError::InvalidResponse(e.to_string()));
            }
        };

        if let Some(base) = latest
            .base
            .as_deref()
            .filter(|base| !base.eq_ignore_ascii_case(source.as_str()))
        {
            return Err(ProviderError::InvalidResponse(format!(
                "asked for base {source}, got {base}"
            )));
        }

        latest
            .rates
            .get(target.as_str())
            .copied()
            .ok_or_else(|| ProviderError::RateNotAvailable(source.clone(), target.clone()))
    }
}
