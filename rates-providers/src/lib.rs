//! # Rates Providers
//!
//! Adapters implementing the `ExchangeRateProvider` port:
//! - [`FixedRateProvider`] - in-process reference table, for development and tests
//! - [`HttpRateProvider`] - `latest` endpoint of a Frankfurter/Fixer style JSON API

pub mod fixed;
pub mod http;

pub use fixed::FixedRateProvider;
pub use http::HttpRateProvider;
