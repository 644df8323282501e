//! # Rates Importer
//!
//! Application service that synchronizes exchange rates.
//!
//! ## Architecture
//!
//! - `importer/` - the importer service (orchestrates the ports)
//!
//! The importer is generic over every port it uses, allowing different
//! providers and repositories to be injected.

pub mod importer;

#[cfg(test)]
mod importer_tests;

pub use importer::{ExchangeRatesImporter, ImportError, ImportReport, Importer, SkippedPair};
