//! Pending exchange rate changes, committed in one flush.

use serde::Serialize;

use super::exchange_rate::ExchangeRate;

/// Unit of work handed to [`ExchangeRateManager::flush`](crate::ExchangeRateManager::flush).
///
/// New records are staged, records loaded from the store and mutated are marked dirty.
#[derive(Debug, Clone, Default)]
pub struct ChangeSet {
    staged: Vec<ExchangeRate>,
    dirty: Vec<ExchangeRate>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stages a record that does not exist in the store yet.
    pub fn stage(&mut self, rate: ExchangeRate) {
        self.staged.push(rate);
    }

    /// Records an update to a record that already exists in the store.
    pub fn mark_dirty(&mut self, rate: ExchangeRate) {
        self.dirty.push(rate);
    }

    pub fn staged(&self) -> &[ExchangeRate] {
        &self.staged
    }

    pub fn dirty(&self) -> &[ExchangeRate] {
        &self.dirty
    }

    pub fn len(&self) -> usize {
        self.staged.len() + self.dirty.len()
    }

    pub fn is_empty(&self) -> bool {
        self.staged.is_empty() && self.dirty.is_empty()
    }

    /// Splits into (staged, dirty).
    pub fn into_parts(self) -> (Vec<ExchangeRate>, Vec<ExchangeRate>) {
        (self.staged, self.dirty)
    }
}

/// What a flush wrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FlushSummary {
    pub inserted: usize,
    pub updated: usize,
}
