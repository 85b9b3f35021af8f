//! Results of list loads that tolerate per-item failures

use chronicle_core::SkippedResource;

/// Items that loaded plus the ones that were skipped
///
/// Lets callers tell "not in the manifest" apart from "listed but failed to
/// load".
#[derive(Debug, Clone, PartialEq)]
pub struct Batch<T> {
    pub items: Vec<T>,
    pub skipped: Vec<SkippedResource>,
}

impl<T> Batch<T> {
    pub fn new(items: Vec<T>, skipped: Vec<SkippedResource>) -> Self {
        Self { items, skipped }
    }

    /// Returns true if every listed item loaded
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Discards the skip records
    pub fn into_items(self) -> Vec<T> {
        self.items
    }
}

impl<T> Default for Batch<T> {
    fn default() -> Self {
        Self::new(Vec::new(), Vec::new())
    }
}
