//! Accumulator for overlap entries seen during dispatch.

use std::collections::BTreeMap;

use crate::models::{Entry, QuestionIndex};

/// Overlap entries grouped by question index, in registration order.
///
/// Built up by the dispatcher and handed by value to the resolver, which
/// consumes it. Groups iterate in ascending index order.
#[derive(Debug, Clone, Default)]
pub struct OverlapRegistry {
    groups: BTreeMap<QuestionIndex, Vec<Entry>>,
}

impl OverlapRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry to the group for its index.
    pub fn register(&mut self, entry: Entry) {
        self.groups
            .entry(entry.index().clone())
            .or_default()
            .push(entry);
    }

    /// Entries registered under `index`, first registered first.
    pub fn group(&self, index: &QuestionIndex) -> Option<&[Entry]> {
        self.groups.get(index).map(Vec::as_slice)
    }

    /// Number of distinct indices.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

impl IntoIterator for OverlapRegistry {
    type Item = (QuestionIndex, Vec<Entry>);
    type IntoIter = std::collections::btree_map::IntoIter<QuestionIndex, Vec<Entry>>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.into_iter()
    }
}
