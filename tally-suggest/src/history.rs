//! Per-category history snapshot fed into the prompt.

use tally_core::{CategoryMeta, LabelStore, TransactionInfo};

/// Transactions previously assigned to one candidate category.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryHistory<'a> {
    pub category: &'a CategoryMeta,
    /// Oldest first. Includes transactions since moved elsewhere.
    pub transactions: Vec<&'a TransactionInfo>,
}

/// Snapshot the history of every candidate, in candidate order.
///
/// Categories without history get an empty list rather than being dropped,
/// and history ids with no recorded info are skipped.
pub fn build_history_snapshot<'a>(
    store: &'a LabelStore,
    categories: &'a [CategoryMeta],
) -> Vec<CategoryHistory<'a>> {
    categories
        .iter()
        .map(|category| CategoryHistory {
            category,
            transactions: store
                .history_ids(&category.id)
                .iter()
                .filter_map(|tx_id| store.transaction(tx_id))
                .collect(),
        })
        .collect()
}
