//! LabelStore: in-memory label ledger plus per-category history.
//!
//! Two structures with different retraction rules live side by side:
//! - `labels`: transaction -> current Label, last write wins.
//! - `history`: category -> every transaction ever assigned to it, in
//!   insertion order. Entries are only ever appended; moving or removing a
//!   label leaves the old category's history intact so it keeps counting as
//!   classification evidence.
//!
//! Nothing here fails. Unknown ids read back as `None` or an empty list.

use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

use crate::id::{CategoryId, TransactionId, UserId};
use crate::record::{Label, TransactionInfo};

/// Source of `created_at` timestamps.
pub type Clock = fn() -> DateTime<Utc>;

/// Insertion-ordered set of transaction ids for one category.
#[derive(Debug, Clone, Default)]
struct CategoryLog {
    order: Vec<TransactionId>,
    seen: HashSet<TransactionId>,
}

impl CategoryLog {
    fn push(&mut self, tx_id: &TransactionId) {
        if self.seen.insert(tx_id.clone()) {
            self.order.push(tx_id.clone());
        }
    }
}

#[derive(Debug, Clone)]
pub struct LabelStore {
    labels: HashMap<TransactionId, Label>,
    transactions: HashMap<TransactionId, TransactionInfo>,
    history: HashMap<CategoryId, CategoryLog>,
    clock: Clock,
}

impl Default for LabelStore {
    fn default() -> Self {
        Self::with_clock(Utc::now)
    }
}

impl LabelStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store whose labels are stamped by `clock` instead of the wall clock.
    pub fn with_clock(clock: Clock) -> Self {
        Self {
            labels: HashMap::new(),
            transactions: HashMap::new(),
            history: HashMap::new(),
            clock,
        }
    }

    /// Number of transactions with a current label.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Record a transaction and label it with `category_id`.
    ///
    /// Re-applying an existing transaction id overwrites its stored info and
    /// current label (upsert); history it already contributed elsewhere stays.
    pub fn apply(
        &mut self,
        user_id: UserId,
        tx_id: TransactionId,
        tx_name: impl Into<String>,
        tx_merchant: impl Into<String>,
        category_id: CategoryId,
    ) -> Label {
        let info = TransactionInfo::new(tx_id, tx_name, tx_merchant);
        self.apply_info(user_id, info, category_id)
    }

    /// `apply` for callers that already hold a `TransactionInfo`.
    pub fn apply_info(
        &mut self,
        user_id: UserId,
        info: TransactionInfo,
        category_id: CategoryId,
    ) -> Label {
        let tx_id = info.id().clone();
        if let Some(prev) = self.transactions.get(&tx_id) {
            if prev != &info {
                warn!(
                    tx_id = %tx_id,
                    old_name = prev.name(),
                    new_name = info.name(),
                    "apply overwrote stored transaction info"
                );
            }
        }
        self.transactions.insert(tx_id.clone(), info);
        self.write_label(user_id, tx_id, category_id)
    }

    /// Move a transaction to `new_category_id`.
    ///
    /// The transaction stays in its previous category's history. If it had no
    /// label yet, one is created without touching stored transaction info.
    pub fn update(
        &mut self,
        user_id: UserId,
        tx_id: TransactionId,
        new_category_id: CategoryId,
    ) -> Label {
        if let Some(prev) = self.labels.get(&tx_id) {
            debug!(
                tx_id = %tx_id,
                from = %prev.category_id,
                to = %new_category_id,
                "moving label"
            );
        }
        self.write_label(user_id, tx_id, new_category_id)
    }

    /// Reassign the transaction to the reserved trash category.
    pub fn remove(&mut self, user_id: UserId, tx_id: TransactionId) -> Label {
        self.update(user_id, tx_id, CategoryId::trash())
    }

    pub fn label(&self, tx_id: &TransactionId) -> Option<&Label> {
        self.labels.get(tx_id)
    }

    pub fn transaction(&self, tx_id: &TransactionId) -> Option<&TransactionInfo> {
        self.transactions.get(tx_id)
    }

    /// Every transaction ever assigned to `category_id`, oldest first.
    pub fn category_history(&self, category_id: &CategoryId) -> Vec<TransactionId> {
        self.history_ids(category_id).to_vec()
    }

    /// Borrowing variant of [`category_history`](Self::category_history).
    pub fn history_ids(&self, category_id: &CategoryId) -> &[TransactionId] {
        self.history
            .get(category_id)
            .map(|log| log.order.as_slice())
            .unwrap_or(&[])
    }

    /// All current labels, ordered by transaction id.
    pub fn labels(&self) -> Vec<&Label> {
        let mut out: Vec<&Label> = self.labels.values().collect();
        out.sort_by(|a, b| a.transaction_id.cmp(&b.transaction_id));
        out
    }

    fn write_label(&mut self, user_id: UserId, tx_id: TransactionId, category_id: CategoryId) -> Label {
        self.record_history(&category_id, &tx_id);

        let label = Label::new(tx_id.clone(), category_id, user_id, (self.clock)());
        debug!(tx_id = %tx_id, category_id = %label.category_id, "label written");
        self.labels.insert(tx_id, label.clone());
        label
    }

    fn record_history(&mut self, category_id: &CategoryId, tx_id: &TransactionId) {
        self.history.entry(category_id.clone()).or_default().push(tx_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 10, 1, 12, 0, 0).unwrap()
    }

    fn store() -> LabelStore {
        LabelStore::with_clock(fixed_now)
    }

    fn u() -> UserId {
        UserId::from("u1")
    }

    #[test]
    fn test_apply_records_label_info_and_history() {
        let mut s = store();
        let label = s.apply(
            u(),
            "rx1".into(),
            "Whole Foods",
            "Whole Foods",
            "cat_groceries".into(),
        );

        assert_eq!(label.category_id, CategoryId::from("cat_groceries"));
        assert_eq!(label.created_at, fixed_now());
        assert_eq!(s.label(&"rx1".into()), Some(&label));
        assert_eq!(s.transaction(&"rx1".into()).unwrap().merchant(), "Whole Foods");
        assert_eq!(s.category_history(&"cat_groceries".into()), vec![TransactionId::from("rx1")]);
        assert_eq!(s.len(), 1);
    }

    #[test]
    fn test_update_keeps_old_history() {
        let mut s = store();
        s.apply(u(), "t".into(), "Starbucks", "Starbucks", "c".into());
        let label = s.update(u(), "t".into(), "c2".into());

        assert_eq!(label.category_id, CategoryId::from("c2"));
        assert_eq!(s.label(&"t".into()).unwrap().category_id, CategoryId::from("c2"));
        assert!(s.history_ids(&"c2".into()).contains(&"t".into()));
        assert!(s.history_ids(&"c".into()).contains(&"t".into()));
    }

    #[test]
    fn test_update_without_prior_label_creates_one() {
        let mut s = store();
        let label = s.update(u(), "new".into(), "c".into());

        assert_eq!(s.label(&"new".into()), Some(&label));
        assert!(s.transaction(&"new".into()).is_none());
        assert_eq!(s.category_history(&"c".into()), vec![TransactionId::from("new")]);
    }

    #[test]
    fn test_remove_matches_update_to_trash() {
        let mut a = store();
        let mut b = store();
        a.apply(u(), "t".into(), "H&M", "H&M", "c".into());
        b.apply(u(), "t".into(), "H&M", "H&M", "c".into());

        let removed = a.remove(u(), "t".into());
        let updated = b.update(u(), "t".into(), CategoryId::trash());

        assert_eq!(removed, updated);
        assert!(removed.is_removed());
        assert_eq!(a.label(&"t".into()), b.label(&"t".into()));
    }

    #[test]
    fn test_reapply_overwrites_info_and_keeps_history() {
        let mut s = store();
        s.apply(u(), "t".into(), "Old name", "Old", "c1".into());
        s.apply(u(), "t".into(), "New name", "New", "c2".into());

        assert_eq!(s.transaction(&"t".into()).unwrap().name(), "New name");
        assert_eq!(s.label(&"t".into()).unwrap().category_id, CategoryId::from("c2"));
        assert!(s.history_ids(&"c1".into()).contains(&"t".into()));
        assert!(s.history_ids(&"c2".into()).contains(&"t".into()));
    }

    #[test]
    fn test_history_is_insertion_ordered_without_duplicates() {
        let mut s = store();
        s.apply(u(), "b".into(), "B", "B", "c".into());
        s.apply(u(), "a".into(), "A", "A", "c".into());
        s.update(u(), "b".into(), "c".into());

        assert_eq!(
            s.category_history(&"c".into()),
            vec![TransactionId::from("b"), TransactionId::from("a")]
        );
    }

    #[test]
    fn test_large_seed_keeps_order_and_dedups() {
        let mut s = store();
        for i in 0..5_000 {
            s.apply(u(), format!("tx{i:05}").into(), "Target", "Target", "c".into());
        }
        for i in (0..5_000).step_by(7) {
            s.update(u(), format!("tx{i:05}").into(), "c".into());
        }

        let ids = s.history_ids(&"c".into());
        assert_eq!(ids.len(), 5_000);
        assert_eq!(ids[0].as_str(), "tx00000");
        assert_eq!(ids[4_999].as_str(), "tx04999");
    }

    #[test]
    fn test_unknown_ids_read_as_absent() {
        let s = store();
        assert!(s.is_empty());
        assert!(s.label(&"nope".into()).is_none());
        assert!(s.transaction(&"nope".into()).is_none());
        assert!(s.category_history(&"nope".into()).is_empty());
        assert!(s.labels().is_empty());
    }

    #[test]
    fn test_labels_sorted_by_transaction_id() {
        let mut s = store();
        s.apply(u(), "tx2".into(), "B", "B", "c".into());
        s.apply(u(), "tx1".into(), "A", "A", "c".into());

        let ids: Vec<&str> = s.labels().iter().map(|l| l.transaction_id.as_str()).collect();
        assert_eq!(ids, vec!["tx1", "tx2"]);
    }
}
