//! Record types: transactions, labels and category metadata

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::{CategoryId, TransactionId, UserId};

/// The facts available for classifying a transaction.
///
/// Only name and merchant are kept; amount, date and account never reach
/// the classifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionInfo {
    id: TransactionId,
    name: String,
    merchant: String,
}

impl TransactionInfo {
    pub fn new(
        id: impl Into<TransactionId>,
        name: impl Into<String>,
        merchant: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            merchant: merchant.into(),
        }
    }

    pub fn id(&self) -> &TransactionId {
        &self.id
    }

    /// Statement line / description text
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn merchant(&self) -> &str {
        &self.merchant
    }
}

/// Current category assignment for one transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub transaction_id: TransactionId,
    pub category_id: CategoryId,
    /// Who made the assignment
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
}

impl Label {
    pub fn new(
        transaction_id: TransactionId,
        category_id: CategoryId,
        user_id: UserId,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            transaction_id,
            category_id,
            user_id,
            created_at,
        }
    }

    /// True when the label points at the reserved trash category.
    pub fn is_removed(&self) -> bool {
        self.category_id.is_trash()
    }
}

/// A category as the caller knows it: stable id plus display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryMeta {
    pub id: CategoryId,
    pub name: String,
}

impl CategoryMeta {
    pub fn new(id: impl Into<CategoryId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    /// Build from a `(name, id)` pair, the order callers usually hold them in.
    pub fn from_pair(name: impl Into<String>, id: impl Into<CategoryId>) -> Self {
        Self::new(id, name)
    }
}

impl<N: Into<String>, I: Into<CategoryId>> From<(N, I)> for CategoryMeta {
    fn from((name, id): (N, I)) -> Self {
        Self::from_pair(name, id)
    }
}
