//! tally-core: identifiers, transaction records and the in-memory label ledger

pub mod id;
pub mod ledger;
pub mod record;

pub use id::{CategoryId, TransactionId, UserId, TRASH_CATEGORY};
pub use ledger::{Clock, LabelStore};
pub use record::{CategoryMeta, Label, TransactionInfo};
