//! String-backed identifiers for users, transactions and categories.
//!
//! Each domain gets its own newtype so a `CategoryId` can never be passed
//! where a `TransactionId` is expected, even though all three wrap a `String`.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id!(
    /// The user who created or changed a label.
    UserId
);

string_id!(
    /// A bank transaction, as identified by the caller.
    TransactionId
);

string_id!(
    /// A spending category.
    CategoryId
);

/// Raw value of the reserved "discarded" category.
pub const TRASH_CATEGORY: &str = "TRASH_CATEGORY";

impl CategoryId {
    /// The reserved category that `remove` moves transactions into.
    ///
    /// It never needs to appear in a candidate list.
    pub fn trash() -> Self {
        Self(TRASH_CATEGORY.to_string())
    }

    pub fn is_trash(&self) -> bool {
        self.0 == TRASH_CATEGORY
    }
}
