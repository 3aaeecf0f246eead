//! Typed IDs for type-safe document references.
//!
//! Using typed IDs prevents accidentally passing a `BookingId` where a `TransactionId` is expected.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Macro to generate typed ID wrappers.
macro_rules! typed_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Creates a new random ID using UUID v7 (time-ordered).
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Creates an ID from an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the inner UUID.
            #[must_use]
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }
    };
}

typed_id!(BookingId, "Unique identifier for a booking.");
typed_id!(TransactionId, "Unique identifier for a finance transaction.");
typed_id!(AllocationId, "Unique identifier for an allocation (order).");
typed_id!(AccountId, "Unique identifier for a finance (bank/cash) account.");
typed_id!(CategoryId, "Unique identifier for a finance category.");
typed_id!(CounterpartyId, "Unique identifier for a counterparty.");
typed_id!(WithdrawalId, "Unique identifier for an owner withdrawal.");

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
