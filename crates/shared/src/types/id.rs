//! Typed IDs for type-safe entity references.
//!
//! Using typed IDs prevents accidentally passing a `MemberProfileId` where an `AccountId` is expected.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Macro to generate typed ID wrappers.
macro_rules! typed_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
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

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
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
    };
}

typed_id!(UserId, "Unique identifier for a user.");
typed_id!(OrganizationId, "Unique identifier for an organization.");
typed_id!(BranchId, "Unique identifier for a branch of an organization.");
typed_id!(
    UserOrganizationId,
    "Unique identifier for a user's membership in an organization branch."
);
typed_id!(AccountId, "Unique identifier for a ledger account.");
typed_id!(CurrencyId, "Unique identifier for a currency.");
typed_id!(MemberProfileId, "Unique identifier for a member profile.");
typed_id!(
    MemberJointAccountId,
    "Unique identifier for a member joint account holder."
);
typed_id!(MemberTypeId, "Unique identifier for a member type.");
typed_id!(TransactionId, "Unique identifier for a transaction.");
typed_id!(GeneralLedgerId, "Unique identifier for a general ledger entry.");
typed_id!(TransactionBatchId, "Unique identifier for a transaction batch.");
typed_id!(PaymentTypeId, "Unique identifier for a payment type.");
typed_id!(BankId, "Unique identifier for a bank.");
typed_id!(MediaId, "Unique identifier for an uploaded media file.");

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_typed_id_from_uuid() {
        let uuid = Uuid::new_v4();
        let id = AccountId::from_uuid(uuid);
        assert_eq!(id.into_inner(), uuid);
        assert_eq!(Uuid::from(id), uuid);
    }

    #[test]
    fn test_typed_id_display_round_trips() {
        let id = MemberProfileId::new();
        let parsed = MemberProfileId::from_str(&id.to_string()).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_typed_id_from_str_error() {
        assert!(TransactionId::from_str("invalid").is_err());
    }
}
