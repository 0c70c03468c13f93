//! Payment request and result types, and the reference data the pipeline
//! resolves on the way.

use chrono::{DateTime, Utc};
use coopbook_shared::types::{
    AccountId, BankId, BranchId, GeneralLedgerId, MediaId, MemberJointAccountId,
    MemberProfileId, OrganizationId, PaymentTypeId, TransactionId, UserId, UserOrganizationId,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ledger::LedgerSource;

/// A single payment, deposit or withdrawal against one account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRequest {
    /// Requested amount. Negative amounts invert the direction.
    pub amount: Decimal,
    /// Target account.
    pub account_id: Option<AccountId>,
    /// Member the posting belongs to. Absent means a house posting, unless
    /// the referenced transaction carries a member.
    pub member_profile_id: Option<MemberProfileId>,
    /// Joint account holder.
    pub member_joint_account_id: Option<MemberJointAccountId>,
    /// Payment type (cash, check, online...).
    pub payment_type_id: Option<PaymentTypeId>,
    /// Bank for check and online payments.
    pub bank_id: Option<BankId>,
    /// Bank reference.
    pub bank_reference_number: Option<String>,
    /// Uploaded proof of payment.
    pub proof_of_payment_media_id: Option<MediaId>,
    /// Uploaded signature.
    pub signature_media_id: Option<MediaId>,
    /// Business date of the posting. Defaults to now.
    pub entry_date: Option<DateTime<Utc>>,
    /// Official receipt or reference number.
    pub reference_number: Option<String>,
    /// Free-text description.
    pub description: Option<String>,
    /// Transaction to add this posting to. A new one is created when absent
    /// or not found.
    pub transaction_id: Option<TransactionId>,
    /// Advance the teller's official receipt counter.
    #[serde(default)]
    pub or_auto_generated: bool,
}

/// Outcome of a committed posting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionResult {
    /// Transaction the posting was added to.
    pub transaction_id: TransactionId,
    /// The new general-ledger row.
    pub general_ledger_id: GeneralLedgerId,
    /// Posted amount (always positive).
    pub amount: Decimal,
    /// Running balance after the posting.
    pub new_balance: Decimal,
    /// Direction applied after sign normalization.
    pub effective_source: LedgerSource,
    /// Whether the requested amount was negative.
    pub was_negative_normalized: bool,
}

/// Role of the authenticated user inside the organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    /// Organization owner.
    Owner,
    /// Teller or other staff.
    Employee,
    /// Cooperative member.
    Member,
}

/// The authenticated user's membership in an organization branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserOrganization {
    /// Membership id, which also keys the official receipt counter.
    pub id: UserOrganizationId,
    /// User.
    pub user_id: UserId,
    /// Organization.
    pub organization_id: OrganizationId,
    /// Branch the user is working in.
    pub branch_id: BranchId,
    /// Role.
    pub user_type: UserType,
}

/// Caller identity as seen by the hosting service.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    /// Key the abuse guard counts failures against (usually the client IP).
    pub client_key: String,
    /// Session token, resolved to a [`UserOrganization`] by the actor port.
    pub session_token: Option<String>,
}

impl RequestContext {
    /// Context for a client with a session.
    #[must_use]
    pub fn new(client_key: impl Into<String>, session_token: impl Into<String>) -> Self {
        Self {
            client_key: client_key.into(),
            session_token: Some(session_token.into()),
        }
    }
}

/// Member profile fields the pipeline checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberProfile {
    /// Unique identifier.
    pub id: MemberProfileId,
    /// Organization.
    pub organization_id: OrganizationId,
    /// Branch.
    pub branch_id: BranchId,
    /// Display name.
    pub full_name: String,
}

/// A configured payment type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentType {
    /// Unique identifier.
    pub id: PaymentTypeId,
    /// Organization.
    pub organization_id: OrganizationId,
    /// Name.
    pub name: String,
}

/// A teller's official receipt range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfficialReceiptCounter {
    /// First number of the range.
    pub start: i64,
    /// Last number of the range.
    pub end: i64,
    /// Receipts used so far.
    pub used: i64,
}

impl OfficialReceiptCounter {
    /// Counter after one more receipt, or `None` once the range is used up.
    #[must_use]
    pub const fn advance(self) -> Option<Self> {
        if self.used > self.end {
            return None;
        }
        Some(Self {
            used: self.used + 1,
            ..self
        })
    }
}
