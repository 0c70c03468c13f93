//! Persisted ledger records.

use chrono::{DateTime, Utc};
use coopbook_shared::types::{
    AccountId, BankId, BranchId, GeneralLedgerId, MediaId, MemberJointAccountId, MemberProfileId,
    OrganizationId, PaymentTypeId, TransactionBatchId, TransactionId, UserId,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::posting::LedgerSource;

/// One general-ledger row. Immutable once committed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneralLedgerEntry {
    /// Unique identifier.
    pub id: GeneralLedgerId,
    /// Organization of the posting.
    pub organization_id: OrganizationId,
    /// Branch of the posting.
    pub branch_id: BranchId,
    /// Account this row belongs to.
    pub account_id: AccountId,
    /// Owning transaction.
    pub transaction_id: Option<TransactionId>,
    /// Batch the row was posted in.
    pub transaction_batch_id: Option<TransactionBatchId>,
    /// Member, absent for subsidiary postings.
    pub member_profile_id: Option<MemberProfileId>,
    /// Joint account holder, if any.
    pub member_joint_account_id: Option<MemberJointAccountId>,
    /// Teller who posted the row.
    pub employee_user_id: Option<UserId>,
    /// Payment type.
    pub payment_type_id: Option<PaymentTypeId>,
    /// Bank for check or online payments.
    pub bank_id: Option<BankId>,
    /// Uploaded proof of payment.
    pub proof_of_payment_media_id: Option<MediaId>,
    /// Uploaded signature.
    pub signature_media_id: Option<MediaId>,
    /// Direction applied.
    pub source: LedgerSource,
    /// Receipt or reference number.
    pub reference_number: String,
    /// Bank reference number.
    pub bank_reference_number: Option<String>,
    /// Free-form description.
    pub description: Option<String>,
    /// Debit amount.
    pub debit: Decimal,
    /// Credit amount.
    pub credit: Decimal,
    /// Running balance after this row.
    pub balance: Decimal,
    /// Business date of the posting.
    pub entry_date: DateTime<Utc>,
    /// When the row was written.
    pub created_at: DateTime<Utc>,
}

/// A business event grouping one or more ledger rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique identifier.
    pub id: TransactionId,
    /// Organization.
    pub organization_id: OrganizationId,
    /// Branch.
    pub branch_id: BranchId,
    /// Batch that created the transaction.
    pub transaction_batch_id: TransactionBatchId,
    /// Member, absent for house postings.
    pub member_profile_id: Option<MemberProfileId>,
    /// Joint account holder.
    pub member_joint_account_id: Option<MemberJointAccountId>,
    /// Teller.
    pub employee_user_id: UserId,
    /// Reference number shared by every row of the transaction.
    pub reference_number: Option<String>,
    /// Description.
    pub description: Option<String>,
    /// Direction of the first posting.
    pub source: LedgerSource,
    /// Cumulative net amount of all postings.
    pub amount: Decimal,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
}

/// Last known balance of one member on one account. Read cache only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberAccountingLedger {
    /// Member.
    pub member_profile_id: MemberProfileId,
    /// Account.
    pub account_id: AccountId,
    /// Organization.
    pub organization_id: OrganizationId,
    /// Branch.
    pub branch_id: BranchId,
    /// Balance after the latest posting.
    pub balance: Decimal,
    /// Date of the latest posting.
    pub last_pay: DateTime<Utc>,
    /// Last write time.
    pub updated_at: DateTime<Utc>,
}
