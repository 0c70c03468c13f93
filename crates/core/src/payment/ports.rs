//! Collaborator ports of the payment pipeline.
//!
//! These traits are implemented by the db crate (PostgreSQL), by
//! [`super::memory::MemoryStore`] and by the guard and audit adapters in
//! this module tree.

use std::future::Future;

use coopbook_shared::types::{
    AccountId, BranchId, MemberProfileId, OrganizationId, PaymentTypeId, TransactionId, UserId,
    UserOrganizationId,
};
use rust_decimal::Decimal;
use serde::Serialize;

use super::error::{ActorError, GuardError, StoreError};
use super::types::{
    MemberProfile, OfficialReceiptCounter, PaymentType, RequestContext, UserOrganization,
};
use crate::batch::TransactionBatch;
use crate::ledger::{Account, GeneralLedgerEntry, MemberAccountingLedger, Transaction};

/// Storage entry point: reference lookups and unit-of-work creation.
pub trait PaymentStore: Send + Sync {
    /// Unit of work type of this store.
    type Tx: UnitOfWork;

    /// Opens a unit of work.
    fn begin(&self) -> impl Future<Output = Result<Self::Tx, StoreError>> + Send;

    /// Find a member profile by ID.
    fn find_member(
        &self,
        id: MemberProfileId,
    ) -> impl Future<Output = Result<Option<MemberProfile>, StoreError>> + Send;

    /// Find a payment type by ID.
    fn find_payment_type(
        &self,
        id: PaymentTypeId,
    ) -> impl Future<Output = Result<Option<PaymentType>, StoreError>> + Send;

    /// The most recent batch of a teller in a branch, open or not.
    fn current_batch(
        &self,
        employee_user_id: UserId,
        organization_id: OrganizationId,
        branch_id: BranchId,
    ) -> impl Future<Output = Result<Option<TransactionBatch>, StoreError>> + Send;
}

/// One atomic storage transaction.
///
/// Writes become visible only through [`UnitOfWork::commit`]. Dropping the
/// unit of work without committing rolls everything back and releases its
/// locks.
pub trait UnitOfWork: Send {
    /// Fetch an account and hold an exclusive lock on it until commit or
    /// rollback.
    fn lock_account(
        &mut self,
        id: AccountId,
    ) -> impl Future<Output = Result<Option<Account>, StoreError>> + Send;

    /// Latest general-ledger row of an account, for one member or for house
    /// postings when `member_profile_id` is `None`, locked for update.
    fn lock_latest_ledger(
        &mut self,
        account_id: AccountId,
        member_profile_id: Option<MemberProfileId>,
        organization_id: OrganizationId,
        branch_id: BranchId,
    ) -> impl Future<Output = Result<Option<GeneralLedgerEntry>, StoreError>> + Send;

    /// Find a transaction by ID.
    fn find_transaction(
        &mut self,
        id: TransactionId,
    ) -> impl Future<Output = Result<Option<Transaction>, StoreError>> + Send;

    /// Insert a new transaction.
    fn create_transaction(
        &mut self,
        transaction: &Transaction,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Insert a general-ledger row.
    fn create_ledger_entry(
        &mut self,
        entry: &GeneralLedgerEntry,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Add `delta` to a transaction's cumulative amount and return the new
    /// amount.
    fn update_transaction_amount(
        &mut self,
        id: TransactionId,
        delta: Decimal,
    ) -> impl Future<Output = Result<Decimal, StoreError>> + Send;

    /// Insert or replace the cached balance of a (member, account) pair.
    fn upsert_member_accounting_ledger(
        &mut self,
        ledger: &MemberAccountingLedger,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Official receipt counter of a teller, locked for update.
    fn lock_official_receipt(
        &mut self,
        user_organization_id: UserOrganizationId,
    ) -> impl Future<Output = Result<Option<OfficialReceiptCounter>, StoreError>> + Send;

    /// Persist an advanced official receipt counter.
    fn save_official_receipt(
        &mut self,
        user_organization_id: UserOrganizationId,
        counter: OfficialReceiptCounter,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Make every write of this unit of work visible.
    fn commit(self) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// Resolves the authenticated user of a request.
pub trait ActorResolver: Send + Sync {
    /// The caller's organization membership.
    fn current_user_organization(
        &self,
        ctx: &RequestContext,
    ) -> impl Future<Output = Result<UserOrganization, ActorError>> + Send;
}

/// Registers one failure against the caller.
pub trait Blocker: Send + Sync {
    /// Count a failure; repeated failures block the caller.
    fn block(&self, reason: &str);
}

/// Admission decision of the abuse guard.
#[derive(Debug, Clone)]
pub struct GuardDecision<B> {
    /// Handle used to report later failures of this request.
    pub blocker: B,
    /// The caller is currently blocked.
    pub blocked: bool,
}

/// Request admission based on the caller's recent failures.
pub trait AbuseGuard: Send + Sync {
    /// Failure reporter handed out with each decision.
    type Blocker: Blocker;

    /// Check whether the caller may proceed.
    fn check(
        &self,
        ctx: &RequestContext,
    ) -> impl Future<Output = Result<GuardDecision<Self::Blocker>, GuardError>> + Send;
}

/// Structured audit record of one pipeline branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditEvent {
    /// Short kebab-case activity name.
    pub activity: &'static str,
    /// Human-readable detail.
    pub description: String,
    /// Functional module.
    pub module: &'static str,
}

impl AuditEvent {
    /// Event of the transaction module.
    #[must_use]
    pub fn transaction(activity: &'static str, description: impl Into<String>) -> Self {
        Self {
            activity,
            description: description.into(),
            module: "Transaction",
        }
    }
}

/// Fire-and-forget audit trail.
pub trait AuditSink: Send + Sync {
    /// Record one event.
    fn record(&self, event: AuditEvent);
}
