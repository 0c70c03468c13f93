//! Teller batches and the per-request batch handle.

use chrono::{DateTime, Utc};
use coopbook_shared::types::{BranchId, OrganizationId, TransactionBatchId, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ledger::{GeneralLedgerEntry, Transaction};

/// Batch bookkeeping errors.
#[derive(Debug, Error)]
pub enum BatchError {
    /// The batch no longer accepts postings.
    #[error("Transaction batch {0} is closed")]
    Closed(TransactionBatchId),

    /// A transaction was created by another batch.
    #[error("Transaction belongs to batch {found}, not the current batch {current}")]
    ForeignTransaction {
        /// Batch of the request.
        current: TransactionBatchId,
        /// Batch recorded on the transaction.
        found: TransactionBatchId,
    },
}

/// The open working period of one teller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionBatch {
    /// Unique identifier.
    pub id: TransactionBatchId,
    /// Organization.
    pub organization_id: OrganizationId,
    /// Branch.
    pub branch_id: BranchId,
    /// Teller owning the batch.
    pub employee_user_id: UserId,
    /// Cash the teller started with.
    pub beginning_balance: Decimal,
    /// Closed batches reject postings.
    pub is_closed: bool,
    /// Opening time.
    pub created_at: DateTime<Utc>,
}

/// The batch resolved for one request, threaded explicitly through the
/// posting pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchHandle {
    batch: TransactionBatch,
}

impl BatchHandle {
    /// Wraps a batch loaded for the current request.
    #[must_use]
    pub fn new(batch: TransactionBatch) -> Self {
        Self { batch }
    }

    /// Batch id.
    #[must_use]
    pub fn id(&self) -> TransactionBatchId {
        self.batch.id
    }

    /// The underlying batch.
    #[must_use]
    pub fn batch(&self) -> &TransactionBatch {
        &self.batch
    }

    /// Fails if the batch is closed.
    ///
    /// # Errors
    ///
    /// Returns `BatchError::Closed` for a closed batch.
    pub fn ensure_open(&self) -> Result<(), BatchError> {
        if self.batch.is_closed {
            return Err(BatchError::Closed(self.batch.id));
        }
        Ok(())
    }

    /// Returns true if `transaction` was created in this batch.
    #[must_use]
    pub fn owns(&self, transaction: &Transaction) -> bool {
        transaction.transaction_batch_id == self.batch.id
    }

    /// Fails unless `transaction` was created in this batch.
    ///
    /// # Errors
    ///
    /// Returns `BatchError::ForeignTransaction` otherwise.
    pub fn ensure_owns(&self, transaction: &Transaction) -> Result<(), BatchError> {
        if self.owns(transaction) {
            Ok(())
        } else {
            Err(BatchError::ForeignTransaction {
                current: self.batch.id,
                found: transaction.transaction_batch_id,
            })
        }
    }
}

/// True iff the batch's posted lines have equal debit and credit totals.
#[must_use]
pub fn is_batch_balanced(lines: &[GeneralLedgerEntry]) -> bool {
    let (debit, credit) = lines.iter().fold(
        (Decimal::ZERO, Decimal::ZERO),
        |(debit, credit), line| (debit + line.debit, credit + line.credit),
    );
    debit == credit
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::LedgerSource;
    use coopbook_shared::types::TransactionId;
    use rust_decimal_macros::dec;

    fn batch(is_closed: bool) -> TransactionBatch {
        TransactionBatch {
            id: TransactionBatchId::new(),
            organization_id: OrganizationId::new(),
            branch_id: BranchId::new(),
            employee_user_id: UserId::new(),
            beginning_balance: dec!(5000),
            is_closed,
            created_at: Utc::now(),
        }
    }

    fn transaction(batch_id: TransactionBatchId) -> Transaction {
        Transaction {
            id: TransactionId::new(),
            organization_id: OrganizationId::new(),
            branch_id: BranchId::new(),
            transaction_batch_id: batch_id,
            member_profile_id: None,
            member_joint_account_id: None,
            employee_user_id: UserId::new(),
            reference_number: None,
            description: None,
            source: LedgerSource::Deposit,
            amount: Decimal::ZERO,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_closed_batch_rejects_postings() {
        let handle = BatchHandle::new(batch(true));
        assert!(matches!(handle.ensure_open(), Err(BatchError::Closed(id)) if id == handle.id()));
        assert!(BatchHandle::new(batch(false)).ensure_open().is_ok());
    }

    #[test]
    fn test_ownership() {
        let handle = BatchHandle::new(batch(false));
        let own = transaction(handle.id());
        let foreign = transaction(TransactionBatchId::new());

        assert!(handle.owns(&own));
        assert!(handle.ensure_owns(&own).is_ok());
        assert!(!handle.owns(&foreign));
        assert!(matches!(
            handle.ensure_owns(&foreign),
            Err(BatchError::ForeignTransaction { .. })
        ));
    }

    #[test]
    fn test_is_batch_balanced() {
        use crate::ledger::running::tests::row;
        use coopbook_shared::types::AccountId;

        let now = Utc::now();
        let cash = AccountId::new();
        let savings = AccountId::new();
        let balanced = [
            row(cash, dec!(250), dec!(0), now),
            row(savings, dec!(0), dec!(250), now),
        ];
        assert!(is_batch_balanced(&balanced));
        assert!(!is_batch_balanced(&balanced[..1]));
        assert!(is_batch_balanced(&[]));
    }
}
