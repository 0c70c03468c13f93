//! Teller batch repository.

use chrono::Utc;
use coopbook_core::batch::{TransactionBatch, is_batch_balanced};
use coopbook_core::ledger::GeneralLedgerEntry;
use coopbook_core::payment::StoreError;
use coopbook_shared::types::{BranchId, OrganizationId, TransactionBatchId, UserId};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QuerySelect, Set,
    TransactionTrait,
};

use super::mapping::db_err;
use crate::entities::{general_ledgers, transaction_batches};

/// Error types for batch operations.
#[derive(Debug, thiserror::Error)]
pub enum BatchRepositoryError {
    /// Batch not found.
    #[error("Transaction batch not found: {0}")]
    NotFound(TransactionBatchId),

    /// The batch was closed already.
    #[error("Transaction batch {0} is already closed")]
    AlreadyClosed(TransactionBatchId),

    /// Debits and credits of the batch differ.
    #[error("Transaction batch is not balanced: debit {debit}, credit {credit}")]
    Unbalanced {
        /// Total debit.
        debit: Decimal,
        /// Total credit.
        credit: Decimal,
    },

    /// Storage error.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Teller batch repository.
#[derive(Debug, Clone)]
pub struct BatchRepository {
    db: DatabaseConnection,
}

impl BatchRepository {
    /// Creates a new batch repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Opens a new batch for a teller. The newest batch is the teller's
    /// current one.
    pub async fn open(
        &self,
        employee_user_id: UserId,
        organization_id: OrganizationId,
        branch_id: BranchId,
        beginning_balance: Decimal,
    ) -> Result<TransactionBatch, StoreError> {
        let now = Utc::now().into();
        let batch = transaction_batches::ActiveModel {
            id: Set(TransactionBatchId::new().into_inner()),
            organization_id: Set(organization_id.into_inner()),
            branch_id: Set(branch_id.into_inner()),
            employee_user_id: Set(employee_user_id.into_inner()),
            beginning_balance: Set(beginning_balance),
            is_closed: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = batch.insert(&self.db).await.map_err(db_err)?;
        tracing::info!(batch_id = %model.id, %employee_user_id, "transaction batch opened");
        Ok(model.into())
    }

    /// Closes a batch once its debits equal its credits.
    pub async fn close(
        &self,
        batch_id: TransactionBatchId,
    ) -> Result<TransactionBatch, BatchRepositoryError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let batch = transaction_batches::Entity::find_by_id(batch_id.into_inner())
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(db_err)?
            .ok_or(BatchRepositoryError::NotFound(batch_id))?;
        if batch.is_closed {
            return Err(BatchRepositoryError::AlreadyClosed(batch_id));
        }

        let entries = general_ledgers::Entity::find()
            .filter(general_ledgers::Column::TransactionBatchId.eq(batch_id.into_inner()))
            .all(&txn)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(GeneralLedgerEntry::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        if !is_batch_balanced(&entries) {
            let debit: Decimal = entries.iter().map(|entry| entry.debit).sum();
            let credit: Decimal = entries.iter().map(|entry| entry.credit).sum();
            tracing::warn!(%batch_id, %debit, %credit, "batch close rejected");
            return Err(BatchRepositoryError::Unbalanced { debit, credit });
        }

        let mut active: transaction_batches::ActiveModel = batch.into();
        active.is_closed = Set(true);
        active.updated_at = Set(Utc::now().into());
        let closed = active.update(&txn).await.map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;
        tracing::info!(%batch_id, "transaction batch closed");
        Ok(closed.into())
    }
}
