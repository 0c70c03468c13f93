//! Read side of the general ledger: balances, running balances and totals.

use std::collections::HashMap;

use coopbook_core::ledger::{
    Account, AccountTotals, BalanceEntries, BalanceQuery, BalanceResponse, GeneralLedgerEntry,
    LedgerError, LedgerLine, attach_running_balances, calculate_balance, sum_by_account,
};
use coopbook_core::payment::StoreError;
use coopbook_shared::types::{
    AccountId, BranchId, MemberProfileId, OrganizationId, TransactionBatchId,
};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};

use super::mapping::db_err;
use crate::entities::{accounts, general_ledgers};

/// Error types for ledger queries.
#[derive(Debug, thiserror::Error)]
pub enum LedgerQueryError {
    /// Account not found.
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    /// The aggregation rejected the loaded lines.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Storage error.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Ledger read repository.
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    db: DatabaseConnection,
}

impl LedgerRepository {
    /// Creates a new ledger repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds an account by ID.
    pub async fn find_account(&self, id: AccountId) -> Result<Option<Account>, StoreError> {
        let account = accounts::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(db_err)?;
        account.map(Account::try_from).transpose()
    }

    /// Ledger rows of an account in posting order.
    ///
    /// `member_profile_id` narrows the rows to one member's sub-ledger.
    pub async fn entries_for_account(
        &self,
        account_id: AccountId,
        organization_id: OrganizationId,
        branch_id: BranchId,
        member_profile_id: Option<MemberProfileId>,
    ) -> Result<Vec<GeneralLedgerEntry>, StoreError> {
        let mut query = general_ledgers::Entity::find()
            .filter(general_ledgers::Column::AccountId.eq(account_id.into_inner()))
            .filter(general_ledgers::Column::OrganizationId.eq(organization_id.into_inner()))
            .filter(general_ledgers::Column::BranchId.eq(branch_id.into_inner()));
        if let Some(member_id) = member_profile_id {
            query = query.filter(general_ledgers::Column::MemberProfileId.eq(member_id.into_inner()));
        }

        query
            .order_by_asc(general_ledgers::Column::CreatedAt)
            .order_by_asc(general_ledgers::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(GeneralLedgerEntry::try_from)
            .collect()
    }

    /// Ledger rows posted in one teller batch, in posting order.
    pub async fn entries_for_batch(
        &self,
        batch_id: TransactionBatchId,
    ) -> Result<Vec<GeneralLedgerEntry>, StoreError> {
        general_ledgers::Entity::find()
            .filter(general_ledgers::Column::TransactionBatchId.eq(batch_id.into_inner()))
            .order_by_asc(general_ledgers::Column::CreatedAt)
            .order_by_asc(general_ledgers::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(GeneralLedgerEntry::try_from)
            .collect()
    }

    /// Aggregates an account's persisted lines.
    pub async fn account_balance(
        &self,
        account_id: AccountId,
        organization_id: OrganizationId,
        branch_id: BranchId,
        member_profile_id: Option<MemberProfileId>,
    ) -> Result<BalanceResponse, LedgerQueryError> {
        let account = self
            .find_account(account_id)
            .await?
            .ok_or(LedgerQueryError::AccountNotFound(account_id))?;
        let entries = self
            .entries_for_account(account_id, organization_id, branch_id, member_profile_id)
            .await?;

        let lines: Vec<LedgerLine> = entries
            .iter()
            .map(|entry| LedgerLine::from_entry(entry, &account))
            .collect();
        let query = BalanceQuery {
            account_id: Some(account_id),
            currency_id: account.currency_id,
            is_add_on: false,
        };

        Ok(calculate_balance(
            BalanceEntries {
                general_ledger: &lines,
                ..BalanceEntries::default()
            },
            &query,
        )?)
    }

    /// Batch rows sorted by entry date, each stamped with its account's
    /// running balance.
    pub async fn running_entries_for_batch(
        &self,
        batch_id: TransactionBatchId,
    ) -> Result<Vec<GeneralLedgerEntry>, StoreError> {
        let entries = self.entries_for_batch(batch_id).await?;

        let mut gl_types = HashMap::new();
        for entry in &entries {
            if gl_types.contains_key(&entry.account_id) {
                continue;
            }
            let gl_type = self
                .find_account(entry.account_id)
                .await?
                .and_then(|account| account.general_ledger_type);
            gl_types.insert(entry.account_id, gl_type);
        }

        Ok(attach_running_balances(entries, |account_id| {
            gl_types.get(&account_id).copied().flatten()
        }))
    }

    /// Debit and credit totals per account of one batch.
    pub async fn totals_for_batch(
        &self,
        batch_id: TransactionBatchId,
    ) -> Result<Vec<AccountTotals>, StoreError> {
        let entries = self.entries_for_batch(batch_id).await?;
        Ok(sum_by_account(&entries))
    }
}
