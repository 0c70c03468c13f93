//! PostgreSQL adapter of the payment pipeline's storage ports.
//!
//! Every posting runs inside one database transaction. Row locks are taken
//! with `SELECT ... FOR UPDATE` on the account, the latest ledger row of the
//! (account, member) pair and the teller's user organization row, so
//! concurrent postings to one account are serialized by the database.

use chrono::Utc;
use coopbook_core::batch::TransactionBatch;
use coopbook_core::ledger::{Account, GeneralLedgerEntry, MemberAccountingLedger, Transaction};
use coopbook_core::payment::{
    MemberProfile, OfficialReceiptCounter, PaymentStore, PaymentType, StoreError, UnitOfWork,
};
use coopbook_shared::types::{
    AccountId, BranchId, MemberProfileId, OrganizationId, PaymentTypeId, TransactionId, UserId,
    UserOrganizationId,
};
use rust_decimal::Decimal;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait, Unchanged,
};
use uuid::Uuid;

use super::mapping::{db_err, stored};
use crate::entities::{
    accounts, general_ledgers, member_accounting_ledgers, member_profiles, payment_types,
    transaction_batches, transactions, user_organizations,
};

/// Payment store backed by PostgreSQL.
#[derive(Debug, Clone)]
pub struct PgPaymentStore {
    db: DatabaseConnection,
}

impl PgPaymentStore {
    /// Creates a new payment store.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

impl PaymentStore for PgPaymentStore {
    type Tx = PgUnitOfWork;

    async fn begin(&self) -> Result<PgUnitOfWork, StoreError> {
        let txn = self.db.begin().await.map_err(db_err)?;
        Ok(PgUnitOfWork { txn })
    }

    async fn find_member(&self, id: MemberProfileId) -> Result<Option<MemberProfile>, StoreError> {
        let member = member_profiles::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(member.map(Into::into))
    }

    async fn find_payment_type(&self, id: PaymentTypeId) -> Result<Option<PaymentType>, StoreError> {
        let payment_type = payment_types::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(payment_type.map(Into::into))
    }

    async fn current_batch(
        &self,
        employee_user_id: UserId,
        organization_id: OrganizationId,
        branch_id: BranchId,
    ) -> Result<Option<TransactionBatch>, StoreError> {
        let batch = transaction_batches::Entity::find()
            .filter(transaction_batches::Column::EmployeeUserId.eq(employee_user_id.into_inner()))
            .filter(transaction_batches::Column::OrganizationId.eq(organization_id.into_inner()))
            .filter(transaction_batches::Column::BranchId.eq(branch_id.into_inner()))
            .order_by_desc(transaction_batches::Column::CreatedAt)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(batch.map(Into::into))
    }
}

/// One posting's database transaction.
///
/// Dropping it without [`UnitOfWork::commit`] rolls the transaction back.
pub struct PgUnitOfWork {
    txn: DatabaseTransaction,
}

impl UnitOfWork for PgUnitOfWork {
    async fn lock_account(&mut self, id: AccountId) -> Result<Option<Account>, StoreError> {
        let account = accounts::Entity::find_by_id(id.into_inner())
            .lock_exclusive()
            .one(&self.txn)
            .await
            .map_err(db_err)?;
        account.map(Account::try_from).transpose()
    }

    async fn lock_latest_ledger(
        &mut self,
        account_id: AccountId,
        member_profile_id: Option<MemberProfileId>,
        organization_id: OrganizationId,
        branch_id: BranchId,
    ) -> Result<Option<GeneralLedgerEntry>, StoreError> {
        let query = general_ledgers::Entity::find()
            .filter(general_ledgers::Column::AccountId.eq(account_id.into_inner()))
            .filter(general_ledgers::Column::OrganizationId.eq(organization_id.into_inner()))
            .filter(general_ledgers::Column::BranchId.eq(branch_id.into_inner()));
        let query = match member_profile_id {
            Some(member_id) => {
                query.filter(general_ledgers::Column::MemberProfileId.eq(member_id.into_inner()))
            }
            None => query.filter(general_ledgers::Column::MemberProfileId.is_null()),
        };

        let latest = query
            .order_by_desc(general_ledgers::Column::CreatedAt)
            .order_by_desc(general_ledgers::Column::Id)
            .lock_exclusive()
            .one(&self.txn)
            .await
            .map_err(db_err)?;
        latest.map(GeneralLedgerEntry::try_from).transpose()
    }

    async fn find_transaction(
        &mut self,
        id: TransactionId,
    ) -> Result<Option<Transaction>, StoreError> {
        let transaction = transactions::Entity::find_by_id(id.into_inner())
            .one(&self.txn)
            .await
            .map_err(db_err)?;
        transaction.map(Transaction::try_from).transpose()
    }

    async fn create_transaction(&mut self, transaction: &Transaction) -> Result<(), StoreError> {
        let model = transactions::ActiveModel {
            id: Set(transaction.id.into_inner()),
            organization_id: Set(transaction.organization_id.into_inner()),
            branch_id: Set(transaction.branch_id.into_inner()),
            transaction_batch_id: Set(transaction.transaction_batch_id.into_inner()),
            member_profile_id: Set(transaction.member_profile_id.map(Into::into)),
            member_joint_account_id: Set(transaction.member_joint_account_id.map(Into::into)),
            employee_user_id: Set(transaction.employee_user_id.into_inner()),
            reference_number: Set(transaction.reference_number.clone()),
            description: Set(transaction.description.clone()),
            source: Set(transaction.source.label().to_string()),
            amount: Set(transaction.amount),
            created_at: Set(stored(transaction.created_at)),
            updated_at: Set(stored(transaction.updated_at)),
        };
        model.insert(&self.txn).await.map_err(db_err)?;
        Ok(())
    }

    async fn create_ledger_entry(&mut self, entry: &GeneralLedgerEntry) -> Result<(), StoreError> {
        let model = general_ledgers::ActiveModel {
            id: Set(entry.id.into_inner()),
            organization_id: Set(entry.organization_id.into_inner()),
            branch_id: Set(entry.branch_id.into_inner()),
            account_id: Set(entry.account_id.into_inner()),
            transaction_id: Set(entry.transaction_id.map(Into::into)),
            transaction_batch_id: Set(entry.transaction_batch_id.map(Into::into)),
            member_profile_id: Set(entry.member_profile_id.map(Into::into)),
            member_joint_account_id: Set(entry.member_joint_account_id.map(Into::into)),
            employee_user_id: Set(entry.employee_user_id.map(Into::into)),
            payment_type_id: Set(entry.payment_type_id.map(Into::into)),
            bank_id: Set(entry.bank_id.map(Into::into)),
            proof_of_payment_media_id: Set(entry.proof_of_payment_media_id.map(Into::into)),
            signature_media_id: Set(entry.signature_media_id.map(Into::into)),
            source: Set(entry.source.label().to_string()),
            reference_number: Set(entry.reference_number.clone()),
            bank_reference_number: Set(entry.bank_reference_number.clone()),
            description: Set(entry.description.clone()),
            debit: Set(entry.debit),
            credit: Set(entry.credit),
            balance: Set(entry.balance),
            entry_date: Set(stored(entry.entry_date)),
            created_at: Set(stored(entry.created_at)),
        };
        model.insert(&self.txn).await.map_err(db_err)?;
        Ok(())
    }

    async fn update_transaction_amount(
        &mut self,
        id: TransactionId,
        delta: Decimal,
    ) -> Result<Decimal, StoreError> {
        let transaction = transactions::Entity::find_by_id(id.into_inner())
            .lock_exclusive()
            .one(&self.txn)
            .await
            .map_err(db_err)?
            .ok_or_else(|| StoreError::database(format!("transaction {id} vanished")))?;

        let amount = transaction.amount + delta;
        let mut active: transactions::ActiveModel = transaction.into();
        active.amount = Set(amount);
        active.updated_at = Set(Utc::now().into());
        active.update(&self.txn).await.map_err(db_err)?;
        Ok(amount)
    }

    async fn upsert_member_accounting_ledger(
        &mut self,
        ledger: &MemberAccountingLedger,
    ) -> Result<(), StoreError> {
        let model = member_accounting_ledgers::ActiveModel {
            id: Set(Uuid::now_v7()),
            member_profile_id: Set(ledger.member_profile_id.into_inner()),
            account_id: Set(ledger.account_id.into_inner()),
            organization_id: Set(ledger.organization_id.into_inner()),
            branch_id: Set(ledger.branch_id.into_inner()),
            balance: Set(ledger.balance),
            last_pay: Set(stored(ledger.last_pay)),
            updated_at: Set(stored(ledger.updated_at)),
        };

        member_accounting_ledgers::Entity::insert(model)
            .on_conflict(
                OnConflict::columns([
                    member_accounting_ledgers::Column::MemberProfileId,
                    member_accounting_ledgers::Column::AccountId,
                ])
                .update_columns([
                    member_accounting_ledgers::Column::Balance,
                    member_accounting_ledgers::Column::LastPay,
                    member_accounting_ledgers::Column::UpdatedAt,
                ])
                .to_owned(),
            )
            .exec(&self.txn)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn lock_official_receipt(
        &mut self,
        user_organization_id: UserOrganizationId,
    ) -> Result<Option<OfficialReceiptCounter>, StoreError> {
        let row = user_organizations::Entity::find_by_id(user_organization_id.into_inner())
            .lock_exclusive()
            .one(&self.txn)
            .await
            .map_err(db_err)?;
        Ok(row.as_ref().map(OfficialReceiptCounter::from))
    }

    async fn save_official_receipt(
        &mut self,
        user_organization_id: UserOrganizationId,
        counter: OfficialReceiptCounter,
    ) -> Result<(), StoreError> {
        let active = user_organizations::ActiveModel {
            id: Unchanged(user_organization_id.into_inner()),
            or_used: Set(counter.used),
            ..Default::default()
        };
        active.update(&self.txn).await.map_err(db_err)?;
        Ok(())
    }

    async fn commit(self) -> Result<(), StoreError> {
        self.txn.commit().await.map_err(db_err)
    }
}
