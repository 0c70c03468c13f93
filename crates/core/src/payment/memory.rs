//! In-memory payment store.
//!
//! Account and receipt locks are per-key `tokio` mutexes held by the unit of
//! work until it commits or is dropped. Writes are staged and applied in one
//! step on commit, so an abandoned unit of work leaves no trace.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::Utc;
use coopbook_shared::types::{
    AccountId, BranchId, MemberProfileId, OrganizationId, PaymentTypeId, TransactionId, UserId,
    UserOrganizationId,
};
use dashmap::DashMap;
use rust_decimal::Decimal;
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::error::StoreError;
use super::ports::{PaymentStore, UnitOfWork};
use super::types::{MemberProfile, OfficialReceiptCounter, PaymentType};
use crate::batch::TransactionBatch;
use crate::ledger::{Account, GeneralLedgerEntry, MemberAccountingLedger, Transaction};

#[derive(Debug, Default)]
struct State {
    accounts: HashMap<AccountId, Account>,
    members: HashMap<MemberProfileId, MemberProfile>,
    payment_types: HashMap<PaymentTypeId, PaymentType>,
    batches: Vec<TransactionBatch>,
    transactions: HashMap<TransactionId, Transaction>,
    ledger: Vec<GeneralLedgerEntry>,
    member_ledgers: HashMap<(MemberProfileId, AccountId), MemberAccountingLedger>,
    receipts: HashMap<UserOrganizationId, OfficialReceiptCounter>,
}

#[derive(Debug, Default)]
struct Inner {
    state: Mutex<State>,
    account_locks: DashMap<AccountId, Arc<Mutex<()>>>,
    receipt_locks: DashMap<UserOrganizationId, Arc<Mutex<()>>>,
}

/// Payment store kept entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an account.
    pub async fn insert_account(&self, account: Account) {
        self.inner
            .state
            .lock()
            .await
            .accounts
            .insert(account.id, account);
    }

    /// Add or replace a member profile.
    pub async fn insert_member(&self, member: MemberProfile) {
        self.inner.state.lock().await.members.insert(member.id, member);
    }

    /// Add or replace a payment type.
    pub async fn insert_payment_type(&self, payment_type: PaymentType) {
        self.inner
            .state
            .lock()
            .await
            .payment_types
            .insert(payment_type.id, payment_type);
    }

    /// Add a batch. Later batches of the same teller win.
    pub async fn insert_batch(&self, batch: TransactionBatch) {
        self.inner.state.lock().await.batches.push(batch);
    }

    /// Add a committed transaction.
    pub async fn insert_transaction(&self, transaction: Transaction) {
        self.inner
            .state
            .lock()
            .await
            .transactions
            .insert(transaction.id, transaction);
    }

    /// Add a committed ledger row.
    pub async fn insert_ledger_entry(&self, entry: GeneralLedgerEntry) {
        self.inner.state.lock().await.ledger.push(entry);
    }

    /// Set a teller's official receipt range.
    pub async fn set_official_receipt(
        &self,
        user_organization_id: UserOrganizationId,
        counter: OfficialReceiptCounter,
    ) {
        self.inner
            .state
            .lock()
            .await
            .receipts
            .insert(user_organization_id, counter);
    }

    /// Committed ledger rows of an account, in insertion order.
    pub async fn ledger_entries(&self, account_id: AccountId) -> Vec<GeneralLedgerEntry> {
        self.inner
            .state
            .lock()
            .await
            .ledger
            .iter()
            .filter(|entry| entry.account_id == account_id)
            .cloned()
            .collect()
    }

    /// Committed transaction by ID.
    pub async fn transaction(&self, id: TransactionId) -> Option<Transaction> {
        self.inner.state.lock().await.transactions.get(&id).cloned()
    }

    /// Cached balance of a (member, account) pair.
    pub async fn member_ledger(
        &self,
        member_profile_id: MemberProfileId,
        account_id: AccountId,
    ) -> Option<MemberAccountingLedger> {
        self.inner
            .state
            .lock()
            .await
            .member_ledgers
            .get(&(member_profile_id, account_id))
            .cloned()
    }

    /// Committed official receipt counter.
    pub async fn official_receipt(
        &self,
        user_organization_id: UserOrganizationId,
    ) -> Option<OfficialReceiptCounter> {
        self.inner
            .state
            .lock()
            .await
            .receipts
            .get(&user_organization_id)
            .copied()
    }
}

impl PaymentStore for MemoryStore {
    type Tx = MemoryUnitOfWork;

    async fn begin(&self) -> Result<MemoryUnitOfWork, StoreError> {
        Ok(MemoryUnitOfWork {
            inner: Arc::clone(&self.inner),
            guards: Vec::new(),
            locked_accounts: HashSet::new(),
            locked_receipts: HashSet::new(),
            staged: Staged::default(),
        })
    }

    async fn find_member(&self, id: MemberProfileId) -> Result<Option<MemberProfile>, StoreError> {
        Ok(self.inner.state.lock().await.members.get(&id).cloned())
    }

    async fn find_payment_type(
        &self,
        id: PaymentTypeId,
    ) -> Result<Option<PaymentType>, StoreError> {
        Ok(self.inner.state.lock().await.payment_types.get(&id).cloned())
    }

    async fn current_batch(
        &self,
        employee_user_id: UserId,
        organization_id: OrganizationId,
        branch_id: BranchId,
    ) -> Result<Option<TransactionBatch>, StoreError> {
        Ok(self
            .inner
            .state
            .lock()
            .await
            .batches
            .iter()
            .rev()
            .find(|batch| {
                batch.employee_user_id == employee_user_id
                    && batch.organization_id == organization_id
                    && batch.branch_id == branch_id
            })
            .cloned())
    }
}

#[derive(Debug, Default)]
struct Staged {
    transactions: HashMap<TransactionId, Transaction>,
    // Applied to the committed amount at commit time, not copied from it.
    amount_deltas: HashMap<TransactionId, Decimal>,
    ledger: Vec<GeneralLedgerEntry>,
    member_ledgers: HashMap<(MemberProfileId, AccountId), MemberAccountingLedger>,
    receipts: HashMap<UserOrganizationId, OfficialReceiptCounter>,
}

/// Unit of work of [`MemoryStore`].
#[derive(Debug)]
pub struct MemoryUnitOfWork {
    inner: Arc<Inner>,
    guards: Vec<OwnedMutexGuard<()>>,
    locked_accounts: HashSet<AccountId>,
    locked_receipts: HashSet<UserOrganizationId>,
    staged: Staged,
}

impl MemoryUnitOfWork {
    async fn acquire(&mut self, lock: Arc<Mutex<()>>) {
        self.guards.push(lock.lock_owned().await);
    }
}

impl UnitOfWork for MemoryUnitOfWork {
    async fn lock_account(&mut self, id: AccountId) -> Result<Option<Account>, StoreError> {
        if !self.locked_accounts.contains(&id) {
            let lock = Arc::clone(self.inner.account_locks.entry(id).or_default().value());
            self.acquire(lock).await;
            self.locked_accounts.insert(id);
        }
        Ok(self.inner.state.lock().await.accounts.get(&id).cloned())
    }

    async fn lock_latest_ledger(
        &mut self,
        account_id: AccountId,
        member_profile_id: Option<MemberProfileId>,
        organization_id: OrganizationId,
        branch_id: BranchId,
    ) -> Result<Option<GeneralLedgerEntry>, StoreError> {
        let matches = |entry: &&GeneralLedgerEntry| {
            entry.account_id == account_id
                && entry.member_profile_id == member_profile_id
                && entry.organization_id == organization_id
                && entry.branch_id == branch_id
        };

        if let Some(staged) = self.staged.ledger.iter().rev().find(matches) {
            return Ok(Some(staged.clone()));
        }
        let state = self.inner.state.lock().await;
        Ok(state.ledger.iter().rev().find(matches).cloned())
    }

    async fn find_transaction(
        &mut self,
        id: TransactionId,
    ) -> Result<Option<Transaction>, StoreError> {
        if let Some(staged) = self.staged.transactions.get(&id) {
            return Ok(Some(staged.clone()));
        }
        let mut transaction = self.inner.state.lock().await.transactions.get(&id).cloned();
        if let (Some(transaction), Some(delta)) =
            (transaction.as_mut(), self.staged.amount_deltas.get(&id))
        {
            transaction.amount += *delta;
        }
        Ok(transaction)
    }

    async fn create_transaction(&mut self, transaction: &Transaction) -> Result<(), StoreError> {
        let exists = self.staged.transactions.contains_key(&transaction.id)
            || self
                .inner
                .state
                .lock()
                .await
                .transactions
                .contains_key(&transaction.id);
        if exists {
            return Err(StoreError::database(format!(
                "duplicate transaction {}",
                transaction.id
            )));
        }
        self.staged
            .transactions
            .insert(transaction.id, transaction.clone());
        Ok(())
    }

    async fn create_ledger_entry(&mut self, entry: &GeneralLedgerEntry) -> Result<(), StoreError> {
        self.staged.ledger.push(entry.clone());
        Ok(())
    }

    async fn update_transaction_amount(
        &mut self,
        id: TransactionId,
        delta: Decimal,
    ) -> Result<Decimal, StoreError> {
        if let Some(created) = self.staged.transactions.get_mut(&id) {
            created.amount += delta;
            created.updated_at = Utc::now();
            return Ok(created.amount);
        }

        let committed = self
            .inner
            .state
            .lock()
            .await
            .transactions
            .get(&id)
            .map(|transaction| transaction.amount)
            .ok_or_else(|| StoreError::database(format!("transaction {id} does not exist")))?;
        let pending = self.staged.amount_deltas.entry(id).or_default();
        *pending += delta;
        Ok(committed + *pending)
    }

    async fn upsert_member_accounting_ledger(
        &mut self,
        ledger: &MemberAccountingLedger,
    ) -> Result<(), StoreError> {
        self.staged
            .member_ledgers
            .insert((ledger.member_profile_id, ledger.account_id), ledger.clone());
        Ok(())
    }

    async fn lock_official_receipt(
        &mut self,
        user_organization_id: UserOrganizationId,
    ) -> Result<Option<OfficialReceiptCounter>, StoreError> {
        if !self.locked_receipts.contains(&user_organization_id) {
            let lock = Arc::clone(
                self.inner
                    .receipt_locks
                    .entry(user_organization_id)
                    .or_default()
                    .value(),
            );
            self.acquire(lock).await;
            self.locked_receipts.insert(user_organization_id);
        }
        if let Some(staged) = self.staged.receipts.get(&user_organization_id) {
            return Ok(Some(*staged));
        }
        Ok(self
            .inner
            .state
            .lock()
            .await
            .receipts
            .get(&user_organization_id)
            .copied())
    }

    async fn save_official_receipt(
        &mut self,
        user_organization_id: UserOrganizationId,
        counter: OfficialReceiptCounter,
    ) -> Result<(), StoreError> {
        self.staged.receipts.insert(user_organization_id, counter);
        Ok(())
    }

    async fn commit(self) -> Result<(), StoreError> {
        let Staged {
            transactions,
            amount_deltas,
            ledger,
            member_ledgers,
            receipts,
        } = self.staged;

        let mut state = self.inner.state.lock().await;
        if let Some(missing) = amount_deltas
            .keys()
            .find(|id| !state.transactions.contains_key(id))
        {
            return Err(StoreError::database(format!(
                "transaction {missing} does not exist"
            )));
        }

        let now = Utc::now();
        state.transactions.extend(transactions);
        for (id, delta) in amount_deltas {
            if let Some(transaction) = state.transactions.get_mut(&id) {
                transaction.amount += delta;
                transaction.updated_at = now;
            }
        }
        state.ledger.extend(ledger);
        state.member_ledgers.extend(member_ledgers);
        state.receipts.extend(receipts);
        drop(state);

        // Row locks are released only after the writes are visible.
        drop(self.guards);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::running::tests::row;
    use crate::ledger::{AccountType, GracePeriods};
    use rust_decimal_macros::dec;
    use std::time::Duration;

    fn account() -> Account {
        Account {
            id: AccountId::new(),
            organization_id: OrganizationId::new(),
            branch_id: BranchId::new(),
            name: "Regular Savings".into(),
            account_type: AccountType::Deposit,
            general_ledger_type: None,
            currency_id: None,
            min_amount: Decimal::ZERO,
            max_amount: Decimal::ZERO,
            grace: GracePeriods::default(),
        }
    }

    #[tokio::test]
    async fn test_dropped_unit_of_work_rolls_back() {
        let store = MemoryStore::new();
        let account = account();
        store.insert_account(account.clone()).await;

        {
            let mut uow = store.begin().await.unwrap();
            uow.lock_account(account.id).await.unwrap();
            let mut entry = row(account.id, dec!(0), dec!(100), Utc::now());
            entry.organization_id = account.organization_id;
            entry.branch_id = account.branch_id;
            uow.create_ledger_entry(&entry).await.unwrap();

            let staged = uow
                .lock_latest_ledger(account.id, None, account.organization_id, account.branch_id)
                .await
                .unwrap();
            assert_eq!(staged.map(|e| e.credit), Some(dec!(100)));
        }

        assert!(store.ledger_entries(account.id).await.is_empty());

        // The lock was released by the drop.
        let mut uow = store.begin().await.unwrap();
        let locked = tokio::time::timeout(Duration::from_secs(1), uow.lock_account(account.id))
            .await
            .unwrap()
            .unwrap();
        assert!(locked.is_some());
    }

    #[tokio::test]
    async fn test_account_lock_is_exclusive_until_commit() {
        let store = MemoryStore::new();
        let account = account();
        store.insert_account(account.clone()).await;

        let mut first = store.begin().await.unwrap();
        first.lock_account(account.id).await.unwrap();

        let mut second = store.begin().await.unwrap();
        let blocked =
            tokio::time::timeout(Duration::from_millis(50), second.lock_account(account.id)).await;
        assert!(blocked.is_err());

        first.commit().await.unwrap();

        let acquired =
            tokio::time::timeout(Duration::from_secs(1), second.lock_account(account.id)).await;
        assert!(acquired.is_ok());
    }

    #[tokio::test]
    async fn test_transaction_amount_accumulates_in_unit_of_work() {
        let store = MemoryStore::new();
        let batch_id = coopbook_shared::types::TransactionBatchId::new();
        let transaction = Transaction {
            id: TransactionId::new(),
            organization_id: OrganizationId::new(),
            branch_id: BranchId::new(),
            transaction_batch_id: batch_id,
            member_profile_id: None,
            member_joint_account_id: None,
            employee_user_id: UserId::new(),
            reference_number: None,
            description: None,
            source: crate::ledger::LedgerSource::Deposit,
            amount: Decimal::ZERO,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let mut uow = store.begin().await.unwrap();
        uow.create_transaction(&transaction).await.unwrap();
        assert!(uow.create_transaction(&transaction).await.is_err());
        assert_eq!(
            uow.update_transaction_amount(transaction.id, dec!(50)).await.unwrap(),
            dec!(50)
        );
        assert_eq!(
            uow.update_transaction_amount(transaction.id, dec!(-20)).await.unwrap(),
            dec!(30)
        );
        assert!(store.transaction(transaction.id).await.is_none());

        uow.commit().await.unwrap();
        assert_eq!(
            store.transaction(transaction.id).await.map(|t| t.amount),
            Some(dec!(30))
        );
    }

    #[tokio::test]
    async fn test_interleaved_amount_updates_are_not_lost() {
        let store = MemoryStore::new();
        let transaction = Transaction {
            id: TransactionId::new(),
            organization_id: OrganizationId::new(),
            branch_id: BranchId::new(),
            transaction_batch_id: coopbook_shared::types::TransactionBatchId::new(),
            member_profile_id: None,
            member_joint_account_id: None,
            employee_user_id: UserId::new(),
            reference_number: None,
            description: None,
            source: crate::ledger::LedgerSource::Deposit,
            amount: dec!(25),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        store.insert_transaction(transaction.clone()).await;

        let mut first = store.begin().await.unwrap();
        let mut second = store.begin().await.unwrap();
        assert_eq!(
            first.update_transaction_amount(transaction.id, dec!(100)).await.unwrap(),
            dec!(125)
        );
        assert_eq!(
            second.update_transaction_amount(transaction.id, dec!(100)).await.unwrap(),
            dec!(125)
        );
        assert_eq!(
            first.find_transaction(transaction.id).await.unwrap().map(|t| t.amount),
            Some(dec!(125))
        );

        first.commit().await.unwrap();
        second.commit().await.unwrap();

        assert_eq!(
            store.transaction(transaction.id).await.map(|t| t.amount),
            Some(dec!(225))
        );
    }
}
