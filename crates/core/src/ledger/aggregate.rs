//! Balance aggregation over heterogeneous entry collections.

use chrono::{DateTime, Utc};
use coopbook_shared::types::{AccountId, CurrencyId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{
    account::Account,
    balance::{GeneralLedgerType, apply_balance_direction},
    entry::GeneralLedgerEntry,
    error::{EntryKind, LedgerError},
};

/// Account facts an aggregated line needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerAccountRef {
    /// Account id.
    pub id: AccountId,
    /// Currency of the account.
    pub currency_id: Option<CurrencyId>,
    /// Chart-of-accounts classification.
    pub general_ledger_type: Option<GeneralLedgerType>,
}

impl From<&Account> for LedgerAccountRef {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            currency_id: account.currency_id,
            general_ledger_type: account.general_ledger_type,
        }
    }
}

/// A persisted general-ledger, adjustment or loan-transaction line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerLine {
    /// Resolved account. Absent when the reference could not be loaded.
    pub account: Option<LedgerAccountRef>,
    /// Debit amount.
    pub debit: Decimal,
    /// Credit amount.
    pub credit: Decimal,
    /// Business date.
    pub entry_date: Option<DateTime<Utc>>,
    /// Line belongs to an add-on loan charge.
    #[serde(default)]
    pub is_add_on: bool,
}

impl LedgerLine {
    /// Builds a line from a stored ledger row and its account.
    #[must_use]
    pub fn from_entry(entry: &GeneralLedgerEntry, account: &Account) -> Self {
        Self {
            account: Some(account.into()),
            debit: entry.debit,
            credit: entry.credit,
            entry_date: Some(entry.entry_date),
            is_add_on: false,
        }
    }
}

/// A draft voucher line that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoucherEntryRequest {
    /// Target account.
    pub account_id: Option<AccountId>,
    /// Currency of the target account.
    pub currency_id: Option<CurrencyId>,
    /// Debit amount.
    pub debit: Decimal,
    /// Credit amount.
    pub credit: Decimal,
    /// Business date.
    pub entry_date: Option<DateTime<Utc>>,
}

/// Filters and flags for `calculate_balance`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceQuery {
    /// Only count lines of this account.
    pub account_id: Option<AccountId>,
    /// Only count lines whose account uses this currency.
    pub currency_id: Option<CurrencyId>,
    /// Accumulate add-on loan lines into `add_on_amount`.
    pub is_add_on: bool,
}

impl BalanceQuery {
    fn skips(&self, account_id: Option<AccountId>, currency_id: Option<CurrencyId>) -> bool {
        if let Some(wanted) = self.account_id
            && account_id != Some(wanted)
        {
            return true;
        }
        if let Some(wanted) = self.currency_id
            && currency_id != Some(wanted)
        {
            return true;
        }
        false
    }
}

/// Entry collections folded by `calculate_balance`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BalanceEntries<'a> {
    /// Persisted general-ledger lines.
    pub general_ledger: &'a [LedgerLine],
    /// Adjustment entries.
    pub adjustments: &'a [LedgerLine],
    /// Loan-transaction entries.
    pub loan_transactions: &'a [LedgerLine],
    /// Draft cash/check voucher lines.
    pub cash_voucher_requests: &'a [VoucherEntryRequest],
    /// Draft journal voucher lines.
    pub journal_voucher_requests: &'a [VoucherEntryRequest],
}

/// Aggregate of a set of entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceResponse {
    /// Total credit.
    pub credit: Decimal,
    /// Total debit.
    pub debit: Decimal,
    /// Signed net balance.
    pub balance: Decimal,
    /// Debit plus credit of add-on loan lines.
    pub add_on_amount: Decimal,
    /// Lines with a non-zero debit.
    pub count_debit: usize,
    /// Lines with a non-zero credit.
    pub count_credit: usize,
    /// Lines that passed the filters.
    pub entry_count: usize,
    /// Latest entry date among debit lines.
    pub last_debit: Option<DateTime<Utc>>,
    /// Latest entry date among credit lines.
    pub last_credit: Option<DateTime<Utc>>,
    /// Latest entry date among all lines.
    pub last_payment: Option<DateTime<Utc>>,
    /// `credit == debit` exactly.
    pub is_balanced: bool,
}

impl BalanceResponse {
    fn add(&mut self, debit: Decimal, credit: Decimal, delta: Decimal, date: Option<DateTime<Utc>>) {
        self.debit += debit;
        self.credit += credit;
        self.balance += delta;
        self.entry_count += 1;

        if !debit.is_zero() {
            self.count_debit += 1;
            self.last_debit = latest(self.last_debit, date);
        }
        if !credit.is_zero() {
            self.count_credit += 1;
            self.last_credit = latest(self.last_credit, date);
        }
        self.last_payment = latest(self.last_payment, date);
    }
}

fn latest(current: Option<DateTime<Utc>>, candidate: Option<DateTime<Utc>>) -> Option<DateTime<Utc>> {
    match (current, candidate) {
        (Some(a), Some(b)) => Some(a.max(b)),
        (a, b) => a.or(b),
    }
}

/// Folds every entry collection into one `BalanceResponse`.
///
/// Persisted lines move the balance by their account's classification;
/// draft voucher lines always count as `debit - credit`.
///
/// # Errors
///
/// Returns `LedgerError::MissingAccount` if any line lacks its account.
pub fn calculate_balance(
    entries: BalanceEntries<'_>,
    query: &BalanceQuery,
) -> Result<BalanceResponse, LedgerError> {
    let mut response = BalanceResponse::default();

    let persisted = [
        (EntryKind::GeneralLedger, entries.general_ledger),
        (EntryKind::Adjustment, entries.adjustments),
        (EntryKind::LoanTransaction, entries.loan_transactions),
    ];
    for (kind, lines) in persisted {
        for (index, line) in lines.iter().enumerate() {
            let account = line.account.ok_or(LedgerError::MissingAccount { kind, index })?;
            if query.skips(Some(account.id), account.currency_id) {
                continue;
            }
            let delta = apply_balance_direction(account.general_ledger_type, line.debit, line.credit);
            response.add(line.debit, line.credit, delta, line.entry_date);
            if line.is_add_on && query.is_add_on {
                response.add_on_amount += line.debit + line.credit;
            }
        }
    }

    let drafts = [
        (EntryKind::CashVoucherRequest, entries.cash_voucher_requests),
        (EntryKind::JournalVoucherRequest, entries.journal_voucher_requests),
    ];
    for (kind, requests) in drafts {
        for (index, request) in requests.iter().enumerate() {
            let account_id = request
                .account_id
                .ok_or(LedgerError::MissingAccount { kind, index })?;
            if query.skips(Some(account_id), request.currency_id) {
                continue;
            }
            response.add(
                request.debit,
                request.credit,
                request.debit - request.credit,
                request.entry_date,
            );
        }
    }

    response.is_balanced = response.credit == response.debit;
    Ok(response)
}

/// Like `calculate_balance` but requires a self-balancing, non-empty set.
///
/// # Errors
///
/// * `MissingAccount` if any line lacks its account
/// * `Unbalanced` if total debit differs from total credit
/// * `EmptyEntries` if total debit is not positive
pub fn calculate_strict_balance(
    entries: BalanceEntries<'_>,
    query: &BalanceQuery,
) -> Result<BalanceResponse, LedgerError> {
    let response = calculate_balance(entries, query)?;
    if response.debit != response.credit {
        return Err(LedgerError::Unbalanced {
            debit: response.debit,
            credit: response.credit,
        });
    }
    if response.debit <= Decimal::ZERO {
        return Err(LedgerError::EmptyEntries);
    }
    Ok(response)
}

/// Checks that a draft voucher balances before it is released.
///
/// # Errors
///
/// See `calculate_strict_balance`.
pub fn validate_voucher_balance(
    entries: &[VoucherEntryRequest],
) -> Result<BalanceResponse, LedgerError> {
    calculate_strict_balance(
        BalanceEntries {
            journal_voucher_requests: entries,
            ..BalanceEntries::default()
        },
        &BalanceQuery::default(),
    )
}
