//! Running balances and per-account totals over stored ledger rows.

use std::collections::HashMap;

use coopbook_shared::types::AccountId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{
    balance::{GeneralLedgerType, apply_balance_direction},
    entry::GeneralLedgerEntry,
};

/// Debit and credit totals of one account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountTotals {
    /// Account id.
    pub account_id: AccountId,
    /// Sum of debits.
    pub total_debit: Decimal,
    /// Sum of credits.
    pub total_credit: Decimal,
}

/// Sorts rows by entry date and stamps each with its account's running
/// balance.
///
/// The sort is stable, so rows sharing an entry date keep their relative
/// order. `gl_type_of` resolves each account's classification; `None` counts
/// as `Assets`. Running this twice yields the same balances.
#[must_use]
pub fn attach_running_balances<F>(
    mut entries: Vec<GeneralLedgerEntry>,
    gl_type_of: F,
) -> Vec<GeneralLedgerEntry>
where
    F: Fn(AccountId) -> Option<GeneralLedgerType>,
{
    entries.sort_by_key(|entry| entry.entry_date);

    let mut totals: HashMap<AccountId, Decimal> = HashMap::new();
    for entry in &mut entries {
        let delta = apply_balance_direction(gl_type_of(entry.account_id), entry.debit, entry.credit);
        let running = totals.entry(entry.account_id).or_default();
        *running += delta;
        entry.balance = *running;
    }
    entries
}

/// Groups rows by account, in order of first appearance.
///
/// Rows with neither a debit nor a credit are skipped.
#[must_use]
pub fn sum_by_account(entries: &[GeneralLedgerEntry]) -> Vec<AccountTotals> {
    let mut positions: HashMap<AccountId, usize> = HashMap::new();
    let mut totals: Vec<AccountTotals> = Vec::new();

    for entry in entries {
        if entry.debit.is_zero() && entry.credit.is_zero() {
            continue;
        }
        let position = *positions.entry(entry.account_id).or_insert_with(|| {
            totals.push(AccountTotals {
                account_id: entry.account_id,
                total_debit: Decimal::ZERO,
                total_credit: Decimal::ZERO,
            });
            totals.len() - 1
        });
        totals[position].total_debit += entry.debit;
        totals[position].total_credit += entry.credit;
    }
    totals
}
