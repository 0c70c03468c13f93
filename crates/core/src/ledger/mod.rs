//! Double-entry bookkeeping logic.
//!
//! This module implements the core ledger functionality:
//! - Account types and their posting rules
//! - The balance direction rule shared by every aggregation
//! - Balance aggregation over persisted and draft entries
//! - Running balances and per-account totals
//! - Error types for ledger operations

pub mod account;
pub mod aggregate;
pub mod balance;
pub mod entry;
pub mod error;
pub mod posting;
pub mod running;

#[cfg(test)]
mod posting_props;

pub use account::{Account, AccountType, GracePeriods};
pub use aggregate::{
    BalanceEntries, BalanceQuery, BalanceResponse, LedgerAccountRef, LedgerLine,
    VoucherEntryRequest, calculate_balance, calculate_strict_balance, validate_voucher_balance,
};
pub use balance::{GeneralLedgerType, apply_balance_direction};
pub use entry::{GeneralLedgerEntry, MemberAccountingLedger, Transaction};
pub use error::{EntryKind, LedgerError};
pub use posting::{LedgerSource, Posting, compute_posting, normalize_sign};
pub use running::{AccountTotals, attach_running_balances, sum_by_account};
