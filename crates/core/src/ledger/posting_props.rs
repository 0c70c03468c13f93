//! Property-based tests for the posting rules and aggregation.
//!
//! - Balance invariant: signed deltas sum to the final running balance
//! - Running balances are idempotent
//! - Strict balance law
//! - Negative amounts post like the inverted direction
//! - Overdraft and overpayment guards

use chrono::{Duration, TimeZone, Utc};
use coopbook_shared::types::{AccountId, BranchId, OrganizationId};
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::account::{Account, AccountType, GracePeriods};
use super::aggregate::{VoucherEntryRequest, validate_voucher_balance};
use super::balance::{GeneralLedgerType, apply_balance_direction};
use super::error::LedgerError;
use super::posting::{LedgerSource, compute_posting};
use super::running::{attach_running_balances, tests::row};

/// Strategy to generate positive decimal amounts (0.01 to 10,000.00).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate non-negative balances.
fn balance_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn source_strategy() -> impl Strategy<Value = LedgerSource> {
    prop_oneof![
        Just(LedgerSource::Payment),
        Just(LedgerSource::Deposit),
        Just(LedgerSource::Withdraw),
    ]
}

fn account_type_strategy() -> impl Strategy<Value = AccountType> {
    proptest::sample::select(AccountType::ALL.to_vec())
}

fn gl_type_strategy() -> impl Strategy<Value = Option<GeneralLedgerType>> {
    prop_oneof![
        Just(None),
        Just(Some(GeneralLedgerType::Assets)),
        Just(Some(GeneralLedgerType::Liabilities)),
        Just(Some(GeneralLedgerType::Revenue)),
    ]
}

fn make_account(account_type: AccountType) -> Account {
    Account {
        id: AccountId::new(),
        organization_id: OrganizationId::new(),
        branch_id: BranchId::new(),
        name: "Prop".to_string(),
        account_type,
        general_ledger_type: None,
        currency_id: None,
        min_amount: Decimal::ZERO,
        max_amount: Decimal::ZERO,
        grace: GracePeriods::default(),
    }
}

fn voucher_line(debit: Decimal, credit: Decimal) -> VoucherEntryRequest {
    VoucherEntryRequest {
        account_id: Some(AccountId::new()),
        currency_id: None,
        debit,
        credit,
        entry_date: None,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Every successful posting moves the balance by `credit - debit`, for
    /// every account type.
    #[test]
    fn prop_posting_delta_matches_row(
        account_type in account_type_strategy(),
        current in balance_strategy(),
        amount in positive_amount(),
        source in source_strategy(),
    ) {
        let account = make_account(account_type);
        if let Ok(posting) = compute_posting(&account, Some(current), amount, source) {
            prop_assert_eq!(
                posting.new_balance - posting.previous_balance,
                posting.credit - posting.debit
            );
            prop_assert!(posting.debit.is_zero() || posting.credit.is_zero());
            prop_assert_eq!(posting.debit + posting.credit, amount);
        }
    }

    /// The sum of signed deltas equals the final running balance.
    #[test]
    fn prop_balance_invariant(
        sides in prop::collection::vec((balance_strategy(), balance_strategy()), 1..30),
        gl_type in gl_type_strategy(),
    ) {
        let account = AccountId::new();
        let start = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let entries: Vec<_> = sides
            .iter()
            .enumerate()
            .map(|(i, (debit, credit))| {
                row(account, *debit, *credit, start + Duration::hours(i64::try_from(i).unwrap_or(0)))
            })
            .collect();

        let expected: Decimal = sides
            .iter()
            .map(|(debit, credit)| apply_balance_direction(gl_type, *debit, *credit))
            .sum();
        let stamped = attach_running_balances(entries, |_| gl_type);

        prop_assert_eq!(stamped.last().map(|e| e.balance), Some(expected));
    }

    /// Re-stamping an already stamped, already sorted list changes nothing.
    #[test]
    fn prop_running_balances_idempotent(
        rows in prop::collection::vec((balance_strategy(), balance_strategy(), 0i64..5), 1..30),
    ) {
        let accounts = [AccountId::new(), AccountId::new()];
        let start = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let entries: Vec<_> = rows
            .iter()
            .enumerate()
            .map(|(i, (debit, credit, day))| {
                row(accounts[i % 2], *debit, *credit, start + Duration::days(*day))
            })
            .collect();

        let once = attach_running_balances(entries, |_| Some(GeneralLedgerType::Liabilities));
        let twice = attach_running_balances(once.clone(), |_| Some(GeneralLedgerType::Liabilities));

        prop_assert_eq!(once, twice);
    }

    /// Strict balance succeeds iff debits equal credits and are positive.
    #[test]
    fn prop_strict_balance_law(
        lines in prop::collection::vec((balance_strategy(), balance_strategy()), 0..10),
    ) {
        let requests: Vec<_> = lines.iter().map(|(d, c)| voucher_line(*d, *c)).collect();
        let debit: Decimal = lines.iter().map(|(d, _)| *d).sum();
        let credit: Decimal = lines.iter().map(|(_, c)| *c).sum();

        let result = validate_voucher_balance(&requests);
        prop_assert_eq!(result.is_ok(), debit == credit && debit > Decimal::ZERO);
    }

    /// A mirrored voucher always balances to zero.
    #[test]
    fn prop_mirrored_voucher_balances(amounts in prop::collection::vec(positive_amount(), 1..10)) {
        let mut requests: Vec<_> = amounts.iter().map(|a| voucher_line(*a, Decimal::ZERO)).collect();
        let total: Decimal = amounts.iter().copied().sum();
        requests.push(voucher_line(Decimal::ZERO, total));

        let response = validate_voucher_balance(&requests).unwrap();
        prop_assert_eq!(response.balance, Decimal::ZERO);
    }

    /// Posting `-x` in one direction equals posting `x` in the other.
    #[test]
    fn prop_negative_amount_equivalent_to_inverted_source(
        account_type in account_type_strategy(),
        current in balance_strategy(),
        amount in positive_amount(),
        source in source_strategy(),
    ) {
        let account = make_account(account_type);
        let flipped = compute_posting(&account, Some(current), -amount, source);
        let direct = compute_posting(&account, Some(current), amount, source.inverted());

        match (flipped, direct) {
            (Ok(f), Ok(d)) => {
                prop_assert!(f.was_negative_normalized);
                prop_assert_eq!(f.source, d.source);
                prop_assert_eq!(f.debit, d.debit);
                prop_assert_eq!(f.credit, d.credit);
                prop_assert_eq!(f.new_balance, d.new_balance);
            }
            (Err(f), Err(d)) => prop_assert_eq!(f.error_code(), d.error_code()),
            _ => prop_assert!(false, "normalized and direct postings disagree"),
        }
    }

    /// Withdrawing more than the balance always fails on non-loan accounts.
    #[test]
    fn prop_overdraft_guard(
        account_type in account_type_strategy(),
        current in balance_strategy(),
        excess in positive_amount(),
    ) {
        prop_assume!(!account_type.is_loan());
        let account = make_account(account_type);
        let result = compute_posting(&account, Some(current), current + excess, LedgerSource::Withdraw);
        let is_insufficient = matches!(result, Err(LedgerError::InsufficientBalance { .. }));
        prop_assert!(is_insufficient);
    }

    /// Paying more than the loan balance fails; paying exactly clears it.
    #[test]
    fn prop_overpayment_guard(current in positive_amount(), excess in positive_amount()) {
        let loan = make_account(AccountType::Loan);

        let over = compute_posting(&loan, Some(current), current + excess, LedgerSource::Payment);
        let is_overpayment = matches!(over, Err(LedgerError::Overpayment { .. }));
        prop_assert!(is_overpayment);

        let exact = compute_posting(&loan, Some(current), current, LedgerSource::Payment).unwrap();
        prop_assert_eq!(exact.new_balance, Decimal::ZERO);
    }
}
