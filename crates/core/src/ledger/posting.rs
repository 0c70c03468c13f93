//! Per-account-type posting rules.
//!
//! Turns a requested amount and direction into the debit, credit and new
//! running balance of a single general-ledger row.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{
    account::{Account, AccountType},
    error::LedgerError,
};

/// Direction of a posting as requested by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LedgerSource {
    /// Payment against an account (deposit-direction).
    Payment,
    /// Deposit into an account.
    Deposit,
    /// Withdrawal or disbursement.
    Withdraw,
}

impl LedgerSource {
    /// Returns true for Payment and Deposit.
    #[must_use]
    pub const fn is_deposit_direction(self) -> bool {
        matches!(self, Self::Payment | Self::Deposit)
    }

    /// Direction used when the requested amount was negative.
    ///
    /// Payment shares Deposit's direction, so a negative Payment posts as a
    /// Withdraw.
    #[must_use]
    pub const fn inverted(self) -> Self {
        match self {
            Self::Payment | Self::Deposit => Self::Withdraw,
            Self::Withdraw => Self::Deposit,
        }
    }

    /// Stored label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Payment => "payment",
            Self::Deposit => "deposit",
            Self::Withdraw => "withdraw",
        }
    }
}

impl std::fmt::Display for LedgerSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for LedgerSource {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "payment" => Ok(Self::Payment),
            "deposit" => Ok(Self::Deposit),
            "withdraw" => Ok(Self::Withdraw),
            other => Err(LedgerError::UnknownSource(other.to_string())),
        }
    }
}

/// Computed ledger row for one posting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    /// Direction actually applied after sign normalization.
    pub source: LedgerSource,
    /// Positive posted amount.
    pub amount: Decimal,
    /// Debit side of the row.
    pub debit: Decimal,
    /// Credit side of the row.
    pub credit: Decimal,
    /// Balance before the posting (missing ledger row = 0).
    pub previous_balance: Decimal,
    /// Balance after the posting.
    pub new_balance: Decimal,
    /// Whether a negative request amount was flipped.
    pub was_negative_normalized: bool,
}

impl Posting {
    /// Signed change applied to the owning transaction's cumulative amount.
    #[must_use]
    pub fn transaction_delta(&self) -> Decimal {
        if self.source.is_deposit_direction() {
            self.amount
        } else {
            -self.amount
        }
    }
}

/// Flips a negative amount to positive and inverts the direction.
///
/// Returns `(amount, source, was_normalized)`.
#[must_use]
pub fn normalize_sign(amount: Decimal, source: LedgerSource) -> (Decimal, LedgerSource, bool) {
    if amount.is_sign_negative() && !amount.is_zero() {
        (-amount, source.inverted(), true)
    } else {
        (amount, source, false)
    }
}

/// Computes the ledger row a posting would produce against `account`.
///
/// # Arguments
///
/// * `account` - The locked target account
/// * `current_balance` - Running balance of the latest ledger row, if any
/// * `amount` - Requested amount; negative amounts invert `source`
/// * `source` - Requested direction
///
/// # Errors
///
/// * `ZeroAmount` for a zero amount
/// * `InsufficientBalance` when a non-loan withdrawal exceeds the balance
/// * `Overpayment` when a loan payment exceeds the outstanding balance
/// * `LimitExceeded` when the new balance leaves `[min_amount, max_amount]`
pub fn compute_posting(
    account: &Account,
    current_balance: Option<Decimal>,
    amount: Decimal,
    source: LedgerSource,
) -> Result<Posting, LedgerError> {
    if amount.is_zero() {
        return Err(LedgerError::ZeroAmount);
    }

    let (amount, source, was_negative_normalized) = normalize_sign(amount, source);
    let current = current_balance.unwrap_or(Decimal::ZERO);
    let deposit = source.is_deposit_direction();

    let (debit, credit, new_balance) = match account.account_type {
        AccountType::Loan => {
            if deposit {
                let new_balance = current - amount;
                if new_balance.is_sign_negative() && !new_balance.is_zero() {
                    return Err(LedgerError::Overpayment {
                        balance: current,
                        payment: amount,
                    });
                }
                (amount, Decimal::ZERO, new_balance)
            } else {
                (Decimal::ZERO, amount, current + amount)
            }
        }
        AccountType::Deposit
        | AccountType::TimeDeposit
        | AccountType::SvfLedger
        | AccountType::ArLedger
        | AccountType::ArAging
        | AccountType::Fines
        | AccountType::Interest
        | AccountType::ApLedger
        | AccountType::WriteOff
        | AccountType::Other => {
            if deposit {
                (Decimal::ZERO, amount, current + amount)
            } else {
                if current < amount {
                    return Err(LedgerError::InsufficientBalance {
                        available: current,
                        required: amount,
                    });
                }
                (amount, Decimal::ZERO, current - amount)
            }
        }
    };

    account.check_bounds(new_balance)?;

    Ok(Posting {
        source,
        amount,
        debit,
        credit,
        previous_balance: current,
        new_balance,
        was_negative_normalized,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{account::GracePeriods, balance::GeneralLedgerType};
    use coopbook_shared::types::{AccountId, BranchId, OrganizationId};
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn account(account_type: AccountType) -> Account {
        Account {
            id: AccountId::new(),
            organization_id: OrganizationId::new(),
            branch_id: BranchId::new(),
            name: account_type.label().to_string(),
            account_type,
            general_ledger_type: Some(GeneralLedgerType::Liabilities),
            currency_id: None,
            min_amount: Decimal::ZERO,
            max_amount: Decimal::ZERO,
            grace: GracePeriods::default(),
        }
    }

    #[test]
    fn test_deposit_credits_and_increases() {
        let posting = compute_posting(
            &account(AccountType::Deposit),
            Some(dec!(100)),
            dec!(25.50),
            LedgerSource::Deposit,
        )
        .unwrap();
        assert_eq!(posting.credit, dec!(25.50));
        assert_eq!(posting.debit, dec!(0));
        assert_eq!(posting.new_balance, dec!(125.50));
        assert_eq!(posting.transaction_delta(), dec!(25.50));
        assert!(!posting.was_negative_normalized);
    }

    #[test]
    fn test_withdraw_debits_and_decreases() {
        let posting = compute_posting(
            &account(AccountType::Deposit),
            Some(dec!(100)),
            dec!(100),
            LedgerSource::Withdraw,
        )
        .unwrap();
        assert_eq!(posting.debit, dec!(100));
        assert_eq!(posting.new_balance, dec!(0));
        assert_eq!(posting.transaction_delta(), dec!(-100));
    }

    #[rstest]
    #[case(AccountType::Deposit)]
    #[case(AccountType::TimeDeposit)]
    #[case(AccountType::SvfLedger)]
    #[case(AccountType::ArLedger)]
    #[case(AccountType::Fines)]
    #[case(AccountType::WriteOff)]
    #[case(AccountType::Other)]
    fn test_overdraft_is_rejected(#[case] account_type: AccountType) {
        let err = compute_posting(
            &account(account_type),
            Some(dec!(40)),
            dec!(40.01),
            LedgerSource::Withdraw,
        )
        .unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientBalance { .. }));
    }

    #[test]
    fn test_missing_ledger_row_is_zero_balance() {
        let err = compute_posting(
            &account(AccountType::Deposit),
            None,
            dec!(1),
            LedgerSource::Withdraw,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::InsufficientBalance { available, .. } if available == dec!(0)
        ));
    }

    #[test]
    fn test_loan_payment_reduces_balance() {
        let posting = compute_posting(
            &account(AccountType::Loan),
            Some(dec!(1000)),
            dec!(1000),
            LedgerSource::Payment,
        )
        .unwrap();
        assert_eq!(posting.debit, dec!(1000));
        assert_eq!(posting.new_balance, dec!(0));
    }

    #[test]
    fn test_loan_overpayment_is_rejected() {
        let err = compute_posting(
            &account(AccountType::Loan),
            Some(dec!(1000)),
            dec!(1000.01),
            LedgerSource::Payment,
        )
        .unwrap_err();
        assert!(matches!(err, LedgerError::Overpayment { .. }));
    }

    #[test]
    fn test_loan_disbursement_credits() {
        let posting = compute_posting(
            &account(AccountType::Loan),
            None,
            dec!(5000),
            LedgerSource::Withdraw,
        )
        .unwrap();
        assert_eq!(posting.credit, dec!(5000));
        assert_eq!(posting.new_balance, dec!(5000));
    }

    #[test]
    fn test_negative_amount_flips_direction() {
        let flipped = compute_posting(
            &account(AccountType::Deposit),
            Some(dec!(200)),
            dec!(-50),
            LedgerSource::Deposit,
        )
        .unwrap();
        let direct = compute_posting(
            &account(AccountType::Deposit),
            Some(dec!(200)),
            dec!(50),
            LedgerSource::Withdraw,
        )
        .unwrap();

        assert!(flipped.was_negative_normalized);
        assert_eq!(flipped.source, LedgerSource::Withdraw);
        assert_eq!(flipped.debit, direct.debit);
        assert_eq!(flipped.credit, direct.credit);
        assert_eq!(flipped.new_balance, direct.new_balance);
    }

    #[test]
    fn test_negative_withdraw_becomes_deposit() {
        let (amount, source, flipped) = normalize_sign(dec!(-10), LedgerSource::Withdraw);
        assert_eq!(amount, dec!(10));
        assert_eq!(source, LedgerSource::Deposit);
        assert!(flipped);
    }

    #[test]
    fn test_negative_payment_becomes_withdraw() {
        let (amount, source, flipped) = normalize_sign(dec!(-10), LedgerSource::Payment);
        assert_eq!(amount, dec!(10));
        assert_eq!(source, LedgerSource::Withdraw);
        assert!(flipped);

        let posting = compute_posting(
            &account(AccountType::Deposit),
            Some(dec!(200)),
            dec!(-50),
            LedgerSource::Payment,
        )
        .unwrap();
        assert_eq!(posting.source, LedgerSource::Withdraw);
        assert_eq!(posting.new_balance, dec!(150));
    }

    #[test]
    fn test_source_labels_parse() {
        for source in [LedgerSource::Payment, LedgerSource::Deposit, LedgerSource::Withdraw] {
            assert_eq!(source.label().parse::<LedgerSource>().unwrap(), source);
        }
        assert!(matches!(
            "transfer".parse::<LedgerSource>(),
            Err(LedgerError::UnknownSource(_))
        ));
    }

    #[test]
    fn test_zero_amount_is_rejected() {
        let err = compute_posting(
            &account(AccountType::Deposit),
            None,
            dec!(0),
            LedgerSource::Deposit,
        )
        .unwrap_err();
        assert!(matches!(err, LedgerError::ZeroAmount));
    }

    #[test]
    fn test_limits_apply_after_posting() {
        let mut capped = account(AccountType::Deposit);
        capped.max_amount = dec!(1000);
        let err = compute_posting(&capped, Some(dec!(900)), dec!(200), LedgerSource::Deposit)
            .unwrap_err();
        assert!(matches!(err, LedgerError::LimitExceeded { .. }));

        let mut floored = account(AccountType::Deposit);
        floored.min_amount = dec!(100);
        let err = compute_posting(&floored, Some(dec!(150)), dec!(60), LedgerSource::Withdraw)
            .unwrap_err();
        assert!(matches!(err, LedgerError::LimitExceeded { .. }));
    }
}
