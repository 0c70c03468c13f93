//! Member and house accounts as seen by the posting rules.

use std::{fmt, str::FromStr};

use coopbook_shared::types::{AccountId, BranchId, CurrencyId, OrganizationId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{balance::GeneralLedgerType, error::LedgerError};
use crate::loan::LoanModeOfPayment;

/// Product type of an account. Drives which side of a posting increases the
/// balance and which guard applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccountType {
    /// Savings deposit.
    Deposit,
    /// Time deposit.
    TimeDeposit,
    /// Loan receivable.
    Loan,
    /// Accounts receivable ledger.
    ArLedger,
    /// Accounts receivable aging.
    ArAging,
    /// Fines.
    Fines,
    /// Interest.
    Interest,
    /// Special voluntary fund ledger.
    SvfLedger,
    /// Write-off.
    WriteOff,
    /// Accounts payable ledger.
    ApLedger,
    /// Anything else.
    Other,
}

impl AccountType {
    /// All variants, in stored order.
    pub const ALL: [Self; 11] = [
        Self::Deposit,
        Self::TimeDeposit,
        Self::Loan,
        Self::ArLedger,
        Self::ArAging,
        Self::Fines,
        Self::Interest,
        Self::SvfLedger,
        Self::WriteOff,
        Self::ApLedger,
        Self::Other,
    ];

    /// Label stored in the `accounts.type` column.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Deposit => "Deposit",
            Self::TimeDeposit => "Time Deposit",
            Self::Loan => "Loan",
            Self::ArLedger => "A/R-Ledger",
            Self::ArAging => "A/R-Aging",
            Self::Fines => "Fines",
            Self::Interest => "Interest",
            Self::SvfLedger => "SVF-Ledger",
            Self::WriteOff => "W-Off",
            Self::ApLedger => "A/P-Ledger",
            Self::Other => "Other",
        }
    }

    /// Returns true for loan accounts, whose balance is an amount owed.
    #[must_use]
    pub const fn is_loan(self) -> bool {
        matches!(self, Self::Loan)
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for AccountType {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| LedgerError::UnknownAccountType(s.to_string()))
    }
}

/// Grace-period percentages per payment mode, applied to fines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GracePeriods {
    /// Daily.
    pub daily: Decimal,
    /// Weekly.
    pub weekly: Decimal,
    /// Semi-monthly.
    pub semi_monthly: Decimal,
    /// Monthly.
    pub monthly: Decimal,
    /// Quarterly.
    pub quarterly: Decimal,
    /// Semi-annual.
    pub semi_annual: Decimal,
    /// Lumpsum.
    pub lumpsum: Decimal,
}

impl GracePeriods {
    /// Grace percentage configured for a payment mode. Fixed-days loans
    /// share the daily grace.
    #[must_use]
    pub fn for_mode(&self, mode: LoanModeOfPayment) -> Decimal {
        match mode {
            LoanModeOfPayment::Daily | LoanModeOfPayment::FixedDays => self.daily,
            LoanModeOfPayment::Weekly => self.weekly,
            LoanModeOfPayment::SemiMonthly => self.semi_monthly,
            LoanModeOfPayment::Monthly => self.monthly,
            LoanModeOfPayment::Quarterly => self.quarterly,
            LoanModeOfPayment::SemiAnnual => self.semi_annual,
            LoanModeOfPayment::Lumpsum => self.lumpsum,
        }
    }
}

/// An account that accepts postings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Unique identifier.
    pub id: AccountId,
    /// Owning organization.
    pub organization_id: OrganizationId,
    /// Owning branch.
    pub branch_id: BranchId,
    /// Display name.
    pub name: String,
    /// Product type.
    pub account_type: AccountType,
    /// Chart-of-accounts classification, if assigned.
    pub general_ledger_type: Option<GeneralLedgerType>,
    /// Currency of the account.
    pub currency_id: Option<CurrencyId>,
    /// Lowest allowed balance. Zero leaves the lower side unbounded.
    pub min_amount: Decimal,
    /// Highest allowed balance. Zero leaves the upper side unbounded.
    pub max_amount: Decimal,
    /// Grace percentages applied to fines.
    #[serde(default)]
    pub grace: GracePeriods,
}

impl Account {
    /// Checks a prospective balance against `min_amount`/`max_amount`.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::LimitExceeded` when the balance falls outside a
    /// non-zero bound.
    pub fn check_bounds(&self, balance: Decimal) -> Result<(), LedgerError> {
        let below = !self.min_amount.is_zero() && balance < self.min_amount;
        let above = !self.max_amount.is_zero() && balance > self.max_amount;
        if below || above {
            return Err(LedgerError::LimitExceeded {
                balance,
                min: self.min_amount,
                max: self.max_amount,
            });
        }
        Ok(())
    }
}
