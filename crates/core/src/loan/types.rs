//! Loan computation domain types.

use std::{fmt, str::FromStr};

use coopbook_shared::types::{AccountId, MemberTypeId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::LoanError;

/// Number of (threshold, rate) column pairs in a rate table row.
pub const RATE_COLUMNS: usize = 22;

/// Repayment cadence of a loan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LoanModeOfPayment {
    /// Every day.
    Daily,
    /// Every week.
    Weekly,
    /// Twice a month.
    SemiMonthly,
    /// Every month.
    Monthly,
    /// Every three months.
    Quarterly,
    /// Every six months.
    SemiAnnual,
    /// Single payment at maturity.
    Lumpsum,
    /// Every N days.
    FixedDays,
}

impl LoanModeOfPayment {
    /// All variants.
    pub const ALL: [Self; 8] = [
        Self::Daily,
        Self::Weekly,
        Self::SemiMonthly,
        Self::Monthly,
        Self::Quarterly,
        Self::SemiAnnual,
        Self::Lumpsum,
        Self::FixedDays,
    ];

    /// Stored label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::SemiMonthly => "semi-monthly",
            Self::Monthly => "monthly",
            Self::Quarterly => "quarterly",
            Self::SemiAnnual => "semi-annual",
            Self::Lumpsum => "lumpsum",
            Self::FixedDays => "fixed-days",
        }
    }
}

impl fmt::Display for LoanModeOfPayment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for LoanModeOfPayment {
    type Err = LoanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| LoanError::UnknownModeOfPayment(s.to_string()))
    }
}

/// The parts of a loan application the engine reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanTerms {
    /// Applied (principal) amount.
    pub applied_amount: Decimal,
    /// Term count in months.
    pub terms: i32,
    /// Repayment cadence.
    pub mode_of_payment: LoanModeOfPayment,
    /// Day interval for fixed-days loans.
    #[serde(default)]
    pub fixed_days: i32,
    /// Member type of the borrower.
    pub member_type_id: Option<MemberTypeId>,
    /// Finance charge is added to the principal upfront.
    #[serde(default)]
    pub is_add_on: bool,
}

/// One amount band of a by-range scheme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeCharge {
    /// Lower bound of the applied amount, inclusive.
    pub from: Decimal,
    /// Upper bound of the applied amount, inclusive.
    pub to: Decimal,
    /// Percentage of the applied amount.
    pub charge: Decimal,
    /// Flat amount, used when `charge` is zero.
    pub amount: Decimal,
    /// Floor returned instead of a charge that reaches it.
    pub minimum_amount: Decimal,
}

/// One amount band of a by-type scheme with its rate columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeOfPaymentRateRow {
    /// Lower bound of the applied amount, inclusive.
    pub from: Decimal,
    /// Upper bound of the applied amount, inclusive.
    pub to: Decimal,
    /// Monthly-equivalent rates, paired with the scheme's headers.
    pub rates: [Decimal; RATE_COLUMNS],
}

/// Rate columns of a by-term scheme for one payment mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermRateRow {
    /// Mode this row applies to.
    pub mode_of_payment: LoanModeOfPayment,
    /// Monthly-equivalent rates, paired with the scheme's headers.
    pub rates: [Decimal; RATE_COLUMNS],
}

/// The three kinds of tiered rate table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChargesRateSchemeKind {
    /// Charge by applied-amount band.
    ByRange {
        /// Bands, scanned in order.
        ranges: Vec<RangeCharge>,
    },
    /// Charge by member type and payment mode.
    ByType {
        /// Only borrowers of this member type qualify.
        member_type_id: Option<MemberTypeId>,
        /// Only loans with this mode qualify.
        mode_of_payment: Option<LoanModeOfPayment>,
        /// Term thresholds of the rate columns.
        headers: [i32; RATE_COLUMNS],
        /// Amount bands.
        rows: Vec<ModeOfPaymentRateRow>,
    },
    /// Charge by term count.
    ByTerm {
        /// Term thresholds of the rate columns.
        headers: [i32; RATE_COLUMNS],
        /// One row per payment mode.
        rows: Vec<TermRateRow>,
    },
}

/// A configured rate table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChargesRateScheme {
    /// Display name.
    pub name: String,
    /// Table contents.
    #[serde(flatten)]
    pub kind: ChargesRateSchemeKind,
}

/// A deduction taken from the loan proceeds at release.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutomaticLoanDeduction {
    /// Display name.
    pub name: String,
    /// Account credited with the deduction. Deductions without one are skipped.
    pub account_id: Option<AccountId>,
    /// Rate table consulted before the percentage rules.
    pub charges_rate_scheme: Option<ChargesRateScheme>,
    /// Smallest applied amount the deduction applies to (0 = none).
    pub min_amount: Decimal,
    /// Largest applied amount the deduction applies to (0 = none).
    pub max_amount: Decimal,
    /// Percentage for non-add-on loans.
    pub charges_percentage_1: Decimal,
    /// Percentage for add-on loans.
    pub charges_percentage_2: Decimal,
    /// Divisor of the divide-then-multiply rule.
    pub charges_divisor: Decimal,
    /// Flat charge amount.
    pub charges_amount: Decimal,
    /// Term-scaling selector: 0, -1, or a month count.
    pub number_of_months: i32,
    /// Annual rate, divided by 12 when `number_of_months` is 0.
    pub annum: bool,
    /// Deduction is an add-on charge.
    pub add_on: bool,
}
