//! General-ledger classification and the balance direction rule.
//!
//! `apply_balance_direction` is the one place that decides which side of an
//! entry increases a balance. The aggregator and the running-balance stamper
//! both go through it.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Classification of a ledger account in the chart of accounts.
///
/// - Assets/Expenses: balance += debit - credit (debit-normal)
/// - Liabilities/Equity/Revenue: balance += credit - debit (credit-normal)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum GeneralLedgerType {
    /// Debit-normal.
    #[default]
    Assets,
    /// Credit-normal.
    Liabilities,
    /// Credit-normal.
    Equity,
    /// Credit-normal.
    Revenue,
    /// Debit-normal.
    Expenses,
}

impl GeneralLedgerType {
    /// Parses a stored classification label. Unknown labels fall back to
    /// `Assets`.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "liabilities" | "liability" => Self::Liabilities,
            "equity" => Self::Equity,
            "revenue" | "income" => Self::Revenue,
            "expenses" | "expense" => Self::Expenses,
            _ => Self::Assets,
        }
    }

    /// Stored label of this classification.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Assets => "Assets",
            Self::Liabilities => "Liabilities",
            Self::Equity => "Equity",
            Self::Revenue => "Revenue",
            Self::Expenses => "Expenses",
        }
    }

    /// Returns true if debits increase the balance.
    #[must_use]
    pub const fn is_debit_normal(self) -> bool {
        matches!(self, Self::Assets | Self::Expenses)
    }

    /// Calculates the signed balance change for one entry.
    #[must_use]
    pub fn balance_change(self, debit: Decimal, credit: Decimal) -> Decimal {
        if self.is_debit_normal() {
            debit - credit
        } else {
            credit - debit
        }
    }
}

/// Signed balance delta of an entry against an account of the given
/// classification. An unclassified account is treated as `Assets`.
#[must_use]
pub fn apply_balance_direction(
    gl_type: Option<GeneralLedgerType>,
    debit: Decimal,
    credit: Decimal,
) -> Decimal {
    gl_type.unwrap_or_default().balance_change(debit, credit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case("Assets", GeneralLedgerType::Assets)]
    #[case("liabilities", GeneralLedgerType::Liabilities)]
    #[case(" Equity ", GeneralLedgerType::Equity)]
    #[case("REVENUE", GeneralLedgerType::Revenue)]
    #[case("expense", GeneralLedgerType::Expenses)]
    #[case("", GeneralLedgerType::Assets)]
    #[case("contra", GeneralLedgerType::Assets)]
    fn test_from_label(#[case] label: &str, #[case] expected: GeneralLedgerType) {
        assert_eq!(GeneralLedgerType::from_label(label), expected);
    }

    #[rstest]
    #[case(Some(GeneralLedgerType::Assets), dec!(100), dec!(30), dec!(70))]
    #[case(Some(GeneralLedgerType::Expenses), dec!(100), dec!(30), dec!(70))]
    #[case(Some(GeneralLedgerType::Liabilities), dec!(100), dec!(30), dec!(-70))]
    #[case(Some(GeneralLedgerType::Equity), dec!(0), dec!(45.50), dec!(45.50))]
    #[case(Some(GeneralLedgerType::Revenue), dec!(10), dec!(10), dec!(0))]
    #[case(None, dec!(12.34), dec!(0), dec!(12.34))]
    fn test_apply_balance_direction(
        #[case] gl_type: Option<GeneralLedgerType>,
        #[case] debit: Decimal,
        #[case] credit: Decimal,
        #[case] expected: Decimal,
    ) {
        assert_eq!(apply_balance_direction(gl_type, debit, credit), expected);
    }

    fn gl_type_strategy() -> impl Strategy<Value = GeneralLedgerType> {
        prop_oneof![
            Just(GeneralLedgerType::Assets),
            Just(GeneralLedgerType::Liabilities),
            Just(GeneralLedgerType::Equity),
            Just(GeneralLedgerType::Revenue),
            Just(GeneralLedgerType::Expenses),
        ]
    }

    fn amount_strategy() -> impl Strategy<Value = Decimal> {
        (0i64..10_000_000i64).prop_map(|n| Decimal::new(n, 2))
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Debit-normal and credit-normal deltas are exact negations.
        #[test]
        fn prop_credit_normal_is_negated_debit_normal(
            debit in amount_strategy(),
            credit in amount_strategy(),
            gl_type in gl_type_strategy(),
        ) {
            let assets = GeneralLedgerType::Assets.balance_change(debit, credit);
            let delta = gl_type.balance_change(debit, credit);
            if gl_type.is_debit_normal() {
                prop_assert_eq!(delta, assets);
            } else {
                prop_assert_eq!(delta, -assets);
            }
        }

        /// Labels round-trip through `label`/`from_label`.
        #[test]
        fn prop_label_round_trip(gl_type in gl_type_strategy()) {
            prop_assert_eq!(GeneralLedgerType::from_label(gl_type.label()), gl_type);
        }
    }
}
