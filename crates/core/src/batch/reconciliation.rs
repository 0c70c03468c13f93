//! End-of-day remittance figures of a teller batch.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One denomination line of a cash count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashCountLine {
    /// Face value.
    pub amount: Decimal,
    /// Number of bills or coins.
    pub quantity: u32,
}

/// Total of a cash count.
#[must_use]
pub fn total_cash_count(lines: &[CashCountLine]) -> Decimal {
    lines
        .iter()
        .map(|line| line.amount * Decimal::from(line.quantity))
        .sum()
}

/// Totals collected over a batch, as entered by the teller and summed from
/// its postings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchFigures {
    /// Cash the teller started with.
    pub beginning_balance: Decimal,
    /// Cash deposited in the bank during the day.
    pub deposit_in_bank: Decimal,
    /// Cash collected from payments and deposits.
    pub cash_collection: Decimal,
    /// Savings withdrawn by members (positive).
    pub savings_withdrawal: Decimal,
    /// Petty cash disbursed.
    pub petty_cash: Decimal,
    /// Counted cash.
    pub cash_count: Decimal,
    /// Check remittance.
    pub check_remittance: Decimal,
    /// Online remittance.
    pub online_remittance: Decimal,
    /// Cash on hand remitted.
    pub cash_on_hand: Decimal,
}

/// Derived remittance figures.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReconciliation {
    /// Beginning balance + deposit in bank + cash collection.
    pub total_cash_handled: Decimal,
    /// Cash handled less withdrawals and petty cash.
    pub total_supposed_remittance: Decimal,
    /// Cash count + deposit in bank + beginning balance.
    pub grand_total: Decimal,
    /// Check + online + cash on hand + deposit in bank.
    pub total_actual_remittance: Decimal,
    /// Actual less supposed remittance. Zero when the teller is square.
    pub actual_supposed_comparison: Decimal,
}

/// Computes the end-of-day remittance figures.
#[must_use]
pub fn reconcile_batch(figures: &BatchFigures) -> BatchReconciliation {
    let total_cash_handled =
        figures.beginning_balance + figures.deposit_in_bank + figures.cash_collection;
    let total_supposed_remittance =
        total_cash_handled - (figures.savings_withdrawal + figures.petty_cash);
    let grand_total = figures.cash_count + figures.deposit_in_bank + figures.beginning_balance;
    let total_actual_remittance = figures.check_remittance
        + figures.online_remittance
        + figures.cash_on_hand
        + figures.deposit_in_bank;

    BatchReconciliation {
        total_cash_handled,
        total_supposed_remittance,
        grand_total,
        total_actual_remittance,
        actual_supposed_comparison: total_actual_remittance - total_supposed_remittance,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_cash_count_total() {
        let lines = [
            CashCountLine {
                amount: dec!(1000),
                quantity: 3,
            },
            CashCountLine {
                amount: dec!(0.25),
                quantity: 8,
            },
        ];
        assert_eq!(total_cash_count(&lines), dec!(3002));
        assert_eq!(total_cash_count(&[]), dec!(0));
    }

    #[test]
    fn test_square_teller() {
        let figures = BatchFigures {
            beginning_balance: dec!(5000),
            deposit_in_bank: dec!(1000),
            cash_collection: dec!(12000),
            savings_withdrawal: dec!(3000),
            petty_cash: dec!(500),
            cash_count: dec!(13500),
            check_remittance: dec!(2000),
            online_remittance: dec!(1500),
            cash_on_hand: dec!(10000),
        };

        let result = reconcile_batch(&figures);

        assert_eq!(result.total_cash_handled, dec!(18000));
        assert_eq!(result.total_supposed_remittance, dec!(14500));
        assert_eq!(result.grand_total, dec!(19500));
        assert_eq!(result.total_actual_remittance, dec!(14500));
        assert_eq!(result.actual_supposed_comparison, dec!(0));
    }

    #[test]
    fn test_short_teller() {
        let figures = BatchFigures {
            cash_collection: dec!(1000),
            cash_on_hand: dec!(950),
            ..BatchFigures::default()
        };
        assert_eq!(reconcile_batch(&figures).actual_supposed_comparison, dec!(-50));
    }
}
