//! Per-member rate selection and the below-minimum-balance charge.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::interest::{SavingsInterestResult, SavingsReduction, compute_savings_interest};

/// Interest rate for balances in `[from, to]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterestRateBand {
    /// Lower bound, inclusive.
    pub from: Decimal,
    /// Upper bound, inclusive.
    pub to: Decimal,
    /// Rate applied inside the band.
    pub rate: Decimal,
}

/// Rate of the first band containing `balance`, else `default_rate`.
#[must_use]
pub fn resolve_rate_by_amount(
    bands: &[InterestRateBand],
    balance: Decimal,
    default_rate: Decimal,
) -> Decimal {
    bands
        .iter()
        .find(|band| balance >= band.from && balance <= band.to)
        .map_or(default_rate, |band| band.rate)
}

/// Charge replacing interest when the last balance is below the minimum.
///
/// Returns `None` when the balance meets the minimum or no charge is
/// configured.
#[must_use]
pub fn apply_minimum_balance_charge(
    last_balance: Decimal,
    minimum_balance: Decimal,
    charge: Decimal,
) -> Option<SavingsInterestResult> {
    if last_balance >= minimum_balance || charge.is_zero() {
        return None;
    }
    Some(SavingsInterestResult {
        interest: -charge,
        tax: Decimal::ZERO,
        ending_balance: last_balance - charge,
    })
}

/// Savings product settings used for one interest run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavingsInterestPolicy {
    /// Base rate.
    pub rate: Decimal,
    /// Amount bands overriding the base rate.
    #[serde(default)]
    pub rate_bands: Vec<InterestRateBand>,
    /// Balance below which the charge applies.
    pub minimum_balance: Decimal,
    /// Below-minimum charge (0 = no interest and no charge).
    pub charge: Decimal,
    /// Withholding tax rate in `[0, 1)`.
    pub tax_rate: Decimal,
    /// Series reduction.
    pub reduction: SavingsReduction,
    /// Days in the interest year.
    pub annual_divisor: u32,
}

/// Interest entry for one member account, or `None` when nothing is posted.
///
/// Nothing is posted for an empty series, a zero last balance, or a
/// below-minimum balance without a configured charge.
#[must_use]
pub fn compute_member_interest(
    daily_balances: &[Decimal],
    policy: &SavingsInterestPolicy,
) -> Option<SavingsInterestResult> {
    let last = *daily_balances.last()?;
    if last.is_zero() {
        return None;
    }
    if last < policy.minimum_balance {
        return apply_minimum_balance_charge(last, policy.minimum_balance, policy.charge);
    }

    let rate = resolve_rate_by_amount(&policy.rate_bands, last, policy.rate);
    Some(compute_savings_interest(
        daily_balances,
        rate,
        policy.tax_rate,
        policy.reduction,
        policy.annual_divisor,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn bands() -> Vec<InterestRateBand> {
        vec![
            InterestRateBand {
                from: dec!(0),
                to: dec!(9999.99),
                rate: dec!(1),
            },
            InterestRateBand {
                from: dec!(10000),
                to: dec!(99999.99),
                rate: dec!(2),
            },
        ]
    }

    #[test]
    fn test_resolve_rate_by_amount() {
        assert_eq!(resolve_rate_by_amount(&bands(), dec!(500), dec!(0.5)), dec!(1));
        assert_eq!(resolve_rate_by_amount(&bands(), dec!(10000), dec!(0.5)), dec!(2));
        assert_eq!(resolve_rate_by_amount(&bands(), dec!(250000), dec!(0.5)), dec!(0.5));
    }

    #[test]
    fn test_minimum_balance_charge() {
        let charged = apply_minimum_balance_charge(dec!(300), dec!(500), dec!(25)).unwrap();
        assert_eq!(charged.interest, dec!(-25));
        assert_eq!(charged.tax, dec!(0));
        assert_eq!(charged.ending_balance, dec!(275));

        assert!(apply_minimum_balance_charge(dec!(300), dec!(500), dec!(0)).is_none());
        assert!(apply_minimum_balance_charge(dec!(500), dec!(500), dec!(25)).is_none());
    }

    #[test]
    fn test_member_interest_uses_band_rate() {
        let policy = SavingsInterestPolicy {
            rate: dec!(0.5),
            rate_bands: bands(),
            minimum_balance: dec!(100),
            charge: dec!(10),
            tax_rate: dec!(0),
            reduction: SavingsReduction::End,
            annual_divisor: 360,
        };
        let balances = vec![dec!(36000); 30];

        let result = compute_member_interest(&balances, &policy).unwrap();
        // 36000 * 2% * 30 / 360
        assert_eq!(result.interest, dec!(60));

        let mut low = vec![dec!(36000); 29];
        low.push(dec!(50));
        let charged = compute_member_interest(&low, &policy).unwrap();
        assert_eq!(charged.interest, dec!(-10));

        let mut empty = vec![dec!(36000); 29];
        empty.push(dec!(0));
        assert!(compute_member_interest(&empty, &policy).is_none());
        assert!(compute_member_interest(&[], &policy).is_none());
    }
}
