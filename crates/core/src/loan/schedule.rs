//! Amortization amounts and term counts.

use coopbook_shared::types::round_money;
use rust_decimal::{Decimal, prelude::ToPrimitive};

use super::{
    error::LoanError,
    types::{LoanModeOfPayment, LoanTerms},
};

fn require_terms(terms: i32) -> Result<Decimal, LoanError> {
    if terms <= 0 {
        return Err(LoanError::InvalidTerms(terms));
    }
    Ok(Decimal::from(terms))
}

/// Number of installments a loan of `terms` months is paid in.
///
/// # Errors
///
/// Returns `LoanError::InvalidTerms` for a fixed-days loan with no terms.
pub fn number_of_payments(mode: LoanModeOfPayment, terms: i32) -> Result<i32, LoanError> {
    let count = match mode {
        LoanModeOfPayment::Daily => terms.saturating_mul(30),
        LoanModeOfPayment::Weekly => terms.saturating_mul(4),
        LoanModeOfPayment::SemiMonthly => terms.saturating_mul(2),
        LoanModeOfPayment::Monthly => terms,
        LoanModeOfPayment::Quarterly => terms / 3,
        LoanModeOfPayment::SemiAnnual => terms / 6,
        LoanModeOfPayment::Lumpsum => 1,
        LoanModeOfPayment::FixedDays => {
            if terms <= 0 {
                return Err(LoanError::InvalidTerms(terms));
            }
            terms
        }
    };
    Ok(count)
}

/// Installment amount of a loan, rounded to 2 decimal places.
///
/// # Errors
///
/// * `InvalidTerms` when the cadence divides by a non-positive term count
/// * `InvalidFixedDays` for a fixed-days loan without a day interval
pub fn amortization_payment(loan: &LoanTerms) -> Result<Decimal, LoanError> {
    let applied = loan.applied_amount;

    let payment = match loan.mode_of_payment {
        LoanModeOfPayment::Daily => applied / require_terms(loan.terms)? / Decimal::from(30),
        LoanModeOfPayment::Weekly => applied / require_terms(loan.terms)? / Decimal::from(4),
        LoanModeOfPayment::SemiMonthly => applied / require_terms(loan.terms)? / Decimal::TWO,
        LoanModeOfPayment::Monthly => applied / require_terms(loan.terms)?,
        LoanModeOfPayment::Quarterly => applied / (require_terms(loan.terms)? / Decimal::from(3)),
        LoanModeOfPayment::SemiAnnual => applied / (require_terms(loan.terms)? / Decimal::from(6)),
        LoanModeOfPayment::Lumpsum => applied,
        LoanModeOfPayment::FixedDays => {
            let terms = require_terms(loan.terms)?;
            if loan.fixed_days <= 0 {
                return Err(LoanError::InvalidFixedDays(loan.fixed_days));
            }
            applied / terms
        }
    };

    Ok(round_money(payment))
}

/// Term count needed to repay `principal` at `installment` per period.
///
/// The count is rounded up and never below 1.
///
/// # Errors
///
/// * `InvalidInstallment` / `InvalidPrincipal` for non-positive inputs
/// * `InvalidFixedDays` for fixed-days without a day interval
/// * `OutOfRange` when the count does not fit an `i32`
pub fn suggested_term_count(
    installment: Decimal,
    principal: Decimal,
    mode: LoanModeOfPayment,
    fixed_days: i32,
) -> Result<i32, LoanError> {
    if installment <= Decimal::ZERO {
        return Err(LoanError::InvalidInstallment);
    }
    if principal <= Decimal::ZERO {
        return Err(LoanError::InvalidPrincipal);
    }

    let base = principal / installment;
    let terms = match mode {
        LoanModeOfPayment::Daily => base / Decimal::from(30),
        LoanModeOfPayment::Weekly => base / Decimal::from(4),
        LoanModeOfPayment::SemiMonthly => base / Decimal::TWO,
        LoanModeOfPayment::Monthly => base,
        LoanModeOfPayment::Quarterly => base * Decimal::from(3),
        LoanModeOfPayment::SemiAnnual => base * Decimal::from(6),
        LoanModeOfPayment::Lumpsum => Decimal::ONE,
        LoanModeOfPayment::FixedDays => {
            if fixed_days <= 0 {
                return Err(LoanError::InvalidFixedDays(fixed_days));
            }
            base
        }
    };

    let rounded = terms.ceil();
    let count = rounded.to_i32().ok_or(LoanError::OutOfRange(rounded))?;
    Ok(count.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn loan(applied: Decimal, terms: i32, mode: LoanModeOfPayment) -> LoanTerms {
        LoanTerms {
            applied_amount: applied,
            terms,
            mode_of_payment: mode,
            fixed_days: 0,
            member_type_id: None,
            is_add_on: false,
        }
    }

    #[rstest]
    #[case(LoanModeOfPayment::Daily, 12, 360)]
    #[case(LoanModeOfPayment::Weekly, 12, 48)]
    #[case(LoanModeOfPayment::SemiMonthly, 12, 24)]
    #[case(LoanModeOfPayment::Monthly, 12, 12)]
    #[case(LoanModeOfPayment::Quarterly, 12, 4)]
    #[case(LoanModeOfPayment::SemiAnnual, 12, 2)]
    #[case(LoanModeOfPayment::Lumpsum, 12, 1)]
    #[case(LoanModeOfPayment::FixedDays, 12, 12)]
    fn test_number_of_payments(
        #[case] mode: LoanModeOfPayment,
        #[case] terms: i32,
        #[case] expected: i32,
    ) {
        assert_eq!(number_of_payments(mode, terms).unwrap(), expected);
    }

    #[test]
    fn test_number_of_payments_fixed_days_requires_terms() {
        assert!(matches!(
            number_of_payments(LoanModeOfPayment::FixedDays, 0),
            Err(LoanError::InvalidTerms(0))
        ));
    }

    #[rstest]
    #[case(LoanModeOfPayment::Daily, dec!(33.33))]
    #[case(LoanModeOfPayment::Weekly, dec!(250))]
    #[case(LoanModeOfPayment::SemiMonthly, dec!(500))]
    #[case(LoanModeOfPayment::Monthly, dec!(1000))]
    #[case(LoanModeOfPayment::Quarterly, dec!(3000))]
    #[case(LoanModeOfPayment::SemiAnnual, dec!(6000))]
    #[case(LoanModeOfPayment::Lumpsum, dec!(12000))]
    fn test_amortization_payment(#[case] mode: LoanModeOfPayment, #[case] expected: Decimal) {
        assert_eq!(amortization_payment(&loan(dec!(12000), 12, mode)).unwrap(), expected);
    }

    #[test]
    fn test_amortization_rejects_bad_terms() {
        assert!(matches!(
            amortization_payment(&loan(dec!(12000), 0, LoanModeOfPayment::Monthly)),
            Err(LoanError::InvalidTerms(0))
        ));

        let mut fixed = loan(dec!(12000), 6, LoanModeOfPayment::FixedDays);
        assert!(matches!(
            amortization_payment(&fixed),
            Err(LoanError::InvalidFixedDays(0))
        ));
        fixed.fixed_days = 10;
        assert_eq!(amortization_payment(&fixed).unwrap(), dec!(2000));

        // Lumpsum never divides, so zero terms are fine.
        assert_eq!(
            amortization_payment(&loan(dec!(500), 0, LoanModeOfPayment::Lumpsum)).unwrap(),
            dec!(500)
        );
    }

    #[rstest]
    #[case(dec!(1000), dec!(12000), LoanModeOfPayment::Monthly, 12)]
    #[case(dec!(1100), dec!(12000), LoanModeOfPayment::Monthly, 11)]
    #[case(dec!(100), dec!(12000), LoanModeOfPayment::Weekly, 30)]
    #[case(dec!(3000), dec!(12000), LoanModeOfPayment::Quarterly, 12)]
    #[case(dec!(50), dec!(12000), LoanModeOfPayment::Lumpsum, 1)]
    #[case(dec!(20000), dec!(1000), LoanModeOfPayment::Daily, 1)]
    fn test_suggested_term_count(
        #[case] installment: Decimal,
        #[case] principal: Decimal,
        #[case] mode: LoanModeOfPayment,
        #[case] expected: i32,
    ) {
        assert_eq!(
            suggested_term_count(installment, principal, mode, 0).unwrap(),
            expected
        );
    }

    #[test]
    fn test_suggested_term_count_rejects_bad_input() {
        assert!(matches!(
            suggested_term_count(dec!(0), dec!(100), LoanModeOfPayment::Monthly, 0),
            Err(LoanError::InvalidInstallment)
        ));
        assert!(matches!(
            suggested_term_count(dec!(10), dec!(-1), LoanModeOfPayment::Monthly, 0),
            Err(LoanError::InvalidPrincipal)
        ));
        assert!(matches!(
            suggested_term_count(dec!(10), dec!(100), LoanModeOfPayment::FixedDays, 0),
            Err(LoanError::InvalidFixedDays(0))
        ));
    }
}
