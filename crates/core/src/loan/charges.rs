//! Charge-rate schemes and automatic loan deductions.

use coopbook_shared::types::round_money;
use rust_decimal::Decimal;

use super::types::{
    AutomaticLoanDeduction, ChargesRateScheme, ChargesRateSchemeKind, LoanModeOfPayment,
    LoanTerms, RATE_COLUMNS,
};

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Last rate whose threshold is within `terms`.
///
/// Scans the columns in order and stops at the first column whose threshold
/// exceeds `terms` or whose rate is not positive.
#[must_use]
pub fn last_applicable_rate(
    rates: &[Decimal; RATE_COLUMNS],
    headers: &[i32; RATE_COLUMNS],
    terms: i32,
) -> Decimal {
    let mut last = Decimal::ZERO;
    for (rate, header) in rates.iter().zip(headers) {
        if *header > terms || *rate <= Decimal::ZERO {
            break;
        }
        last = *rate;
    }
    last
}

/// Converts a monthly-equivalent amount to the loan's payment cadence.
///
/// Lumpsum and fixed-days loans have no cadence equivalent and yield 0.
#[must_use]
pub fn convert_to_cadence(monthly: Decimal, mode: LoanModeOfPayment) -> Decimal {
    let thirty = Decimal::from(30);
    match mode {
        LoanModeOfPayment::Daily => monthly / thirty,
        LoanModeOfPayment::Weekly => monthly * Decimal::from(7) / thirty,
        LoanModeOfPayment::SemiMonthly => monthly * Decimal::from(15) / thirty,
        LoanModeOfPayment::Monthly => monthly,
        LoanModeOfPayment::Quarterly => monthly * Decimal::from(3),
        LoanModeOfPayment::SemiAnnual => monthly * Decimal::from(6),
        LoanModeOfPayment::Lumpsum | LoanModeOfPayment::FixedDays => Decimal::ZERO,
    }
}

fn rate_charge(applied: Decimal, rate: Decimal, mode: LoanModeOfPayment) -> Decimal {
    if rate <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    convert_to_cadence(applied * rate / HUNDRED, mode)
}

fn in_band(amount: Decimal, from: Decimal, to: Decimal) -> bool {
    amount >= from && amount <= to
}

/// Resolves the charge a rate scheme levies on a loan.
///
/// Returns 0 when no band, row or filter matches. The result is rounded to
/// 2 decimal places.
#[must_use]
pub fn resolve_charge_rate(scheme: &ChargesRateScheme, loan: &LoanTerms) -> Decimal {
    let applied = loan.applied_amount;

    let charge = match &scheme.kind {
        ChargesRateSchemeKind::ByRange { ranges } => ranges
            .iter()
            .filter(|range| in_band(applied, range.from, range.to))
            .find_map(|range| {
                let charge = if range.charge > Decimal::ZERO {
                    applied * range.charge / HUNDRED
                } else if range.amount > Decimal::ZERO {
                    range.amount
                } else {
                    Decimal::ZERO
                };
                if charge <= Decimal::ZERO {
                    return None;
                }
                if range.minimum_amount > Decimal::ZERO && charge >= range.minimum_amount {
                    Some(range.minimum_amount)
                } else {
                    Some(charge)
                }
            }),

        ChargesRateSchemeKind::ByType {
            member_type_id,
            mode_of_payment,
            headers,
            rows,
        } => {
            let member_matches = member_type_id.is_none() || *member_type_id == loan.member_type_id;
            let mode_matches = mode_of_payment.is_none_or(|mode| mode == loan.mode_of_payment);
            if !member_matches || !mode_matches {
                return Decimal::ZERO;
            }
            rows.iter()
                .filter(|row| in_band(applied, row.from, row.to))
                .map(|row| {
                    let rate = last_applicable_rate(&row.rates, headers, loan.terms);
                    rate_charge(applied, rate, loan.mode_of_payment)
                })
                .find(|charge| *charge > Decimal::ZERO)
        }

        ChargesRateSchemeKind::ByTerm { headers, rows } => {
            if loan.terms < 1 {
                return Decimal::ZERO;
            }
            rows.iter()
                .filter(|row| row.mode_of_payment == loan.mode_of_payment)
                .map(|row| {
                    let rate = last_applicable_rate(&row.rates, headers, loan.terms);
                    rate_charge(applied, rate, loan.mode_of_payment)
                })
                .find(|charge| *charge > Decimal::ZERO)
        }
    };

    charge.map_or(Decimal::ZERO, round_money)
}

/// Computes an automatic deduction for a loan.
///
/// Outside the `[min_amount, max_amount]` applicability bounds the result is
/// 0. A computation that ends up equal to the applied amount returns the flat
/// `charges_amount` instead.
#[must_use]
pub fn compute_automatic_deduction(deduction: &AutomaticLoanDeduction, loan: &LoanTerms) -> Decimal {
    let applied = loan.applied_amount;

    if deduction.min_amount > Decimal::ZERO && applied < deduction.min_amount {
        return Decimal::ZERO;
    }
    if deduction.max_amount > Decimal::ZERO && applied > deduction.max_amount {
        return Decimal::ZERO;
    }

    let pct1 = deduction.charges_percentage_1;
    let pct2 = deduction.charges_percentage_2;
    let mut result = applied;

    if pct1 > Decimal::ZERO || pct2 > Decimal::ZERO {
        let pct = if pct1 > Decimal::ZERO && pct2 > Decimal::ZERO {
            if deduction.add_on { pct2 } else { pct1 }
        } else if pct1 > Decimal::ZERO {
            pct1
        } else {
            pct2
        };
        result = result * pct / HUNDRED;
    }

    if deduction.charges_divisor > Decimal::ZERO && result > Decimal::ZERO {
        result = result / deduction.charges_divisor * deduction.charges_amount;
    }

    let terms = Decimal::from(loan.terms);
    match deduction.number_of_months {
        0 if deduction.annum => result /= Decimal::from(12),
        -1 => result = result * terms / Decimal::from(12),
        months if months > 0 => result = result * terms / Decimal::from(months),
        _ => {}
    }

    if result == applied {
        return deduction.charges_amount;
    }
    round_money(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loan::types::{ModeOfPaymentRateRow, RangeCharge, TermRateRow};
    use coopbook_shared::types::MemberTypeId;
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

    fn columns<T: Copy + Default>(values: &[T]) -> [T; RATE_COLUMNS] {
        let mut out = [T::default(); RATE_COLUMNS];
        out[..values.len()].copy_from_slice(values);
        out
    }

    #[test]
    fn test_term_scan_keeps_last_applicable_rate() {
        let rates = columns(&[dec!(5), dec!(5), dec!(0)]);
        let headers = columns(&[1, 6, 12]);
        assert_eq!(last_applicable_rate(&rates, &headers, 8), dec!(5));

        let rates = columns(&[dec!(2), dec!(3), dec!(4)]);
        assert_eq!(last_applicable_rate(&rates, &headers, 8), dec!(3));
        assert_eq!(last_applicable_rate(&rates, &headers, 12), dec!(4));
        assert_eq!(last_applicable_rate(&rates, &headers, 0), dec!(0));
    }

    #[rstest]
    #[case(LoanModeOfPayment::Daily, dec!(1))]
    #[case(LoanModeOfPayment::Weekly, dec!(7))]
    #[case(LoanModeOfPayment::SemiMonthly, dec!(15))]
    #[case(LoanModeOfPayment::Monthly, dec!(30))]
    #[case(LoanModeOfPayment::Quarterly, dec!(90))]
    #[case(LoanModeOfPayment::SemiAnnual, dec!(180))]
    #[case(LoanModeOfPayment::Lumpsum, dec!(0))]
    fn test_convert_to_cadence(#[case] mode: LoanModeOfPayment, #[case] expected: Decimal) {
        assert_eq!(convert_to_cadence(dec!(30), mode), expected);
    }

    #[test]
    fn test_by_term_scheme() {
        let scheme = ChargesRateScheme {
            name: "Service fee by term".to_string(),
            kind: ChargesRateSchemeKind::ByTerm {
                headers: columns(&[1, 6, 12]),
                rows: vec![
                    TermRateRow {
                        mode_of_payment: LoanModeOfPayment::Weekly,
                        rates: columns(&[dec!(9)]),
                    },
                    TermRateRow {
                        mode_of_payment: LoanModeOfPayment::Monthly,
                        rates: columns(&[dec!(1), dec!(1.5), dec!(2)]),
                    },
                ],
            },
        };

        let charge = resolve_charge_rate(&scheme, &loan(dec!(10000), 8, LoanModeOfPayment::Monthly));
        assert_eq!(charge, dec!(150));

        let none = resolve_charge_rate(&scheme, &loan(dec!(10000), 0, LoanModeOfPayment::Monthly));
        assert_eq!(none, dec!(0));

        let unmatched = resolve_charge_rate(&scheme, &loan(dec!(10000), 8, LoanModeOfPayment::Daily));
        assert_eq!(unmatched, dec!(0));
    }

    #[test]
    fn test_by_range_scheme() {
        let scheme = ChargesRateScheme {
            name: "Insurance".to_string(),
            kind: ChargesRateSchemeKind::ByRange {
                ranges: vec![
                    RangeCharge {
                        from: dec!(0),
                        to: dec!(4999.99),
                        charge: dec!(0),
                        amount: dec!(75),
                        minimum_amount: dec!(0),
                    },
                    RangeCharge {
                        from: dec!(5000),
                        to: dec!(50000),
                        charge: dec!(2),
                        amount: dec!(0),
                        minimum_amount: dec!(500),
                    },
                ],
            },
        };

        let flat = resolve_charge_rate(&scheme, &loan(dec!(3000), 6, LoanModeOfPayment::Monthly));
        assert_eq!(flat, dec!(75));

        let percent = resolve_charge_rate(&scheme, &loan(dec!(10000), 6, LoanModeOfPayment::Monthly));
        assert_eq!(percent, dec!(200));

        let floored = resolve_charge_rate(&scheme, &loan(dec!(40000), 6, LoanModeOfPayment::Monthly));
        assert_eq!(floored, dec!(500));

        let outside = resolve_charge_rate(&scheme, &loan(dec!(60000), 6, LoanModeOfPayment::Monthly));
        assert_eq!(outside, dec!(0));
    }

    #[test]
    fn test_by_type_scheme_filters() {
        let regular = MemberTypeId::new();
        let scheme = ChargesRateScheme {
            name: "Interest by type".to_string(),
            kind: ChargesRateSchemeKind::ByType {
                member_type_id: Some(regular),
                mode_of_payment: Some(LoanModeOfPayment::Weekly),
                headers: columns(&[1, 12]),
                rows: vec![ModeOfPaymentRateRow {
                    from: dec!(1000),
                    to: dec!(100000),
                    rates: columns(&[dec!(3), dec!(2.5)]),
                }],
            },
        };

        let mut weekly = loan(dec!(30000), 12, LoanModeOfPayment::Weekly);
        weekly.member_type_id = Some(regular);
        // 30000 * 2.5% = 750 monthly, * 7 / 30 weekly
        assert_eq!(resolve_charge_rate(&scheme, &weekly), dec!(175));

        weekly.member_type_id = Some(MemberTypeId::new());
        assert_eq!(resolve_charge_rate(&scheme, &weekly), dec!(0));

        let mut monthly = loan(dec!(30000), 12, LoanModeOfPayment::Monthly);
        monthly.member_type_id = Some(regular);
        assert_eq!(resolve_charge_rate(&scheme, &monthly), dec!(0));
    }

    #[test]
    fn test_deduction_bounds() {
        let deduction = AutomaticLoanDeduction {
            min_amount: dec!(5000),
            max_amount: dec!(20000),
            charges_percentage_1: dec!(1),
            ..AutomaticLoanDeduction::default()
        };
        let below = compute_automatic_deduction(&deduction, &loan(dec!(4000), 12, LoanModeOfPayment::Monthly));
        let above = compute_automatic_deduction(&deduction, &loan(dec!(25000), 12, LoanModeOfPayment::Monthly));
        let inside = compute_automatic_deduction(&deduction, &loan(dec!(10000), 12, LoanModeOfPayment::Monthly));
        assert_eq!(below, dec!(0));
        assert_eq!(above, dec!(0));
        assert_eq!(inside, dec!(100));
    }

    #[test]
    fn test_deduction_dual_percentage_uses_add_on_flag() {
        let mut deduction = AutomaticLoanDeduction {
            charges_percentage_1: dec!(1),
            charges_percentage_2: dec!(3),
            ..AutomaticLoanDeduction::default()
        };
        let terms = loan(dec!(10000), 12, LoanModeOfPayment::Monthly);
        assert_eq!(compute_automatic_deduction(&deduction, &terms), dec!(100));
        deduction.add_on = true;
        assert_eq!(compute_automatic_deduction(&deduction, &terms), dec!(300));
    }

    #[rstest]
    #[case(0, true, dec!(10))]
    #[case(-1, false, dec!(120))]
    #[case(6, false, dec!(240))]
    #[case(0, false, dec!(120))]
    fn test_deduction_term_scaling(
        #[case] number_of_months: i32,
        #[case] annum: bool,
        #[case] expected: Decimal,
    ) {
        let deduction = AutomaticLoanDeduction {
            charges_percentage_1: dec!(1.2),
            number_of_months,
            annum,
            ..AutomaticLoanDeduction::default()
        };
        let terms = loan(dec!(10000), 12, LoanModeOfPayment::Monthly);
        assert_eq!(compute_automatic_deduction(&deduction, &terms), expected);
    }

    #[test]
    fn test_deduction_divisor_rule() {
        let deduction = AutomaticLoanDeduction {
            charges_divisor: dec!(1000),
            charges_amount: dec!(12),
            ..AutomaticLoanDeduction::default()
        };
        let charge = compute_automatic_deduction(&deduction, &loan(dec!(25000), 6, LoanModeOfPayment::Monthly));
        assert_eq!(charge, dec!(300));
    }

    #[test]
    fn test_deduction_unchanged_principal_returns_flat_amount() {
        let deduction = AutomaticLoanDeduction {
            charges_amount: dec!(150),
            ..AutomaticLoanDeduction::default()
        };
        let charge = compute_automatic_deduction(&deduction, &loan(dec!(25000), 6, LoanModeOfPayment::Monthly));
        assert_eq!(charge, dec!(150));
    }
}
