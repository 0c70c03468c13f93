//! Fines on skipped amortizations and periodic interest.

use coopbook_shared::types::round_money;
use rust_decimal::Decimal;

use super::types::LoanModeOfPayment;
use crate::ledger::GracePeriods;

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Fines owed for an amortization skipped by `days_skipped` days.
///
/// Up to 30 skipped days use the amortization rate, beyond that the maturity
/// rate. Unless `skip_grace` is set, the account's grace percentage for the
/// mode reduces the rate, and a grace of 100% or more waives the fine.
/// Lumpsum loans charge the maturity rate (or the amortization rate when no
/// maturity rate is set) once, without a day fraction.
#[must_use]
pub fn compute_fines(
    balance: Decimal,
    amort_rate: Decimal,
    maturity_rate: Decimal,
    days_skipped: i32,
    mode: LoanModeOfPayment,
    skip_grace: bool,
    grace: &GracePeriods,
) -> Decimal {
    if days_skipped <= 0 {
        return Decimal::ZERO;
    }

    let mut rate = if days_skipped > 30 { maturity_rate } else { amort_rate };
    if rate <= Decimal::ZERO {
        return Decimal::ZERO;
    }

    if !skip_grace {
        let grace = grace.for_mode(mode);
        if grace >= HUNDRED {
            return Decimal::ZERO;
        }
        if grace > Decimal::ZERO {
            rate *= Decimal::ONE - grace / HUNDRED;
        }
    }

    let days = Decimal::from(days_skipped);
    let per_day = |period_days: i64| balance * rate / HUNDRED * days / Decimal::from(period_days);

    let fines = match mode {
        LoanModeOfPayment::Daily | LoanModeOfPayment::FixedDays => per_day(1),
        LoanModeOfPayment::Weekly => per_day(7),
        LoanModeOfPayment::SemiMonthly => per_day(15),
        LoanModeOfPayment::Monthly => per_day(30),
        LoanModeOfPayment::Quarterly => per_day(90),
        LoanModeOfPayment::SemiAnnual => per_day(180),
        LoanModeOfPayment::Lumpsum => {
            let lumpsum_rate = if maturity_rate > Decimal::ZERO {
                maturity_rate
            } else {
                amort_rate
            };
            balance * lumpsum_rate / HUNDRED
        }
    };

    round_money(fines)
}

/// Interest on `balance` for one period of `mode` at a monthly rate (%).
#[must_use]
pub fn compute_interest(balance: Decimal, rate: Decimal, mode: LoanModeOfPayment) -> Decimal {
    let monthly = rate / HUNDRED;
    let daily = monthly / Decimal::from(30);

    let multiplier = match mode {
        LoanModeOfPayment::Monthly | LoanModeOfPayment::Lumpsum => monthly,
        LoanModeOfPayment::Daily | LoanModeOfPayment::FixedDays => daily,
        LoanModeOfPayment::SemiMonthly => daily * Decimal::from(15),
        LoanModeOfPayment::Weekly => daily * Decimal::from(7),
        LoanModeOfPayment::Quarterly => monthly * Decimal::from(3),
        LoanModeOfPayment::SemiAnnual => monthly * Decimal::from(6),
    };

    round_money(balance * multiplier)
}

/// Straight interest over `terms` periods, with no cadence scaling.
#[must_use]
pub fn compute_interest_straight(balance: Decimal, rate: Decimal, terms: i32) -> Decimal {
    if rate <= Decimal::ZERO || balance <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    let mut interest = balance * rate / HUNDRED;
    if terms > 1 {
        interest *= Decimal::from(terms);
    }
    round_money(interest)
}
