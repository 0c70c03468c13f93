//! Loan-release computation sheet.
//!
//! Builds the balanced entry set a loan release posts: cash out, loan
//! receivable in, one line per automatic deduction, and the add-on interest
//! line for add-on loans.

use coopbook_shared::types::AccountId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{
    charges::{compute_automatic_deduction, resolve_charge_rate},
    error::LoanError,
    schedule::{amortization_payment, number_of_payments},
    types::{AutomaticLoanDeduction, LoanTerms},
};

/// Name of the add-on interest line.
pub const ADD_ON_INTEREST: &str = "ADD ON INTEREST";

/// Role of a line on the sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SheetLineKind {
    /// Cash-on-hand or loan receivable line.
    Static,
    /// Automatic deduction.
    Deduction,
    /// Add-on interest.
    AddOn,
}

/// One line of the computation sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetLine {
    /// Account posted to. The add-on interest line has none.
    pub account_id: Option<AccountId>,
    /// Display name.
    pub name: String,
    /// Role of the line.
    pub kind: SheetLineKind,
    /// Counts toward add-on interest.
    pub is_add_on: bool,
    /// Debit amount.
    pub debit: Decimal,
    /// Credit amount.
    pub credit: Decimal,
}

/// Inputs of a computation sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComputationSheetRequest {
    /// Loan being released.
    pub loan: LoanTerms,
    /// Loan receivable account.
    pub loan_account_id: AccountId,
    /// Display name of the loan account.
    pub loan_account_name: String,
    /// Cash-on-hand account paying out the proceeds.
    pub cash_on_hand_account_id: AccountId,
    /// Display name of the cash-on-hand account.
    pub cash_on_hand_account_name: String,
}

/// A balanced loan-release entry set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComputationSheet {
    /// Lines in posting order: cash, loan, deductions, add-on interest.
    pub entries: Vec<SheetLine>,
    /// Total debit.
    pub total_debit: Decimal,
    /// Total credit.
    pub total_credit: Decimal,
    /// Installment amount.
    pub amortization: Decimal,
    /// Number of installments.
    pub number_of_payments: i32,
}

/// Charge of one deduction: the rate scheme when it yields a positive charge,
/// the deduction's own rules otherwise.
#[must_use]
pub fn deduction_charge(deduction: &AutomaticLoanDeduction, loan: &LoanTerms) -> Decimal {
    let from_scheme = deduction
        .charges_rate_scheme
        .as_ref()
        .map_or(Decimal::ZERO, |scheme| resolve_charge_rate(scheme, loan));
    if from_scheme > Decimal::ZERO {
        from_scheme
    } else {
        compute_automatic_deduction(deduction, loan)
    }
}

/// Builds the loan-release computation sheet.
///
/// # Errors
///
/// * `UnbalancedSheet` if debits and credits differ
/// * schedule errors from `amortization_payment` / `number_of_payments`
pub fn build_computation_sheet(
    request: &ComputationSheetRequest,
    deductions: &[AutomaticLoanDeduction],
) -> Result<ComputationSheet, LoanError> {
    let loan = &request.loan;
    let applied = loan.applied_amount;

    let mut entries = vec![
        SheetLine {
            account_id: Some(request.cash_on_hand_account_id),
            name: request.loan_account_name.clone(),
            kind: SheetLineKind::Static,
            is_add_on: false,
            debit: Decimal::ZERO,
            credit: applied,
        },
        SheetLine {
            account_id: Some(request.loan_account_id),
            name: request.cash_on_hand_account_name.clone(),
            kind: SheetLineKind::Static,
            is_add_on: false,
            debit: applied,
            credit: Decimal::ZERO,
        },
    ];

    let mut total_add_ons = Decimal::ZERO;
    let mut total_non_add_ons = Decimal::ZERO;

    for deduction in deductions {
        let Some(account_id) = deduction.account_id else {
            continue;
        };
        let charge = deduction_charge(deduction, loan);
        if deduction.add_on {
            total_add_ons += charge;
        } else {
            total_non_add_ons += charge;
        }
        if charge > Decimal::ZERO {
            entries.push(SheetLine {
                account_id: Some(account_id),
                name: deduction.name.clone(),
                kind: SheetLineKind::Deduction,
                is_add_on: deduction.add_on,
                debit: Decimal::ZERO,
                credit: charge,
            });
        }
    }

    entries[0].credit = if loan.is_add_on {
        applied - total_non_add_ons
    } else {
        applied - (total_non_add_ons + total_add_ons)
    };

    if loan.is_add_on {
        entries.push(SheetLine {
            account_id: None,
            name: ADD_ON_INTEREST.to_string(),
            kind: SheetLineKind::AddOn,
            is_add_on: true,
            debit: total_add_ons,
            credit: Decimal::ZERO,
        });
    }

    let total_debit: Decimal = entries.iter().map(|line| line.debit).sum();
    let total_credit: Decimal = entries.iter().map(|line| line.credit).sum();
    if total_debit != total_credit {
        return Err(LoanError::UnbalancedSheet {
            debit: total_debit,
            credit: total_credit,
        });
    }

    Ok(ComputationSheet {
        entries,
        total_debit,
        total_credit,
        amortization: amortization_payment(loan)?,
        number_of_payments: number_of_payments(loan.mode_of_payment, loan.terms)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loan::types::LoanModeOfPayment;
    use rust_decimal_macros::dec;

    fn request(is_add_on: bool) -> ComputationSheetRequest {
        ComputationSheetRequest {
            loan: LoanTerms {
                applied_amount: dec!(12000),
                terms: 12,
                mode_of_payment: LoanModeOfPayment::Monthly,
                fixed_days: 0,
                member_type_id: None,
                is_add_on,
            },
            loan_account_id: AccountId::new(),
            loan_account_name: "Regular Loan".to_string(),
            cash_on_hand_account_id: AccountId::new(),
            cash_on_hand_account_name: "Cash on Hand".to_string(),
        }
    }

    fn deductions() -> Vec<AutomaticLoanDeduction> {
        vec![
            AutomaticLoanDeduction {
                name: "Service Fee".to_string(),
                account_id: Some(AccountId::new()),
                charges_percentage_1: dec!(2),
                ..AutomaticLoanDeduction::default()
            },
            AutomaticLoanDeduction {
                name: "Interest".to_string(),
                account_id: Some(AccountId::new()),
                charges_percentage_1: dec!(1),
                number_of_months: 1,
                add_on: true,
                ..AutomaticLoanDeduction::default()
            },
            AutomaticLoanDeduction {
                name: "Unlinked".to_string(),
                account_id: None,
                charges_percentage_1: dec!(50),
                ..AutomaticLoanDeduction::default()
            },
        ]
    }

    #[test]
    fn test_regular_loan_deducts_everything_from_cash() {
        let sheet = build_computation_sheet(&request(false), &deductions()).unwrap();

        // service fee 240, interest 12000 * 1% * 12 / 1 = 1440
        assert_eq!(sheet.entries.len(), 4);
        assert_eq!(sheet.entries[0].credit, dec!(10320));
        assert_eq!(sheet.entries[1].debit, dec!(12000));
        assert_eq!(sheet.entries[2].credit, dec!(240));
        assert_eq!(sheet.entries[3].credit, dec!(1440));
        assert_eq!(sheet.total_debit, dec!(12000));
        assert_eq!(sheet.total_credit, dec!(12000));
        assert_eq!(sheet.amortization, dec!(1000));
        assert_eq!(sheet.number_of_payments, 12);
    }

    #[test]
    fn test_add_on_loan_adds_interest_line() {
        let sheet = build_computation_sheet(&request(true), &deductions()).unwrap();

        assert_eq!(sheet.entries[0].credit, dec!(11760));
        let add_on = sheet.entries.last().unwrap();
        assert_eq!(add_on.name, ADD_ON_INTEREST);
        assert_eq!(add_on.kind, SheetLineKind::AddOn);
        assert_eq!(add_on.debit, dec!(1440));
        assert_eq!(sheet.total_debit, dec!(13440));
        assert_eq!(sheet.total_debit, sheet.total_credit);
    }

    #[test]
    fn test_zero_charge_deductions_are_omitted() {
        let zero = vec![AutomaticLoanDeduction {
            name: "Out of range".to_string(),
            account_id: Some(AccountId::new()),
            min_amount: dec!(50000),
            charges_percentage_1: dec!(1),
            ..AutomaticLoanDeduction::default()
        }];
        let sheet = build_computation_sheet(&request(false), &zero).unwrap();
        assert_eq!(sheet.entries.len(), 2);
        assert_eq!(sheet.entries[0].credit, dec!(12000));
    }

    #[test]
    fn test_invalid_terms_fail() {
        let mut bad = request(false);
        bad.loan.terms = 0;
        assert!(matches!(
            build_computation_sheet(&bad, &[]),
            Err(LoanError::InvalidTerms(0))
        ));
    }
}
