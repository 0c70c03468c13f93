//! Loan computation engine.
//!
//! - Charge-rate schemes (by range, by type, by term)
//! - Automatic loan deductions
//! - Amortization amounts and suggested term counts
//! - Fines and interest formulas
//! - The loan-release computation sheet
//!
//! All arithmetic is exact decimal; returned amounts are rounded to 2 places.

pub mod charges;
pub mod error;
pub mod penalty;
pub mod schedule;
pub mod sheet;
pub mod types;

pub use charges::{compute_automatic_deduction, convert_to_cadence, last_applicable_rate, resolve_charge_rate};
pub use error::LoanError;
pub use penalty::{compute_fines, compute_interest, compute_interest_straight};
pub use schedule::{amortization_payment, number_of_payments, suggested_term_count};
pub use sheet::{
    ADD_ON_INTEREST, ComputationSheet, ComputationSheetRequest, SheetLine, SheetLineKind,
    build_computation_sheet, deduction_charge,
};
pub use types::{
    AutomaticLoanDeduction, ChargesRateScheme, ChargesRateSchemeKind, LoanModeOfPayment,
    LoanTerms, ModeOfPaymentRateRow, RATE_COLUMNS, RangeCharge, TermRateRow,
};
