//! Loan computation errors.

use rust_decimal::Decimal;
use thiserror::Error;

/// Errors that can occur during loan computations.
#[derive(Debug, Error)]
pub enum LoanError {
    /// Term count must be positive for this cadence.
    #[error("Invalid terms {0}: must be greater than 0")]
    InvalidTerms(i32),

    /// Fixed-days interval must be positive.
    #[error("Invalid fixed days {0}: must be greater than 0")]
    InvalidFixedDays(i32),

    /// Suggested installment must be positive.
    #[error("Suggested installment must be greater than zero")]
    InvalidInstallment,

    /// Principal must be positive.
    #[error("Invalid total loan amount")]
    InvalidPrincipal,

    /// Payment mode label is not recognised.
    #[error("Unknown mode of payment: {0}")]
    UnknownModeOfPayment(String),

    /// Result does not fit the target integer type.
    #[error("Computed term count is out of range: {0}")]
    OutOfRange(Decimal),

    /// Computation sheet debits and credits differ.
    #[error("Computation sheet is not balanced. Debit: {debit}, Credit: {credit}")]
    UnbalancedSheet {
        /// Total debit.
        debit: Decimal,
        /// Total credit.
        credit: Decimal,
    },
}

impl LoanError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidTerms(_) => "INVALID_TERMS",
            Self::InvalidFixedDays(_) => "INVALID_FIXED_DAYS",
            Self::InvalidInstallment => "INVALID_INSTALLMENT",
            Self::InvalidPrincipal => "INVALID_PRINCIPAL",
            Self::UnknownModeOfPayment(_) => "UNKNOWN_MODE_OF_PAYMENT",
            Self::OutOfRange(_) => "OUT_OF_RANGE",
            Self::UnbalancedSheet { .. } => "UNBALANCED_SHEET",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        // Every loan error is a bad input.
        400
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_and_display() {
        assert_eq!(LoanError::InvalidTerms(0).error_code(), "INVALID_TERMS");
        assert_eq!(LoanError::InvalidTerms(0).http_status_code(), 400);
        assert_eq!(
            LoanError::InvalidFixedDays(-2).to_string(),
            "Invalid fixed days -2: must be greater than 0"
        );
        assert_eq!(
            LoanError::UnbalancedSheet {
                debit: Decimal::new(100_000, 2),
                credit: Decimal::new(99_000, 2),
            }
            .to_string(),
            "Computation sheet is not balanced. Debit: 1000.00, Credit: 990.00"
        );
    }
}
