//! Ledger error types for aggregation and posting-rule failures.
//!
//! Aggregation errors come from malformed entry sets, posting errors from
//! the account-type rules that guard every balance change.

use rust_decimal::Decimal;
use thiserror::Error;

/// Which entry collection an offending line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Persisted general-ledger line.
    GeneralLedger,
    /// Adjustment entry.
    Adjustment,
    /// Loan-transaction entry.
    LoanTransaction,
    /// Draft cash/check voucher line.
    CashVoucherRequest,
    /// Draft journal voucher line.
    JournalVoucherRequest,
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::GeneralLedger => "general ledger",
            Self::Adjustment => "adjustment",
            Self::LoanTransaction => "loan transaction",
            Self::CashVoucherRequest => "cash voucher request",
            Self::JournalVoucherRequest => "journal voucher request",
        };
        f.write_str(label)
    }
}

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    // ========== Validation Errors ==========
    /// An entry is missing its account reference.
    #[error("{kind} entry #{index} has no account")]
    MissingAccount {
        /// Collection the entry belongs to.
        kind: EntryKind,
        /// Position inside that collection.
        index: usize,
    },

    /// Debits and credits do not net to zero.
    #[error("Entries are not balanced. Debit: {debit}, Credit: {credit}")]
    Unbalanced {
        /// Total debit amount.
        debit: Decimal,
        /// Total credit amount.
        credit: Decimal,
    },

    /// The entry set carries no debit at all.
    #[error("Entries must carry a positive debit total")]
    EmptyEntries,

    /// Posting amount cannot be zero.
    #[error("Posting amount cannot be zero")]
    ZeroAmount,

    // ========== Posting Rule Errors ==========
    /// Withdrawal larger than the available balance.
    #[error("Insufficient balance: available {available}, required {required}")]
    InsufficientBalance {
        /// Current balance of the account.
        available: Decimal,
        /// Amount requested.
        required: Decimal,
    },

    /// Loan payment larger than the outstanding balance.
    #[error("Payment {payment} exceeds outstanding loan balance {balance}")]
    Overpayment {
        /// Outstanding loan balance before the payment.
        balance: Decimal,
        /// Payment amount.
        payment: Decimal,
    },

    /// Resulting balance falls outside the account's configured bounds.
    #[error("Balance {balance} is outside the allowed range [{min}, {max}]")]
    LimitExceeded {
        /// Balance the posting would produce.
        balance: Decimal,
        /// Configured minimum (0 = unbounded).
        min: Decimal,
        /// Configured maximum (0 = unbounded).
        max: Decimal,
    },

    // ========== Classification Errors ==========
    /// Stored account type label is not recognised.
    #[error("Unknown account type: {0}")]
    UnknownAccountType(String),

    /// Stored ledger source label is not recognised.
    #[error("Unknown ledger source: {0}")]
    UnknownSource(String),
}

impl LedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MissingAccount { .. } => "MISSING_ACCOUNT",
            Self::Unbalanced { .. } => "UNBALANCED_ENTRIES",
            Self::EmptyEntries => "EMPTY_ENTRIES",
            Self::ZeroAmount => "ZERO_AMOUNT",
            Self::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            Self::Overpayment { .. } => "OVERPAYMENT",
            Self::LimitExceeded { .. } => "LIMIT_EXCEEDED",
            Self::UnknownAccountType(_) => "UNKNOWN_ACCOUNT_TYPE",
            Self::UnknownSource(_) => "UNKNOWN_LEDGER_SOURCE",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - validation errors
            Self::MissingAccount { .. }
            | Self::Unbalanced { .. }
            | Self::EmptyEntries
            | Self::ZeroAmount
            | Self::UnknownAccountType(_)
            | Self::UnknownSource(_) => 400,

            // 422 Unprocessable - business rule violations
            Self::InsufficientBalance { .. }
            | Self::Overpayment { .. }
            | Self::LimitExceeded { .. } => 422,
        }
    }

    /// Returns true for failures caused by the shape of the input rather than
    /// by the state of an account.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        self.http_status_code() == 400
    }
}
