//! Payment pipeline error taxonomy.

use coopbook_shared::AppError;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::batch::BatchError;
use crate::ledger::LedgerError;

/// Failure reported by a storage adapter.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing database failed.
    #[error("database error: {0}")]
    Database(String),

    /// A row lock could not be acquired in time.
    #[error("lock timeout: {0}")]
    LockTimeout(String),

    /// A stored value could not be mapped onto a domain type.
    #[error("corrupt record: {0}")]
    Corrupt(String),
}

impl StoreError {
    /// Create a database error.
    #[must_use]
    pub fn database(msg: impl Into<String>) -> Self {
        Self::Database(msg.into())
    }
}

/// Failure reported by the abuse guard.
#[derive(Debug, Error)]
pub enum GuardError {
    /// The guard backend could not be reached.
    #[error("abuse guard unavailable: {0}")]
    Unavailable(String),
}

/// Failure reported by the actor resolver.
#[derive(Debug, Error)]
pub enum ActorError {
    /// No authenticated session.
    #[error("no authenticated session")]
    Unauthenticated,

    /// The session is not attached to an organization branch.
    #[error("user is not assigned to a branch")]
    NoBranch,

    /// Session lookup failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors returned by the payment pipeline.
#[derive(Debug, Error)]
pub enum PaymentError {
    // ========== Request Errors ==========
    /// Malformed or missing request fields.
    #[error("Validation error: {0}")]
    Validation(String),

    /// No authenticated actor.
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Cross-organization or cross-branch access.
    #[error("Access denied: {0}")]
    Authorization(String),

    /// A referenced entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Entity kind.
        entity: &'static str,
        /// Requested id.
        id: String,
    },

    /// Batch or transaction state forbids the posting.
    #[error("Invalid state: {0}")]
    State(String),

    // ========== Posting Rule Errors ==========
    /// Withdrawal larger than the available balance.
    #[error("Insufficient balance: available {available}, required {required}")]
    InsufficientBalance {
        /// Current balance.
        available: Decimal,
        /// Requested amount.
        required: Decimal,
    },

    /// Loan payment larger than the outstanding balance.
    #[error("Payment {payment} exceeds outstanding loan balance {balance}")]
    Overpayment {
        /// Outstanding balance.
        balance: Decimal,
        /// Payment amount.
        payment: Decimal,
    },

    /// New balance outside the account's bounds.
    #[error("Balance {balance} is outside the allowed range [{min}, {max}]")]
    LimitExceeded {
        /// Balance the posting would produce.
        balance: Decimal,
        /// Configured minimum.
        min: Decimal,
        /// Configured maximum.
        max: Decimal,
    },

    // ========== Infrastructure Errors ==========
    /// Caller is blocked after repeated failures.
    #[error("Too many failed requests, try again later")]
    RateLimited,

    /// Temporary failure of a collaborator.
    #[error("Temporary failure: {0}")]
    Transient(String),

    /// Storage failure. The unit of work was rolled back.
    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
}

impl PaymentError {
    /// Create a not found error.
    #[must_use]
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Authentication(_) => "AUTHENTICATION_ERROR",
            Self::Authorization(_) => "AUTHORIZATION_ERROR",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::State(_) => "INVALID_STATE",
            Self::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            Self::Overpayment { .. } => "OVERPAYMENT",
            Self::LimitExceeded { .. } => "LIMIT_EXCEEDED",
            Self::RateLimited => "RATE_LIMITED",
            Self::Transient(_) => "TRANSIENT_ERROR",
            Self::Storage(_) => "STORAGE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::Authentication(_) => 401,
            Self::Authorization(_) => 403,
            Self::NotFound { .. } => 404,
            Self::State(_) => 409,
            Self::InsufficientBalance { .. }
            | Self::Overpayment { .. }
            | Self::LimitExceeded { .. } => 422,
            Self::RateLimited => 429,
            Self::Transient(_) => 503,
            Self::Storage(_) => 500,
        }
    }

    /// Returns true if the same request may succeed when retried.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transient(_) | Self::Storage(_))
    }
}

impl From<LedgerError> for PaymentError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::InsufficientBalance {
                available,
                required,
            } => Self::InsufficientBalance {
                available,
                required,
            },
            LedgerError::Overpayment { balance, payment } => Self::Overpayment { balance, payment },
            LedgerError::LimitExceeded { balance, min, max } => {
                Self::LimitExceeded { balance, min, max }
            }
            LedgerError::MissingAccount { .. }
            | LedgerError::Unbalanced { .. }
            | LedgerError::EmptyEntries
            | LedgerError::ZeroAmount
            | LedgerError::UnknownAccountType(_)
            | LedgerError::UnknownSource(_) => Self::Validation(err.to_string()),
        }
    }
}

impl From<BatchError> for PaymentError {
    fn from(err: BatchError) -> Self {
        Self::State(err.to_string())
    }
}

impl From<GuardError> for PaymentError {
    fn from(err: GuardError) -> Self {
        Self::Transient(err.to_string())
    }
}

impl From<ActorError> for PaymentError {
    fn from(err: ActorError) -> Self {
        match err {
            ActorError::Store(inner) => Self::Storage(inner),
            ActorError::Unauthenticated | ActorError::NoBranch => {
                Self::Authentication(err.to_string())
            }
        }
    }
}

impl From<PaymentError> for AppError {
    fn from(err: PaymentError) -> Self {
        let msg = err.to_string();
        match err {
            PaymentError::Validation(_) => Self::Validation(msg),
            PaymentError::Authentication(_) => Self::Unauthorized(msg),
            PaymentError::Authorization(_) => Self::Forbidden(msg),
            PaymentError::NotFound { .. } => Self::NotFound(msg),
            PaymentError::State(_) => Self::Conflict(msg),
            PaymentError::InsufficientBalance { .. }
            | PaymentError::Overpayment { .. }
            | PaymentError::LimitExceeded { .. } => Self::BusinessRule(msg),
            PaymentError::RateLimited => Self::RateLimited(msg),
            PaymentError::Transient(_) => Self::ExternalService(msg),
            PaymentError::Storage(_) => Self::Database(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_ledger_errors_map_onto_taxonomy() {
        let err: PaymentError = LedgerError::InsufficientBalance {
            available: dec!(10),
            required: dec!(20),
        }
        .into();
        assert_eq!(err.error_code(), "INSUFFICIENT_BALANCE");
        assert_eq!(err.http_status_code(), 422);

        let err: PaymentError = LedgerError::ZeroAmount.into();
        assert!(matches!(err, PaymentError::Validation(_)));
    }

    #[test]
    fn test_retryable() {
        assert!(PaymentError::Transient("timeout".into()).is_retryable());
        assert!(PaymentError::Storage(StoreError::database("gone")).is_retryable());
        assert!(!PaymentError::RateLimited.is_retryable());
        assert!(!PaymentError::State("closed".into()).is_retryable());
    }

    #[test]
    fn test_app_error_mapping() {
        let app: AppError = PaymentError::State("batch closed".into()).into();
        assert_eq!(app.status_code(), 409);

        let app: AppError = PaymentError::Overpayment {
            balance: dec!(100),
            payment: dec!(150),
        }
        .into();
        assert_eq!(app.error_code(), "BUSINESS_RULE_VIOLATION");

        let app: AppError = PaymentError::RateLimited.into();
        assert_eq!(app.status_code(), 429);

        let app: AppError = PaymentError::from(ActorError::Unauthenticated).into();
        assert_eq!(app.status_code(), 401);
    }
}
