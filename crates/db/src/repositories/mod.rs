//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.

pub mod batch;
pub mod ledger;
mod mapping;
pub mod payment_store;

pub use batch::{BatchRepository, BatchRepositoryError};
pub use ledger::{LedgerQueryError, LedgerRepository};
pub use payment_store::{PgPaymentStore, PgUnitOfWork};
