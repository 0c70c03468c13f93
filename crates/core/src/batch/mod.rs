//! Teller transaction batches.
//!
//! - `BatchHandle`, the batch resolved once per request
//! - Batch balance check
//! - End-of-day remittance reconciliation

pub mod handle;
pub mod reconciliation;

pub use handle::{BatchError, BatchHandle, TransactionBatch, is_batch_balanced};
pub use reconciliation::{
    BatchFigures, BatchReconciliation, CashCountLine, reconcile_batch, total_cash_count,
};
