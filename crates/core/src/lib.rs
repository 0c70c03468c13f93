//! Core business logic for Coopbook.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, posting rules, and calculations live here.
//!
//! # Modules
//!
//! - `ledger` - Account-type rules, balance aggregation and running balances
//! - `loan` - Charge rates, automatic deductions, amortization, fines and interest
//! - `savings` - Daily-balance savings interest
//! - `batch` - Teller transaction batches and end-of-day reconciliation
//! - `payment` - The payment posting pipeline and its collaborator ports

pub mod batch;
pub mod ledger;
pub mod loan;
pub mod payment;
pub mod savings;
