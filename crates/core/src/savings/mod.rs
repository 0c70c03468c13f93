//! Savings interest engine.
//!
//! Reduces a month of daily balances to interest, withholding tax and an
//! ending balance, with per-amount rate bands and a below-minimum charge.

pub mod interest;
pub mod rate;

pub use interest::{
    MIN_DAILY_SAMPLES, SavingsInterestResult, SavingsReduction, compute_savings_interest,
};
pub use rate::{
    InterestRateBand, SavingsInterestPolicy, apply_minimum_balance_charge,
    compute_member_interest, resolve_rate_by_amount,
};
