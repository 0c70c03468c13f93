//! Shared types, errors, and configuration for Coopbook.
//!
//! This crate provides common types used across all other crates:
//! - Typed IDs for type-safe entity references
//! - Decimal boundary helpers for monetary amounts
//! - Application-wide error types
//! - Configuration management
//! - Tracing subscriber bootstrap

pub mod config;
pub mod error;
pub mod telemetry;
pub mod types;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
