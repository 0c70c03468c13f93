//! Database layer with `SeaORM` entities and repositories.
//!
//! This crate provides:
//! - `SeaORM` entity definitions for the posting core tables
//! - `PgPaymentStore`, the PostgreSQL adapter of the payment storage ports
//! - Ledger and batch repositories
//! - Database migrations

pub mod entities;
pub mod migration;
pub mod repositories;

pub use repositories::{BatchRepository, LedgerRepository, PgPaymentStore, PgUnitOfWork};

use coopbook_shared::config::DatabaseConfig;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

/// Builds pool options from the database section of the application config.
#[must_use]
pub fn connect_options(config: &DatabaseConfig) -> ConnectOptions {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .sqlx_logging(false);
    options
}

/// Establishes a pooled connection to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    Database::connect(connect_options(config)).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_options_carry_pool_bounds() {
        let config = DatabaseConfig {
            url: "postgres://localhost/coopbook".to_string(),
            max_connections: 25,
            min_connections: 4,
        };

        let options = connect_options(&config);

        assert_eq!(options.get_url(), "postgres://localhost/coopbook");
        assert_eq!(options.get_max_connections(), Some(25));
        assert_eq!(options.get_min_connections(), Some(4));
    }
}
