//! `SeaORM` entities for the posting core tables.

pub mod accounts;
pub mod general_ledgers;
pub mod member_accounting_ledgers;
pub mod member_profiles;
pub mod payment_types;
pub mod transaction_batches;
pub mod transactions;
pub mod user_organizations;
