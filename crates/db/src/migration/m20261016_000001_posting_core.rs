//! Initial database migration.
//!
//! Creates the posting core tables: accounts, teller batches, transactions,
//! the general ledger, the per-member balance cache and the reference rows
//! the posting pipeline resolves. Money columns are unconstrained `NUMERIC`.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: REFERENCE DATA
        // ============================================================
        db.execute_unprepared(USER_ORGANIZATIONS_SQL).await?;
        db.execute_unprepared(MEMBER_PROFILES_SQL).await?;
        db.execute_unprepared(PAYMENT_TYPES_SQL).await?;

        // ============================================================
        // PART 2: CHART OF ACCOUNTS
        // ============================================================
        db.execute_unprepared(ACCOUNTS_SQL).await?;

        // ============================================================
        // PART 3: BATCHES, TRANSACTIONS & LEDGER
        // ============================================================
        db.execute_unprepared(TRANSACTION_BATCHES_SQL).await?;
        db.execute_unprepared(TRANSACTIONS_SQL).await?;
        db.execute_unprepared(GENERAL_LEDGERS_SQL).await?;
        db.execute_unprepared(MEMBER_ACCOUNTING_LEDGERS_SQL).await?;

        // ============================================================
        // PART 4: INDEXES
        // ============================================================
        db.execute_unprepared(INDEXES_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const USER_ORGANIZATIONS_SQL: &str = r"
CREATE TABLE user_organizations (
    id              UUID PRIMARY KEY,
    user_id         UUID NOT NULL,
    organization_id UUID NOT NULL,
    branch_id       UUID NOT NULL,
    user_type       TEXT NOT NULL CHECK (user_type IN ('owner', 'employee', 'member')),
    or_start        BIGINT NOT NULL DEFAULT 0,
    or_end          BIGINT NOT NULL DEFAULT 0,
    or_used         BIGINT NOT NULL DEFAULT 0,
    created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    UNIQUE (user_id, organization_id, branch_id)
);
";

const MEMBER_PROFILES_SQL: &str = r"
CREATE TABLE member_profiles (
    id              UUID PRIMARY KEY,
    organization_id UUID NOT NULL,
    branch_id       UUID NOT NULL,
    full_name       TEXT NOT NULL,
    created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const PAYMENT_TYPES_SQL: &str = r"
CREATE TABLE payment_types (
    id              UUID PRIMARY KEY,
    organization_id UUID NOT NULL,
    name            TEXT NOT NULL,
    created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const ACCOUNTS_SQL: &str = r"
CREATE TABLE accounts (
    id                  UUID PRIMARY KEY,
    organization_id     UUID NOT NULL,
    branch_id           UUID NOT NULL,
    name                TEXT NOT NULL,
    account_type        TEXT NOT NULL CHECK (account_type IN (
        'Deposit', 'Time Deposit', 'Loan', 'A/R-Ledger', 'A/R-Aging', 'Fines',
        'Interest', 'SVF-Ledger', 'W-Off', 'A/P-Ledger', 'Other'
    )),
    general_ledger_type TEXT CHECK (general_ledger_type IN (
        'Assets', 'Liabilities', 'Equity', 'Revenue', 'Expenses'
    )),
    currency_id         UUID,
    min_amount          NUMERIC NOT NULL DEFAULT 0,
    max_amount          NUMERIC NOT NULL DEFAULT 0,
    grace_daily         NUMERIC NOT NULL DEFAULT 0,
    grace_weekly        NUMERIC NOT NULL DEFAULT 0,
    grace_semi_monthly  NUMERIC NOT NULL DEFAULT 0,
    grace_monthly       NUMERIC NOT NULL DEFAULT 0,
    grace_quarterly     NUMERIC NOT NULL DEFAULT 0,
    grace_semi_annual   NUMERIC NOT NULL DEFAULT 0,
    grace_lumpsum       NUMERIC NOT NULL DEFAULT 0,
    created_at          TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at          TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const TRANSACTION_BATCHES_SQL: &str = r"
CREATE TABLE transaction_batches (
    id                UUID PRIMARY KEY,
    organization_id   UUID NOT NULL,
    branch_id         UUID NOT NULL,
    employee_user_id  UUID NOT NULL,
    beginning_balance NUMERIC NOT NULL DEFAULT 0,
    is_closed         BOOLEAN NOT NULL DEFAULT FALSE,
    created_at        TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at        TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const TRANSACTIONS_SQL: &str = r"
CREATE TABLE transactions (
    id                      UUID PRIMARY KEY,
    organization_id         UUID NOT NULL,
    branch_id               UUID NOT NULL,
    transaction_batch_id    UUID NOT NULL REFERENCES transaction_batches(id),
    member_profile_id       UUID REFERENCES member_profiles(id),
    member_joint_account_id UUID,
    employee_user_id        UUID NOT NULL,
    reference_number        TEXT,
    description             TEXT,
    source                  TEXT NOT NULL CHECK (source IN ('payment', 'deposit', 'withdraw')),
    amount                  NUMERIC NOT NULL DEFAULT 0,
    created_at              TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at              TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const GENERAL_LEDGERS_SQL: &str = r"
CREATE TABLE general_ledgers (
    id                        UUID PRIMARY KEY,
    organization_id           UUID NOT NULL,
    branch_id                 UUID NOT NULL,
    account_id                UUID NOT NULL REFERENCES accounts(id),
    transaction_id            UUID REFERENCES transactions(id),
    transaction_batch_id      UUID REFERENCES transaction_batches(id),
    member_profile_id         UUID REFERENCES member_profiles(id),
    member_joint_account_id   UUID,
    employee_user_id          UUID,
    payment_type_id           UUID REFERENCES payment_types(id),
    bank_id                   UUID,
    proof_of_payment_media_id UUID,
    signature_media_id        UUID,
    source                    TEXT NOT NULL CHECK (source IN ('payment', 'deposit', 'withdraw')),
    reference_number          TEXT NOT NULL DEFAULT '',
    bank_reference_number     TEXT,
    description               TEXT,
    debit                     NUMERIC NOT NULL DEFAULT 0 CHECK (debit >= 0),
    credit                    NUMERIC NOT NULL DEFAULT 0 CHECK (credit >= 0),
    balance                   NUMERIC NOT NULL DEFAULT 0,
    entry_date                TIMESTAMPTZ NOT NULL,
    created_at                TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const MEMBER_ACCOUNTING_LEDGERS_SQL: &str = r"
CREATE TABLE member_accounting_ledgers (
    id                UUID PRIMARY KEY,
    member_profile_id UUID NOT NULL REFERENCES member_profiles(id),
    account_id        UUID NOT NULL REFERENCES accounts(id),
    organization_id   UUID NOT NULL,
    branch_id         UUID NOT NULL,
    balance           NUMERIC NOT NULL DEFAULT 0,
    last_pay          TIMESTAMPTZ NOT NULL,
    updated_at        TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    UNIQUE (member_profile_id, account_id)
);
";

const INDEXES_SQL: &str = r"
CREATE INDEX idx_accounts_scope ON accounts(organization_id, branch_id);
CREATE INDEX idx_transaction_batches_teller
    ON transaction_batches(employee_user_id, organization_id, branch_id, created_at DESC);
CREATE INDEX idx_transactions_batch ON transactions(transaction_batch_id);
CREATE INDEX idx_general_ledgers_latest
    ON general_ledgers(account_id, organization_id, branch_id, member_profile_id, created_at DESC);
CREATE INDEX idx_general_ledgers_batch ON general_ledgers(transaction_batch_id);
CREATE INDEX idx_general_ledgers_transaction ON general_ledgers(transaction_id);
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS member_accounting_ledgers CASCADE;
DROP TABLE IF EXISTS general_ledgers CASCADE;
DROP TABLE IF EXISTS transactions CASCADE;
DROP TABLE IF EXISTS transaction_batches CASCADE;
DROP TABLE IF EXISTS accounts CASCADE;
DROP TABLE IF EXISTS payment_types CASCADE;
DROP TABLE IF EXISTS member_profiles CASCADE;
DROP TABLE IF EXISTS user_organizations CASCADE;
";
