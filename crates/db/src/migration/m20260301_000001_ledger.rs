//! Ledger schema: bookings, finance documents, FX rates, snapshots.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(ENUMS_SQL).await?;
        db.execute_unprepared(REFERENCE_SQL).await?;
        db.execute_unprepared(LEDGER_SQL).await?;
        db.execute_unprepared(CACHE_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_SQL).await?;
        Ok(())
    }
}

const ENUMS_SQL: &str = r"
CREATE TYPE transaction_side AS ENUM ('income', 'expense');
CREATE TYPE transaction_status AS ENUM ('planned', 'actual', 'reconciled');
CREATE TYPE allocation_status AS ENUM ('planned', 'posted');
CREATE TYPE cache_run_status AS ENUM ('running', 'done', 'error');
";

const REFERENCE_SQL: &str = r#"
CREATE TABLE finance_accounts (
    id UUID PRIMARY KEY,
    name VARCHAR(255) NOT NULL,
    currency VARCHAR(3) NOT NULL DEFAULT 'EUR',
    opening_balance NUMERIC(19, 4) NOT NULL DEFAULT 0
);

CREATE TABLE finance_categories (
    id UUID PRIMARY KEY,
    name VARCHAR(255) NOT NULL,
    is_agent_commission BOOLEAN NOT NULL DEFAULT FALSE
);

CREATE TABLE finance_counterparties (
    id UUID PRIMARY KEY,
    name VARCHAR(255) NOT NULL
);

-- One document per effective date; rates are {currency: rate}, 1 base = rate currency
CREATE TABLE finance_fx_rates (
    date DATE PRIMARY KEY,
    base VARCHAR(3) NOT NULL DEFAULT 'EUR',
    rates JSONB NOT NULL DEFAULT '{}'::jsonb
);

CREATE TABLE bookings (
    id UUID PRIMARY KEY,
    booking_number VARCHAR(64) NOT NULL,
    operator VARCHAR(255) NOT NULL DEFAULT '',
    agent VARCHAR(255),
    created_on DATE NOT NULL,
    check_in DATE,
    payment_method VARCHAR(16) NOT NULL DEFAULT 'card',
    gross_client_price NUMERIC(19, 4) NOT NULL DEFAULT 0,
    internal_net NUMERIC(19, 4),
    supplier_net NUMERIC(19, 4),
    operator_gross NUMERIC(19, 4),
    pooled_base VARCHAR(16),
    commission JSONB NOT NULL DEFAULT '{"state": "pending"}'::jsonb,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_pooled_base CHECK (pooled_base IS NULL OR pooled_base IN ('igor', 'evgeniy', 'company'))
);

CREATE INDEX idx_bookings_created_on ON bookings(created_on);
CREATE INDEX idx_bookings_check_in ON bookings(check_in);

CREATE TABLE owner_withdrawals (
    id UUID PRIMARY KEY,
    date DATE NOT NULL,
    founder VARCHAR(16) NOT NULL,
    amount NUMERIC(19, 4) NOT NULL,
    CONSTRAINT chk_withdrawal_positive CHECK (amount > 0)
);
"#;

const LEDGER_SQL: &str = r"
CREATE TABLE finance_transactions (
    id UUID PRIMARY KEY,
    date DATE NOT NULL,
    side transaction_side NOT NULL,
    status transaction_status NOT NULL DEFAULT 'actual',
    account_id UUID NOT NULL REFERENCES finance_accounts(id),
    currency VARCHAR(3) NOT NULL,
    amount NUMERIC(19, 4) NOT NULL,
    base_amount NUMERIC(19, 4) NOT NULL DEFAULT 0,
    remaining_to_allocate NUMERIC(19, 4) NOT NULL DEFAULT 0,
    category_id UUID REFERENCES finance_categories(id),
    counterparty_id UUID REFERENCES finance_counterparties(id),
    owner_who VARCHAR(16),
    note TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_transaction_positive CHECK (amount > 0),
    CONSTRAINT chk_owner_on_expense CHECK (owner_who IS NULL OR side = 'expense')
);

CREATE INDEX idx_finance_transactions_date ON finance_transactions(date);
CREATE INDEX idx_finance_transactions_account ON finance_transactions(account_id);

-- Orders: one slice of a transaction assigned to one booking
CREATE TABLE finance_allocations (
    id UUID PRIMARY KEY,
    transaction_id UUID NOT NULL REFERENCES finance_transactions(id) ON DELETE CASCADE,
    booking_id UUID NOT NULL,
    date DATE NOT NULL,
    side transaction_side NOT NULL,
    amount NUMERIC(19, 4) NOT NULL,
    status allocation_status NOT NULL DEFAULT 'posted',
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_allocation_positive CHECK (amount > 0)
);

CREATE INDEX idx_finance_allocations_transaction ON finance_allocations(transaction_id);
CREATE INDEX idx_finance_allocations_booking ON finance_allocations(booking_id);
CREATE INDEX idx_finance_allocations_date ON finance_allocations(date);
";

const CACHE_SQL: &str = r"
CREATE TABLE report_snapshots (
    kind VARCHAR(16) NOT NULL,
    key VARCHAR(64) NOT NULL,
    payload JSONB NOT NULL,
    built_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    PRIMARY KEY (kind, key)
);

CREATE TABLE cache_runs (
    kind VARCHAR(16) PRIMARY KEY,
    status cache_run_status NOT NULL,
    started_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    finished_at TIMESTAMPTZ,
    error TEXT
);
";

const DROP_SQL: &str = r"
DROP TABLE IF EXISTS cache_runs CASCADE;
DROP TABLE IF EXISTS report_snapshots CASCADE;
DROP TABLE IF EXISTS finance_allocations CASCADE;
DROP TABLE IF EXISTS finance_transactions CASCADE;
DROP TABLE IF EXISTS owner_withdrawals CASCADE;
DROP TABLE IF EXISTS bookings CASCADE;
DROP TABLE IF EXISTS finance_fx_rates CASCADE;
DROP TABLE IF EXISTS finance_counterparties CASCADE;
DROP TABLE IF EXISTS finance_categories CASCADE;
DROP TABLE IF EXISTS finance_accounts CASCADE;
DROP TYPE IF EXISTS cache_run_status;
DROP TYPE IF EXISTS allocation_status;
DROP TYPE IF EXISTS transaction_status;
DROP TYPE IF EXISTS transaction_side;
";
