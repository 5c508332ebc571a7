//! PostgreSQL implementation of the storage traits.
//!
//! Hand-written SQL with positional parameters. Timestamps are `TIMESTAMPTZ`,
//! JSON documents are `JSONB`; partial updates use `COALESCE($n, column)` so a
//! NULL parameter leaves the column untouched.

mod admin_store;
mod content_store;
mod gamification_store;
mod impact_store;
mod order_store;
mod rma_store;
mod support_store;
mod user_store;

use std::str::FromStr;

use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use tracing::info;

use super::Result;
use crate::config::PostgresConfig;
use crate::models::ParseEnumError;

const SCHEMA: &[&str] = &[
    r#"
CREATE TABLE IF NOT EXISTS users (
    id BIGSERIAL PRIMARY KEY,
    email TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    name TEXT NOT NULL,
    company TEXT,
    phone TEXT,
    role TEXT NOT NULL,
    status TEXT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL,
    deleted_at TIMESTAMPTZ
)"#,
    r#"
CREATE TABLE IF NOT EXISTS orders (
    id BIGSERIAL PRIMARY KEY,
    order_number TEXT NOT NULL UNIQUE,
    user_id BIGINT NOT NULL REFERENCES users(id),
    status TEXT NOT NULL,
    order_date TIMESTAMPTZ NOT NULL,
    total_cents BIGINT NOT NULL,
    currency TEXT NOT NULL,
    shipping_address TEXT,
    tracking_number TEXT,
    notes TEXT,
    created_at TIMESTAMPTZ NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL
)"#,
    "CREATE INDEX IF NOT EXISTS idx_orders_user ON orders(user_id)",
    r#"
CREATE TABLE IF NOT EXISTS order_items (
    id BIGSERIAL PRIMARY KEY,
    order_id BIGINT NOT NULL REFERENCES orders(id) ON DELETE CASCADE,
    product_name TEXT NOT NULL,
    sku TEXT,
    serial_number TEXT,
    quantity INTEGER NOT NULL,
    unit_price_cents BIGINT NOT NULL,
    warranty_months INTEGER NOT NULL
)"#,
    "CREATE INDEX IF NOT EXISTS idx_order_items_order ON order_items(order_id)",
    "CREATE INDEX IF NOT EXISTS idx_order_items_serial ON order_items(serial_number)",
    r#"
CREATE TABLE IF NOT EXISTS delivery_timelines (
    id BIGSERIAL PRIMARY KEY,
    order_id BIGINT NOT NULL REFERENCES orders(id) ON DELETE CASCADE,
    stage TEXT NOT NULL,
    description TEXT,
    occurred_at TIMESTAMPTZ NOT NULL,
    created_at TIMESTAMPTZ NOT NULL
)"#,
    r#"
CREATE TABLE IF NOT EXISTS rmas (
    id BIGSERIAL PRIMARY KEY,
    rma_number TEXT NOT NULL UNIQUE,
    user_id BIGINT NOT NULL REFERENCES users(id),
    order_id BIGINT REFERENCES orders(id) ON DELETE SET NULL,
    status TEXT NOT NULL,
    contact_name TEXT NOT NULL,
    contact_email TEXT NOT NULL,
    contact_phone TEXT,
    reason TEXT NOT NULL,
    notes TEXT,
    created_at TIMESTAMPTZ NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL
)"#,
    "CREATE INDEX IF NOT EXISTS idx_rmas_user ON rmas(user_id)",
    r#"
CREATE TABLE IF NOT EXISTS rma_items (
    id BIGSERIAL PRIMARY KEY,
    rma_id BIGINT NOT NULL REFERENCES rmas(id) ON DELETE CASCADE,
    product_name TEXT NOT NULL,
    serial_number TEXT,
    fault_description TEXT NOT NULL,
    quantity INTEGER NOT NULL
)"#,
    r#"
CREATE TABLE IF NOT EXISTS rma_request_logs (
    id BIGSERIAL PRIMARY KEY,
    rma_id BIGINT NOT NULL REFERENCES rmas(id) ON DELETE CASCADE,
    user_id BIGINT NOT NULL,
    payload JSONB NOT NULL,
    status TEXT NOT NULL,
    webhook_status INTEGER,
    email_notified BOOLEAN NOT NULL DEFAULT FALSE,
    notification_error TEXT,
    created_at TIMESTAMPTZ NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL
)"#,
    r#"
CREATE TABLE IF NOT EXISTS support_tickets (
    id BIGSERIAL PRIMARY KEY,
    user_id BIGINT NOT NULL REFERENCES users(id),
    subject TEXT NOT NULL,
    message TEXT NOT NULL,
    status TEXT NOT NULL,
    priority TEXT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL
)"#,
    r#"
CREATE TABLE IF NOT EXISTS case_studies (
    id BIGSERIAL PRIMARY KEY,
    title TEXT NOT NULL,
    slug TEXT NOT NULL UNIQUE,
    summary TEXT NOT NULL,
    body TEXT NOT NULL,
    image_url TEXT,
    published BOOLEAN NOT NULL DEFAULT FALSE,
    created_at TIMESTAMPTZ NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL
)"#,
    r#"
CREATE TABLE IF NOT EXISTS water_projects (
    id BIGSERIAL PRIMARY KEY,
    name TEXT NOT NULL,
    location TEXT NOT NULL,
    description TEXT NOT NULL,
    liters_provided BIGINT NOT NULL,
    families_helped BIGINT NOT NULL,
    status TEXT NOT NULL,
    image_url TEXT,
    created_at TIMESTAMPTZ NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL
)"#,
    r#"
CREATE TABLE IF NOT EXISTS environmental_impact (
    id BIGSERIAL PRIMARY KEY,
    user_id BIGINT NOT NULL REFERENCES users(id),
    order_id BIGINT REFERENCES orders(id) ON DELETE SET NULL,
    carbon_kg DOUBLE PRECISION NOT NULL,
    water_liters DOUBLE PRECISION NOT NULL,
    minerals_kg DOUBLE PRECISION NOT NULL,
    families_helped BIGINT NOT NULL,
    recorded_at TIMESTAMPTZ NOT NULL,
    created_at TIMESTAMPTZ NOT NULL
)"#,
    "CREATE INDEX IF NOT EXISTS idx_impact_user ON environmental_impact(user_id)",
    r#"
CREATE TABLE IF NOT EXISTS achievements (
    id BIGSERIAL PRIMARY KEY,
    code TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL,
    description TEXT NOT NULL,
    metric TEXT NOT NULL,
    threshold DOUBLE PRECISION NOT NULL,
    points INTEGER NOT NULL
)"#,
    r#"
CREATE TABLE IF NOT EXISTS milestones (
    id BIGSERIAL PRIMARY KEY,
    name TEXT NOT NULL,
    description TEXT NOT NULL,
    target_score BIGINT NOT NULL,
    reward TEXT,
    sort_order INTEGER NOT NULL
)"#,
    r#"
CREATE TABLE IF NOT EXISTS user_progress (
    id BIGSERIAL PRIMARY KEY,
    user_id BIGINT NOT NULL REFERENCES users(id),
    achievement_id BIGINT NOT NULL REFERENCES achievements(id) ON DELETE CASCADE,
    progress DOUBLE PRECISION NOT NULL,
    completed BOOLEAN NOT NULL,
    completed_at TIMESTAMPTZ,
    updated_at TIMESTAMPTZ NOT NULL,
    UNIQUE (user_id, achievement_id)
)"#,
    r#"
CREATE TABLE IF NOT EXISTS api_keys (
    id BIGSERIAL PRIMARY KEY,
    name TEXT NOT NULL,
    key_prefix TEXT NOT NULL,
    key_hash TEXT NOT NULL UNIQUE,
    permissions JSONB NOT NULL,
    active BOOLEAN NOT NULL,
    last_used_at TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL
)"#,
    r#"
CREATE TABLE IF NOT EXISTS system_settings (
    key TEXT PRIMARY KEY,
    value JSONB NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL
)"#,
];

/// PostgreSQL-backed storage for every entity group.
#[derive(Clone)]
pub struct PostgresStorage {
    pool: PgPool,
}

impl PostgresStorage {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(config: &PostgresConfig) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections.max(1))
            .connect(&config.uri)
            .await?;
        info!("connected to postgres");
        Ok(Self { pool })
    }

    /// Create tables and indexes that do not exist yet.
    pub async fn init_schema(&self) -> Result<()> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Read a TEXT status column into its enum.
fn get_enum<T>(row: &PgRow, column: &str) -> Result<T>
where
    T: FromStr<Err = ParseEnumError>,
{
    Ok(row.try_get::<String, _>(column)?.parse()?)
}

/// Map "no row touched" to `NotFound`.
fn expect_affected(result: sqlx::postgres::PgQueryResult) -> Result<()> {
    if result.rows_affected() == 0 {
        return Err(super::StorageError::NotFound);
    }
    Ok(())
}
