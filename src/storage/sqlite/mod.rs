//! SQLite implementation of the storage traits.
//!
//! Statements are built with sea-query and bound through sea-query-binder, so
//! every value travels as a parameter.

mod admin_store;
mod content_store;
mod gamification_store;
mod impact_store;
mod order_store;
mod rma_store;
mod support_store;
mod user_store;

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use tracing::info;

use super::helpers::{opt_ts_from_text, ts_from_text};
use super::schema::SQLITE_SCHEMA;
use super::Result;
use crate::config::SqliteConfig;
use crate::models::{ParseEnumError, Timestamp};

/// SQLite-backed storage for every entity group.
#[derive(Clone)]
pub struct SqliteStorage {
    pool: SqlitePool,
}

impl SqliteStorage {
    /// Wrap an existing pool. Foreign keys must be enabled on its connections.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (creating if needed) the database described by `config`.
    pub async fn connect(config: &SqliteConfig) -> Result<Self> {
        let pool = if config.is_memory() {
            let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
            // A private in-memory database lives only as long as its connection.
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await?
        } else {
            if let Some(parent) = Path::new(&config.path).parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent).map_err(|e| {
                        super::StorageError::Database(format!(
                            "cannot create {}: {e}",
                            parent.display()
                        ))
                    })?;
                }
            }
            let options = SqliteConnectOptions::new()
                .filename(&config.path)
                .create_if_missing(true)
                .foreign_keys(true)
                .journal_mode(SqliteJournalMode::Wal)
                .busy_timeout(Duration::from_secs(5));
            SqlitePoolOptions::new()
                .max_connections(config.max_connections.max(1))
                .connect_with(options)
                .await?
        };

        info!(path = %config.path, "connected to sqlite");
        Ok(Self { pool })
    }

    /// Shortcut for a fresh private in-memory database.
    pub async fn in_memory() -> Result<Self> {
        Self::connect(&SqliteConfig::in_memory()).await
    }

    /// Create tables and indexes that do not exist yet.
    pub async fn init_schema(&self) -> Result<()> {
        for statement in SQLITE_SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn get_ts(row: &SqliteRow, column: &str) -> Result<Timestamp> {
    ts_from_text(&row.try_get::<String, _>(column)?)
}

fn get_opt_ts(row: &SqliteRow, column: &str) -> Result<Option<Timestamp>> {
    opt_ts_from_text(row.try_get(column)?)
}

/// Read a TEXT status column into its enum.
fn get_enum<T>(row: &SqliteRow, column: &str) -> Result<T>
where
    T: FromStr<Err = ParseEnumError>,
{
    Ok(row.try_get::<String, _>(column)?.parse()?)
}
