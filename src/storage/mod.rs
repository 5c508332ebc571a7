//! Storage implementations.
//!
//! One async trait per entity group, combined into the [`Storage`] supertrait
//! that handlers hold as `Arc<dyn Storage>`. Backends:
//! - `sqlite`: sea-query statements bound into sqlx (feature `sqlite`)
//! - `postgres`: hand-written parameterized SQL (feature `postgres`)
//! - `mock`: in-memory tables for tests and `memory` mode

use std::sync::Arc;

use tracing::info;

use crate::config::{StorageConfig, StorageType};

pub mod admin_store;
pub mod content_store;
pub mod gamification_store;
pub mod helpers;
pub mod impact_store;
pub mod mock;
pub mod order_store;
pub mod rma_store;
pub mod support_store;
pub mod user_store;

#[cfg(feature = "sqlite")]
pub mod schema;
#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "postgres")]
pub mod postgres;

pub use admin_store::AdminStore;
pub use content_store::ContentStore;
pub use gamification_store::GamificationStore;
pub use impact_store::ImpactStore;
pub use mock::MockStorage;
pub use order_store::OrderStore;
pub use rma_store::RmaStore;
pub use support_store::SupportStore;
pub use user_store::UserStore;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStorage;

#[cfg(feature = "postgres")]
pub use postgres::PostgresStorage;

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors from storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("record not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

#[cfg(any(feature = "sqlite", feature = "postgres"))]
impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StorageError::NotFound,
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                StorageError::Conflict(db.message().to_string())
            }
            other => StorageError::Database(other.to_string()),
        }
    }
}

#[cfg(feature = "sqlite")]
impl From<sea_query::error::Error> for StorageError {
    fn from(err: sea_query::error::Error) -> Self {
        StorageError::Database(err.to_string())
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

impl From<crate::models::ParseEnumError> for StorageError {
    fn from(err: crate::models::ParseEnumError) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

impl From<chrono::ParseError> for StorageError {
    fn from(err: chrono::ParseError) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

/// Everything the portal persists.
///
/// Blanket-implemented for any type implementing every entity-group trait,
/// so backends only implement the parts.
pub trait Storage:
    UserStore
    + OrderStore
    + RmaStore
    + SupportStore
    + ContentStore
    + ImpactStore
    + GamificationStore
    + AdminStore
    + Send
    + Sync
    + 'static
{
}

impl<T> Storage for T where
    T: UserStore
        + OrderStore
        + RmaStore
        + SupportStore
        + ContentStore
        + ImpactStore
        + GamificationStore
        + AdminStore
        + Send
        + Sync
        + 'static
{
}

/// Initialize storage based on configuration.
///
/// Connects, creates tables if missing, and returns the backend as a trait
/// object.
pub async fn init_storage(
    config: &StorageConfig,
) -> std::result::Result<Arc<dyn Storage>, Box<dyn std::error::Error + Send + Sync>> {
    info!(storage = %config.storage_type, "initializing storage");

    match config.storage_type {
        StorageType::Memory => Ok(Arc::new(MockStorage::new())),
        #[cfg(feature = "sqlite")]
        StorageType::Sqlite => {
            let store = SqliteStorage::connect(&config.sqlite).await?;
            store.init_schema().await?;
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "sqlite"))]
        StorageType::Sqlite => {
            tracing::error!("SQLite storage requested but 'sqlite' feature is not enabled");
            Err("sqlite feature not enabled".into())
        }
        #[cfg(feature = "postgres")]
        StorageType::Postgres => {
            let store = PostgresStorage::connect(&config.postgres).await?;
            store.init_schema().await?;
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "postgres"))]
        StorageType::Postgres => {
            tracing::error!("PostgreSQL storage requested but 'postgres' feature is not enabled");
            Err("postgres feature not enabled".into())
        }
    }
}
