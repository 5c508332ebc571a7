//! Storage configuration types.

use serde::Deserialize;

use super::ConfigError;

/// Storage type discriminator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageType {
    #[default]
    Sqlite,
    Postgres,
    Memory,
}

impl std::fmt::Display for StorageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageType::Sqlite => write!(f, "sqlite"),
            StorageType::Postgres => write!(f, "postgres"),
            StorageType::Memory => write!(f, "memory"),
        }
    }
}

/// Storage configuration (discriminated union).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Storage type discriminator.
    #[serde(rename = "type")]
    pub storage_type: StorageType,
    /// SQLite-specific configuration.
    pub sqlite: SqliteConfig,
    /// PostgreSQL-specific configuration.
    pub postgres: PostgresConfig,
}

impl StorageConfig {
    /// Point the backend at a `DATABASE_URL`, picking the type from its scheme.
    pub fn apply_database_url(&mut self, url: &str) -> Result<(), ConfigError> {
        if url.starts_with("postgres://") || url.starts_with("postgresql://") {
            self.storage_type = StorageType::Postgres;
            self.postgres.uri = url.to_string();
        } else if let Some(path) = url.strip_prefix("sqlite:") {
            self.storage_type = StorageType::Sqlite;
            self.sqlite.path = path.trim_start_matches("//").to_string();
        } else {
            return Err(ConfigError::UnsupportedDatabaseUrl(url.to_string()));
        }
        Ok(())
    }
}

/// SQLite-specific configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SqliteConfig {
    /// Database file path, or `:memory:`.
    pub path: String,
    pub max_connections: u32,
}

impl Default for SqliteConfig {
    fn default() -> Self {
        Self {
            path: "./data/reman.db".to_string(),
            max_connections: 5,
        }
    }
}

impl SqliteConfig {
    pub fn in_memory() -> Self {
        Self {
            path: ":memory:".to_string(),
            max_connections: 1,
        }
    }

    pub fn is_memory(&self) -> bool {
        self.path == ":memory:"
    }
}

/// PostgreSQL-specific configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PostgresConfig {
    /// PostgreSQL connection URI.
    pub uri: String,
    pub max_connections: u32,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            uri: "postgres://localhost:5432/reman".to_string(),
            max_connections: 10,
        }
    }
}
