//! Application configuration.
//!
//! Aggregates the per-concern sections into a single [`Config`] loaded from
//! YAML files and environment variables.

mod notifications;
mod scoring;
mod server;
mod storage;

pub use notifications::NotificationConfig;
pub use scoring::{BaseUnits, Multipliers, PillarWeights, ScoringConfig, TierConfig};
pub use server::ServerConfig;
pub use storage::{PostgresConfig, SqliteConfig, StorageConfig, StorageType};

use serde::Deserialize;

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";
/// Environment variable for configuration file path.
pub const CONFIG_ENV_VAR: &str = "REMAN_CONFIG";
/// Prefix for configuration environment variables.
pub const CONFIG_ENV_PREFIX: &str = "REMAN";
/// Environment variable for logging configuration.
pub const LOG_ENV_VAR: &str = "REMAN_LOG";
/// Environment variable for server port.
pub const PORT_ENV_VAR: &str = "PORT";
/// Environment variable for database URL.
pub const DATABASE_URL_ENV_VAR: &str = "DATABASE_URL";
/// Environment variable for the session signing secret.
pub const SESSION_SECRET_ENV_VAR: &str = "SESSION_SECRET";

/// Shortest accepted session secret, in bytes.
pub const MIN_SESSION_SECRET_LEN: usize = 32;

/// Main application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server, session and bootstrap settings.
    pub server: ServerConfig,
    /// Storage backend selection.
    pub storage: StorageConfig,
    /// RMA notification defaults.
    pub notifications: NotificationConfig,
    /// ESG score parameters.
    pub scoring: ScoringConfig,
}

impl Config {
    /// Load configuration from file and environment.
    ///
    /// Configuration sources (in order of priority, later overrides earlier):
    /// 1. `config.yaml` in current directory (if exists)
    /// 2. File specified by `path` argument (if provided)
    /// 3. File specified by `CONFIG_ENV_VAR` environment variable (if set)
    /// 4. Environment variables with `CONFIG_ENV_PREFIX` prefix
    /// 5. `DATABASE_URL`, `SESSION_SECRET` and `PORT`
    pub fn load(path: Option<&str>) -> Result<Self, Box<dyn std::error::Error>> {
        use ::config::{Config as ConfigLib, Environment, File, FileFormat};

        let mut builder = ConfigLib::builder()
            .add_source(File::new(DEFAULT_CONFIG_FILE, FileFormat::Yaml).required(false));

        if let Some(config_path) = path {
            builder = builder.add_source(File::new(config_path, FileFormat::Yaml).required(true));
        }

        if let Ok(config_path) = std::env::var(CONFIG_ENV_VAR) {
            builder = builder.add_source(File::new(&config_path, FileFormat::Yaml).required(true));
        }

        let config = builder
            .add_source(
                Environment::with_prefix(CONFIG_ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("notifications.admin_emails")
                    .try_parsing(true),
            )
            .build()?;

        let mut config: Config = config.try_deserialize()?;
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Apply the conventional unprefixed environment variables.
    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(url) = std::env::var(DATABASE_URL_ENV_VAR) {
            self.storage.apply_database_url(&url)?;
        }

        if let Ok(secret) = std::env::var(SESSION_SECRET_ENV_VAR) {
            self.server.session_secret = secret;
        }

        if let Ok(port) = std::env::var(PORT_ENV_VAR) {
            self.server.port = port
                .parse()
                .map_err(|_| ConfigError::InvalidPort(port.clone()))?;
        }

        Ok(())
    }

    /// Reject configurations the server cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.session_secret.len() < MIN_SESSION_SECRET_LEN {
            return Err(ConfigError::WeakSessionSecret(MIN_SESSION_SECRET_LEN));
        }
        if !(4..=31).contains(&self.server.bcrypt_cost) {
            return Err(ConfigError::InvalidBcryptCost(self.server.bcrypt_cost));
        }
        self.scoring.validate()
    }

    /// Create config for testing: in-memory storage, a fixed secret and the
    /// cheapest bcrypt cost.
    pub fn for_test() -> Self {
        let mut config = Self::default();
        config.storage.storage_type = StorageType::Memory;
        config.server.session_secret = "test-secret-test-secret-test-secret!".to_string();
        config.server.bcrypt_cost = 4;
        config
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("session secret must be at least {0} bytes")]
    WeakSessionSecret(usize),

    #[error("bcrypt cost must be between 4 and 31, got {0}")]
    InvalidBcryptCost(u32),

    #[error("invalid port: {0}")]
    InvalidPort(String),

    #[error("unsupported database URL scheme: {0}")]
    UnsupportedDatabaseUrl(String),

    #[error("invalid scoring configuration: {0}")]
    InvalidScoring(String),
}
