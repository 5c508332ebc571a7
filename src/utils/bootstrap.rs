//! Bootstrap utilities for the portal binary.
//!
//! Startup code kept out of `main` so it can be tested.

use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::auth::hash_password;
use crate::config::{ServerConfig, LOG_ENV_VAR};
use crate::models::user::normalize_email;
use crate::models::{NewUser, Role, User, UserStatus};
use crate::storage::{Storage, StorageError};

/// Initialize tracing with the REMAN_LOG environment variable.
///
/// Defaults to "info" level if REMAN_LOG is not set.
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_env(LOG_ENV_VAR)
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Value of `--config <path>` or `--config=<path>`, if present.
pub fn config_path_from_args<I>(args: I) -> Option<String>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        if arg == "--config" || arg == "-c" {
            return args.next();
        }
        if let Some(path) = arg.strip_prefix("--config=") {
            return Some(path.to_string());
        }
    }
    None
}

#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),
}

/// Create the configured admin account if no user holds that email.
///
/// Returns the created user, or `None` when nothing was configured or the
/// account already exists. An existing account is never modified.
pub async fn bootstrap_admin(
    storage: &dyn Storage,
    server: &ServerConfig,
) -> Result<Option<User>, BootstrapError> {
    let (Some(email), Some(password)) = (
        server.bootstrap_admin_email.as_deref(),
        server.bootstrap_admin_password.as_deref(),
    ) else {
        if server.bootstrap_admin_email.is_some() {
            warn!("bootstrap admin email set without a password; skipping");
        }
        return Ok(None);
    };

    let email = normalize_email(email);
    if storage.find_user_by_email(&email).await?.is_some() {
        return Ok(None);
    }

    let created = storage
        .create_user(NewUser {
            email,
            password_hash: hash_password(password, server.bcrypt_cost)?,
            name: "Administrator".to_string(),
            company: None,
            phone: None,
            role: Role::Admin,
            status: UserStatus::Active,
        })
        .await;
    let user = match created {
        Ok(user) => user,
        // A soft-deleted account still holds the address.
        Err(StorageError::Conflict(reason)) => {
            warn!(%reason, "bootstrap admin email is taken; skipping");
            return Ok(None);
        }
        Err(e) => return Err(e.into()),
    };
    info!(user = user.id, email = %user.email, "bootstrap admin created");
    Ok(Some(user))
}
