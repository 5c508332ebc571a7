//! reman-portal: HTTP API server
//!
//! ## Configuration
//! ```yaml
//! server:
//!   port: 8080
//!   session_secret: "at-least-32-bytes-of-random-secret"
//!   cors_origins: ["https://portal.example.com"]
//!   bootstrap_admin_email: admin@example.com
//!   bootstrap_admin_password: change-me
//!
//! storage:
//!   type: sqlite
//!   sqlite:
//!     path: ./data/portal.db
//!
//! notifications:
//!   webhook_url: https://hooks.example.com/rma
//!   admin_emails: [ops@example.com]
//! ```
//!
//! `DATABASE_URL`, `SESSION_SECRET` and `PORT` override the file.

use std::sync::Arc;

use tracing::{error, info};

use reman_portal::config::Config;
use reman_portal::handlers::{serve, AppState};
use reman_portal::services::LogMailer;
use reman_portal::storage::init_storage;
use reman_portal::utils::bootstrap::{bootstrap_admin, config_path_from_args, init_tracing};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    init_tracing();

    let config_path = config_path_from_args(std::env::args().skip(1));
    let config = Config::load(config_path.as_deref()).map_err(|e| {
        error!(error = %e, "failed to load configuration");
        e.to_string()
    })?;
    config.validate()?;

    let storage = init_storage(&config.storage).await?;
    bootstrap_admin(&*storage, &config.server).await?;

    let state = AppState::new(&config, storage, Arc::new(LogMailer))?;

    info!(storage = %config.storage.storage_type, "reman-portal starting");
    serve(
        state,
        &config.server.bind_address(),
        &config.server.cors_origins,
    )
    .await
}
