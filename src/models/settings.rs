//! Admin-managed configuration: API keys and key/value settings.

use serde::{Deserialize, Serialize};

use super::Timestamp;

/// Setting key holding the RMA webhook URL.
pub const RMA_WEBHOOK_URL_KEY: &str = "rma_webhook_url";
/// Setting key holding a JSON array of admin notification addresses.
pub const RMA_NOTIFICATION_EMAILS_KEY: &str = "rma_notification_emails";
/// Setting key holding the portal theme (colors, logo) for the web client.
pub const THEME_KEY: &str = "theme";

/// Credential for the data-push endpoints. Only the hash is stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiKey {
    pub id: i64,
    pub name: String,
    pub key_prefix: String,
    #[serde(skip_serializing, default)]
    pub key_hash: String,
    pub permissions: Vec<String>,
    pub active: bool,
    pub last_used_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

impl ApiKey {
    pub fn allows(&self, permission: &str) -> bool {
        self.permissions.iter().any(|p| p == permission || p == "*")
    }
}

#[derive(Debug, Clone)]
pub struct NewApiKey {
    pub name: String,
    pub key_prefix: String,
    pub key_hash: String,
    pub permissions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemSetting {
    pub key: String,
    pub value: serde_json::Value,
    pub updated_at: Timestamp,
}
