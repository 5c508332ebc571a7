//! Defaults for RMA notifications.
//!
//! The webhook URL and admin addresses here are fallbacks; system settings
//! edited through the admin API take precedence.

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    /// Webhook that receives every RMA submission.
    pub webhook_url: Option<String>,
    /// Per-request timeout for the webhook call.
    pub webhook_timeout_secs: u64,
    /// Recipients of the fallback email notice.
    pub admin_emails: Vec<String>,
    /// Sender address on outgoing notices.
    pub from_address: String,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            webhook_timeout_secs: 10,
            admin_emails: Vec::new(),
            from_address: "no-reply@reman.local".to_string(),
        }
    }
}
