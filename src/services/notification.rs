//! RMA submission notices.
//!
//! One webhook attempt per submission. Anything other than a 2xx answer (or
//! no webhook at all) falls back to an email notice to the admin addresses.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info, warn};

use crate::config::NotificationConfig;
use crate::models::settings::{RMA_NOTIFICATION_EMAILS_KEY, RMA_WEBHOOK_URL_KEY};
use crate::models::Rma;
use crate::storage::{Storage, StorageError};

/// Errors from the notification step. Never reach the HTTP caller.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("mail error: {0}")]
    Mail(String),
}

/// A plain-text notice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Outbound email transport.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: EmailMessage) -> Result<(), NotifyError>;
}

/// Writes each message to the log instead of delivering it.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: EmailMessage) -> Result<(), NotifyError> {
        info!(
            from = %message.from,
            to = %message.to,
            subject = %message.subject,
            body = %message.body,
            "email notice"
        );
        Ok(())
    }
}

/// Keeps sent messages in memory. Can be told to fail.
#[derive(Debug, Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<EmailMessage>>,
    fail: bool,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent
            .lock()
            .map(|sent| sent.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, message: EmailMessage) -> Result<(), NotifyError> {
        if self.fail {
            return Err(NotifyError::Mail(format!("refused delivery to {}", message.to)));
        }
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(message);
        }
        Ok(())
    }
}

/// How a submission was announced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyOutcome {
    /// The webhook answered 2xx.
    Webhook { status: u16 },
    /// Fell back to email.
    Email {
        recipients: Vec<String>,
        /// Status of a non-2xx webhook answer.
        webhook_status: Option<u16>,
        /// Why the webhook was not used or did not succeed.
        webhook_error: Option<String>,
        /// First delivery failure, if any.
        email_error: Option<String>,
    },
}

/// Sends RMA submission notices.
pub struct RmaNotifier {
    client: Client,
    config: NotificationConfig,
    mailer: Arc<dyn Mailer>,
}

impl RmaNotifier {
    pub fn new(config: NotificationConfig, mailer: Arc<dyn Mailer>) -> Result<Self, NotifyError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.webhook_timeout_secs.max(1)))
            .build()?;
        Ok(Self {
            client,
            config,
            mailer,
        })
    }

    /// Webhook URL: the admin setting wins over the config default.
    pub async fn webhook_url(&self, storage: &dyn Storage) -> Result<Option<String>, NotifyError> {
        let from_setting = storage
            .get_setting(RMA_WEBHOOK_URL_KEY)
            .await?
            .and_then(|s| s.value.as_str().map(str::trim).map(str::to_string))
            .filter(|url| !url.is_empty());
        Ok(from_setting.or_else(|| {
            self.config
                .webhook_url
                .clone()
                .filter(|url| !url.trim().is_empty())
        }))
    }

    /// Admin recipients: the admin setting (a JSON array) wins over the config default.
    pub async fn admin_emails(&self, storage: &dyn Storage) -> Result<Vec<String>, NotifyError> {
        let from_setting: Option<Vec<String>> = storage
            .get_setting(RMA_NOTIFICATION_EMAILS_KEY)
            .await?
            .and_then(|s| serde_json::from_value(s.value).ok());
        Ok(match from_setting {
            Some(emails) if !emails.is_empty() => emails,
            _ => self.config.admin_emails.clone(),
        })
    }

    pub async fn notify(
        &self,
        storage: &dyn Storage,
        rma: &Rma,
        payload: &serde_json::Value,
    ) -> Result<NotifyOutcome, NotifyError> {
        let (webhook_status, webhook_error) = match self.webhook_url(storage).await? {
            Some(url) => match self.client.post(&url).json(payload).send().await {
                Ok(response) if response.status().is_success() => {
                    let status = response.status().as_u16();
                    debug!(rma = %rma.rma_number, status, "RMA webhook accepted");
                    return Ok(NotifyOutcome::Webhook { status });
                }
                Ok(response) => {
                    let status = response.status();
                    warn!(rma = %rma.rma_number, %status, "RMA webhook rejected submission");
                    (Some(status.as_u16()), Some(format!("webhook returned {status}")))
                }
                Err(e) => {
                    warn!(rma = %rma.rma_number, error = %e, "RMA webhook unreachable");
                    (None, Some(format!("webhook request failed: {e}")))
                }
            },
            None => (None, Some("no webhook configured".to_string())),
        };

        let recipients = self.admin_emails(storage).await?;
        let email_error = self.send_emails(rma, payload, &recipients).await;

        Ok(NotifyOutcome::Email {
            recipients,
            webhook_status,
            webhook_error,
            email_error,
        })
    }

    async fn send_emails(
        &self,
        rma: &Rma,
        payload: &serde_json::Value,
        recipients: &[String],
    ) -> Option<String> {
        if recipients.is_empty() {
            warn!(rma = %rma.rma_number, "no admin email recipients configured");
            return Some("no admin email recipients configured".to_string());
        }

        let body = serde_json::to_string_pretty(payload).unwrap_or_else(|_| payload.to_string());
        let mut first_error = None;
        for to in recipients {
            let message = EmailMessage {
                from: self.config.from_address.clone(),
                to: to.clone(),
                subject: format!("New RMA request {}", rma.rma_number),
                body: body.clone(),
            };
            if let Err(e) = self.mailer.send(message).await {
                tracing::error!(rma = %rma.rma_number, to = %to, error = %e, "RMA email notice failed");
                first_error.get_or_insert_with(|| e.to_string());
            }
        }
        first_error
    }
}
