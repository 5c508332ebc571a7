//! RMA submission pipeline.
//!
//! ```text
//! validate -> resolve owner -> check order -> create RMA + items -> request log
//!          -> notify (webhook | email) -> record outcome
//! ```
//! Everything up to the request log must succeed for the submission to count.
//! The notify/record tail is best effort: failures are logged and swallowed.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info, warn};

use super::notification::{NotifyError, NotifyOutcome, RmaNotifier};
use crate::auth::unusable_password_hash;
use crate::models::user::normalize_email;
use crate::models::{
    NewRma, NewRmaItem, NewRmaRequestLog, NewUser, Order, RequestLogStatus, Rma, RmaItem,
    RmaLogUpdate, RmaRequestLog, RmaStatus, RmaUpdate, Role, User, UserStatus,
};
use crate::storage::{Storage, StorageError};
use crate::validation::{limits, Errors, FieldError, Validate};

/// Warranty claim as submitted by a signed-in customer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RmaSubmission {
    #[serde(default)]
    pub order_number: Option<String>,
    pub contact_name: String,
    pub contact_email: String,
    #[serde(default)]
    pub contact_phone: Option<String>,
    pub reason: String,
    #[serde(default)]
    pub notes: Option<String>,
    pub items: Vec<NewRmaItem>,
    /// When false and the contact email is not the account's, the RMA is
    /// filed under a pending account for the contact email.
    #[serde(default = "default_true")]
    pub track_under_current_account: bool,
}

fn default_true() -> bool {
    true
}

impl Validate for RmaSubmission {
    fn validate(&self) -> Vec<FieldError> {
        let mut errors = Errors::new();
        errors.required("contact_name", &self.contact_name, limits::MAX_NAME_LENGTH);
        errors.email("contact_email", &self.contact_email);
        errors.optional("contact_phone", self.contact_phone.as_deref(), limits::MAX_NAME_LENGTH);
        errors.optional("order_number", self.order_number.as_deref(), limits::MAX_NAME_LENGTH);
        errors.required("reason", &self.reason, limits::MAX_TEXT_LENGTH);
        errors.optional("notes", self.notes.as_deref(), limits::MAX_TEXT_LENGTH);

        if self.items.is_empty() {
            errors.add("items", crate::validation::errmsg::NO_ITEMS);
        } else if self.items.len() > limits::MAX_RMA_ITEMS {
            errors.add("items", crate::validation::errmsg::TOO_MANY_ITEMS);
        }
        for (i, item) in self.items.iter().enumerate() {
            errors.nested(&format!("items[{i}]"), item.validate());
        }
        errors.into_vec()
    }
}

impl Validate for NewRmaItem {
    fn validate(&self) -> Vec<FieldError> {
        let mut errors = Errors::new();
        errors.required("product_name", &self.product_name, limits::MAX_NAME_LENGTH);
        errors.optional("serial_number", self.serial_number.as_deref(), limits::MAX_NAME_LENGTH);
        errors.required("fault_description", &self.fault_description, limits::MAX_TEXT_LENGTH);
        errors.positive("quantity", i64::from(self.quantity));
        errors.into_vec()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RmaError {
    #[error("validation failed")]
    Validation(Vec<FieldError>),

    #[error("order not found")]
    OrderNotFound,

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Result of a successful submission.
#[derive(Debug, Clone, Serialize)]
pub struct SubmittedRma {
    pub rma: Rma,
    pub items: Vec<RmaItem>,
    pub log: RmaRequestLog,
}

/// `RMA-YYYYMMDD-XXXXXXXX` with eight random upper-case hex digits.
pub fn generate_rma_number() -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!(
        "RMA-{}-{}",
        Utc::now().format("%Y%m%d"),
        suffix[..8].to_uppercase()
    )
}

pub struct RmaService {
    storage: Arc<dyn Storage>,
    notifier: Arc<RmaNotifier>,
}

impl RmaService {
    pub fn new(storage: Arc<dyn Storage>, notifier: Arc<RmaNotifier>) -> Self {
        Self { storage, notifier }
    }

    pub async fn submit(
        &self,
        actor: &User,
        submission: RmaSubmission,
    ) -> Result<SubmittedRma, RmaError> {
        let errors = submission.validate();
        if !errors.is_empty() {
            return Err(RmaError::Validation(errors));
        }

        let owner = self.resolve_owner(actor, &submission).await?;
        let order = self.resolve_order(actor, submission.order_number.as_deref()).await?;

        let rma = self
            .storage
            .create_rma(NewRma {
                rma_number: generate_rma_number(),
                user_id: owner.id,
                order_id: order.as_ref().map(|o| o.id),
                status: RmaStatus::Submitted,
                contact_name: submission.contact_name.trim().to_string(),
                contact_email: normalize_email(&submission.contact_email),
                contact_phone: submission.contact_phone.clone(),
                reason: submission.reason.clone(),
                notes: submission.notes.clone(),
            })
            .await?;

        let items = self.insert_items(&rma, &submission.items).await?;

        let payload = build_payload(actor, &owner, &rma, order.as_ref(), &submission);
        let log = self
            .storage
            .create_rma_log(NewRmaRequestLog {
                rma_id: rma.id,
                user_id: owner.id,
                payload: payload.clone(),
                status: RequestLogStatus::Submitted,
            })
            .await?;

        info!(
            rma = %rma.rma_number,
            owner = owner.id,
            submitted_by = actor.id,
            items = items.len(),
            "RMA submitted"
        );

        match self.notify_and_record(&rma, &log, &payload).await {
            Ok((rma, log)) => Ok(SubmittedRma { rma, items, log }),
            Err(e) => {
                error!(rma = %rma.rma_number, error = %e, "RMA notification failed");
                Ok(SubmittedRma { rma, items, log })
            }
        }
    }

    /// Who owns the RMA.
    ///
    /// The signed-in user, unless the claim names another contact email and
    /// the submitter opted out of tracking it under their own account. Then
    /// the account for the contact email owns it, created as pending if absent.
    /// An address held by a deleted account falls back to the signed-in user.
    pub async fn resolve_owner(
        &self,
        actor: &User,
        submission: &RmaSubmission,
    ) -> Result<User, RmaError> {
        let contact = normalize_email(&submission.contact_email);
        if contact == normalize_email(&actor.email) || submission.track_under_current_account {
            return Ok(actor.clone());
        }

        if let Some(existing) = self.storage.find_user_by_email(&contact).await? {
            return Ok(existing);
        }

        let created = self
            .storage
            .create_user(NewUser {
                email: contact.clone(),
                password_hash: unusable_password_hash(),
                name: submission.contact_name.trim().to_string(),
                company: None,
                phone: submission.contact_phone.clone(),
                role: Role::Customer,
                status: UserStatus::PendingApproval,
            })
            .await;

        match created {
            Ok(user) => {
                info!(user = user.id, "created pending account for RMA contact");
                Ok(user)
            }
            // Either a concurrent submission created the account first, or a
            // deleted account still reserves the address.
            Err(StorageError::Conflict(_)) => {
                match self.storage.find_user_by_email(&contact).await? {
                    Some(existing) => Ok(existing),
                    None => {
                        warn!(
                            submitted_by = actor.id,
                            "RMA contact email belongs to a deleted account, filing under submitter"
                        );
                        Ok(actor.clone())
                    }
                }
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn resolve_order(
        &self,
        actor: &User,
        order_number: Option<&str>,
    ) -> Result<Option<Order>, RmaError> {
        let Some(number) = order_number.map(str::trim).filter(|n| !n.is_empty()) else {
            return Ok(None);
        };
        match self.storage.find_order_by_number(number).await? {
            Some(order) if order.user_id == actor.id || actor.is_admin() => Ok(Some(order)),
            _ => Err(RmaError::OrderNotFound),
        }
    }

    /// Insert items one by one; on failure remove what was written.
    async fn insert_items(&self, rma: &Rma, items: &[NewRmaItem]) -> Result<Vec<RmaItem>, RmaError> {
        let mut inserted = Vec::with_capacity(items.len());
        for item in items {
            match self.storage.add_rma_item(rma.id, item.clone()).await {
                Ok(row) => inserted.push(row),
                Err(e) => {
                    warn!(rma = %rma.rma_number, error = %e, "RMA item insert failed, rolling back");
                    self.compensate(rma, &inserted).await;
                    return Err(e.into());
                }
            }
        }
        Ok(inserted)
    }

    async fn compensate(&self, rma: &Rma, inserted: &[RmaItem]) {
        for item in inserted {
            if let Err(e) = self.storage.delete_rma_item(item.id).await {
                error!(rma = %rma.rma_number, item = item.id, error = %e, "failed to remove RMA item");
            }
        }
        if let Err(e) = self.storage.delete_rma(rma.id).await {
            error!(rma = %rma.rma_number, error = %e, "failed to remove RMA");
        }
    }

    async fn notify_and_record(
        &self,
        rma: &Rma,
        log: &RmaRequestLog,
        payload: &serde_json::Value,
    ) -> Result<(Rma, RmaRequestLog), NotifyError> {
        let outcome = self.notifier.notify(&*self.storage, rma, payload).await?;

        match outcome {
            NotifyOutcome::Webhook { status } => {
                let log = self
                    .storage
                    .update_rma_log(
                        log.id,
                        RmaLogUpdate {
                            status: Some(RequestLogStatus::Approved),
                            webhook_status: Some(i32::from(status)),
                            ..Default::default()
                        },
                    )
                    .await?;
                let rma = self
                    .storage
                    .update_rma(
                        rma.id,
                        RmaUpdate {
                            status: Some(RmaStatus::Approved),
                            notes: None,
                        },
                    )
                    .await?;
                info!(rma = %rma.rma_number, "RMA approved by webhook");
                Ok((rma, log))
            }
            NotifyOutcome::Email {
                recipients,
                webhook_status,
                webhook_error,
                email_error,
            } => {
                let error_text = [webhook_error, email_error]
                    .into_iter()
                    .flatten()
                    .collect::<Vec<_>>()
                    .join("; ");
                let log = self
                    .storage
                    .update_rma_log(
                        log.id,
                        RmaLogUpdate {
                            status: None,
                            webhook_status: webhook_status.map(i32::from),
                            email_notified: Some(!recipients.is_empty()),
                            notification_error: (!error_text.is_empty()).then_some(error_text),
                        },
                    )
                    .await?;
                info!(
                    rma = %rma.rma_number,
                    recipients = recipients.len(),
                    "RMA announced by email"
                );
                Ok((rma.clone(), log))
            }
        }
    }
}

/// Everything the webhook receiver and the admin notice need.
fn build_payload(
    actor: &User,
    owner: &User,
    rma: &Rma,
    order: Option<&Order>,
    submission: &RmaSubmission,
) -> serde_json::Value {
    json!({
        "rma_id": rma.id,
        "rma_number": rma.rma_number,
        "status": rma.status,
        "submitted_at": rma.created_at,
        "submitted_by": {
            "user_id": actor.id,
            "email": actor.email,
            "name": actor.name,
        },
        "owner": {
            "user_id": owner.id,
            "email": owner.email,
            "status": owner.status,
        },
        "order_number": order.map(|o| o.order_number.as_str()),
        "contact": {
            "name": submission.contact_name,
            "email": submission.contact_email,
            "phone": submission.contact_phone,
        },
        "reason": submission.reason,
        "notes": submission.notes,
        "items": submission.items,
        "track_under_current_account": submission.track_under_current_account,
    })
}
