//! Return merchandise authorizations and their submission log.

use serde::{Deserialize, Serialize};

use super::{string_enum, Timestamp};

string_enum! {
    pub enum RmaStatus ("rma status") {
        Submitted => "submitted",
        Approved => "approved",
        Received => "received",
        InRepair => "in_repair",
        Shipped => "shipped",
        Completed => "completed",
        Rejected => "rejected",
    }
}

string_enum! {
    /// Outcome of the submission notification step.
    ///
    /// `Approved` only when the webhook accepted the payload.
    pub enum RequestLogStatus ("request log status") {
        Submitted => "submitted",
        Approved => "approved",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rma {
    pub id: i64,
    pub rma_number: String,
    pub user_id: i64,
    pub order_id: Option<i64>,
    pub status: RmaStatus,
    pub contact_name: String,
    pub contact_email: String,
    pub contact_phone: Option<String>,
    pub reason: String,
    pub notes: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone)]
pub struct NewRma {
    pub rma_number: String,
    pub user_id: i64,
    pub order_id: Option<i64>,
    pub status: RmaStatus,
    pub contact_name: String,
    pub contact_email: String,
    pub contact_phone: Option<String>,
    pub reason: String,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct RmaUpdate {
    pub status: Option<RmaStatus>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RmaItem {
    pub id: i64,
    pub rma_id: i64,
    pub product_name: String,
    pub serial_number: Option<String>,
    pub fault_description: String,
    pub quantity: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRmaItem {
    pub product_name: String,
    #[serde(default)]
    pub serial_number: Option<String>,
    pub fault_description: String,
    #[serde(default = "default_quantity")]
    pub quantity: i32,
}

fn default_quantity() -> i32 {
    1
}

/// One row per submission: what was sent and how it was delivered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RmaRequestLog {
    pub id: i64,
    pub rma_id: i64,
    pub user_id: i64,
    pub payload: serde_json::Value,
    pub status: RequestLogStatus,
    pub webhook_status: Option<i32>,
    pub email_notified: bool,
    pub notification_error: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone)]
pub struct NewRmaRequestLog {
    pub rma_id: i64,
    pub user_id: i64,
    pub payload: serde_json::Value,
    pub status: RequestLogStatus,
}

#[derive(Debug, Clone, Default)]
pub struct RmaLogUpdate {
    pub status: Option<RequestLogStatus>,
    pub webhook_status: Option<i32>,
    pub email_notified: Option<bool>,
    pub notification_error: Option<String>,
}
