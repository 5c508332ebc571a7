//! Customer support tickets.

use serde::{Deserialize, Serialize};

use super::{string_enum, Timestamp};

string_enum! {
    pub enum TicketStatus ("ticket status") {
        Open => "open",
        InProgress => "in_progress",
        Resolved => "resolved",
        Closed => "closed",
    }
}

string_enum! {
    pub enum TicketPriority ("ticket priority") {
        Low => "low",
        Normal => "normal",
        High => "high",
    }
}

impl Default for TicketPriority {
    fn default() -> Self {
        TicketPriority::Normal
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupportTicket {
    pub id: i64,
    pub user_id: i64,
    pub subject: String,
    pub message: String,
    pub status: TicketStatus,
    pub priority: TicketPriority,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone)]
pub struct NewSupportTicket {
    pub user_id: i64,
    pub subject: String,
    pub message: String,
    pub priority: TicketPriority,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TicketUpdate {
    #[serde(default)]
    pub status: Option<TicketStatus>,
    #[serde(default)]
    pub priority: Option<TicketPriority>,
}
