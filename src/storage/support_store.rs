//! SupportStore trait definition.

use async_trait::async_trait;

use super::Result;
use crate::models::{NewSupportTicket, SupportTicket, TicketUpdate};

/// Interface for support tickets. New tickets start `open`.
#[async_trait]
pub trait SupportStore: Send + Sync {
    async fn create_ticket(&self, ticket: NewSupportTicket) -> Result<SupportTicket>;

    async fn get_ticket(&self, id: i64) -> Result<Option<SupportTicket>>;

    async fn list_tickets(&self) -> Result<Vec<SupportTicket>>;

    async fn list_tickets_for_user(&self, user_id: i64) -> Result<Vec<SupportTicket>>;

    async fn update_ticket(&self, id: i64, update: TicketUpdate) -> Result<SupportTicket>;

    async fn delete_ticket(&self, id: i64) -> Result<()>;
}
