use async_trait::async_trait;

use super::{missing_parent, newest_first, MockStorage};
use crate::models::{NewSupportTicket, SupportTicket, TicketStatus, TicketUpdate};
use crate::storage::helpers::now;
use crate::storage::{Result, StorageError, SupportStore};

#[async_trait]
impl SupportStore for MockStorage {
    async fn create_ticket(&self, ticket: NewSupportTicket) -> Result<SupportTicket> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&ticket.user_id) {
            return Err(missing_parent("user", ticket.user_id));
        }
        let id = tables.next_id();
        let ts = now();
        let record = SupportTicket {
            id,
            user_id: ticket.user_id,
            subject: ticket.subject,
            message: ticket.message,
            status: TicketStatus::Open,
            priority: ticket.priority,
            created_at: ts,
            updated_at: ts,
        };
        tables.tickets.insert(id, record.clone());
        Ok(record)
    }

    async fn get_ticket(&self, id: i64) -> Result<Option<SupportTicket>> {
        Ok(self.tables.read().await.tickets.get(&id).cloned())
    }

    async fn list_tickets(&self) -> Result<Vec<SupportTicket>> {
        let tables = self.tables.read().await;
        Ok(newest_first(tables.tickets.values().cloned()))
    }

    async fn list_tickets_for_user(&self, user_id: i64) -> Result<Vec<SupportTicket>> {
        let tables = self.tables.read().await;
        Ok(newest_first(
            tables.tickets.values().filter(|t| t.user_id == user_id).cloned(),
        ))
    }

    async fn update_ticket(&self, id: i64, update: TicketUpdate) -> Result<SupportTicket> {
        let mut tables = self.tables.write().await;
        let ticket = tables.tickets.get_mut(&id).ok_or(StorageError::NotFound)?;
        if let Some(status) = update.status {
            ticket.status = status;
        }
        if let Some(priority) = update.priority {
            ticket.priority = priority;
        }
        ticket.updated_at = now();
        Ok(ticket.clone())
    }

    async fn delete_ticket(&self, id: i64) -> Result<()> {
        let mut tables = self.tables.write().await;
        tables
            .tickets
            .remove(&id)
            .map(|_| ())
            .ok_or(StorageError::NotFound)
    }
}
