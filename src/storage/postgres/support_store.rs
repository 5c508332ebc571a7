//! PostgreSQL SupportStore implementation.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::Row;

use super::{expect_affected, get_enum, PostgresStorage};
use crate::models::{NewSupportTicket, SupportTicket, TicketStatus, TicketUpdate};
use crate::storage::helpers::now;
use crate::storage::{Result, StorageError, SupportStore};

fn ticket_from_row(row: &PgRow) -> Result<SupportTicket> {
    Ok(SupportTicket {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        subject: row.try_get("subject")?,
        message: row.try_get("message")?,
        status: get_enum(row, "status")?,
        priority: get_enum(row, "priority")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl SupportStore for PostgresStorage {
    async fn create_ticket(&self, ticket: NewSupportTicket) -> Result<SupportTicket> {
        let row = sqlx::query(
            "INSERT INTO support_tickets
                (user_id, subject, message, status, priority, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $6)
             RETURNING *",
        )
        .bind(ticket.user_id)
        .bind(&ticket.subject)
        .bind(&ticket.message)
        .bind(TicketStatus::Open.as_str())
        .bind(ticket.priority.as_str())
        .bind(now())
        .fetch_one(&self.pool)
        .await?;
        ticket_from_row(&row)
    }

    async fn get_ticket(&self, id: i64) -> Result<Option<SupportTicket>> {
        let row = sqlx::query("SELECT * FROM support_tickets WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(ticket_from_row).transpose()
    }

    async fn list_tickets(&self) -> Result<Vec<SupportTicket>> {
        let rows = sqlx::query("SELECT * FROM support_tickets ORDER BY id DESC")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(ticket_from_row).collect()
    }

    async fn list_tickets_for_user(&self, user_id: i64) -> Result<Vec<SupportTicket>> {
        let rows = sqlx::query("SELECT * FROM support_tickets WHERE user_id = $1 ORDER BY id DESC")
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(ticket_from_row).collect()
    }

    async fn update_ticket(&self, id: i64, update: TicketUpdate) -> Result<SupportTicket> {
        let row = sqlx::query(
            "UPDATE support_tickets SET
                status = COALESCE($2, status),
                priority = COALESCE($3, priority),
                updated_at = $4
             WHERE id = $1
             RETURNING *",
        )
        .bind(id)
        .bind(update.status.map(|s| s.as_str()))
        .bind(update.priority.map(|p| p.as_str()))
        .bind(now())
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StorageError::NotFound)?;
        ticket_from_row(&row)
    }

    async fn delete_ticket(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM support_tickets WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        expect_affected(result)
    }
}
