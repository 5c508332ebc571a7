//! SQLite SupportStore implementation.

use async_trait::async_trait;
use sea_query::{Asterisk, Expr, Order, Query, SqliteQueryBuilder};
use sea_query_binder::SqlxBinder;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use super::{get_enum, get_ts, SqliteStorage};
use crate::models::{NewSupportTicket, SupportTicket, TicketStatus, TicketUpdate};
use crate::storage::helpers::{now, ts_to_text};
use crate::storage::schema::SupportTickets;
use crate::storage::{Result, StorageError, SupportStore};

fn ticket_from_row(row: &SqliteRow) -> Result<SupportTicket> {
    Ok(SupportTicket {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        subject: row.try_get("subject")?,
        message: row.try_get("message")?,
        status: get_enum(row, "status")?,
        priority: get_enum(row, "priority")?,
        created_at: get_ts(row, "created_at")?,
        updated_at: get_ts(row, "updated_at")?,
    })
}

#[async_trait]
impl SupportStore for SqliteStorage {
    async fn create_ticket(&self, ticket: NewSupportTicket) -> Result<SupportTicket> {
        let ts = ts_to_text(&now());
        let (sql, values) = Query::insert()
            .into_table(SupportTickets::Table)
            .columns([
                SupportTickets::UserId,
                SupportTickets::Subject,
                SupportTickets::Message,
                SupportTickets::Status,
                SupportTickets::Priority,
                SupportTickets::CreatedAt,
                SupportTickets::UpdatedAt,
            ])
            .values([
                ticket.user_id.into(),
                ticket.subject.into(),
                ticket.message.into(),
                TicketStatus::Open.as_str().into(),
                ticket.priority.as_str().into(),
                ts.clone().into(),
                ts.into(),
            ])?
            .returning_all()
            .build_sqlx(SqliteQueryBuilder);

        let row = sqlx::query_with(&sql, values).fetch_one(&self.pool).await?;
        ticket_from_row(&row)
    }

    async fn get_ticket(&self, id: i64) -> Result<Option<SupportTicket>> {
        let (sql, values) = Query::select()
            .column(Asterisk)
            .from(SupportTickets::Table)
            .and_where(Expr::col(SupportTickets::Id).eq(id))
            .build_sqlx(SqliteQueryBuilder);

        let row = sqlx::query_with(&sql, values)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(ticket_from_row).transpose()
    }

    async fn list_tickets(&self) -> Result<Vec<SupportTicket>> {
        let (sql, values) = Query::select()
            .column(Asterisk)
            .from(SupportTickets::Table)
            .order_by(SupportTickets::Id, Order::Desc)
            .build_sqlx(SqliteQueryBuilder);

        let rows = sqlx::query_with(&sql, values).fetch_all(&self.pool).await?;
        rows.iter().map(ticket_from_row).collect()
    }

    async fn list_tickets_for_user(&self, user_id: i64) -> Result<Vec<SupportTicket>> {
        let (sql, values) = Query::select()
            .column(Asterisk)
            .from(SupportTickets::Table)
            .and_where(Expr::col(SupportTickets::UserId).eq(user_id))
            .order_by(SupportTickets::Id, Order::Desc)
            .build_sqlx(SqliteQueryBuilder);

        let rows = sqlx::query_with(&sql, values).fetch_all(&self.pool).await?;
        rows.iter().map(ticket_from_row).collect()
    }

    async fn update_ticket(&self, id: i64, update: TicketUpdate) -> Result<SupportTicket> {
        let mut query = Query::update();
        query
            .table(SupportTickets::Table)
            .value(SupportTickets::UpdatedAt, ts_to_text(&now()));
        if let Some(status) = update.status {
            query.value(SupportTickets::Status, status.as_str());
        }
        if let Some(priority) = update.priority {
            query.value(SupportTickets::Priority, priority.as_str());
        }
        let (sql, values) = query
            .and_where(Expr::col(SupportTickets::Id).eq(id))
            .returning_all()
            .build_sqlx(SqliteQueryBuilder);

        let row = sqlx::query_with(&sql, values)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StorageError::NotFound)?;
        ticket_from_row(&row)
    }

    async fn delete_ticket(&self, id: i64) -> Result<()> {
        let (sql, values) = Query::delete()
            .from_table(SupportTickets::Table)
            .and_where(Expr::col(SupportTickets::Id).eq(id))
            .build_sqlx(SqliteQueryBuilder);

        let result = sqlx::query_with(&sql, values).execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }
}
