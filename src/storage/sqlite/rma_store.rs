//! SQLite RmaStore implementation.

use async_trait::async_trait;
use sea_query::{Asterisk, Expr, Order, Query, SqliteQueryBuilder};
use sea_query_binder::SqlxBinder;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use super::{get_enum, get_ts, SqliteStorage};
use crate::models::{
    NewRma, NewRmaItem, NewRmaRequestLog, Rma, RmaItem, RmaLogUpdate, RmaRequestLog, RmaUpdate,
};
use crate::storage::helpers::{now, ts_to_text};
use crate::storage::schema::{RmaItems, RmaRequestLogs, Rmas};
use crate::storage::{Result, RmaStore, StorageError};

fn rma_from_row(row: &SqliteRow) -> Result<Rma> {
    Ok(Rma {
        id: row.try_get("id")?,
        rma_number: row.try_get("rma_number")?,
        user_id: row.try_get("user_id")?,
        order_id: row.try_get("order_id")?,
        status: get_enum(row, "status")?,
        contact_name: row.try_get("contact_name")?,
        contact_email: row.try_get("contact_email")?,
        contact_phone: row.try_get("contact_phone")?,
        reason: row.try_get("reason")?,
        notes: row.try_get("notes")?,
        created_at: get_ts(row, "created_at")?,
        updated_at: get_ts(row, "updated_at")?,
    })
}

fn item_from_row(row: &SqliteRow) -> Result<RmaItem> {
    Ok(RmaItem {
        id: row.try_get("id")?,
        rma_id: row.try_get("rma_id")?,
        product_name: row.try_get("product_name")?,
        serial_number: row.try_get("serial_number")?,
        fault_description: row.try_get("fault_description")?,
        quantity: row.try_get("quantity")?,
    })
}

fn log_from_row(row: &SqliteRow) -> Result<RmaRequestLog> {
    let payload: String = row.try_get("payload")?;
    Ok(RmaRequestLog {
        id: row.try_get("id")?,
        rma_id: row.try_get("rma_id")?,
        user_id: row.try_get("user_id")?,
        payload: serde_json::from_str(&payload)?,
        status: get_enum(row, "status")?,
        webhook_status: row.try_get("webhook_status")?,
        email_notified: row.try_get("email_notified")?,
        notification_error: row.try_get("notification_error")?,
        created_at: get_ts(row, "created_at")?,
        updated_at: get_ts(row, "updated_at")?,
    })
}

#[async_trait]
impl RmaStore for SqliteStorage {
    async fn create_rma(&self, rma: NewRma) -> Result<Rma> {
        let ts = ts_to_text(&now());
        let (sql, values) = Query::insert()
            .into_table(Rmas::Table)
            .columns([
                Rmas::RmaNumber,
                Rmas::UserId,
                Rmas::OrderId,
                Rmas::Status,
                Rmas::ContactName,
                Rmas::ContactEmail,
                Rmas::ContactPhone,
                Rmas::Reason,
                Rmas::Notes,
                Rmas::CreatedAt,
                Rmas::UpdatedAt,
            ])
            .values([
                rma.rma_number.into(),
                rma.user_id.into(),
                rma.order_id.into(),
                rma.status.as_str().into(),
                rma.contact_name.into(),
                rma.contact_email.into(),
                rma.contact_phone.into(),
                rma.reason.into(),
                rma.notes.into(),
                ts.clone().into(),
                ts.into(),
            ])?
            .returning_all()
            .build_sqlx(SqliteQueryBuilder);

        let row = sqlx::query_with(&sql, values).fetch_one(&self.pool).await?;
        rma_from_row(&row)
    }

    async fn get_rma(&self, id: i64) -> Result<Option<Rma>> {
        let (sql, values) = Query::select()
            .column(Asterisk)
            .from(Rmas::Table)
            .and_where(Expr::col(Rmas::Id).eq(id))
            .build_sqlx(SqliteQueryBuilder);

        let row = sqlx::query_with(&sql, values)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(rma_from_row).transpose()
    }

    async fn find_rma_by_number(&self, rma_number: &str) -> Result<Option<Rma>> {
        let (sql, values) = Query::select()
            .column(Asterisk)
            .from(Rmas::Table)
            .and_where(Expr::col(Rmas::RmaNumber).eq(rma_number))
            .build_sqlx(SqliteQueryBuilder);

        let row = sqlx::query_with(&sql, values)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(rma_from_row).transpose()
    }

    async fn list_rmas(&self) -> Result<Vec<Rma>> {
        let (sql, values) = Query::select()
            .column(Asterisk)
            .from(Rmas::Table)
            .order_by(Rmas::Id, Order::Desc)
            .build_sqlx(SqliteQueryBuilder);

        let rows = sqlx::query_with(&sql, values).fetch_all(&self.pool).await?;
        rows.iter().map(rma_from_row).collect()
    }

    async fn list_rmas_for_user(&self, user_id: i64) -> Result<Vec<Rma>> {
        let (sql, values) = Query::select()
            .column(Asterisk)
            .from(Rmas::Table)
            .and_where(Expr::col(Rmas::UserId).eq(user_id))
            .order_by(Rmas::Id, Order::Desc)
            .build_sqlx(SqliteQueryBuilder);

        let rows = sqlx::query_with(&sql, values).fetch_all(&self.pool).await?;
        rows.iter().map(rma_from_row).collect()
    }

    async fn update_rma(&self, id: i64, update: RmaUpdate) -> Result<Rma> {
        let mut query = Query::update();
        query
            .table(Rmas::Table)
            .value(Rmas::UpdatedAt, ts_to_text(&now()));
        if let Some(status) = update.status {
            query.value(Rmas::Status, status.as_str());
        }
        if let Some(notes) = update.notes {
            query.value(Rmas::Notes, notes);
        }
        let (sql, values) = query
            .and_where(Expr::col(Rmas::Id).eq(id))
            .returning_all()
            .build_sqlx(SqliteQueryBuilder);

        let row = sqlx::query_with(&sql, values)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StorageError::NotFound)?;
        rma_from_row(&row)
    }

    async fn delete_rma(&self, id: i64) -> Result<()> {
        let (sql, values) = Query::delete()
            .from_table(Rmas::Table)
            .and_where(Expr::col(Rmas::Id).eq(id))
            .build_sqlx(SqliteQueryBuilder);

        let result = sqlx::query_with(&sql, values).execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }

    async fn add_rma_item(&self, rma_id: i64, item: NewRmaItem) -> Result<RmaItem> {
        let (sql, values) = Query::insert()
            .into_table(RmaItems::Table)
            .columns([
                RmaItems::RmaId,
                RmaItems::ProductName,
                RmaItems::SerialNumber,
                RmaItems::FaultDescription,
                RmaItems::Quantity,
            ])
            .values([
                rma_id.into(),
                item.product_name.into(),
                item.serial_number.into(),
                item.fault_description.into(),
                item.quantity.into(),
            ])?
            .returning_all()
            .build_sqlx(SqliteQueryBuilder);

        let row = sqlx::query_with(&sql, values).fetch_one(&self.pool).await?;
        item_from_row(&row)
    }

    async fn delete_rma_item(&self, id: i64) -> Result<()> {
        let (sql, values) = Query::delete()
            .from_table(RmaItems::Table)
            .and_where(Expr::col(RmaItems::Id).eq(id))
            .build_sqlx(SqliteQueryBuilder);

        let result = sqlx::query_with(&sql, values).execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }

    async fn list_rma_items(&self, rma_id: i64) -> Result<Vec<RmaItem>> {
        let (sql, values) = Query::select()
            .column(Asterisk)
            .from(RmaItems::Table)
            .and_where(Expr::col(RmaItems::RmaId).eq(rma_id))
            .order_by(RmaItems::Id, Order::Asc)
            .build_sqlx(SqliteQueryBuilder);

        let rows = sqlx::query_with(&sql, values).fetch_all(&self.pool).await?;
        rows.iter().map(item_from_row).collect()
    }

    async fn create_rma_log(&self, log: NewRmaRequestLog) -> Result<RmaRequestLog> {
        let ts = ts_to_text(&now());
        let (sql, values) = Query::insert()
            .into_table(RmaRequestLogs::Table)
            .columns([
                RmaRequestLogs::RmaId,
                RmaRequestLogs::UserId,
                RmaRequestLogs::Payload,
                RmaRequestLogs::Status,
                RmaRequestLogs::EmailNotified,
                RmaRequestLogs::CreatedAt,
                RmaRequestLogs::UpdatedAt,
            ])
            .values([
                log.rma_id.into(),
                log.user_id.into(),
                serde_json::to_string(&log.payload)?.into(),
                log.status.as_str().into(),
                false.into(),
                ts.clone().into(),
                ts.into(),
            ])?
            .returning_all()
            .build_sqlx(SqliteQueryBuilder);

        let row = sqlx::query_with(&sql, values).fetch_one(&self.pool).await?;
        log_from_row(&row)
    }

    async fn update_rma_log(&self, id: i64, update: RmaLogUpdate) -> Result<RmaRequestLog> {
        let mut query = Query::update();
        query
            .table(RmaRequestLogs::Table)
            .value(RmaRequestLogs::UpdatedAt, ts_to_text(&now()));
        if let Some(status) = update.status {
            query.value(RmaRequestLogs::Status, status.as_str());
        }
        if let Some(code) = update.webhook_status {
            query.value(RmaRequestLogs::WebhookStatus, code);
        }
        if let Some(notified) = update.email_notified {
            query.value(RmaRequestLogs::EmailNotified, notified);
        }
        if let Some(error) = update.notification_error {
            query.value(RmaRequestLogs::NotificationError, error);
        }
        let (sql, values) = query
            .and_where(Expr::col(RmaRequestLogs::Id).eq(id))
            .returning_all()
            .build_sqlx(SqliteQueryBuilder);

        let row = sqlx::query_with(&sql, values)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StorageError::NotFound)?;
        log_from_row(&row)
    }

    async fn get_rma_log(&self, id: i64) -> Result<Option<RmaRequestLog>> {
        let (sql, values) = Query::select()
            .column(Asterisk)
            .from(RmaRequestLogs::Table)
            .and_where(Expr::col(RmaRequestLogs::Id).eq(id))
            .build_sqlx(SqliteQueryBuilder);

        let row = sqlx::query_with(&sql, values)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(log_from_row).transpose()
    }

    async fn list_rma_logs(&self) -> Result<Vec<RmaRequestLog>> {
        let (sql, values) = Query::select()
            .column(Asterisk)
            .from(RmaRequestLogs::Table)
            .order_by(RmaRequestLogs::Id, Order::Desc)
            .build_sqlx(SqliteQueryBuilder);

        let rows = sqlx::query_with(&sql, values).fetch_all(&self.pool).await?;
        rows.iter().map(log_from_row).collect()
    }
}
