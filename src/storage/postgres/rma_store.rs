//! PostgreSQL RmaStore implementation.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::Row;

use super::{expect_affected, get_enum, PostgresStorage};
use crate::models::{
    NewRma, NewRmaItem, NewRmaRequestLog, Rma, RmaItem, RmaLogUpdate, RmaRequestLog, RmaUpdate,
};
use crate::storage::helpers::now;
use crate::storage::{Result, RmaStore, StorageError};

fn rma_from_row(row: &PgRow) -> Result<Rma> {
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
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn item_from_row(row: &PgRow) -> Result<RmaItem> {
    Ok(RmaItem {
        id: row.try_get("id")?,
        rma_id: row.try_get("rma_id")?,
        product_name: row.try_get("product_name")?,
        serial_number: row.try_get("serial_number")?,
        fault_description: row.try_get("fault_description")?,
        quantity: row.try_get("quantity")?,
    })
}

fn log_from_row(row: &PgRow) -> Result<RmaRequestLog> {
    let Json(payload) = row.try_get::<Json<serde_json::Value>, _>("payload")?;
    Ok(RmaRequestLog {
        id: row.try_get("id")?,
        rma_id: row.try_get("rma_id")?,
        user_id: row.try_get("user_id")?,
        payload,
        status: get_enum(row, "status")?,
        webhook_status: row.try_get("webhook_status")?,
        email_notified: row.try_get("email_notified")?,
        notification_error: row.try_get("notification_error")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl RmaStore for PostgresStorage {
    async fn create_rma(&self, rma: NewRma) -> Result<Rma> {
        let row = sqlx::query(
            "INSERT INTO rmas
                (rma_number, user_id, order_id, status, contact_name, contact_email,
                 contact_phone, reason, notes, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $10)
             RETURNING *",
        )
        .bind(&rma.rma_number)
        .bind(rma.user_id)
        .bind(rma.order_id)
        .bind(rma.status.as_str())
        .bind(&rma.contact_name)
        .bind(&rma.contact_email)
        .bind(&rma.contact_phone)
        .bind(&rma.reason)
        .bind(&rma.notes)
        .bind(now())
        .fetch_one(&self.pool)
        .await?;
        rma_from_row(&row)
    }

    async fn get_rma(&self, id: i64) -> Result<Option<Rma>> {
        let row = sqlx::query("SELECT * FROM rmas WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(rma_from_row).transpose()
    }

    async fn find_rma_by_number(&self, rma_number: &str) -> Result<Option<Rma>> {
        let row = sqlx::query("SELECT * FROM rmas WHERE rma_number = $1")
            .bind(rma_number)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(rma_from_row).transpose()
    }

    async fn list_rmas(&self) -> Result<Vec<Rma>> {
        let rows = sqlx::query("SELECT * FROM rmas ORDER BY id DESC")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(rma_from_row).collect()
    }

    async fn list_rmas_for_user(&self, user_id: i64) -> Result<Vec<Rma>> {
        let rows = sqlx::query("SELECT * FROM rmas WHERE user_id = $1 ORDER BY id DESC")
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(rma_from_row).collect()
    }

    async fn update_rma(&self, id: i64, update: RmaUpdate) -> Result<Rma> {
        let row = sqlx::query(
            "UPDATE rmas SET
                status = COALESCE($2, status),
                notes = COALESCE($3, notes),
                updated_at = $4
             WHERE id = $1
             RETURNING *",
        )
        .bind(id)
        .bind(update.status.map(|s| s.as_str()))
        .bind(update.notes)
        .bind(now())
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StorageError::NotFound)?;
        rma_from_row(&row)
    }

    async fn delete_rma(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM rmas WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        expect_affected(result)
    }

    async fn add_rma_item(&self, rma_id: i64, item: NewRmaItem) -> Result<RmaItem> {
        let row = sqlx::query(
            "INSERT INTO rma_items (rma_id, product_name, serial_number, fault_description, quantity)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING *",
        )
        .bind(rma_id)
        .bind(&item.product_name)
        .bind(&item.serial_number)
        .bind(&item.fault_description)
        .bind(item.quantity)
        .fetch_one(&self.pool)
        .await?;
        item_from_row(&row)
    }

    async fn delete_rma_item(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM rma_items WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        expect_affected(result)
    }

    async fn list_rma_items(&self, rma_id: i64) -> Result<Vec<RmaItem>> {
        let rows = sqlx::query("SELECT * FROM rma_items WHERE rma_id = $1 ORDER BY id")
            .bind(rma_id)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(item_from_row).collect()
    }

    async fn create_rma_log(&self, log: NewRmaRequestLog) -> Result<RmaRequestLog> {
        let row = sqlx::query(
            "INSERT INTO rma_request_logs
                (rma_id, user_id, payload, status, email_notified, created_at, updated_at)
             VALUES ($1, $2, $3, $4, FALSE, $5, $5)
             RETURNING *",
        )
        .bind(log.rma_id)
        .bind(log.user_id)
        .bind(Json(&log.payload))
        .bind(log.status.as_str())
        .bind(now())
        .fetch_one(&self.pool)
        .await?;
        log_from_row(&row)
    }

    async fn update_rma_log(&self, id: i64, update: RmaLogUpdate) -> Result<RmaRequestLog> {
        let row = sqlx::query(
            "UPDATE rma_request_logs SET
                status = COALESCE($2, status),
                webhook_status = COALESCE($3, webhook_status),
                email_notified = COALESCE($4, email_notified),
                notification_error = COALESCE($5, notification_error),
                updated_at = $6
             WHERE id = $1
             RETURNING *",
        )
        .bind(id)
        .bind(update.status.map(|s| s.as_str()))
        .bind(update.webhook_status)
        .bind(update.email_notified)
        .bind(update.notification_error)
        .bind(now())
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StorageError::NotFound)?;
        log_from_row(&row)
    }

    async fn get_rma_log(&self, id: i64) -> Result<Option<RmaRequestLog>> {
        let row = sqlx::query("SELECT * FROM rma_request_logs WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(log_from_row).transpose()
    }

    async fn list_rma_logs(&self) -> Result<Vec<RmaRequestLog>> {
        let rows = sqlx::query("SELECT * FROM rma_request_logs ORDER BY id DESC")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(log_from_row).collect()
    }
}
