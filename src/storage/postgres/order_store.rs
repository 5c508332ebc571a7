//! PostgreSQL OrderStore implementation.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::Row;

use super::{expect_affected, get_enum, PostgresStorage};
use crate::models::{
    DeliveryTimeline, NewDeliveryEvent, NewOrder, NewOrderItem, Order, OrderItem, OrderUpdate,
};
use crate::storage::helpers::{normalize, now};
use crate::storage::{OrderStore, Result, StorageError};

fn order_from_row(row: &PgRow) -> Result<Order> {
    Ok(Order {
        id: row.try_get("id")?,
        order_number: row.try_get("order_number")?,
        user_id: row.try_get("user_id")?,
        status: get_enum(row, "status")?,
        order_date: row.try_get("order_date")?,
        total_cents: row.try_get("total_cents")?,
        currency: row.try_get("currency")?,
        shipping_address: row.try_get("shipping_address")?,
        tracking_number: row.try_get("tracking_number")?,
        notes: row.try_get("notes")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn item_from_row(row: &PgRow) -> Result<OrderItem> {
    Ok(OrderItem {
        id: row.try_get("id")?,
        order_id: row.try_get("order_id")?,
        product_name: row.try_get("product_name")?,
        sku: row.try_get("sku")?,
        serial_number: row.try_get("serial_number")?,
        quantity: row.try_get("quantity")?,
        unit_price_cents: row.try_get("unit_price_cents")?,
        warranty_months: row.try_get("warranty_months")?,
    })
}

fn timeline_from_row(row: &PgRow) -> Result<DeliveryTimeline> {
    Ok(DeliveryTimeline {
        id: row.try_get("id")?,
        order_id: row.try_get("order_id")?,
        stage: row.try_get("stage")?,
        description: row.try_get("description")?,
        occurred_at: row.try_get("occurred_at")?,
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait]
impl OrderStore for PostgresStorage {
    async fn create_order(&self, order: NewOrder) -> Result<Order> {
        let row = sqlx::query(
            "INSERT INTO orders
                (order_number, user_id, status, order_date, total_cents, currency,
                 shipping_address, tracking_number, notes, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $10)
             RETURNING *",
        )
        .bind(&order.order_number)
        .bind(order.user_id)
        .bind(order.status.as_str())
        .bind(normalize(order.order_date))
        .bind(order.total_cents)
        .bind(&order.currency)
        .bind(&order.shipping_address)
        .bind(&order.tracking_number)
        .bind(&order.notes)
        .bind(now())
        .fetch_one(&self.pool)
        .await?;
        order_from_row(&row)
    }

    async fn get_order(&self, id: i64) -> Result<Option<Order>> {
        let row = sqlx::query("SELECT * FROM orders WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(order_from_row).transpose()
    }

    async fn find_order_by_number(&self, order_number: &str) -> Result<Option<Order>> {
        let row = sqlx::query("SELECT * FROM orders WHERE order_number = $1")
            .bind(order_number)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(order_from_row).transpose()
    }

    async fn list_orders(&self) -> Result<Vec<Order>> {
        let rows = sqlx::query("SELECT * FROM orders ORDER BY order_date DESC, id DESC")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(order_from_row).collect()
    }

    async fn list_orders_for_user(&self, user_id: i64) -> Result<Vec<Order>> {
        let rows = sqlx::query(
            "SELECT * FROM orders WHERE user_id = $1 ORDER BY order_date DESC, id DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(order_from_row).collect()
    }

    async fn update_order(&self, id: i64, update: OrderUpdate) -> Result<Order> {
        let row = sqlx::query(
            "UPDATE orders SET
                status = COALESCE($2, status),
                total_cents = COALESCE($3, total_cents),
                shipping_address = COALESCE($4, shipping_address),
                tracking_number = COALESCE($5, tracking_number),
                notes = COALESCE($6, notes),
                updated_at = $7
             WHERE id = $1
             RETURNING *",
        )
        .bind(id)
        .bind(update.status.map(|s| s.as_str()))
        .bind(update.total_cents)
        .bind(update.shipping_address)
        .bind(update.tracking_number)
        .bind(update.notes)
        .bind(now())
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StorageError::NotFound)?;
        order_from_row(&row)
    }

    async fn delete_order(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        expect_affected(result)
    }

    async fn add_order_item(&self, order_id: i64, item: NewOrderItem) -> Result<OrderItem> {
        let row = sqlx::query(
            "INSERT INTO order_items
                (order_id, product_name, sku, serial_number, quantity, unit_price_cents,
                 warranty_months)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING *",
        )
        .bind(order_id)
        .bind(&item.product_name)
        .bind(&item.sku)
        .bind(&item.serial_number)
        .bind(item.quantity)
        .bind(item.unit_price_cents)
        .bind(item.warranty_months)
        .fetch_one(&self.pool)
        .await?;
        item_from_row(&row)
    }

    async fn list_order_items(&self, order_id: i64) -> Result<Vec<OrderItem>> {
        let rows = sqlx::query("SELECT * FROM order_items WHERE order_id = $1 ORDER BY id")
            .bind(order_id)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(item_from_row).collect()
    }

    async fn find_order_item_by_serial(&self, serial_number: &str) -> Result<Option<OrderItem>> {
        let row = sqlx::query(
            "SELECT * FROM order_items WHERE serial_number = $1 ORDER BY id LIMIT 1",
        )
        .bind(serial_number)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(item_from_row).transpose()
    }

    async fn add_timeline_event(&self, event: NewDeliveryEvent) -> Result<DeliveryTimeline> {
        let row = sqlx::query(
            "INSERT INTO delivery_timelines (order_id, stage, description, occurred_at, created_at)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING *",
        )
        .bind(event.order_id)
        .bind(&event.stage)
        .bind(&event.description)
        .bind(normalize(event.occurred_at))
        .bind(now())
        .fetch_one(&self.pool)
        .await?;
        timeline_from_row(&row)
    }

    async fn list_timeline(&self, order_id: i64) -> Result<Vec<DeliveryTimeline>> {
        let rows = sqlx::query(
            "SELECT * FROM delivery_timelines WHERE order_id = $1 ORDER BY occurred_at, id",
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(timeline_from_row).collect()
    }
}
