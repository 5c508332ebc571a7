//! SQLite OrderStore implementation.

use async_trait::async_trait;
use sea_query::{Asterisk, Expr, Order as SortOrder, Query, SqliteQueryBuilder};
use sea_query_binder::SqlxBinder;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use super::{get_enum, get_ts, SqliteStorage};
use crate::models::{
    DeliveryTimeline, NewDeliveryEvent, NewOrder, NewOrderItem, Order, OrderItem, OrderUpdate,
};
use crate::storage::helpers::{now, ts_to_text};
use crate::storage::schema::{DeliveryTimelines, OrderItems, Orders};
use crate::storage::{OrderStore, Result, StorageError};

fn order_from_row(row: &SqliteRow) -> Result<Order> {
    Ok(Order {
        id: row.try_get("id")?,
        order_number: row.try_get("order_number")?,
        user_id: row.try_get("user_id")?,
        status: get_enum(row, "status")?,
        order_date: get_ts(row, "order_date")?,
        total_cents: row.try_get("total_cents")?,
        currency: row.try_get("currency")?,
        shipping_address: row.try_get("shipping_address")?,
        tracking_number: row.try_get("tracking_number")?,
        notes: row.try_get("notes")?,
        created_at: get_ts(row, "created_at")?,
        updated_at: get_ts(row, "updated_at")?,
    })
}

fn item_from_row(row: &SqliteRow) -> Result<OrderItem> {
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

fn timeline_from_row(row: &SqliteRow) -> Result<DeliveryTimeline> {
    Ok(DeliveryTimeline {
        id: row.try_get("id")?,
        order_id: row.try_get("order_id")?,
        stage: row.try_get("stage")?,
        description: row.try_get("description")?,
        occurred_at: get_ts(row, "occurred_at")?,
        created_at: get_ts(row, "created_at")?,
    })
}

#[async_trait]
impl OrderStore for SqliteStorage {
    async fn create_order(&self, order: NewOrder) -> Result<Order> {
        let ts = ts_to_text(&now());
        let (sql, values) = Query::insert()
            .into_table(Orders::Table)
            .columns([
                Orders::OrderNumber,
                Orders::UserId,
                Orders::Status,
                Orders::OrderDate,
                Orders::TotalCents,
                Orders::Currency,
                Orders::ShippingAddress,
                Orders::TrackingNumber,
                Orders::Notes,
                Orders::CreatedAt,
                Orders::UpdatedAt,
            ])
            .values([
                order.order_number.into(),
                order.user_id.into(),
                order.status.as_str().into(),
                ts_to_text(&order.order_date).into(),
                order.total_cents.into(),
                order.currency.into(),
                order.shipping_address.into(),
                order.tracking_number.into(),
                order.notes.into(),
                ts.clone().into(),
                ts.into(),
            ])?
            .returning_all()
            .build_sqlx(SqliteQueryBuilder);

        let row = sqlx::query_with(&sql, values).fetch_one(&self.pool).await?;
        order_from_row(&row)
    }

    async fn get_order(&self, id: i64) -> Result<Option<Order>> {
        let (sql, values) = Query::select()
            .column(Asterisk)
            .from(Orders::Table)
            .and_where(Expr::col(Orders::Id).eq(id))
            .build_sqlx(SqliteQueryBuilder);

        let row = sqlx::query_with(&sql, values)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(order_from_row).transpose()
    }

    async fn find_order_by_number(&self, order_number: &str) -> Result<Option<Order>> {
        let (sql, values) = Query::select()
            .column(Asterisk)
            .from(Orders::Table)
            .and_where(Expr::col(Orders::OrderNumber).eq(order_number))
            .build_sqlx(SqliteQueryBuilder);

        let row = sqlx::query_with(&sql, values)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(order_from_row).transpose()
    }

    async fn list_orders(&self) -> Result<Vec<Order>> {
        let (sql, values) = Query::select()
            .column(Asterisk)
            .from(Orders::Table)
            .order_by(Orders::OrderDate, SortOrder::Desc)
            .order_by(Orders::Id, SortOrder::Desc)
            .build_sqlx(SqliteQueryBuilder);

        let rows = sqlx::query_with(&sql, values).fetch_all(&self.pool).await?;
        rows.iter().map(order_from_row).collect()
    }

    async fn list_orders_for_user(&self, user_id: i64) -> Result<Vec<Order>> {
        let (sql, values) = Query::select()
            .column(Asterisk)
            .from(Orders::Table)
            .and_where(Expr::col(Orders::UserId).eq(user_id))
            .order_by(Orders::OrderDate, SortOrder::Desc)
            .order_by(Orders::Id, SortOrder::Desc)
            .build_sqlx(SqliteQueryBuilder);

        let rows = sqlx::query_with(&sql, values).fetch_all(&self.pool).await?;
        rows.iter().map(order_from_row).collect()
    }

    async fn update_order(&self, id: i64, update: OrderUpdate) -> Result<Order> {
        let mut query = Query::update();
        query
            .table(Orders::Table)
            .value(Orders::UpdatedAt, ts_to_text(&now()));
        if let Some(status) = update.status {
            query.value(Orders::Status, status.as_str());
        }
        if let Some(total) = update.total_cents {
            query.value(Orders::TotalCents, total);
        }
        if let Some(address) = update.shipping_address {
            query.value(Orders::ShippingAddress, address);
        }
        if let Some(tracking) = update.tracking_number {
            query.value(Orders::TrackingNumber, tracking);
        }
        if let Some(notes) = update.notes {
            query.value(Orders::Notes, notes);
        }
        let (sql, values) = query
            .and_where(Expr::col(Orders::Id).eq(id))
            .returning_all()
            .build_sqlx(SqliteQueryBuilder);

        let row = sqlx::query_with(&sql, values)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StorageError::NotFound)?;
        order_from_row(&row)
    }

    async fn delete_order(&self, id: i64) -> Result<()> {
        let (sql, values) = Query::delete()
            .from_table(Orders::Table)
            .and_where(Expr::col(Orders::Id).eq(id))
            .build_sqlx(SqliteQueryBuilder);

        let result = sqlx::query_with(&sql, values).execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }

    async fn add_order_item(&self, order_id: i64, item: NewOrderItem) -> Result<OrderItem> {
        let (sql, values) = Query::insert()
            .into_table(OrderItems::Table)
            .columns([
                OrderItems::OrderId,
                OrderItems::ProductName,
                OrderItems::Sku,
                OrderItems::SerialNumber,
                OrderItems::Quantity,
                OrderItems::UnitPriceCents,
                OrderItems::WarrantyMonths,
            ])
            .values([
                order_id.into(),
                item.product_name.into(),
                item.sku.into(),
                item.serial_number.into(),
                item.quantity.into(),
                item.unit_price_cents.into(),
                item.warranty_months.into(),
            ])?
            .returning_all()
            .build_sqlx(SqliteQueryBuilder);

        let row = sqlx::query_with(&sql, values).fetch_one(&self.pool).await?;
        item_from_row(&row)
    }

    async fn list_order_items(&self, order_id: i64) -> Result<Vec<OrderItem>> {
        let (sql, values) = Query::select()
            .column(Asterisk)
            .from(OrderItems::Table)
            .and_where(Expr::col(OrderItems::OrderId).eq(order_id))
            .order_by(OrderItems::Id, SortOrder::Asc)
            .build_sqlx(SqliteQueryBuilder);

        let rows = sqlx::query_with(&sql, values).fetch_all(&self.pool).await?;
        rows.iter().map(item_from_row).collect()
    }

    async fn find_order_item_by_serial(&self, serial_number: &str) -> Result<Option<OrderItem>> {
        let (sql, values) = Query::select()
            .column(Asterisk)
            .from(OrderItems::Table)
            .and_where(Expr::col(OrderItems::SerialNumber).eq(serial_number))
            .order_by(OrderItems::Id, SortOrder::Asc)
            .limit(1)
            .build_sqlx(SqliteQueryBuilder);

        let row = sqlx::query_with(&sql, values)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(item_from_row).transpose()
    }

    async fn add_timeline_event(&self, event: NewDeliveryEvent) -> Result<DeliveryTimeline> {
        let (sql, values) = Query::insert()
            .into_table(DeliveryTimelines::Table)
            .columns([
                DeliveryTimelines::OrderId,
                DeliveryTimelines::Stage,
                DeliveryTimelines::Description,
                DeliveryTimelines::OccurredAt,
                DeliveryTimelines::CreatedAt,
            ])
            .values([
                event.order_id.into(),
                event.stage.into(),
                event.description.into(),
                ts_to_text(&event.occurred_at).into(),
                ts_to_text(&now()).into(),
            ])?
            .returning_all()
            .build_sqlx(SqliteQueryBuilder);

        let row = sqlx::query_with(&sql, values).fetch_one(&self.pool).await?;
        timeline_from_row(&row)
    }

    async fn list_timeline(&self, order_id: i64) -> Result<Vec<DeliveryTimeline>> {
        let (sql, values) = Query::select()
            .column(Asterisk)
            .from(DeliveryTimelines::Table)
            .and_where(Expr::col(DeliveryTimelines::OrderId).eq(order_id))
            .order_by(DeliveryTimelines::OccurredAt, SortOrder::Asc)
            .order_by(DeliveryTimelines::Id, SortOrder::Asc)
            .build_sqlx(SqliteQueryBuilder);

        let rows = sqlx::query_with(&sql, values).fetch_all(&self.pool).await?;
        rows.iter().map(timeline_from_row).collect()
    }
}
