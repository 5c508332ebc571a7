use async_trait::async_trait;

use super::{missing_parent, MockStorage};
use crate::models::{
    DeliveryTimeline, NewDeliveryEvent, NewOrder, NewOrderItem, Order, OrderItem, OrderUpdate,
};
use crate::storage::helpers::{normalize, now};
use crate::storage::{OrderStore, Result, StorageError};

/// Newest order date first, ties broken by id.
fn sort_orders(mut orders: Vec<Order>) -> Vec<Order> {
    orders.sort_by(|a, b| b.order_date.cmp(&a.order_date).then(b.id.cmp(&a.id)));
    orders
}

#[async_trait]
impl OrderStore for MockStorage {
    async fn create_order(&self, order: NewOrder) -> Result<Order> {
        let mut tables = self.tables.write().await;
        if tables
            .orders
            .values()
            .any(|o| o.order_number == order.order_number)
        {
            return Err(StorageError::Conflict(format!(
                "order number {} already exists",
                order.order_number
            )));
        }
        if !tables.users.contains_key(&order.user_id) {
            return Err(missing_parent("user", order.user_id));
        }
        let id = tables.next_id();
        let ts = now();
        let record = Order {
            id,
            order_number: order.order_number,
            user_id: order.user_id,
            status: order.status,
            order_date: normalize(order.order_date),
            total_cents: order.total_cents,
            currency: order.currency,
            shipping_address: order.shipping_address,
            tracking_number: order.tracking_number,
            notes: order.notes,
            created_at: ts,
            updated_at: ts,
        };
        tables.orders.insert(id, record.clone());
        Ok(record)
    }

    async fn get_order(&self, id: i64) -> Result<Option<Order>> {
        Ok(self.tables.read().await.orders.get(&id).cloned())
    }

    async fn find_order_by_number(&self, order_number: &str) -> Result<Option<Order>> {
        let tables = self.tables.read().await;
        Ok(tables
            .orders
            .values()
            .find(|o| o.order_number == order_number)
            .cloned())
    }

    async fn list_orders(&self) -> Result<Vec<Order>> {
        let tables = self.tables.read().await;
        Ok(sort_orders(tables.orders.values().cloned().collect()))
    }

    async fn list_orders_for_user(&self, user_id: i64) -> Result<Vec<Order>> {
        let tables = self.tables.read().await;
        Ok(sort_orders(
            tables
                .orders
                .values()
                .filter(|o| o.user_id == user_id)
                .cloned()
                .collect(),
        ))
    }

    async fn update_order(&self, id: i64, update: OrderUpdate) -> Result<Order> {
        let mut tables = self.tables.write().await;
        let order = tables.orders.get_mut(&id).ok_or(StorageError::NotFound)?;
        if let Some(status) = update.status {
            order.status = status;
        }
        if let Some(total) = update.total_cents {
            order.total_cents = total;
        }
        if let Some(address) = update.shipping_address {
            order.shipping_address = Some(address);
        }
        if let Some(tracking) = update.tracking_number {
            order.tracking_number = Some(tracking);
        }
        if let Some(notes) = update.notes {
            order.notes = Some(notes);
        }
        order.updated_at = now();
        Ok(order.clone())
    }

    async fn delete_order(&self, id: i64) -> Result<()> {
        let mut tables = self.tables.write().await;
        tables.orders.remove(&id).ok_or(StorageError::NotFound)?;
        tables.order_items.retain(|_, i| i.order_id != id);
        tables.timelines.retain(|_, t| t.order_id != id);
        for rma in tables.rmas.values_mut() {
            if rma.order_id == Some(id) {
                rma.order_id = None;
            }
        }
        for impact in tables.impacts.values_mut() {
            if impact.order_id == Some(id) {
                impact.order_id = None;
            }
        }
        Ok(())
    }

    async fn add_order_item(&self, order_id: i64, item: NewOrderItem) -> Result<OrderItem> {
        self.take_order_item_budget().await?;
        let mut tables = self.tables.write().await;
        if !tables.orders.contains_key(&order_id) {
            return Err(missing_parent("order", order_id));
        }
        let id = tables.next_id();
        let record = OrderItem {
            id,
            order_id,
            product_name: item.product_name,
            sku: item.sku,
            serial_number: item.serial_number,
            quantity: item.quantity,
            unit_price_cents: item.unit_price_cents,
            warranty_months: item.warranty_months,
        };
        tables.order_items.insert(id, record.clone());
        Ok(record)
    }

    async fn list_order_items(&self, order_id: i64) -> Result<Vec<OrderItem>> {
        let tables = self.tables.read().await;
        Ok(tables
            .order_items
            .values()
            .filter(|i| i.order_id == order_id)
            .cloned()
            .collect())
    }

    async fn find_order_item_by_serial(&self, serial_number: &str) -> Result<Option<OrderItem>> {
        let tables = self.tables.read().await;
        Ok(tables
            .order_items
            .values()
            .find(|i| i.serial_number.as_deref() == Some(serial_number))
            .cloned())
    }

    async fn add_timeline_event(&self, event: NewDeliveryEvent) -> Result<DeliveryTimeline> {
        let mut tables = self.tables.write().await;
        if !tables.orders.contains_key(&event.order_id) {
            return Err(missing_parent("order", event.order_id));
        }
        let id = tables.next_id();
        let record = DeliveryTimeline {
            id,
            order_id: event.order_id,
            stage: event.stage,
            description: event.description,
            occurred_at: normalize(event.occurred_at),
            created_at: now(),
        };
        tables.timelines.insert(id, record.clone());
        Ok(record)
    }

    async fn list_timeline(&self, order_id: i64) -> Result<Vec<DeliveryTimeline>> {
        let tables = self.tables.read().await;
        let mut events: Vec<_> = tables
            .timelines
            .values()
            .filter(|t| t.order_id == order_id)
            .cloned()
            .collect();
        events.sort_by(|a, b| a.occurred_at.cmp(&b.occurred_at).then(a.id.cmp(&b.id)));
        Ok(events)
    }
}
