//! OrderStore trait definition.

use async_trait::async_trait;

use super::Result;
use crate::models::{
    DeliveryTimeline, NewDeliveryEvent, NewOrder, NewOrderItem, Order, OrderItem, OrderUpdate,
};

/// Interface for orders, line items and delivery tracking.
///
/// `order_number` is unique. Deleting an order removes its items and
/// timeline events.
#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn create_order(&self, order: NewOrder) -> Result<Order>;

    async fn get_order(&self, id: i64) -> Result<Option<Order>>;

    async fn find_order_by_number(&self, order_number: &str) -> Result<Option<Order>>;

    /// All orders, newest order date first.
    async fn list_orders(&self) -> Result<Vec<Order>>;

    async fn list_orders_for_user(&self, user_id: i64) -> Result<Vec<Order>>;

    async fn update_order(&self, id: i64, update: OrderUpdate) -> Result<Order>;

    async fn delete_order(&self, id: i64) -> Result<()>;

    async fn add_order_item(&self, order_id: i64, item: NewOrderItem) -> Result<OrderItem>;

    async fn list_order_items(&self, order_id: i64) -> Result<Vec<OrderItem>>;

    /// Warranty lookups go through the serial number printed on the unit.
    async fn find_order_item_by_serial(&self, serial_number: &str) -> Result<Option<OrderItem>>;

    async fn add_timeline_event(&self, event: NewDeliveryEvent) -> Result<DeliveryTimeline>;

    /// Events for an order, oldest first.
    async fn list_timeline(&self, order_id: i64) -> Result<Vec<DeliveryTimeline>>;
}
