//! Orders, their line items and delivery tracking events.

use serde::{Deserialize, Serialize};

use super::{string_enum, Timestamp};

string_enum! {
    pub enum OrderStatus ("order status") {
        Pending => "pending",
        Processing => "processing",
        Shipped => "shipped",
        Delivered => "delivered",
        Cancelled => "cancelled",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub order_number: String,
    pub user_id: i64,
    pub status: OrderStatus,
    pub order_date: Timestamp,
    pub total_cents: i64,
    pub currency: String,
    pub shipping_address: Option<String>,
    pub tracking_number: Option<String>,
    pub notes: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone)]
pub struct NewOrder {
    pub order_number: String,
    pub user_id: i64,
    pub status: OrderStatus,
    pub order_date: Timestamp,
    pub total_cents: i64,
    pub currency: String,
    pub shipping_address: Option<String>,
    pub tracking_number: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct OrderUpdate {
    pub status: Option<OrderStatus>,
    pub total_cents: Option<i64>,
    pub shipping_address: Option<String>,
    pub tracking_number: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub product_name: String,
    pub sku: Option<String>,
    pub serial_number: Option<String>,
    pub quantity: i32,
    pub unit_price_cents: i64,
    pub warranty_months: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewOrderItem {
    pub product_name: String,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub serial_number: Option<String>,
    pub quantity: i32,
    pub unit_price_cents: i64,
    #[serde(default = "default_warranty_months")]
    pub warranty_months: i32,
}

fn default_warranty_months() -> i32 {
    12
}

/// A tracking event on an order ("picked", "in transit", "delivered", ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryTimeline {
    pub id: i64,
    pub order_id: i64,
    pub stage: String,
    pub description: Option<String>,
    pub occurred_at: Timestamp,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone)]
pub struct NewDeliveryEvent {
    pub order_id: i64,
    pub stage: String,
    pub description: Option<String>,
    pub occurred_at: Timestamp,
}

/// Sum of `quantity * unit_price_cents` over the items, `None` on overflow.
pub fn items_total_cents(items: &[NewOrderItem]) -> Option<i64> {
    items.iter().try_fold(0i64, |total, i| {
        i64::from(i.quantity)
            .checked_mul(i.unit_price_cents)
            .and_then(|line| total.checked_add(line))
    })
}
