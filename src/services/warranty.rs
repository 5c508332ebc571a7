//! Warranty lookup by serial number.

use chrono::{Months, NaiveDate, Utc};
use serde::Serialize;

use crate::models::{Order, OrderItem};
use crate::storage::{Result, Storage};

/// Public warranty answer. Carries no customer identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WarrantyStatus {
    pub serial_number: String,
    pub product_name: String,
    pub order_number: String,
    pub purchase_date: NaiveDate,
    pub warranty_months: i32,
    pub expires_on: NaiveDate,
    pub in_warranty: bool,
}

/// Expiry is the purchase date plus whole calendar months, clamped to the
/// end of shorter months (Jan 31 + 1 month = Feb 28/29).
pub fn warranty_status(item: &OrderItem, order: &Order, today: NaiveDate) -> WarrantyStatus {
    let purchase_date = order.order_date.date_naive();
    let months = u32::try_from(item.warranty_months).unwrap_or(0);
    let expires_on = purchase_date
        .checked_add_months(Months::new(months))
        .unwrap_or(NaiveDate::MAX);

    WarrantyStatus {
        serial_number: item.serial_number.clone().unwrap_or_default(),
        product_name: item.product_name.clone(),
        order_number: order.order_number.clone(),
        purchase_date,
        warranty_months: item.warranty_months,
        expires_on,
        in_warranty: expires_on >= today,
    }
}

/// `None` when no order item carries `serial`.
pub async fn lookup(storage: &dyn Storage, serial: &str) -> Result<Option<WarrantyStatus>> {
    let serial = serial.trim();
    if serial.is_empty() {
        return Ok(None);
    }
    let Some(item) = storage.find_order_item_by_serial(serial).await? else {
        return Ok(None);
    };
    let Some(order) = storage.get_order(item.order_id).await? else {
        return Ok(None);
    };
    Ok(Some(warranty_status(&item, &order, Utc::now().date_naive())))
}
