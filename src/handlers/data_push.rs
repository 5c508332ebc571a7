//! Endpoints upstream systems (ERP, logistics, impact calculators) push to.
//!
//! Records reference customers by email and orders by order number, the keys
//! those systems know.

use axum::extract::State;
use axum::response::IntoResponse;
use chrono::Utc;
use serde::Deserialize;
use tracing::{error, info, warn};

use super::customer::order_detail;
use super::error::{errmsg, ApiResult};
use super::extract::{ApiClient, ValidJson};
use super::{created, ApiError, AppState};
use crate::models::order::items_total_cents;
use crate::models::user::normalize_email;
use crate::models::{
    NewDeliveryEvent, NewImpact, NewOrder, NewOrderItem, Order, OrderStatus, Timestamp, User,
};
use crate::validation::{errmsg as fieldmsg, limits, Errors, FieldError, Validate};

pub const ORDERS_WRITE: &str = "orders:write";
pub const IMPACT_WRITE: &str = "impact:write";
pub const TIMELINES_WRITE: &str = "timelines:write";

impl Validate for NewOrderItem {
    fn validate(&self) -> Vec<FieldError> {
        let mut errors = Errors::new();
        errors.required("product_name", &self.product_name, limits::MAX_NAME_LENGTH);
        errors.optional("sku", self.sku.as_deref(), limits::MAX_NAME_LENGTH);
        errors.optional("serial_number", self.serial_number.as_deref(), limits::MAX_NAME_LENGTH);
        errors.positive("quantity", i64::from(self.quantity));
        if self.unit_price_cents < 0 {
            errors.add("unit_price_cents", crate::validation::errmsg::NEGATIVE);
        }
        if self.warranty_months < 0 {
            errors.add("warranty_months", crate::validation::errmsg::NEGATIVE);
        }
        errors.into_vec()
    }
}

/// Validate a list of order items into `errors`.
pub(crate) fn validate_items(errors: &mut Errors, items: &[NewOrderItem]) {
    for (i, item) in items.iter().enumerate() {
        errors.nested(&format!("items[{i}]"), item.validate());
    }
    if items_total_cents(items).is_none() {
        errors.add("items", fieldmsg::TOTAL_OUT_OF_RANGE);
    }
}

/// Order total derived from the items.
pub(crate) fn order_total(items: &[NewOrderItem]) -> ApiResult<i64> {
    items_total_cents(items).ok_or_else(|| {
        ApiError::Validation(vec![FieldError::new("items", fieldmsg::TOTAL_OUT_OF_RANGE)])
    })
}

/// Insert the items of a freshly created order.
///
/// On failure the order is deleted again (items cascade), so callers never
/// leave an order holding only part of its items.
pub(crate) async fn insert_order_items(
    state: &AppState,
    order: &Order,
    items: Vec<NewOrderItem>,
) -> ApiResult<()> {
    for item in items {
        if let Err(e) = state.storage.add_order_item(order.id, item).await {
            warn!(order = %order.order_number, error = %e, "order item insert failed, rolling back");
            if let Err(cleanup) = state.storage.delete_order(order.id).await {
                error!(order = %order.order_number, error = %cleanup, "failed to remove order");
            }
            return Err(e.into());
        }
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
pub struct PushOrderRequest {
    pub customer_email: String,
    pub order_number: String,
    #[serde(default)]
    pub status: Option<OrderStatus>,
    #[serde(default)]
    pub order_date: Option<Timestamp>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub shipping_address: Option<String>,
    #[serde(default)]
    pub tracking_number: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub items: Vec<NewOrderItem>,
}

impl Validate for PushOrderRequest {
    fn validate(&self) -> Vec<FieldError> {
        let mut errors = Errors::new();
        errors.email("customer_email", &self.customer_email);
        errors.required("order_number", &self.order_number, limits::MAX_NAME_LENGTH);
        validate_items(&mut errors, &self.items);
        errors.into_vec()
    }
}

async fn customer_by_email(state: &AppState, email: &str) -> ApiResult<User> {
    state
        .storage
        .find_user_by_email(&normalize_email(email))
        .await?
        .filter(|u| u.deleted_at.is_none())
        .ok_or(ApiError::NotFound(errmsg::CUSTOMER_NOT_FOUND))
}

pub async fn push_order(
    State(state): State<AppState>,
    client: ApiClient,
    ValidJson(req): ValidJson<PushOrderRequest>,
) -> ApiResult<impl IntoResponse> {
    client.require(ORDERS_WRITE)?;
    let customer = customer_by_email(&state, &req.customer_email).await?;
    let total_cents = order_total(&req.items)?;

    let order = state
        .storage
        .create_order(NewOrder {
            order_number: req.order_number.trim().to_string(),
            user_id: customer.id,
            status: req.status.unwrap_or(OrderStatus::Pending),
            order_date: req.order_date.unwrap_or_else(Utc::now),
            total_cents,
            currency: req.currency.unwrap_or_else(|| "USD".to_string()),
            shipping_address: req.shipping_address,
            tracking_number: req.tracking_number,
            notes: req.notes,
        })
        .await?;
    insert_order_items(&state, &order, req.items).await?;

    info!(key = %client.0.key_prefix, order = %order.order_number, "order pushed");
    Ok(created(order_detail(&state, order).await?))
}

#[derive(Debug, Deserialize)]
pub struct ImpactRecord {
    pub customer_email: String,
    #[serde(default)]
    pub order_number: Option<String>,
    #[serde(default)]
    pub carbon_kg: f64,
    #[serde(default)]
    pub water_liters: f64,
    #[serde(default)]
    pub minerals_kg: f64,
    #[serde(default)]
    pub families_helped: i64,
    #[serde(default)]
    pub recorded_at: Option<Timestamp>,
}

impl Validate for ImpactRecord {
    fn validate(&self) -> Vec<FieldError> {
        let mut errors = Errors::new();
        errors.email("customer_email", &self.customer_email);
        errors.non_negative("carbon_kg", self.carbon_kg);
        errors.non_negative("water_liters", self.water_liters);
        errors.non_negative("minerals_kg", self.minerals_kg);
        if self.families_helped < 0 {
            errors.add("families_helped", crate::validation::errmsg::NEGATIVE);
        }
        errors.into_vec()
    }
}

#[derive(Debug, Deserialize)]
pub struct PushImpactRequest {
    pub records: Vec<ImpactRecord>,
}

impl Validate for PushImpactRequest {
    fn validate(&self) -> Vec<FieldError> {
        let mut errors = Errors::new();
        if self.records.is_empty() {
            errors.add("records", crate::validation::errmsg::REQUIRED);
        }
        for (i, record) in self.records.iter().enumerate() {
            errors.nested(&format!("records[{i}]"), record.validate());
        }
        errors.into_vec()
    }
}

/// Every record's customer and order are resolved before the first write, so
/// an unknown reference rejects the whole batch.
pub async fn push_impact(
    State(state): State<AppState>,
    client: ApiClient,
    ValidJson(req): ValidJson<PushImpactRequest>,
) -> ApiResult<impl IntoResponse> {
    client.require(IMPACT_WRITE)?;

    let mut resolved = Vec::with_capacity(req.records.len());
    for record in req.records {
        let customer = customer_by_email(&state, &record.customer_email).await?;
        let order_id = match record.order_number.as_deref() {
            Some(number) => match state.storage.find_order_by_number(number).await? {
                Some(order) if order.user_id == customer.id => Some(order.id),
                _ => return Err(ApiError::NotFound(errmsg::ORDER_NOT_FOUND)),
            },
            None => None,
        };
        resolved.push(NewImpact {
            user_id: customer.id,
            order_id,
            carbon_kg: record.carbon_kg,
            water_liters: record.water_liters,
            minerals_kg: record.minerals_kg,
            families_helped: record.families_helped,
            recorded_at: record.recorded_at.unwrap_or_else(Utc::now),
        });
    }

    let mut rows = Vec::with_capacity(resolved.len());
    for impact in resolved {
        match state.storage.add_impact(impact).await {
            Ok(row) => rows.push(row),
            Err(e) => {
                warn!(error = %e, written = rows.len(), "impact insert failed, rolling back");
                for row in &rows {
                    if let Err(cleanup) = state.storage.delete_impact(row.id).await {
                        error!(impact = row.id, error = %cleanup, "failed to remove impact row");
                    }
                }
                return Err(e.into());
            }
        }
    }

    info!(key = %client.0.key_prefix, rows = rows.len(), "impact pushed");
    Ok(created(rows))
}

#[derive(Debug, Deserialize)]
pub struct PushTimelineRequest {
    pub order_number: String,
    pub stage: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub occurred_at: Option<Timestamp>,
}

impl Validate for PushTimelineRequest {
    fn validate(&self) -> Vec<FieldError> {
        let mut errors = Errors::new();
        errors.required("order_number", &self.order_number, limits::MAX_NAME_LENGTH);
        errors.required("stage", &self.stage, limits::MAX_NAME_LENGTH);
        errors.optional("description", self.description.as_deref(), limits::MAX_TEXT_LENGTH);
        errors.into_vec()
    }
}

pub async fn push_timeline(
    State(state): State<AppState>,
    client: ApiClient,
    ValidJson(req): ValidJson<PushTimelineRequest>,
) -> ApiResult<impl IntoResponse> {
    client.require(TIMELINES_WRITE)?;
    let order = state
        .storage
        .find_order_by_number(req.order_number.trim())
        .await?
        .ok_or(ApiError::NotFound(errmsg::ORDER_NOT_FOUND))?;

    let event = state
        .storage
        .add_timeline_event(NewDeliveryEvent {
            order_id: order.id,
            stage: req.stage.trim().to_string(),
            description: req.description,
            occurred_at: req.occurred_at.unwrap_or_else(Utc::now),
        })
        .await?;
    Ok(created(event))
}
