use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;

use super::no_content;
use crate::handlers::customer::{order_detail, OrderDetail};
use crate::handlers::data_push::{insert_order_items, order_total, validate_items};
use crate::handlers::error::ApiResult;
use crate::handlers::extract::{AdminUser, ValidJson};
use crate::handlers::{created, ApiError, AppState};
use crate::models::{
    NewDeliveryEvent, NewOrder, NewOrderItem, Order, OrderStatus, OrderUpdate, Timestamp,
};
use crate::validation::{limits, Errors, FieldError, Validate};

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub order_number: String,
    pub user_id: i64,
    #[serde(default)]
    pub status: Option<OrderStatus>,
    #[serde(default)]
    pub order_date: Option<Timestamp>,
    /// Defaults to the sum of the items.
    #[serde(default)]
    pub total_cents: Option<i64>,
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

impl Validate for CreateOrderRequest {
    fn validate(&self) -> Vec<FieldError> {
        let mut errors = Errors::new();
        errors.required("order_number", &self.order_number, limits::MAX_NAME_LENGTH);
        if let Some(total) = self.total_cents {
            if total < 0 {
                errors.add("total_cents", crate::validation::errmsg::NEGATIVE);
            }
        }
        if let Some(currency) = &self.currency {
            if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_uppercase()) {
                errors.add("currency", "must be a three-letter ISO code");
            }
        }
        validate_items(&mut errors, &self.items);
        errors.into_vec()
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateOrderRequest {
    #[serde(default)]
    pub status: Option<OrderStatus>,
    #[serde(default)]
    pub total_cents: Option<i64>,
    #[serde(default)]
    pub shipping_address: Option<String>,
    #[serde(default)]
    pub tracking_number: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Validate for UpdateOrderRequest {
    fn validate(&self) -> Vec<FieldError> {
        let mut errors = Errors::new();
        if self.total_cents.is_some_and(|t| t < 0) {
            errors.add("total_cents", crate::validation::errmsg::NEGATIVE);
        }
        errors.into_vec()
    }
}

#[derive(Debug, Deserialize)]
pub struct TimelineRequest {
    pub stage: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub occurred_at: Option<Timestamp>,
}

impl Validate for TimelineRequest {
    fn validate(&self) -> Vec<FieldError> {
        let mut errors = Errors::new();
        errors.required("stage", &self.stage, limits::MAX_NAME_LENGTH);
        errors.optional("description", self.description.as_deref(), limits::MAX_TEXT_LENGTH);
        errors.into_vec()
    }
}

pub async fn list(State(state): State<AppState>, _: AdminUser) -> ApiResult<Json<Vec<Order>>> {
    Ok(Json(state.storage.list_orders().await?))
}

pub async fn create(
    State(state): State<AppState>,
    _: AdminUser,
    ValidJson(req): ValidJson<CreateOrderRequest>,
) -> ApiResult<impl IntoResponse> {
    if state.storage.get_user(req.user_id).await?.is_none() {
        return Err(ApiError::BadRequest(format!("user {} does not exist", req.user_id)));
    }
    let total_cents = match req.total_cents {
        Some(total) => total,
        None => order_total(&req.items)?,
    };
    let order = state
        .storage
        .create_order(NewOrder {
            order_number: req.order_number.trim().to_string(),
            user_id: req.user_id,
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
    Ok(created(order_detail(&state, order).await?))
}

pub async fn get(
    State(state): State<AppState>,
    _: AdminUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<OrderDetail>> {
    let order = state
        .storage
        .get_order(id)
        .await?
        .ok_or_else(ApiError::not_found)?;
    Ok(Json(order_detail(&state, order).await?))
}

pub async fn update(
    State(state): State<AppState>,
    _: AdminUser,
    Path(id): Path<i64>,
    ValidJson(req): ValidJson<UpdateOrderRequest>,
) -> ApiResult<Json<Order>> {
    let order = state
        .storage
        .update_order(
            id,
            OrderUpdate {
                status: req.status,
                total_cents: req.total_cents,
                shipping_address: req.shipping_address,
                tracking_number: req.tracking_number,
                notes: req.notes,
            },
        )
        .await?;
    Ok(Json(order))
}

pub async fn delete(
    State(state): State<AppState>,
    _: AdminUser,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    state.storage.delete_order(id).await?;
    Ok(no_content())
}

pub async fn add_timeline(
    State(state): State<AppState>,
    _: AdminUser,
    Path(id): Path<i64>,
    ValidJson(req): ValidJson<TimelineRequest>,
) -> ApiResult<impl IntoResponse> {
    if state.storage.get_order(id).await?.is_none() {
        return Err(ApiError::not_found());
    }
    let event = state
        .storage
        .add_timeline_event(NewDeliveryEvent {
            order_id: id,
            stage: req.stage.trim().to_string(),
            description: req.description,
            occurred_at: req.occurred_at.unwrap_or_else(Utc::now),
        })
        .await?;
    Ok(created(event))
}
