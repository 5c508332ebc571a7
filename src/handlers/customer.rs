//! Endpoints for a signed-in customer's own records.
//!
//! Records owned by someone else answer 404, not 403, so ids cannot be probed.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use super::error::ApiResult;
use super::extract::{CurrentUser, JsonBody, ValidJson};
use super::{created, ApiError, AppState};
use crate::models::{
    DeliveryTimeline, EnvironmentalImpact, ImpactTotals, NewSupportTicket, Order, OrderItem, Rma,
    RmaItem, SupportTicket, TicketPriority,
};
use crate::services::{compute_score, refresh_progress, EsgScore, ProgressReport, RmaSubmission};
use crate::validation::{limits, Errors, FieldError, Validate};

#[derive(Debug, Serialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub timeline: Vec<DeliveryTimeline>,
}

#[derive(Debug, Serialize)]
pub struct RmaDetail {
    #[serde(flatten)]
    pub rma: Rma,
    pub items: Vec<RmaItem>,
}

pub(crate) async fn order_detail(state: &AppState, order: Order) -> ApiResult<OrderDetail> {
    let items = state.storage.list_order_items(order.id).await?;
    let timeline = state.storage.list_timeline(order.id).await?;
    Ok(OrderDetail {
        order,
        items,
        timeline,
    })
}

pub(crate) async fn rma_detail(state: &AppState, rma: Rma) -> ApiResult<RmaDetail> {
    let items = state.storage.list_rma_items(rma.id).await?;
    Ok(RmaDetail { rma, items })
}

pub async fn list_orders(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<Vec<Order>>> {
    Ok(Json(state.storage.list_orders_for_user(user.id).await?))
}

pub async fn get_order(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<OrderDetail>> {
    match state.storage.get_order(id).await? {
        Some(order) if order.user_id == user.id => Ok(Json(order_detail(&state, order).await?)),
        _ => Err(ApiError::not_found()),
    }
}

pub async fn list_rmas(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<Vec<Rma>>> {
    Ok(Json(state.storage.list_rmas_for_user(user.id).await?))
}

pub async fn get_rma(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<RmaDetail>> {
    match state.storage.get_rma(id).await? {
        Some(rma) if rma.user_id == user.id => Ok(Json(rma_detail(&state, rma).await?)),
        _ => Err(ApiError::not_found()),
    }
}

/// Validation happens inside the service so it covers every caller.
pub async fn submit_rma(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    JsonBody(submission): JsonBody<RmaSubmission>,
) -> ApiResult<impl IntoResponse> {
    let submitted = state.rma.submit(&user, submission).await?;
    Ok(created(submitted))
}

#[derive(Debug, Deserialize)]
pub struct TicketRequest {
    pub subject: String,
    pub message: String,
    #[serde(default)]
    pub priority: TicketPriority,
}

impl Validate for TicketRequest {
    fn validate(&self) -> Vec<FieldError> {
        let mut errors = Errors::new();
        errors.required("subject", &self.subject, limits::MAX_NAME_LENGTH);
        errors.required("message", &self.message, limits::MAX_TEXT_LENGTH);
        errors.into_vec()
    }
}

pub async fn list_tickets(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<Vec<SupportTicket>>> {
    Ok(Json(state.storage.list_tickets_for_user(user.id).await?))
}

pub async fn create_ticket(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ValidJson(req): ValidJson<TicketRequest>,
) -> ApiResult<impl IntoResponse> {
    let ticket = state
        .storage
        .create_ticket(NewSupportTicket {
            user_id: user.id,
            subject: req.subject.trim().to_string(),
            message: req.message,
            priority: req.priority,
        })
        .await?;
    Ok(created(ticket))
}

pub async fn list_impact(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<Vec<EnvironmentalImpact>>> {
    Ok(Json(state.storage.list_impact_for_user(user.id).await?))
}

pub async fn impact_summary(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<ImpactTotals>> {
    Ok(Json(state.storage.sum_impact(user.id).await?))
}

pub async fn esg_score(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<EsgScore>> {
    let totals = state.storage.sum_impact(user.id).await?;
    Ok(Json(compute_score(totals, &state.scoring)))
}

pub async fn progress(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<ProgressReport>> {
    Ok(Json(
        refresh_progress(&*state.storage, user.id, &state.scoring).await?,
    ))
}
