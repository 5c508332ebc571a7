use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use super::no_content;
use crate::handlers::error::ApiResult;
use crate::handlers::extract::{AdminUser, JsonBody};
use crate::handlers::AppState;
use crate::models::{SupportTicket, TicketUpdate};

pub async fn list(
    State(state): State<AppState>,
    _: AdminUser,
) -> ApiResult<Json<Vec<SupportTicket>>> {
    Ok(Json(state.storage.list_tickets().await?))
}

pub async fn update(
    State(state): State<AppState>,
    _: AdminUser,
    Path(id): Path<i64>,
    JsonBody(update): JsonBody<TicketUpdate>,
) -> ApiResult<Json<SupportTicket>> {
    Ok(Json(state.storage.update_ticket(id, update).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    _: AdminUser,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    state.storage.delete_ticket(id).await?;
    Ok(no_content())
}
