use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use tracing::info;

use super::no_content;
use crate::handlers::customer::{rma_detail, RmaDetail};
use crate::handlers::error::ApiResult;
use crate::handlers::extract::{AdminUser, ValidJson};
use crate::handlers::{ApiError, AppState};
use crate::models::{Rma, RmaRequestLog, RmaStatus, RmaUpdate};
use crate::validation::{limits, Errors, FieldError, Validate};

#[derive(Debug, Default, Deserialize)]
pub struct UpdateRmaRequest {
    #[serde(default)]
    pub status: Option<RmaStatus>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Validate for UpdateRmaRequest {
    fn validate(&self) -> Vec<FieldError> {
        let mut errors = Errors::new();
        errors.optional("notes", self.notes.as_deref(), limits::MAX_TEXT_LENGTH);
        errors.into_vec()
    }
}

pub async fn list(State(state): State<AppState>, _: AdminUser) -> ApiResult<Json<Vec<Rma>>> {
    Ok(Json(state.storage.list_rmas().await?))
}

pub async fn get(
    State(state): State<AppState>,
    _: AdminUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<RmaDetail>> {
    let rma = state
        .storage
        .get_rma(id)
        .await?
        .ok_or_else(ApiError::not_found)?;
    Ok(Json(rma_detail(&state, rma).await?))
}

pub async fn update(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<i64>,
    ValidJson(req): ValidJson<UpdateRmaRequest>,
) -> ApiResult<Json<Rma>> {
    let rma = state
        .storage
        .update_rma(
            id,
            RmaUpdate {
                status: req.status,
                notes: req.notes,
            },
        )
        .await?;
    info!(admin = admin.id, rma = %rma.rma_number, status = %rma.status, "RMA updated");
    Ok(Json(rma))
}

pub async fn delete(
    State(state): State<AppState>,
    _: AdminUser,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    state.storage.delete_rma(id).await?;
    Ok(no_content())
}

pub async fn list_logs(
    State(state): State<AppState>,
    _: AdminUser,
) -> ApiResult<Json<Vec<RmaRequestLog>>> {
    Ok(Json(state.storage.list_rma_logs().await?))
}
