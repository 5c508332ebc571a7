//! Unauthenticated endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};

use super::error::ApiResult;
use super::{ApiError, AppState};
use crate::models::{CaseStudy, WaterProject};
use crate::services::warranty::{self, WarrantyStatus};

pub async fn health() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "ok" })))
}

pub async fn list_case_studies(State(state): State<AppState>) -> ApiResult<Json<Vec<CaseStudy>>> {
    Ok(Json(state.storage.list_case_studies(true).await?))
}

/// Drafts are invisible here, even to admins.
pub async fn get_case_study(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<Json<CaseStudy>> {
    match state.storage.find_case_study_by_slug(&slug).await? {
        Some(study) if study.published => Ok(Json(study)),
        _ => Err(ApiError::not_found()),
    }
}

pub async fn list_water_projects(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<WaterProject>>> {
    Ok(Json(state.storage.list_water_projects().await?))
}

pub async fn warranty(
    State(state): State<AppState>,
    Path(serial): Path<String>,
) -> ApiResult<Json<WarrantyStatus>> {
    warranty::lookup(&*state.storage, &serial)
        .await?
        .map(Json)
        .ok_or_else(ApiError::not_found)
}
