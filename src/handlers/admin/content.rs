use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use super::no_content;
use crate::handlers::error::ApiResult;
use crate::handlers::extract::{AdminUser, ValidJson};
use crate::handlers::{created, AppState};
use crate::models::{CaseStudy, CaseStudyInput, WaterProject, WaterProjectInput};
use crate::validation::{limits, Errors, FieldError, Validate};

impl Validate for CaseStudyInput {
    fn validate(&self) -> Vec<FieldError> {
        let mut errors = Errors::new();
        errors.required("title", &self.title, limits::MAX_NAME_LENGTH);
        errors.slug("slug", &self.slug);
        errors.required("summary", &self.summary, limits::MAX_TEXT_LENGTH);
        errors.required("body", &self.body, limits::MAX_TEXT_LENGTH * 10);
        errors.optional("image_url", self.image_url.as_deref(), limits::MAX_TEXT_LENGTH);
        errors.into_vec()
    }
}

impl Validate for WaterProjectInput {
    fn validate(&self) -> Vec<FieldError> {
        let mut errors = Errors::new();
        errors.required("name", &self.name, limits::MAX_NAME_LENGTH);
        errors.required("location", &self.location, limits::MAX_NAME_LENGTH);
        errors.required("description", &self.description, limits::MAX_TEXT_LENGTH);
        if self.liters_provided < 0 {
            errors.add("liters_provided", crate::validation::errmsg::NEGATIVE);
        }
        if self.families_helped < 0 {
            errors.add("families_helped", crate::validation::errmsg::NEGATIVE);
        }
        errors.optional("image_url", self.image_url.as_deref(), limits::MAX_TEXT_LENGTH);
        errors.into_vec()
    }
}

/// Drafts included.
pub async fn list_case_studies(
    State(state): State<AppState>,
    _: AdminUser,
) -> ApiResult<Json<Vec<CaseStudy>>> {
    Ok(Json(state.storage.list_case_studies(false).await?))
}

pub async fn create_case_study(
    State(state): State<AppState>,
    _: AdminUser,
    ValidJson(input): ValidJson<CaseStudyInput>,
) -> ApiResult<impl IntoResponse> {
    Ok(created(state.storage.create_case_study(input).await?))
}

pub async fn update_case_study(
    State(state): State<AppState>,
    _: AdminUser,
    Path(id): Path<i64>,
    ValidJson(input): ValidJson<CaseStudyInput>,
) -> ApiResult<Json<CaseStudy>> {
    Ok(Json(state.storage.update_case_study(id, input).await?))
}

pub async fn delete_case_study(
    State(state): State<AppState>,
    _: AdminUser,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    state.storage.delete_case_study(id).await?;
    Ok(no_content())
}

pub async fn list_water_projects(
    State(state): State<AppState>,
    _: AdminUser,
) -> ApiResult<Json<Vec<WaterProject>>> {
    Ok(Json(state.storage.list_water_projects().await?))
}

pub async fn create_water_project(
    State(state): State<AppState>,
    _: AdminUser,
    ValidJson(input): ValidJson<WaterProjectInput>,
) -> ApiResult<impl IntoResponse> {
    Ok(created(state.storage.create_water_project(input).await?))
}

pub async fn update_water_project(
    State(state): State<AppState>,
    _: AdminUser,
    Path(id): Path<i64>,
    ValidJson(input): ValidJson<WaterProjectInput>,
) -> ApiResult<Json<WaterProject>> {
    Ok(Json(state.storage.update_water_project(id, input).await?))
}

pub async fn delete_water_project(
    State(state): State<AppState>,
    _: AdminUser,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    state.storage.delete_water_project(id).await?;
    Ok(no_content())
}
