use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;

use super::no_content;
use crate::handlers::error::ApiResult;
use crate::handlers::extract::{AdminUser, ValidJson};
use crate::handlers::{created, ApiError, AppState};
use crate::models::{
    Achievement, AchievementInput, Milestone, MilestoneInput, NewImpact, Timestamp,
};
use crate::validation::{limits, Errors, FieldError, Validate};

impl Validate for AchievementInput {
    fn validate(&self) -> Vec<FieldError> {
        let mut errors = Errors::new();
        errors.slug("code", &self.code);
        errors.required("name", &self.name, limits::MAX_NAME_LENGTH);
        errors.optional("description", Some(self.description.as_str()), limits::MAX_TEXT_LENGTH);
        errors.non_negative("threshold", self.threshold);
        errors.into_vec()
    }
}

impl Validate for MilestoneInput {
    fn validate(&self) -> Vec<FieldError> {
        let mut errors = Errors::new();
        errors.required("name", &self.name, limits::MAX_NAME_LENGTH);
        errors.optional("description", Some(self.description.as_str()), limits::MAX_TEXT_LENGTH);
        if self.target_score < 0 {
            errors.add("target_score", crate::validation::errmsg::NEGATIVE);
        }
        errors.optional("reward", self.reward.as_deref(), limits::MAX_NAME_LENGTH);
        errors.into_vec()
    }
}

#[derive(Debug, Deserialize)]
pub struct ImpactRequest {
    pub user_id: i64,
    #[serde(default)]
    pub order_id: Option<i64>,
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

impl Validate for ImpactRequest {
    fn validate(&self) -> Vec<FieldError> {
        let mut errors = Errors::new();
        errors.non_negative("carbon_kg", self.carbon_kg);
        errors.non_negative("water_liters", self.water_liters);
        errors.non_negative("minerals_kg", self.minerals_kg);
        if self.families_helped < 0 {
            errors.add("families_helped", crate::validation::errmsg::NEGATIVE);
        }
        errors.into_vec()
    }
}

pub async fn create_impact(
    State(state): State<AppState>,
    _: AdminUser,
    ValidJson(req): ValidJson<ImpactRequest>,
) -> ApiResult<impl IntoResponse> {
    if state.storage.get_user(req.user_id).await?.is_none() {
        return Err(ApiError::BadRequest(format!("user {} does not exist", req.user_id)));
    }
    if let Some(order_id) = req.order_id {
        match state.storage.get_order(order_id).await? {
            Some(order) if order.user_id == req.user_id => {}
            _ => {
                return Err(ApiError::BadRequest(format!(
                    "order {order_id} does not belong to user {}",
                    req.user_id
                )))
            }
        }
    }
    let row = state
        .storage
        .add_impact(NewImpact {
            user_id: req.user_id,
            order_id: req.order_id,
            carbon_kg: req.carbon_kg,
            water_liters: req.water_liters,
            minerals_kg: req.minerals_kg,
            families_helped: req.families_helped,
            recorded_at: req.recorded_at.unwrap_or_else(Utc::now),
        })
        .await?;
    Ok(created(row))
}

pub async fn list_achievements(
    State(state): State<AppState>,
    _: AdminUser,
) -> ApiResult<Json<Vec<Achievement>>> {
    Ok(Json(state.storage.list_achievements().await?))
}

pub async fn create_achievement(
    State(state): State<AppState>,
    _: AdminUser,
    ValidJson(input): ValidJson<AchievementInput>,
) -> ApiResult<impl IntoResponse> {
    Ok(created(state.storage.create_achievement(input).await?))
}

pub async fn update_achievement(
    State(state): State<AppState>,
    _: AdminUser,
    Path(id): Path<i64>,
    ValidJson(input): ValidJson<AchievementInput>,
) -> ApiResult<Json<Achievement>> {
    Ok(Json(state.storage.update_achievement(id, input).await?))
}

pub async fn delete_achievement(
    State(state): State<AppState>,
    _: AdminUser,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    state.storage.delete_achievement(id).await?;
    Ok(no_content())
}

pub async fn list_milestones(
    State(state): State<AppState>,
    _: AdminUser,
) -> ApiResult<Json<Vec<Milestone>>> {
    Ok(Json(state.storage.list_milestones().await?))
}

pub async fn create_milestone(
    State(state): State<AppState>,
    _: AdminUser,
    ValidJson(input): ValidJson<MilestoneInput>,
) -> ApiResult<impl IntoResponse> {
    Ok(created(state.storage.create_milestone(input).await?))
}

pub async fn update_milestone(
    State(state): State<AppState>,
    _: AdminUser,
    Path(id): Path<i64>,
    ValidJson(input): ValidJson<MilestoneInput>,
) -> ApiResult<Json<Milestone>> {
    Ok(Json(state.storage.update_milestone(id, input).await?))
}

pub async fn delete_milestone(
    State(state): State<AppState>,
    _: AdminUser,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    state.storage.delete_milestone(id).await?;
    Ok(no_content())
}
