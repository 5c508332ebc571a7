use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use tracing::info;

use super::no_content;
use crate::handlers::auth::hash_blocking;
use crate::handlers::error::ApiResult;
use crate::handlers::extract::{AdminUser, ValidJson};
use crate::handlers::{created, ApiError, AppState};
use crate::models::user::normalize_email;
use crate::models::{NewUser, Role, User, UserStatus, UserUpdate};
use crate::services::{compute_score, EsgScore};
use crate::validation::{limits, Errors, FieldError, Validate};

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub status: Option<UserStatus>,
}

impl Validate for CreateUserRequest {
    fn validate(&self) -> Vec<FieldError> {
        let mut errors = Errors::new();
        errors.email("email", &self.email);
        errors.password("password", &self.password);
        errors.required("name", &self.name, limits::MAX_NAME_LENGTH);
        errors.optional("company", self.company.as_deref(), limits::MAX_NAME_LENGTH);
        errors.optional("phone", self.phone.as_deref(), limits::MAX_NAME_LENGTH);
        errors.into_vec()
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub status: Option<UserStatus>,
}

impl Validate for UpdateUserRequest {
    fn validate(&self) -> Vec<FieldError> {
        let mut errors = Errors::new();
        if let Some(email) = &self.email {
            errors.email("email", email);
        }
        if let Some(password) = &self.password {
            errors.password("password", password);
        }
        if let Some(name) = &self.name {
            errors.required("name", name, limits::MAX_NAME_LENGTH);
        }
        errors.optional("company", self.company.as_deref(), limits::MAX_NAME_LENGTH);
        errors.optional("phone", self.phone.as_deref(), limits::MAX_NAME_LENGTH);
        errors.into_vec()
    }
}

pub async fn list(State(state): State<AppState>, _: AdminUser) -> ApiResult<Json<Vec<User>>> {
    Ok(Json(state.storage.list_users().await?))
}

pub async fn create(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    ValidJson(req): ValidJson<CreateUserRequest>,
) -> ApiResult<impl IntoResponse> {
    let password_hash = hash_blocking(req.password, state.bcrypt_cost).await?;
    let user = state
        .storage
        .create_user(NewUser {
            email: normalize_email(&req.email),
            password_hash,
            name: req.name.trim().to_string(),
            company: req.company,
            phone: req.phone,
            role: req.role.unwrap_or(Role::Customer),
            status: req.status.unwrap_or(UserStatus::Active),
        })
        .await?;
    info!(admin = admin.id, user = user.id, "user created");
    Ok(created(user))
}

pub async fn get(
    State(state): State<AppState>,
    _: AdminUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<User>> {
    state
        .storage
        .get_user(id)
        .await?
        .map(Json)
        .ok_or_else(ApiError::not_found)
}

pub async fn update(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<i64>,
    ValidJson(req): ValidJson<UpdateUserRequest>,
) -> ApiResult<Json<User>> {
    let self_demotion =
        req.role == Some(Role::Customer) || req.status.is_some_and(|s| s != UserStatus::Active);
    if id == admin.id && self_demotion {
        return Err(ApiError::BadRequest("admins cannot demote or lock themselves".to_string()));
    }
    let password_hash = match req.password {
        Some(password) => Some(hash_blocking(password, state.bcrypt_cost).await?),
        None => None,
    };
    let user = state
        .storage
        .update_user(
            id,
            UserUpdate {
                email: req.email.as_deref().map(normalize_email),
                password_hash,
                name: req.name.map(|n| n.trim().to_string()),
                company: req.company,
                phone: req.phone,
                role: req.role,
                status: req.status,
            },
        )
        .await?;
    info!(admin = admin.id, user = user.id, "user updated");
    Ok(Json(user))
}

/// Soft delete: the row stays for order and RMA history.
pub async fn delete(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    if id == admin.id {
        return Err(ApiError::BadRequest("admins cannot delete themselves".to_string()));
    }
    state.storage.soft_delete_user(id).await?;
    info!(admin = admin.id, user = id, "user deleted");
    Ok(no_content())
}

pub async fn esg(
    State(state): State<AppState>,
    _: AdminUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<EsgScore>> {
    if state.storage.get_user(id).await?.is_none() {
        return Err(ApiError::not_found());
    }
    let totals = state.storage.sum_impact(id).await?;
    Ok(Json(compute_score(totals, &state.scoring)))
}
