//! Account endpoints: register, login, logout, profile.

use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use tracing::info;

use super::error::{errmsg, ApiError, ApiResult};
use super::extract::{CurrentUser, ValidJson};
use super::AppState;
use crate::auth::{hash_password, verify_password, SessionSigner};
use crate::models::user::normalize_email;
use crate::models::{NewUser, Role, User, UserStatus, UserUpdate};
use crate::validation::{limits, Errors, FieldError, Validate};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

impl Validate for RegisterRequest {
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

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl Validate for LoginRequest {
    fn validate(&self) -> Vec<FieldError> {
        let mut errors = Errors::new();
        errors.required("email", &self.email, limits::MAX_EMAIL_LENGTH);
        errors.required("password", &self.password, limits::MAX_PASSWORD_LENGTH);
        errors.into_vec()
    }
}

/// Own-profile update. Role and status are admin-only.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl Validate for UpdateProfileRequest {
    fn validate(&self) -> Vec<FieldError> {
        let mut errors = Errors::new();
        if let Some(name) = &self.name {
            errors.required("name", name, limits::MAX_NAME_LENGTH);
        }
        errors.optional("company", self.company.as_deref(), limits::MAX_NAME_LENGTH);
        errors.optional("phone", self.phone.as_deref(), limits::MAX_NAME_LENGTH);
        if let Some(password) = &self.password {
            errors.password("password", password);
        }
        errors.into_vec()
    }
}

/// bcrypt off the async executor.
pub(crate) async fn hash_blocking(password: String, cost: u32) -> ApiResult<String> {
    Ok(tokio::task::spawn_blocking(move || hash_password(&password, cost)).await??)
}

async fn verify_blocking(password: String, hash: String) -> ApiResult<bool> {
    Ok(tokio::task::spawn_blocking(move || verify_password(&password, &hash)).await?)
}

fn with_session(state: &AppState, user: &User) -> [(axum::http::HeaderName, String); 1] {
    let token = state.sessions.issue(user.id);
    [(SET_COOKIE, state.sessions.cookie(&token, state.cookie_secure))]
}

pub async fn register(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<RegisterRequest>,
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
            role: Role::Customer,
            status: UserStatus::Active,
        })
        .await?;
    info!(user = user.id, "account registered");
    Ok((StatusCode::CREATED, with_session(&state, &user), Json(user)))
}

pub async fn login(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    let invalid = || ApiError::Unauthorized(errmsg::INVALID_CREDENTIALS);

    let user = state
        .storage
        .find_user_by_email(&normalize_email(&req.email))
        .await?
        .ok_or_else(invalid)?;

    if !verify_blocking(req.password, user.password_hash.clone()).await? || !user.can_sign_in() {
        return Err(invalid());
    }

    info!(user = user.id, "signed in");
    Ok((with_session(&state, &user), Json(user)))
}

pub async fn logout(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::NO_CONTENT,
        [(SET_COOKIE, SessionSigner::clear_cookie(state.cookie_secure))],
    )
}

pub async fn me(CurrentUser(user): CurrentUser) -> Json<User> {
    Json(user)
}

pub async fn update_me(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ValidJson(req): ValidJson<UpdateProfileRequest>,
) -> ApiResult<Json<User>> {
    let password_hash = match req.password {
        Some(password) => Some(hash_blocking(password, state.bcrypt_cost).await?),
        None => None,
    };
    let updated = state
        .storage
        .update_user(
            user.id,
            UserUpdate {
                name: req.name.map(|n| n.trim().to_string()),
                company: req.company,
                phone: req.phone,
                password_hash,
                ..Default::default()
            },
        )
        .await?;
    Ok(Json(updated))
}
