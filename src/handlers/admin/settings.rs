//! API keys and system settings (webhook URL, notification emails, theme).

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use super::no_content;
use crate::auth::generate_api_key;
use crate::handlers::error::ApiResult;
use crate::handlers::extract::{AdminUser, ValidJson};
use crate::handlers::{created, ApiError, AppState};
use crate::models::settings::{RMA_NOTIFICATION_EMAILS_KEY, RMA_WEBHOOK_URL_KEY, THEME_KEY};
use crate::models::{ApiKey, NewApiKey, SystemSetting};
use crate::validation::{is_plausible_email, limits, Errors, FieldError, Validate};

#[derive(Debug, Deserialize)]
pub struct CreateKeyRequest {
    pub name: String,
    pub permissions: Vec<String>,
}

impl Validate for CreateKeyRequest {
    fn validate(&self) -> Vec<FieldError> {
        let mut errors = Errors::new();
        errors.required("name", &self.name, limits::MAX_NAME_LENGTH);
        if self.permissions.is_empty() {
            errors.add("permissions", crate::validation::errmsg::REQUIRED);
        }
        for (i, perm) in self.permissions.iter().enumerate() {
            errors.required(&format!("permissions[{i}]"), perm, limits::MAX_NAME_LENGTH);
        }
        errors.into_vec()
    }
}

/// The plaintext `key` appears in this response and nowhere else.
#[derive(Debug, Serialize)]
pub struct CreatedKey {
    #[serde(flatten)]
    pub api_key: ApiKey,
    pub key: String,
}

#[derive(Debug, Deserialize)]
pub struct KeyActiveRequest {
    pub active: bool,
}

impl Validate for KeyActiveRequest {
    fn validate(&self) -> Vec<FieldError> {
        Vec::new()
    }
}

#[derive(Debug, Deserialize)]
pub struct SettingRequest {
    pub value: Value,
}

impl Validate for SettingRequest {
    fn validate(&self) -> Vec<FieldError> {
        Vec::new()
    }
}

pub async fn list_keys(State(state): State<AppState>, _: AdminUser) -> ApiResult<Json<Vec<ApiKey>>> {
    Ok(Json(state.storage.list_api_keys().await?))
}

pub async fn create_key(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    ValidJson(req): ValidJson<CreateKeyRequest>,
) -> ApiResult<impl IntoResponse> {
    let generated = generate_api_key();
    let api_key = state
        .storage
        .create_api_key(NewApiKey {
            name: req.name.trim().to_string(),
            key_prefix: generated.prefix,
            key_hash: generated.hash,
            permissions: req.permissions,
        })
        .await?;
    info!(admin = admin.id, key = %api_key.key_prefix, "API key created");
    Ok(created(CreatedKey {
        api_key,
        key: generated.plaintext,
    }))
}

/// Revoke or reinstate a key.
pub async fn set_key_active(
    State(state): State<AppState>,
    _: AdminUser,
    Path(id): Path<i64>,
    ValidJson(req): ValidJson<KeyActiveRequest>,
) -> ApiResult<Json<ApiKey>> {
    Ok(Json(state.storage.set_api_key_active(id, req.active).await?))
}

pub async fn delete_key(
    State(state): State<AppState>,
    _: AdminUser,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    state.storage.delete_api_key(id).await?;
    Ok(no_content())
}

/// Shape checks for the settings the server itself reads.
pub fn validate_setting(key: &str, value: &Value) -> Vec<FieldError> {
    let mut errors = Errors::new();
    match key {
        RMA_WEBHOOK_URL_KEY => match value {
            Value::Null => {}
            Value::String(url) if url.is_empty() => {}
            Value::String(url) if url.starts_with("https://") && url.len() > "https://".len() => {}
            _ => errors.add("value", "must be an https URL, an empty string or null"),
        },
        RMA_NOTIFICATION_EMAILS_KEY => match value.as_array() {
            Some(list) => {
                for (i, email) in list.iter().enumerate() {
                    if !email.as_str().is_some_and(is_plausible_email) {
                        errors.add(format!("value[{i}]"), crate::validation::errmsg::INVALID_EMAIL);
                    }
                }
            }
            None => errors.add("value", "must be an array of email addresses"),
        },
        THEME_KEY if !value.is_object() => errors.add("value", "must be an object"),
        _ => {}
    }
    errors.into_vec()
}

pub async fn list_settings(
    State(state): State<AppState>,
    _: AdminUser,
) -> ApiResult<Json<Vec<SystemSetting>>> {
    Ok(Json(state.storage.list_settings().await?))
}

pub async fn get_setting(
    State(state): State<AppState>,
    _: AdminUser,
    Path(key): Path<String>,
) -> ApiResult<Json<SystemSetting>> {
    state
        .storage
        .get_setting(&key)
        .await?
        .map(Json)
        .ok_or_else(ApiError::not_found)
}

pub async fn put_setting(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(key): Path<String>,
    ValidJson(req): ValidJson<SettingRequest>,
) -> ApiResult<Json<SystemSetting>> {
    let errors = validate_setting(&key, &req.value);
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }
    let setting = state.storage.put_setting(&key, req.value).await?;
    info!(admin = admin.id, key = %setting.key, "setting saved");
    Ok(Json(setting))
}

pub async fn delete_setting(
    State(state): State<AppState>,
    _: AdminUser,
    Path(key): Path<String>,
) -> ApiResult<StatusCode> {
    state.storage.delete_setting(&key).await?;
    Ok(no_content())
}
