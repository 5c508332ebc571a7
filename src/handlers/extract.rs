//! Request extractors: session user, admin, API client and JSON bodies.

use async_trait::async_trait;
use axum::extract::{FromRequest, FromRequestParts, Request};
use axum::http::header::{AUTHORIZATION, COOKIE};
use axum::http::request::Parts;
use axum::Json;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::error::ApiError;
use super::AppState;
use crate::auth::hash_api_key;
use crate::auth::session::token_from_cookie_header;
use crate::models::{ApiKey, User};
use crate::storage::helpers::now;
use crate::validation::Validate;

/// Header carrying a data-push API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Signed-in user from the session cookie.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find_map(token_from_cookie_header)
            .ok_or_else(ApiError::unauthorized)?;

        let claims = state.sessions.verify(token).map_err(|e| {
            debug!(error = %e, "session rejected");
            ApiError::unauthorized()
        })?;

        match state.storage.get_user(claims.uid).await? {
            Some(user) if user.can_sign_in() => Ok(CurrentUser(user)),
            _ => Err(ApiError::unauthorized()),
        }
    }
}

/// Signed-in user with the admin role.
#[derive(Debug, Clone)]
pub struct AdminUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;
        if !user.is_admin() {
            return Err(ApiError::Forbidden);
        }
        Ok(AdminUser(user))
    }
}

/// Caller authenticated by API key (`X-API-Key` or `Authorization: Bearer`).
#[derive(Debug, Clone)]
pub struct ApiClient(pub ApiKey);

impl ApiClient {
    pub fn require(&self, permission: &str) -> Result<(), ApiError> {
        if self.0.allows(permission) {
            Ok(())
        } else {
            warn!(key = %self.0.key_prefix, permission, "API key lacks permission");
            Err(ApiError::Forbidden)
        }
    }
}

fn presented_key(parts: &Parts) -> Option<&str> {
    if let Some(key) = parts.headers.get(API_KEY_HEADER).and_then(|v| v.to_str().ok()) {
        return Some(key.trim());
    }
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
}

#[async_trait]
impl FromRequestParts<AppState> for ApiClient {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let presented = presented_key(parts)
            .filter(|k| !k.is_empty())
            .ok_or_else(ApiError::unauthorized)?;

        let key = match state.storage.find_api_key_by_hash(&hash_api_key(presented)).await? {
            Some(key) if key.active => key,
            _ => return Err(ApiError::unauthorized()),
        };

        if let Err(e) = state.storage.touch_api_key(key.id, now()).await {
            warn!(key = %key.key_prefix, error = %e, "failed to stamp API key use");
        }
        Ok(ApiClient(key))
    }
}

/// JSON body; malformed input is a 400 rather than axum's 422.
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => Err(ApiError::BadRequest(rejection.body_text())),
        }
    }
}

/// JSON body that also passed [`Validate`].
#[derive(Debug, Clone)]
pub struct ValidJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let JsonBody(value) = JsonBody::<T>::from_request(req, state).await?;
        let errors = value.validate();
        if !errors.is_empty() {
            return Err(ApiError::Validation(errors));
        }
        Ok(ValidJson(value))
    }
}
