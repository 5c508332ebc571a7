//! API error type and its HTTP mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::services::RmaError;
use crate::storage::StorageError;
use crate::validation::FieldError;

/// Error messages shown to API callers.
pub mod errmsg {
    pub const VALIDATION_FAILED: &str = "validation failed";
    pub const UNAUTHORIZED: &str = "authentication required";
    pub const INVALID_CREDENTIALS: &str = "invalid email or password";
    pub const FORBIDDEN: &str = "forbidden";
    pub const NOT_FOUND: &str = "not found";
    pub const INTERNAL: &str = "internal server error";
    pub const ORDER_NOT_FOUND: &str = "order not found";
    pub const CUSTOMER_NOT_FOUND: &str = "customer not found";
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("validation failed")]
    Validation(Vec<FieldError>),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(&'static str),

    #[error("forbidden")]
    Forbidden,

    #[error("{0}")]
    NotFound(&'static str),

    #[error("{0}")]
    Conflict(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn unauthorized() -> Self {
        ApiError::Unauthorized(errmsg::UNAUTHORIZED)
    }

    pub fn not_found() -> Self {
        ApiError::NotFound(errmsg::NOT_FOUND)
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            ApiError::Validation(details) => json!({
                "error": errmsg::VALIDATION_FAILED,
                "details": details,
            }),
            ApiError::Internal(cause) => {
                tracing::error!(error = %cause, "request failed");
                json!({ "error": errmsg::INTERNAL })
            }
            other => json!({ "error": other.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound => ApiError::not_found(),
            StorageError::Conflict(msg) => ApiError::Conflict(msg),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<RmaError> for ApiError {
    fn from(err: RmaError) -> Self {
        match err {
            RmaError::Validation(details) => ApiError::Validation(details),
            RmaError::OrderNotFound => ApiError::NotFound(errmsg::ORDER_NOT_FOUND),
            RmaError::Storage(e) => e.into(),
        }
    }
}

impl From<bcrypt::BcryptError> for ApiError {
    fn from(err: bcrypt::BcryptError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(resp: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(resp.into_body(), 64 * 1024).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_validation_body_lists_fields() {
        let resp = ApiError::Validation(vec![FieldError::new("email", "required")]).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let json = body_json(resp).await;
        assert_eq!(json["error"], "validation failed");
        assert_eq!(json["details"][0]["field"], "email");
    }

    #[tokio::test]
    async fn test_internal_hides_cause() {
        let resp = ApiError::Internal("disk on fire".into()).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(resp).await;
        assert_eq!(json["error"], "internal server error");
    }

    #[test]
    fn test_storage_mapping() {
        assert_eq!(
            ApiError::from(StorageError::NotFound).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(StorageError::Conflict("dup".into())).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::from(StorageError::Database("x".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
