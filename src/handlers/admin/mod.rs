//! Admin CRUD endpoints. Every handler takes [`AdminUser`](super::extract::AdminUser).

pub mod content;
pub mod gamification;
pub mod orders;
pub mod rmas;
pub mod settings;
pub mod support;
pub mod users;

use axum::http::StatusCode;

/// `204 No Content` after a delete.
pub(crate) fn no_content() -> StatusCode {
    StatusCode::NO_CONTENT
}
