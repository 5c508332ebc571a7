//! UserStore trait definition.

use async_trait::async_trait;

use super::Result;
use crate::models::{NewUser, User, UserUpdate};

/// Interface for account persistence.
///
/// Emails are stored lower-cased and are unique among all rows, including
/// soft-deleted ones. Lookups never return soft-deleted users.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new account. `Conflict` if the email is taken.
    async fn create_user(&self, user: NewUser) -> Result<User>;

    async fn get_user(&self, id: i64) -> Result<Option<User>>;

    /// Case-insensitive email lookup.
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;

    /// All live users, newest first.
    async fn list_users(&self) -> Result<Vec<User>>;

    /// Apply a partial update. `NotFound` if the user is missing or deleted.
    async fn update_user(&self, id: i64, update: UserUpdate) -> Result<User>;

    /// Stamp `deleted_at`. `NotFound` if already deleted or missing.
    async fn soft_delete_user(&self, id: i64) -> Result<()>;
}
