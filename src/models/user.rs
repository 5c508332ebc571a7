//! Portal accounts.

use serde::{Deserialize, Serialize};

use super::{string_enum, Timestamp};

string_enum! {
    /// Access level of an account.
    pub enum Role ("role") {
        Admin => "admin",
        Customer => "customer",
    }
}

string_enum! {
    /// Whether an account may sign in.
    ///
    /// `PendingApproval` accounts are created by the RMA flow on behalf of a
    /// contact address and stay locked until an admin activates them.
    pub enum UserStatus ("user status") {
        Active => "active",
        PendingApproval => "pending_approval",
        Disabled => "disabled",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub name: String,
    pub company: Option<String>,
    pub phone: Option<String>,
    pub role: Role,
    pub status: UserStatus,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub deleted_at: Option<Timestamp>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Active and not soft-deleted.
    pub fn can_sign_in(&self) -> bool {
        self.status == UserStatus::Active && self.deleted_at.is_none()
    }
}

/// Fields for a new account. `email` is normalised by the store.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub company: Option<String>,
    pub phone: Option<String>,
    pub role: Role,
    pub status: UserStatus,
}

/// Partial update; `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub name: Option<String>,
    pub company: Option<String>,
    pub phone: Option<String>,
    pub role: Option<Role>,
    pub status: Option<UserStatus>,
}

/// Lower-cases and trims an email so lookups are case-insensitive.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
