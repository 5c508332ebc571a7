use async_trait::async_trait;

use super::{newest_first, MockStorage};
use crate::models::user::normalize_email;
use crate::models::{NewUser, User, UserUpdate};
use crate::storage::helpers::now;
use crate::storage::{Result, StorageError, UserStore};

#[async_trait]
impl UserStore for MockStorage {
    async fn create_user(&self, user: NewUser) -> Result<User> {
        let mut tables = self.tables.write().await;
        let email = normalize_email(&user.email);
        if tables.users.values().any(|u| u.email == email) {
            return Err(StorageError::Conflict(format!("email {email} already registered")));
        }
        let id = tables.next_id();
        let ts = now();
        let record = User {
            id,
            email,
            password_hash: user.password_hash,
            name: user.name,
            company: user.company,
            phone: user.phone,
            role: user.role,
            status: user.status,
            created_at: ts,
            updated_at: ts,
            deleted_at: None,
        };
        tables.users.insert(id, record.clone());
        Ok(record)
    }

    async fn get_user(&self, id: i64) -> Result<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .get(&id)
            .filter(|u| u.deleted_at.is_none())
            .cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let email = normalize_email(email);
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.email == email && u.deleted_at.is_none())
            .cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        let tables = self.tables.read().await;
        Ok(newest_first(
            tables.users.values().filter(|u| u.deleted_at.is_none()).cloned(),
        ))
    }

    async fn update_user(&self, id: i64, update: UserUpdate) -> Result<User> {
        let mut tables = self.tables.write().await;
        if let Some(email) = update.email.as_deref().map(normalize_email) {
            if tables.users.values().any(|u| u.id != id && u.email == email) {
                return Err(StorageError::Conflict(format!("email {email} already registered")));
            }
        }
        let user = tables
            .users
            .get_mut(&id)
            .filter(|u| u.deleted_at.is_none())
            .ok_or(StorageError::NotFound)?;
        if let Some(email) = update.email {
            user.email = normalize_email(&email);
        }
        if let Some(hash) = update.password_hash {
            user.password_hash = hash;
        }
        if let Some(name) = update.name {
            user.name = name;
        }
        if let Some(company) = update.company {
            user.company = Some(company);
        }
        if let Some(phone) = update.phone {
            user.phone = Some(phone);
        }
        if let Some(role) = update.role {
            user.role = role;
        }
        if let Some(status) = update.status {
            user.status = status;
        }
        user.updated_at = now();
        Ok(user.clone())
    }

    async fn soft_delete_user(&self, id: i64) -> Result<()> {
        let mut tables = self.tables.write().await;
        let user = tables
            .users
            .get_mut(&id)
            .filter(|u| u.deleted_at.is_none())
            .ok_or(StorageError::NotFound)?;
        let ts = now();
        user.deleted_at = Some(ts);
        user.updated_at = ts;
        Ok(())
    }
}
