//! PostgreSQL UserStore implementation.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::Row;

use super::{expect_affected, get_enum, PostgresStorage};
use crate::models::user::normalize_email;
use crate::models::{NewUser, User, UserUpdate};
use crate::storage::helpers::now;
use crate::storage::{Result, StorageError, UserStore};

fn user_from_row(row: &PgRow) -> Result<User> {
    Ok(User {
        id: row.try_get("id")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        name: row.try_get("name")?,
        company: row.try_get("company")?,
        phone: row.try_get("phone")?,
        role: get_enum(row, "role")?,
        status: get_enum(row, "status")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        deleted_at: row.try_get("deleted_at")?,
    })
}

#[async_trait]
impl UserStore for PostgresStorage {
    async fn create_user(&self, user: NewUser) -> Result<User> {
        let ts = now();
        let row = sqlx::query(
            "INSERT INTO users
                (email, password_hash, name, company, phone, role, status, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
             RETURNING *",
        )
        .bind(normalize_email(&user.email))
        .bind(&user.password_hash)
        .bind(&user.name)
        .bind(&user.company)
        .bind(&user.phone)
        .bind(user.role.as_str())
        .bind(user.status.as_str())
        .bind(ts)
        .fetch_one(&self.pool)
        .await?;
        user_from_row(&row)
    }

    async fn get_user(&self, id: i64) -> Result<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE id = $1 AND deleted_at IS NULL")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE email = $1 AND deleted_at IS NULL")
            .bind(normalize_email(email))
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        let rows = sqlx::query("SELECT * FROM users WHERE deleted_at IS NULL ORDER BY id DESC")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(user_from_row).collect()
    }

    async fn update_user(&self, id: i64, update: UserUpdate) -> Result<User> {
        let row = sqlx::query(
            "UPDATE users SET
                email = COALESCE($2, email),
                password_hash = COALESCE($3, password_hash),
                name = COALESCE($4, name),
                company = COALESCE($5, company),
                phone = COALESCE($6, phone),
                role = COALESCE($7, role),
                status = COALESCE($8, status),
                updated_at = $9
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING *",
        )
        .bind(id)
        .bind(update.email.as_deref().map(normalize_email))
        .bind(update.password_hash)
        .bind(update.name)
        .bind(update.company)
        .bind(update.phone)
        .bind(update.role.map(|r| r.as_str()))
        .bind(update.status.map(|s| s.as_str()))
        .bind(now())
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StorageError::NotFound)?;
        user_from_row(&row)
    }

    async fn soft_delete_user(&self, id: i64) -> Result<()> {
        let result = sqlx::query(
            "UPDATE users SET deleted_at = $2, updated_at = $2
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .bind(now())
        .execute(&self.pool)
        .await?;
        expect_affected(result)
    }
}
