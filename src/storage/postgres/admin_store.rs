//! PostgreSQL AdminStore implementation.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::Row;

use super::{expect_affected, PostgresStorage};
use crate::models::{ApiKey, NewApiKey, SystemSetting, Timestamp};
use crate::storage::helpers::{normalize, now};
use crate::storage::{AdminStore, Result, StorageError};

fn api_key_from_row(row: &PgRow) -> Result<ApiKey> {
    let Json(permissions) = row.try_get::<Json<Vec<String>>, _>("permissions")?;
    Ok(ApiKey {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        key_prefix: row.try_get("key_prefix")?,
        key_hash: row.try_get("key_hash")?,
        permissions,
        active: row.try_get("active")?,
        last_used_at: row.try_get("last_used_at")?,
        created_at: row.try_get("created_at")?,
    })
}

fn setting_from_row(row: &PgRow) -> Result<SystemSetting> {
    let Json(value) = row.try_get::<Json<serde_json::Value>, _>("value")?;
    Ok(SystemSetting {
        key: row.try_get("key")?,
        value,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl AdminStore for PostgresStorage {
    async fn create_api_key(&self, key: NewApiKey) -> Result<ApiKey> {
        let row = sqlx::query(
            "INSERT INTO api_keys (name, key_prefix, key_hash, permissions, active, created_at)
             VALUES ($1, $2, $3, $4, TRUE, $5)
             RETURNING *",
        )
        .bind(&key.name)
        .bind(&key.key_prefix)
        .bind(&key.key_hash)
        .bind(Json(&key.permissions))
        .bind(now())
        .fetch_one(&self.pool)
        .await?;
        api_key_from_row(&row)
    }

    async fn find_api_key_by_hash(&self, key_hash: &str) -> Result<Option<ApiKey>> {
        let row = sqlx::query("SELECT * FROM api_keys WHERE key_hash = $1")
            .bind(key_hash)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(api_key_from_row).transpose()
    }

    async fn list_api_keys(&self) -> Result<Vec<ApiKey>> {
        let rows = sqlx::query("SELECT * FROM api_keys ORDER BY id DESC")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(api_key_from_row).collect()
    }

    async fn set_api_key_active(&self, id: i64, active: bool) -> Result<ApiKey> {
        let row = sqlx::query("UPDATE api_keys SET active = $2 WHERE id = $1 RETURNING *")
            .bind(id)
            .bind(active)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StorageError::NotFound)?;
        api_key_from_row(&row)
    }

    async fn touch_api_key(&self, id: i64, used_at: Timestamp) -> Result<()> {
        let result = sqlx::query("UPDATE api_keys SET last_used_at = $2 WHERE id = $1")
            .bind(id)
            .bind(normalize(used_at))
            .execute(&self.pool)
            .await?;
        expect_affected(result)
    }

    async fn delete_api_key(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM api_keys WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        expect_affected(result)
    }

    async fn get_setting(&self, key: &str) -> Result<Option<SystemSetting>> {
        let row = sqlx::query("SELECT * FROM system_settings WHERE key = $1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(setting_from_row).transpose()
    }

    async fn list_settings(&self) -> Result<Vec<SystemSetting>> {
        let rows = sqlx::query("SELECT * FROM system_settings ORDER BY key")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(setting_from_row).collect()
    }

    async fn put_setting(&self, key: &str, value: serde_json::Value) -> Result<SystemSetting> {
        let row = sqlx::query(
            "INSERT INTO system_settings (key, value, updated_at)
             VALUES ($1, $2, $3)
             ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value, updated_at = EXCLUDED.updated_at
             RETURNING *",
        )
        .bind(key)
        .bind(Json(&value))
        .bind(now())
        .fetch_one(&self.pool)
        .await?;
        setting_from_row(&row)
    }

    async fn delete_setting(&self, key: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM system_settings WHERE key = $1")
            .bind(key)
            .execute(&self.pool)
            .await?;
        expect_affected(result)
    }
}
