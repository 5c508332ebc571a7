//! SQLite AdminStore implementation.

use async_trait::async_trait;
use sea_query::{Asterisk, Expr, OnConflict, Order, Query, SqliteQueryBuilder};
use sea_query_binder::SqlxBinder;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use super::{get_opt_ts, get_ts, SqliteStorage};
use crate::models::{ApiKey, NewApiKey, SystemSetting, Timestamp};
use crate::storage::helpers::{now, strings_from_json, strings_to_json, ts_to_text};
use crate::storage::schema::{ApiKeys, SystemSettings};
use crate::storage::{AdminStore, Result, StorageError};

fn api_key_from_row(row: &SqliteRow) -> Result<ApiKey> {
    let permissions: String = row.try_get("permissions")?;
    Ok(ApiKey {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        key_prefix: row.try_get("key_prefix")?,
        key_hash: row.try_get("key_hash")?,
        permissions: strings_from_json(&permissions)?,
        active: row.try_get("active")?,
        last_used_at: get_opt_ts(row, "last_used_at")?,
        created_at: get_ts(row, "created_at")?,
    })
}

fn setting_from_row(row: &SqliteRow) -> Result<SystemSetting> {
    let value: String = row.try_get("value")?;
    Ok(SystemSetting {
        key: row.try_get("key")?,
        value: serde_json::from_str(&value)?,
        updated_at: get_ts(row, "updated_at")?,
    })
}

#[async_trait]
impl AdminStore for SqliteStorage {
    async fn create_api_key(&self, key: NewApiKey) -> Result<ApiKey> {
        let (sql, values) = Query::insert()
            .into_table(ApiKeys::Table)
            .columns([
                ApiKeys::Name,
                ApiKeys::KeyPrefix,
                ApiKeys::KeyHash,
                ApiKeys::Permissions,
                ApiKeys::Active,
                ApiKeys::CreatedAt,
            ])
            .values([
                key.name.into(),
                key.key_prefix.into(),
                key.key_hash.into(),
                strings_to_json(&key.permissions)?.into(),
                true.into(),
                ts_to_text(&now()).into(),
            ])?
            .returning_all()
            .build_sqlx(SqliteQueryBuilder);

        let row = sqlx::query_with(&sql, values).fetch_one(&self.pool).await?;
        api_key_from_row(&row)
    }

    async fn find_api_key_by_hash(&self, key_hash: &str) -> Result<Option<ApiKey>> {
        let (sql, values) = Query::select()
            .column(Asterisk)
            .from(ApiKeys::Table)
            .and_where(Expr::col(ApiKeys::KeyHash).eq(key_hash))
            .build_sqlx(SqliteQueryBuilder);

        let row = sqlx::query_with(&sql, values)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(api_key_from_row).transpose()
    }

    async fn list_api_keys(&self) -> Result<Vec<ApiKey>> {
        let (sql, values) = Query::select()
            .column(Asterisk)
            .from(ApiKeys::Table)
            .order_by(ApiKeys::Id, Order::Desc)
            .build_sqlx(SqliteQueryBuilder);

        let rows = sqlx::query_with(&sql, values).fetch_all(&self.pool).await?;
        rows.iter().map(api_key_from_row).collect()
    }

    async fn set_api_key_active(&self, id: i64, active: bool) -> Result<ApiKey> {
        let (sql, values) = Query::update()
            .table(ApiKeys::Table)
            .value(ApiKeys::Active, active)
            .and_where(Expr::col(ApiKeys::Id).eq(id))
            .returning_all()
            .build_sqlx(SqliteQueryBuilder);

        let row = sqlx::query_with(&sql, values)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StorageError::NotFound)?;
        api_key_from_row(&row)
    }

    async fn touch_api_key(&self, id: i64, used_at: Timestamp) -> Result<()> {
        let (sql, values) = Query::update()
            .table(ApiKeys::Table)
            .value(ApiKeys::LastUsedAt, ts_to_text(&used_at))
            .and_where(Expr::col(ApiKeys::Id).eq(id))
            .build_sqlx(SqliteQueryBuilder);

        let result = sqlx::query_with(&sql, values).execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }

    async fn delete_api_key(&self, id: i64) -> Result<()> {
        let (sql, values) = Query::delete()
            .from_table(ApiKeys::Table)
            .and_where(Expr::col(ApiKeys::Id).eq(id))
            .build_sqlx(SqliteQueryBuilder);

        let result = sqlx::query_with(&sql, values).execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }

    async fn get_setting(&self, key: &str) -> Result<Option<SystemSetting>> {
        let (sql, values) = Query::select()
            .column(Asterisk)
            .from(SystemSettings::Table)
            .and_where(Expr::col(SystemSettings::Key).eq(key))
            .build_sqlx(SqliteQueryBuilder);

        let row = sqlx::query_with(&sql, values)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(setting_from_row).transpose()
    }

    async fn list_settings(&self) -> Result<Vec<SystemSetting>> {
        let (sql, values) = Query::select()
            .column(Asterisk)
            .from(SystemSettings::Table)
            .order_by(SystemSettings::Key, Order::Asc)
            .build_sqlx(SqliteQueryBuilder);

        let rows = sqlx::query_with(&sql, values).fetch_all(&self.pool).await?;
        rows.iter().map(setting_from_row).collect()
    }

    async fn put_setting(&self, key: &str, value: serde_json::Value) -> Result<SystemSetting> {
        let (sql, values) = Query::insert()
            .into_table(SystemSettings::Table)
            .columns([
                SystemSettings::Key,
                SystemSettings::Value,
                SystemSettings::UpdatedAt,
            ])
            .values([
                key.into(),
                serde_json::to_string(&value)?.into(),
                ts_to_text(&now()).into(),
            ])?
            .on_conflict(
                OnConflict::column(SystemSettings::Key)
                    .update_columns([SystemSettings::Value, SystemSettings::UpdatedAt])
                    .to_owned(),
            )
            .returning_all()
            .build_sqlx(SqliteQueryBuilder);

        let row = sqlx::query_with(&sql, values).fetch_one(&self.pool).await?;
        setting_from_row(&row)
    }

    async fn delete_setting(&self, key: &str) -> Result<()> {
        let (sql, values) = Query::delete()
            .from_table(SystemSettings::Table)
            .and_where(Expr::col(SystemSettings::Key).eq(key))
            .build_sqlx(SqliteQueryBuilder);

        let result = sqlx::query_with(&sql, values).execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }
}
