//! SQLite UserStore implementation.

use async_trait::async_trait;
use sea_query::{Asterisk, Expr, Order, Query, SqliteQueryBuilder};
use sea_query_binder::SqlxBinder;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use super::{get_enum, get_opt_ts, get_ts, SqliteStorage};
use crate::models::user::normalize_email;
use crate::models::{NewUser, User, UserUpdate};
use crate::storage::helpers::{now, ts_to_text};
use crate::storage::schema::Users;
use crate::storage::{Result, StorageError, UserStore};

fn user_from_row(row: &SqliteRow) -> Result<User> {
    Ok(User {
        id: row.try_get("id")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        name: row.try_get("name")?,
        company: row.try_get("company")?,
        phone: row.try_get("phone")?,
        role: get_enum(row, "role")?,
        status: get_enum(row, "status")?,
        created_at: get_ts(row, "created_at")?,
        updated_at: get_ts(row, "updated_at")?,
        deleted_at: get_opt_ts(row, "deleted_at")?,
    })
}

#[async_trait]
impl UserStore for SqliteStorage {
    async fn create_user(&self, user: NewUser) -> Result<User> {
        let ts = ts_to_text(&now());
        let (sql, values) = Query::insert()
            .into_table(Users::Table)
            .columns([
                Users::Email,
                Users::PasswordHash,
                Users::Name,
                Users::Company,
                Users::Phone,
                Users::Role,
                Users::Status,
                Users::CreatedAt,
                Users::UpdatedAt,
            ])
            .values([
                normalize_email(&user.email).into(),
                user.password_hash.into(),
                user.name.into(),
                user.company.into(),
                user.phone.into(),
                user.role.as_str().into(),
                user.status.as_str().into(),
                ts.clone().into(),
                ts.into(),
            ])?
            .returning_all()
            .build_sqlx(SqliteQueryBuilder);

        let row = sqlx::query_with(&sql, values).fetch_one(&self.pool).await?;
        user_from_row(&row)
    }

    async fn get_user(&self, id: i64) -> Result<Option<User>> {
        let (sql, values) = Query::select()
            .column(Asterisk)
            .from(Users::Table)
            .and_where(Expr::col(Users::Id).eq(id))
            .and_where(Expr::col(Users::DeletedAt).is_null())
            .build_sqlx(SqliteQueryBuilder);

        let row = sqlx::query_with(&sql, values)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let (sql, values) = Query::select()
            .column(Asterisk)
            .from(Users::Table)
            .and_where(Expr::col(Users::Email).eq(normalize_email(email)))
            .and_where(Expr::col(Users::DeletedAt).is_null())
            .build_sqlx(SqliteQueryBuilder);

        let row = sqlx::query_with(&sql, values)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        let (sql, values) = Query::select()
            .column(Asterisk)
            .from(Users::Table)
            .and_where(Expr::col(Users::DeletedAt).is_null())
            .order_by(Users::Id, Order::Desc)
            .build_sqlx(SqliteQueryBuilder);

        let rows = sqlx::query_with(&sql, values).fetch_all(&self.pool).await?;
        rows.iter().map(user_from_row).collect()
    }

    async fn update_user(&self, id: i64, update: UserUpdate) -> Result<User> {
        let mut query = Query::update();
        query
            .table(Users::Table)
            .value(Users::UpdatedAt, ts_to_text(&now()));
        if let Some(email) = update.email {
            query.value(Users::Email, normalize_email(&email));
        }
        if let Some(hash) = update.password_hash {
            query.value(Users::PasswordHash, hash);
        }
        if let Some(name) = update.name {
            query.value(Users::Name, name);
        }
        if let Some(company) = update.company {
            query.value(Users::Company, company);
        }
        if let Some(phone) = update.phone {
            query.value(Users::Phone, phone);
        }
        if let Some(role) = update.role {
            query.value(Users::Role, role.as_str());
        }
        if let Some(status) = update.status {
            query.value(Users::Status, status.as_str());
        }
        let (sql, values) = query
            .and_where(Expr::col(Users::Id).eq(id))
            .and_where(Expr::col(Users::DeletedAt).is_null())
            .returning_all()
            .build_sqlx(SqliteQueryBuilder);

        let row = sqlx::query_with(&sql, values)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StorageError::NotFound)?;
        user_from_row(&row)
    }

    async fn soft_delete_user(&self, id: i64) -> Result<()> {
        let ts = ts_to_text(&now());
        let (sql, values) = Query::update()
            .table(Users::Table)
            .values([
                (Users::DeletedAt, ts.clone().into()),
                (Users::UpdatedAt, ts.into()),
            ])
            .and_where(Expr::col(Users::Id).eq(id))
            .and_where(Expr::col(Users::DeletedAt).is_null())
            .build_sqlx(SqliteQueryBuilder);

        let result = sqlx::query_with(&sql, values).execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }
}
