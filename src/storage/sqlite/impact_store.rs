//! SQLite ImpactStore implementation.

use async_trait::async_trait;
use sea_query::{Alias, Asterisk, Expr, Order, Query, SqliteQueryBuilder};
use sea_query_binder::SqlxBinder;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use super::{get_ts, SqliteStorage};
use crate::models::{EnvironmentalImpact, ImpactTotals, NewImpact};
use crate::storage::helpers::{now, ts_to_text};
use crate::storage::schema::EnvironmentalImpact as ImpactTable;
use crate::storage::{ImpactStore, Result, StorageError};

fn impact_from_row(row: &SqliteRow) -> Result<EnvironmentalImpact> {
    Ok(EnvironmentalImpact {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        order_id: row.try_get("order_id")?,
        carbon_kg: row.try_get("carbon_kg")?,
        water_liters: row.try_get("water_liters")?,
        minerals_kg: row.try_get("minerals_kg")?,
        families_helped: row.try_get("families_helped")?,
        recorded_at: get_ts(row, "recorded_at")?,
        created_at: get_ts(row, "created_at")?,
    })
}

#[async_trait]
impl ImpactStore for SqliteStorage {
    async fn add_impact(&self, impact: NewImpact) -> Result<EnvironmentalImpact> {
        let (sql, values) = Query::insert()
            .into_table(ImpactTable::Table)
            .columns([
                ImpactTable::UserId,
                ImpactTable::OrderId,
                ImpactTable::CarbonKg,
                ImpactTable::WaterLiters,
                ImpactTable::MineralsKg,
                ImpactTable::FamiliesHelped,
                ImpactTable::RecordedAt,
                ImpactTable::CreatedAt,
            ])
            .values([
                impact.user_id.into(),
                impact.order_id.into(),
                impact.carbon_kg.into(),
                impact.water_liters.into(),
                impact.minerals_kg.into(),
                impact.families_helped.into(),
                ts_to_text(&impact.recorded_at).into(),
                ts_to_text(&now()).into(),
            ])?
            .returning_all()
            .build_sqlx(SqliteQueryBuilder);

        let row = sqlx::query_with(&sql, values).fetch_one(&self.pool).await?;
        impact_from_row(&row)
    }

    async fn delete_impact(&self, id: i64) -> Result<()> {
        let (sql, values) = Query::delete()
            .from_table(ImpactTable::Table)
            .and_where(Expr::col(ImpactTable::Id).eq(id))
            .build_sqlx(SqliteQueryBuilder);

        let result = sqlx::query_with(&sql, values).execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }

    async fn list_impact_for_user(&self, user_id: i64) -> Result<Vec<EnvironmentalImpact>> {
        let (sql, values) = Query::select()
            .column(Asterisk)
            .from(ImpactTable::Table)
            .and_where(Expr::col(ImpactTable::UserId).eq(user_id))
            .order_by(ImpactTable::RecordedAt, Order::Desc)
            .order_by(ImpactTable::Id, Order::Desc)
            .build_sqlx(SqliteQueryBuilder);

        let rows = sqlx::query_with(&sql, values).fetch_all(&self.pool).await?;
        rows.iter().map(impact_from_row).collect()
    }

    async fn sum_impact(&self, user_id: i64) -> Result<ImpactTotals> {
        let (sql, values) = Query::select()
            .expr_as(Expr::col(ImpactTable::CarbonKg).sum(), Alias::new("carbon_kg"))
            .expr_as(
                Expr::col(ImpactTable::WaterLiters).sum(),
                Alias::new("water_liters"),
            )
            .expr_as(
                Expr::col(ImpactTable::MineralsKg).sum(),
                Alias::new("minerals_kg"),
            )
            .expr_as(
                Expr::col(ImpactTable::FamiliesHelped).sum(),
                Alias::new("families_helped"),
            )
            .from(ImpactTable::Table)
            .and_where(Expr::col(ImpactTable::UserId).eq(user_id))
            .build_sqlx(SqliteQueryBuilder);

        // SUM over zero rows is NULL.
        let row = sqlx::query_with(&sql, values).fetch_one(&self.pool).await?;
        Ok(ImpactTotals {
            carbon_kg: row.try_get::<Option<f64>, _>("carbon_kg")?.unwrap_or(0.0),
            water_liters: row.try_get::<Option<f64>, _>("water_liters")?.unwrap_or(0.0),
            minerals_kg: row.try_get::<Option<f64>, _>("minerals_kg")?.unwrap_or(0.0),
            families_helped: row.try_get::<Option<i64>, _>("families_helped")?.unwrap_or(0),
        })
    }
}
