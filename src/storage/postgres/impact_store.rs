//! PostgreSQL ImpactStore implementation.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::Row;

use super::{expect_affected, PostgresStorage};
use crate::models::{EnvironmentalImpact, ImpactTotals, NewImpact};
use crate::storage::helpers::{normalize, now};
use crate::storage::{ImpactStore, Result};

fn impact_from_row(row: &PgRow) -> Result<EnvironmentalImpact> {
    Ok(EnvironmentalImpact {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        order_id: row.try_get("order_id")?,
        carbon_kg: row.try_get("carbon_kg")?,
        water_liters: row.try_get("water_liters")?,
        minerals_kg: row.try_get("minerals_kg")?,
        families_helped: row.try_get("families_helped")?,
        recorded_at: row.try_get("recorded_at")?,
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait]
impl ImpactStore for PostgresStorage {
    async fn add_impact(&self, impact: NewImpact) -> Result<EnvironmentalImpact> {
        let row = sqlx::query(
            "INSERT INTO environmental_impact
                (user_id, order_id, carbon_kg, water_liters, minerals_kg, families_helped,
                 recorded_at, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING *",
        )
        .bind(impact.user_id)
        .bind(impact.order_id)
        .bind(impact.carbon_kg)
        .bind(impact.water_liters)
        .bind(impact.minerals_kg)
        .bind(impact.families_helped)
        .bind(normalize(impact.recorded_at))
        .bind(now())
        .fetch_one(&self.pool)
        .await?;
        impact_from_row(&row)
    }

    async fn delete_impact(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM environmental_impact WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        expect_affected(result)
    }

    async fn list_impact_for_user(&self, user_id: i64) -> Result<Vec<EnvironmentalImpact>> {
        let rows = sqlx::query(
            "SELECT * FROM environmental_impact WHERE user_id = $1
             ORDER BY recorded_at DESC, id DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(impact_from_row).collect()
    }

    async fn sum_impact(&self, user_id: i64) -> Result<ImpactTotals> {
        // SUM(BIGINT) is NUMERIC in PostgreSQL; cast back.
        let row = sqlx::query(
            "SELECT
                COALESCE(SUM(carbon_kg), 0)::DOUBLE PRECISION AS carbon_kg,
                COALESCE(SUM(water_liters), 0)::DOUBLE PRECISION AS water_liters,
                COALESCE(SUM(minerals_kg), 0)::DOUBLE PRECISION AS minerals_kg,
                COALESCE(SUM(families_helped), 0)::BIGINT AS families_helped
             FROM environmental_impact WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(ImpactTotals {
            carbon_kg: row.try_get("carbon_kg")?,
            water_liters: row.try_get("water_liters")?,
            minerals_kg: row.try_get("minerals_kg")?,
            families_helped: row.try_get("families_helped")?,
        })
    }
}
