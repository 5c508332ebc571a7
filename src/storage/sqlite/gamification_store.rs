//! SQLite GamificationStore implementation.

use async_trait::async_trait;
use sea_query::{Asterisk, Expr, OnConflict, Order, Query, SqliteQueryBuilder};
use sea_query_binder::SqlxBinder;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use super::{get_enum, get_opt_ts, get_ts, SqliteStorage};
use crate::models::{
    Achievement, AchievementInput, Milestone, MilestoneInput, Timestamp, UserProgress,
};
use crate::storage::helpers::{now, ts_to_text};
use crate::storage::schema::{Achievements, Milestones, UserProgress as ProgressTable};
use crate::storage::{GamificationStore, Result, StorageError};

fn achievement_from_row(row: &SqliteRow) -> Result<Achievement> {
    Ok(Achievement {
        id: row.try_get("id")?,
        code: row.try_get("code")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        metric: get_enum(row, "metric")?,
        threshold: row.try_get("threshold")?,
        points: row.try_get("points")?,
    })
}

fn milestone_from_row(row: &SqliteRow) -> Result<Milestone> {
    Ok(Milestone {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        target_score: row.try_get("target_score")?,
        reward: row.try_get("reward")?,
        sort_order: row.try_get("sort_order")?,
    })
}

fn progress_from_row(row: &SqliteRow) -> Result<UserProgress> {
    Ok(UserProgress {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        achievement_id: row.try_get("achievement_id")?,
        progress: row.try_get("progress")?,
        completed: row.try_get("completed")?,
        completed_at: get_opt_ts(row, "completed_at")?,
        updated_at: get_ts(row, "updated_at")?,
    })
}

#[async_trait]
impl GamificationStore for SqliteStorage {
    async fn create_achievement(&self, input: AchievementInput) -> Result<Achievement> {
        let (sql, values) = Query::insert()
            .into_table(Achievements::Table)
            .columns([
                Achievements::Code,
                Achievements::Name,
                Achievements::Description,
                Achievements::Metric,
                Achievements::Threshold,
                Achievements::Points,
            ])
            .values([
                input.code.into(),
                input.name.into(),
                input.description.into(),
                input.metric.as_str().into(),
                input.threshold.into(),
                input.points.into(),
            ])?
            .returning_all()
            .build_sqlx(SqliteQueryBuilder);

        let row = sqlx::query_with(&sql, values).fetch_one(&self.pool).await?;
        achievement_from_row(&row)
    }

    async fn list_achievements(&self) -> Result<Vec<Achievement>> {
        let (sql, values) = Query::select()
            .column(Asterisk)
            .from(Achievements::Table)
            .order_by(Achievements::Id, Order::Asc)
            .build_sqlx(SqliteQueryBuilder);

        let rows = sqlx::query_with(&sql, values).fetch_all(&self.pool).await?;
        rows.iter().map(achievement_from_row).collect()
    }

    async fn update_achievement(&self, id: i64, input: AchievementInput) -> Result<Achievement> {
        let (sql, values) = Query::update()
            .table(Achievements::Table)
            .values([
                (Achievements::Code, input.code.into()),
                (Achievements::Name, input.name.into()),
                (Achievements::Description, input.description.into()),
                (Achievements::Metric, input.metric.as_str().into()),
                (Achievements::Threshold, input.threshold.into()),
                (Achievements::Points, input.points.into()),
            ])
            .and_where(Expr::col(Achievements::Id).eq(id))
            .returning_all()
            .build_sqlx(SqliteQueryBuilder);

        let row = sqlx::query_with(&sql, values)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StorageError::NotFound)?;
        achievement_from_row(&row)
    }

    async fn delete_achievement(&self, id: i64) -> Result<()> {
        let (sql, values) = Query::delete()
            .from_table(Achievements::Table)
            .and_where(Expr::col(Achievements::Id).eq(id))
            .build_sqlx(SqliteQueryBuilder);

        let result = sqlx::query_with(&sql, values).execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }

    async fn create_milestone(&self, input: MilestoneInput) -> Result<Milestone> {
        let (sql, values) = Query::insert()
            .into_table(Milestones::Table)
            .columns([
                Milestones::Name,
                Milestones::Description,
                Milestones::TargetScore,
                Milestones::Reward,
                Milestones::SortOrder,
            ])
            .values([
                input.name.into(),
                input.description.into(),
                input.target_score.into(),
                input.reward.into(),
                input.sort_order.into(),
            ])?
            .returning_all()
            .build_sqlx(SqliteQueryBuilder);

        let row = sqlx::query_with(&sql, values).fetch_one(&self.pool).await?;
        milestone_from_row(&row)
    }

    async fn list_milestones(&self) -> Result<Vec<Milestone>> {
        let (sql, values) = Query::select()
            .column(Asterisk)
            .from(Milestones::Table)
            .order_by(Milestones::SortOrder, Order::Asc)
            .order_by(Milestones::TargetScore, Order::Asc)
            .order_by(Milestones::Id, Order::Asc)
            .build_sqlx(SqliteQueryBuilder);

        let rows = sqlx::query_with(&sql, values).fetch_all(&self.pool).await?;
        rows.iter().map(milestone_from_row).collect()
    }

    async fn update_milestone(&self, id: i64, input: MilestoneInput) -> Result<Milestone> {
        let (sql, values) = Query::update()
            .table(Milestones::Table)
            .values([
                (Milestones::Name, input.name.into()),
                (Milestones::Description, input.description.into()),
                (Milestones::TargetScore, input.target_score.into()),
                (Milestones::Reward, input.reward.into()),
                (Milestones::SortOrder, input.sort_order.into()),
            ])
            .and_where(Expr::col(Milestones::Id).eq(id))
            .returning_all()
            .build_sqlx(SqliteQueryBuilder);

        let row = sqlx::query_with(&sql, values)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StorageError::NotFound)?;
        milestone_from_row(&row)
    }

    async fn delete_milestone(&self, id: i64) -> Result<()> {
        let (sql, values) = Query::delete()
            .from_table(Milestones::Table)
            .and_where(Expr::col(Milestones::Id).eq(id))
            .build_sqlx(SqliteQueryBuilder);

        let result = sqlx::query_with(&sql, values).execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }

    async fn upsert_progress(
        &self,
        user_id: i64,
        achievement_id: i64,
        progress: f64,
        completed_at: Option<Timestamp>,
    ) -> Result<UserProgress> {
        let (sql, values) = Query::insert()
            .into_table(ProgressTable::Table)
            .columns([
                ProgressTable::UserId,
                ProgressTable::AchievementId,
                ProgressTable::Progress,
                ProgressTable::Completed,
                ProgressTable::CompletedAt,
                ProgressTable::UpdatedAt,
            ])
            .values([
                user_id.into(),
                achievement_id.into(),
                progress.into(),
                completed_at.is_some().into(),
                completed_at.as_ref().map(ts_to_text).into(),
                ts_to_text(&now()).into(),
            ])?
            .on_conflict(
                OnConflict::columns([ProgressTable::UserId, ProgressTable::AchievementId])
                    .update_columns([
                        ProgressTable::Progress,
                        ProgressTable::Completed,
                        ProgressTable::CompletedAt,
                        ProgressTable::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .returning_all()
            .build_sqlx(SqliteQueryBuilder);

        let row = sqlx::query_with(&sql, values).fetch_one(&self.pool).await?;
        progress_from_row(&row)
    }

    async fn list_progress(&self, user_id: i64) -> Result<Vec<UserProgress>> {
        let (sql, values) = Query::select()
            .column(Asterisk)
            .from(ProgressTable::Table)
            .and_where(Expr::col(ProgressTable::UserId).eq(user_id))
            .order_by(ProgressTable::AchievementId, Order::Asc)
            .build_sqlx(SqliteQueryBuilder);

        let rows = sqlx::query_with(&sql, values).fetch_all(&self.pool).await?;
        rows.iter().map(progress_from_row).collect()
    }
}
