//! PostgreSQL GamificationStore implementation.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::Row;

use super::{expect_affected, get_enum, PostgresStorage};
use crate::models::{
    Achievement, AchievementInput, Milestone, MilestoneInput, Timestamp, UserProgress,
};
use crate::storage::helpers::{normalize, now};
use crate::storage::{GamificationStore, Result, StorageError};

fn achievement_from_row(row: &PgRow) -> Result<Achievement> {
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

fn milestone_from_row(row: &PgRow) -> Result<Milestone> {
    Ok(Milestone {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        target_score: row.try_get("target_score")?,
        reward: row.try_get("reward")?,
        sort_order: row.try_get("sort_order")?,
    })
}

fn progress_from_row(row: &PgRow) -> Result<UserProgress> {
    Ok(UserProgress {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        achievement_id: row.try_get("achievement_id")?,
        progress: row.try_get("progress")?,
        completed: row.try_get("completed")?,
        completed_at: row.try_get("completed_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl GamificationStore for PostgresStorage {
    async fn create_achievement(&self, input: AchievementInput) -> Result<Achievement> {
        let row = sqlx::query(
            "INSERT INTO achievements (code, name, description, metric, threshold, points)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING *",
        )
        .bind(&input.code)
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.metric.as_str())
        .bind(input.threshold)
        .bind(input.points)
        .fetch_one(&self.pool)
        .await?;
        achievement_from_row(&row)
    }

    async fn list_achievements(&self) -> Result<Vec<Achievement>> {
        let rows = sqlx::query("SELECT * FROM achievements ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(achievement_from_row).collect()
    }

    async fn update_achievement(&self, id: i64, input: AchievementInput) -> Result<Achievement> {
        let row = sqlx::query(
            "UPDATE achievements SET
                code = $2, name = $3, description = $4, metric = $5, threshold = $6, points = $7
             WHERE id = $1
             RETURNING *",
        )
        .bind(id)
        .bind(&input.code)
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.metric.as_str())
        .bind(input.threshold)
        .bind(input.points)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StorageError::NotFound)?;
        achievement_from_row(&row)
    }

    async fn delete_achievement(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM achievements WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        expect_affected(result)
    }

    async fn create_milestone(&self, input: MilestoneInput) -> Result<Milestone> {
        let row = sqlx::query(
            "INSERT INTO milestones (name, description, target_score, reward, sort_order)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING *",
        )
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.target_score)
        .bind(&input.reward)
        .bind(input.sort_order)
        .fetch_one(&self.pool)
        .await?;
        milestone_from_row(&row)
    }

    async fn list_milestones(&self) -> Result<Vec<Milestone>> {
        let rows = sqlx::query("SELECT * FROM milestones ORDER BY sort_order, target_score, id")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(milestone_from_row).collect()
    }

    async fn update_milestone(&self, id: i64, input: MilestoneInput) -> Result<Milestone> {
        let row = sqlx::query(
            "UPDATE milestones SET
                name = $2, description = $3, target_score = $4, reward = $5, sort_order = $6
             WHERE id = $1
             RETURNING *",
        )
        .bind(id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.target_score)
        .bind(&input.reward)
        .bind(input.sort_order)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StorageError::NotFound)?;
        milestone_from_row(&row)
    }

    async fn delete_milestone(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM milestones WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        expect_affected(result)
    }

    async fn upsert_progress(
        &self,
        user_id: i64,
        achievement_id: i64,
        progress: f64,
        completed_at: Option<Timestamp>,
    ) -> Result<UserProgress> {
        let row = sqlx::query(
            "INSERT INTO user_progress
                (user_id, achievement_id, progress, completed, completed_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6)
             ON CONFLICT (user_id, achievement_id) DO UPDATE SET
                progress = EXCLUDED.progress,
                completed = EXCLUDED.completed,
                completed_at = EXCLUDED.completed_at,
                updated_at = EXCLUDED.updated_at
             RETURNING *",
        )
        .bind(user_id)
        .bind(achievement_id)
        .bind(progress)
        .bind(completed_at.is_some())
        .bind(completed_at.map(normalize))
        .bind(now())
        .fetch_one(&self.pool)
        .await?;
        progress_from_row(&row)
    }

    async fn list_progress(&self, user_id: i64) -> Result<Vec<UserProgress>> {
        let rows = sqlx::query("SELECT * FROM user_progress WHERE user_id = $1 ORDER BY achievement_id")
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(progress_from_row).collect()
    }
}
