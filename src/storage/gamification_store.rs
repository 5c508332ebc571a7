//! GamificationStore trait definition.

use async_trait::async_trait;

use super::Result;
use crate::models::{Achievement, AchievementInput, Milestone, MilestoneInput, Timestamp, UserProgress};

/// Interface for achievements, milestones and per-user progress.
///
/// Achievement codes are unique; there is at most one progress row per
/// (user, achievement).
#[async_trait]
pub trait GamificationStore: Send + Sync {
    async fn create_achievement(&self, input: AchievementInput) -> Result<Achievement>;

    async fn list_achievements(&self) -> Result<Vec<Achievement>>;

    async fn update_achievement(&self, id: i64, input: AchievementInput) -> Result<Achievement>;

    /// Also removes progress rows pointing at the achievement.
    async fn delete_achievement(&self, id: i64) -> Result<()>;

    async fn create_milestone(&self, input: MilestoneInput) -> Result<Milestone>;

    /// Ordered by `sort_order`, then target score.
    async fn list_milestones(&self) -> Result<Vec<Milestone>>;

    async fn update_milestone(&self, id: i64, input: MilestoneInput) -> Result<Milestone>;

    async fn delete_milestone(&self, id: i64) -> Result<()>;

    /// Insert or overwrite the progress row for (user, achievement).
    async fn upsert_progress(
        &self,
        user_id: i64,
        achievement_id: i64,
        progress: f64,
        completed_at: Option<Timestamp>,
    ) -> Result<UserProgress>;

    async fn list_progress(&self, user_id: i64) -> Result<Vec<UserProgress>>;
}
