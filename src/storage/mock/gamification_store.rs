use async_trait::async_trait;

use super::{missing_parent, MockStorage};
use crate::models::{
    Achievement, AchievementInput, Milestone, MilestoneInput, Timestamp, UserProgress,
};
use crate::storage::helpers::{normalize, now};
use crate::storage::{GamificationStore, Result, StorageError};

fn code_taken(code: &str) -> StorageError {
    StorageError::Conflict(format!("achievement code {code} already exists"))
}

#[async_trait]
impl GamificationStore for MockStorage {
    async fn create_achievement(&self, input: AchievementInput) -> Result<Achievement> {
        let mut tables = self.tables.write().await;
        if tables.achievements.values().any(|a| a.code == input.code) {
            return Err(code_taken(&input.code));
        }
        let id = tables.next_id();
        let record = Achievement {
            id,
            code: input.code,
            name: input.name,
            description: input.description,
            metric: input.metric,
            threshold: input.threshold,
            points: input.points,
        };
        tables.achievements.insert(id, record.clone());
        Ok(record)
    }

    async fn list_achievements(&self) -> Result<Vec<Achievement>> {
        Ok(self.tables.read().await.achievements.values().cloned().collect())
    }

    async fn update_achievement(&self, id: i64, input: AchievementInput) -> Result<Achievement> {
        let mut tables = self.tables.write().await;
        if tables
            .achievements
            .values()
            .any(|a| a.id != id && a.code == input.code)
        {
            return Err(code_taken(&input.code));
        }
        let achievement = tables.achievements.get_mut(&id).ok_or(StorageError::NotFound)?;
        achievement.code = input.code;
        achievement.name = input.name;
        achievement.description = input.description;
        achievement.metric = input.metric;
        achievement.threshold = input.threshold;
        achievement.points = input.points;
        Ok(achievement.clone())
    }

    async fn delete_achievement(&self, id: i64) -> Result<()> {
        let mut tables = self.tables.write().await;
        tables.achievements.remove(&id).ok_or(StorageError::NotFound)?;
        tables.progress.retain(|_, p| p.achievement_id != id);
        Ok(())
    }

    async fn create_milestone(&self, input: MilestoneInput) -> Result<Milestone> {
        let mut tables = self.tables.write().await;
        let id = tables.next_id();
        let record = Milestone {
            id,
            name: input.name,
            description: input.description,
            target_score: input.target_score,
            reward: input.reward,
            sort_order: input.sort_order,
        };
        tables.milestones.insert(id, record.clone());
        Ok(record)
    }

    async fn list_milestones(&self) -> Result<Vec<Milestone>> {
        let tables = self.tables.read().await;
        let mut rows: Vec<_> = tables.milestones.values().cloned().collect();
        rows.sort_by_key(|m| (m.sort_order, m.target_score, m.id));
        Ok(rows)
    }

    async fn update_milestone(&self, id: i64, input: MilestoneInput) -> Result<Milestone> {
        let mut tables = self.tables.write().await;
        let milestone = tables.milestones.get_mut(&id).ok_or(StorageError::NotFound)?;
        milestone.name = input.name;
        milestone.description = input.description;
        milestone.target_score = input.target_score;
        milestone.reward = input.reward;
        milestone.sort_order = input.sort_order;
        Ok(milestone.clone())
    }

    async fn delete_milestone(&self, id: i64) -> Result<()> {
        let mut tables = self.tables.write().await;
        tables
            .milestones
            .remove(&id)
            .map(|_| ())
            .ok_or(StorageError::NotFound)
    }

    async fn upsert_progress(
        &self,
        user_id: i64,
        achievement_id: i64,
        progress: f64,
        completed_at: Option<Timestamp>,
    ) -> Result<UserProgress> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&user_id) {
            return Err(missing_parent("user", user_id));
        }
        if !tables.achievements.contains_key(&achievement_id) {
            return Err(missing_parent("achievement", achievement_id));
        }
        let completed_at = completed_at.map(normalize);
        let ts = now();
        let existing = tables
            .progress
            .values()
            .find(|p| p.user_id == user_id && p.achievement_id == achievement_id)
            .map(|p| p.id);
        let id = match existing {
            Some(id) => id,
            None => tables.next_id(),
        };
        let record = UserProgress {
            id,
            user_id,
            achievement_id,
            progress,
            completed: completed_at.is_some(),
            completed_at,
            updated_at: ts,
        };
        tables.progress.insert(id, record.clone());
        Ok(record)
    }

    async fn list_progress(&self, user_id: i64) -> Result<Vec<UserProgress>> {
        let tables = self.tables.read().await;
        let mut rows: Vec<_> = tables
            .progress
            .values()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by_key(|p| p.achievement_id);
        Ok(rows)
    }
}
