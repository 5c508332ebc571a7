//! Achievement progress and milestone status.

use serde::Serialize;

use super::esg::{compute_score, EsgScore};
use crate::config::ScoringConfig;
use crate::models::{Achievement, AchievementMetric, ImpactTotals, Milestone, UserProgress};
use crate::storage::helpers::now;
use crate::storage::{Result, Storage};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AchievementProgress {
    pub achievement: Achievement,
    pub progress: UserProgress,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MilestoneStatus {
    pub milestone: Milestone,
    pub reached: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressReport {
    pub score: EsgScore,
    pub achievements: Vec<AchievementProgress>,
    pub milestones: Vec<MilestoneStatus>,
}

/// The user's value of the aggregate an achievement measures.
pub fn metric_value(metric: AchievementMetric, totals: &ImpactTotals, score: &EsgScore) -> f64 {
    match metric {
        AchievementMetric::Carbon => totals.carbon_kg,
        AchievementMetric::Water => totals.water_liters,
        AchievementMetric::Minerals => totals.minerals_kg,
        AchievementMetric::Families => totals.families_helped as f64,
        AchievementMetric::EsgScore => score.total_score as f64,
    }
}

/// Recompute every achievement for `user_id` and persist the progress rows.
///
/// Completion is sticky: once stamped, `completed_at` is kept even if the
/// underlying totals later drop.
pub async fn refresh_progress(
    storage: &dyn Storage,
    user_id: i64,
    scoring: &ScoringConfig,
) -> Result<ProgressReport> {
    let totals = storage.sum_impact(user_id).await?;
    let score = compute_score(totals, scoring);

    let existing = storage.list_progress(user_id).await?;
    let mut achievements = Vec::new();
    for achievement in storage.list_achievements().await? {
        let value = metric_value(achievement.metric, &totals, &score);
        let previous = existing
            .iter()
            .find(|p| p.achievement_id == achievement.id)
            .and_then(|p| p.completed_at);
        let completed_at = previous.or_else(|| (value >= achievement.threshold).then(now));

        let progress = storage
            .upsert_progress(user_id, achievement.id, value, completed_at)
            .await?;
        achievements.push(AchievementProgress {
            achievement,
            progress,
        });
    }

    let milestones = storage
        .list_milestones()
        .await?
        .into_iter()
        .map(|milestone| MilestoneStatus {
            reached: score.total_score >= milestone.target_score,
            milestone,
        })
        .collect();

    Ok(ProgressReport {
        score,
        achievements,
        milestones,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AchievementInput, MilestoneInput, NewImpact, NewUser, Role, UserStatus};
    use crate::storage::{GamificationStore, ImpactStore, MockStorage, UserStore};

    async fn setup() -> (MockStorage, i64) {
        let store = MockStorage::new();
        let user = store
            .create_user(NewUser {
                email: "g@example.com".into(),
                password_hash: "x".into(),
                name: "G".into(),
                company: None,
                phone: None,
                role: Role::Customer,
                status: UserStatus::Active,
            })
            .await
            .unwrap();
        (store, user.id)
    }

    async fn add_impact(store: &MockStorage, user_id: i64, carbon: f64, families: i64) {
        store
            .add_impact(NewImpact {
                user_id,
                order_id: None,
                carbon_kg: carbon,
                water_liters: 0.0,
                minerals_kg: 0.0,
                families_helped: families,
                recorded_at: now(),
            })
            .await
            .unwrap();
    }

    fn achievement(code: &str, metric: AchievementMetric, threshold: f64) -> AchievementInput {
        AchievementInput {
            code: code.into(),
            name: code.into(),
            description: String::new(),
            metric,
            threshold,
            points: 10,
        }
    }

    #[tokio::test]
    async fn test_progress_tracks_metric_and_completes() {
        let (store, user_id) = setup().await;
        store
            .create_achievement(achievement("carbon-100", AchievementMetric::Carbon, 100.0))
            .await
            .unwrap();
        store
            .create_achievement(achievement("families-5", AchievementMetric::Families, 5.0))
            .await
            .unwrap();
        add_impact(&store, user_id, 60.0, 1).await;

        let report = refresh_progress(&store, user_id, &ScoringConfig::default())
            .await
            .unwrap();
        assert_eq!(report.achievements.len(), 2);
        assert_eq!(report.achievements[0].progress.progress, 60.0);
        assert!(!report.achievements[0].progress.completed);

        add_impact(&store, user_id, 50.0, 0).await;
        let report = refresh_progress(&store, user_id, &ScoringConfig::default())
            .await
            .unwrap();
        let carbon = &report.achievements[0].progress;
        assert_eq!(carbon.progress, 110.0);
        assert!(carbon.completed);
        assert!(carbon.completed_at.is_some());
        assert!(!report.achievements[1].progress.completed);

        // one row per (user, achievement)
        assert_eq!(store.list_progress(user_id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_completion_timestamp_is_kept() {
        let (store, user_id) = setup().await;
        store
            .create_achievement(achievement("first", AchievementMetric::Carbon, 1.0))
            .await
            .unwrap();
        add_impact(&store, user_id, 5.0, 0).await;

        let scoring = ScoringConfig::default();
        let first = refresh_progress(&store, user_id, &scoring).await.unwrap();
        let stamped = first.achievements[0].progress.completed_at;
        assert!(stamped.is_some());

        let again = refresh_progress(&store, user_id, &scoring).await.unwrap();
        assert_eq!(again.achievements[0].progress.completed_at, stamped);
    }

    #[tokio::test]
    async fn test_milestones_against_score() {
        let (store, user_id) = setup().await;
        for (name, target) in [("Seedling", 0), ("Sapling", 50), ("Forest", 5000)] {
            store
                .create_milestone(MilestoneInput {
                    name: name.into(),
                    description: String::new(),
                    target_score: target,
                    reward: None,
                    sort_order: 0,
                })
                .await
                .unwrap();
        }
        // 20 families -> social pillar 400, weighted 60
        add_impact(&store, user_id, 0.0, 20).await;

        let report = refresh_progress(&store, user_id, &ScoringConfig::default())
            .await
            .unwrap();
        assert_eq!(report.score.total_score, 60);
        let reached: Vec<_> = report.milestones.iter().map(|m| m.reached).collect();
        assert_eq!(reached, vec![true, true, false]);
    }

    #[tokio::test]
    async fn test_esg_metric_uses_total_score() {
        let (store, user_id) = setup().await;
        store
            .create_achievement(achievement("esg-50", AchievementMetric::EsgScore, 50.0))
            .await
            .unwrap();
        add_impact(&store, user_id, 0.0, 20).await;

        let report = refresh_progress(&store, user_id, &ScoringConfig::default())
            .await
            .unwrap();
        assert_eq!(report.achievements[0].progress.progress, 60.0);
        assert!(report.achievements[0].progress.completed);
    }
}
