//! Achievements, milestones and per-user progress.

use serde::{Deserialize, Serialize};

use super::{string_enum, Timestamp};

string_enum! {
    /// Which aggregate an achievement threshold is measured against.
    pub enum AchievementMetric ("achievement metric") {
        Carbon => "carbon",
        Water => "water",
        Minerals => "minerals",
        Families => "families",
        EsgScore => "esg_score",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Achievement {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub description: String,
    pub metric: AchievementMetric,
    pub threshold: f64,
    pub points: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AchievementInput {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub metric: AchievementMetric,
    pub threshold: f64,
    #[serde(default)]
    pub points: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Milestone {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub target_score: i64,
    pub reward: Option<String>,
    pub sort_order: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MilestoneInput {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub target_score: i64,
    #[serde(default)]
    pub reward: Option<String>,
    #[serde(default)]
    pub sort_order: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProgress {
    pub id: i64,
    pub user_id: i64,
    pub achievement_id: i64,
    pub progress: f64,
    pub completed: bool,
    pub completed_at: Option<Timestamp>,
    pub updated_at: Timestamp,
}
