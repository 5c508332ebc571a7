//! Marketing content: case studies and funded water projects.

use serde::{Deserialize, Serialize};

use super::{string_enum, Timestamp};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseStudy {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub summary: String,
    pub body: String,
    pub image_url: Option<String>,
    pub published: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Create and full-replace payload for a case study.
#[derive(Debug, Clone, Deserialize)]
pub struct CaseStudyInput {
    pub title: String,
    pub slug: String,
    pub summary: String,
    pub body: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub published: bool,
}

string_enum! {
    pub enum WaterProjectStatus ("water project status") {
        Planned => "planned",
        Active => "active",
        Completed => "completed",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaterProject {
    pub id: i64,
    pub name: String,
    pub location: String,
    pub description: String,
    pub liters_provided: i64,
    pub families_helped: i64,
    pub status: WaterProjectStatus,
    pub image_url: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WaterProjectInput {
    pub name: String,
    pub location: String,
    pub description: String,
    #[serde(default)]
    pub liters_provided: i64,
    #[serde(default)]
    pub families_helped: i64,
    pub status: WaterProjectStatus,
    #[serde(default)]
    pub image_url: Option<String>,
}
