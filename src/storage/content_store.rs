//! ContentStore trait definition.

use async_trait::async_trait;

use super::Result;
use crate::models::{CaseStudy, CaseStudyInput, WaterProject, WaterProjectInput};

/// Interface for case studies and water projects.
///
/// Updates replace every editable field. Case study slugs are unique.
#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn create_case_study(&self, input: CaseStudyInput) -> Result<CaseStudy>;

    async fn get_case_study(&self, id: i64) -> Result<Option<CaseStudy>>;

    async fn find_case_study_by_slug(&self, slug: &str) -> Result<Option<CaseStudy>>;

    /// Newest first; `published_only` hides drafts.
    async fn list_case_studies(&self, published_only: bool) -> Result<Vec<CaseStudy>>;

    async fn update_case_study(&self, id: i64, input: CaseStudyInput) -> Result<CaseStudy>;

    async fn delete_case_study(&self, id: i64) -> Result<()>;

    async fn create_water_project(&self, input: WaterProjectInput) -> Result<WaterProject>;

    async fn get_water_project(&self, id: i64) -> Result<Option<WaterProject>>;

    async fn list_water_projects(&self) -> Result<Vec<WaterProject>>;

    async fn update_water_project(&self, id: i64, input: WaterProjectInput)
        -> Result<WaterProject>;

    async fn delete_water_project(&self, id: i64) -> Result<()>;
}
