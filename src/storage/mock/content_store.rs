use async_trait::async_trait;

use super::{newest_first, MockStorage};
use crate::models::{CaseStudy, CaseStudyInput, WaterProject, WaterProjectInput};
use crate::storage::helpers::now;
use crate::storage::{ContentStore, Result, StorageError};

#[async_trait]
impl ContentStore for MockStorage {
    async fn create_case_study(&self, input: CaseStudyInput) -> Result<CaseStudy> {
        let mut tables = self.tables.write().await;
        if tables.case_studies.values().any(|c| c.slug == input.slug) {
            return Err(StorageError::Conflict(format!("slug {} already exists", input.slug)));
        }
        let id = tables.next_id();
        let ts = now();
        let record = CaseStudy {
            id,
            title: input.title,
            slug: input.slug,
            summary: input.summary,
            body: input.body,
            image_url: input.image_url,
            published: input.published,
            created_at: ts,
            updated_at: ts,
        };
        tables.case_studies.insert(id, record.clone());
        Ok(record)
    }

    async fn get_case_study(&self, id: i64) -> Result<Option<CaseStudy>> {
        Ok(self.tables.read().await.case_studies.get(&id).cloned())
    }

    async fn find_case_study_by_slug(&self, slug: &str) -> Result<Option<CaseStudy>> {
        let tables = self.tables.read().await;
        Ok(tables
            .case_studies
            .values()
            .find(|c| c.slug == slug)
            .cloned())
    }

    async fn list_case_studies(&self, published_only: bool) -> Result<Vec<CaseStudy>> {
        let tables = self.tables.read().await;
        Ok(newest_first(
            tables
                .case_studies
                .values()
                .filter(|c| c.published || !published_only)
                .cloned(),
        ))
    }

    async fn update_case_study(&self, id: i64, input: CaseStudyInput) -> Result<CaseStudy> {
        let mut tables = self.tables.write().await;
        if tables
            .case_studies
            .values()
            .any(|c| c.id != id && c.slug == input.slug)
        {
            return Err(StorageError::Conflict(format!("slug {} already exists", input.slug)));
        }
        let study = tables.case_studies.get_mut(&id).ok_or(StorageError::NotFound)?;
        study.title = input.title;
        study.slug = input.slug;
        study.summary = input.summary;
        study.body = input.body;
        study.image_url = input.image_url;
        study.published = input.published;
        study.updated_at = now();
        Ok(study.clone())
    }

    async fn delete_case_study(&self, id: i64) -> Result<()> {
        let mut tables = self.tables.write().await;
        tables
            .case_studies
            .remove(&id)
            .map(|_| ())
            .ok_or(StorageError::NotFound)
    }

    async fn create_water_project(&self, input: WaterProjectInput) -> Result<WaterProject> {
        let mut tables = self.tables.write().await;
        let id = tables.next_id();
        let ts = now();
        let record = WaterProject {
            id,
            name: input.name,
            location: input.location,
            description: input.description,
            liters_provided: input.liters_provided,
            families_helped: input.families_helped,
            status: input.status,
            image_url: input.image_url,
            created_at: ts,
            updated_at: ts,
        };
        tables.water_projects.insert(id, record.clone());
        Ok(record)
    }

    async fn get_water_project(&self, id: i64) -> Result<Option<WaterProject>> {
        Ok(self.tables.read().await.water_projects.get(&id).cloned())
    }

    async fn list_water_projects(&self) -> Result<Vec<WaterProject>> {
        let tables = self.tables.read().await;
        Ok(newest_first(tables.water_projects.values().cloned()))
    }

    async fn update_water_project(
        &self,
        id: i64,
        input: WaterProjectInput,
    ) -> Result<WaterProject> {
        let mut tables = self.tables.write().await;
        let project = tables
            .water_projects
            .get_mut(&id)
            .ok_or(StorageError::NotFound)?;
        project.name = input.name;
        project.location = input.location;
        project.description = input.description;
        project.liters_provided = input.liters_provided;
        project.families_helped = input.families_helped;
        project.status = input.status;
        project.image_url = input.image_url;
        project.updated_at = now();
        Ok(project.clone())
    }

    async fn delete_water_project(&self, id: i64) -> Result<()> {
        let mut tables = self.tables.write().await;
        tables
            .water_projects
            .remove(&id)
            .map(|_| ())
            .ok_or(StorageError::NotFound)
    }
}
