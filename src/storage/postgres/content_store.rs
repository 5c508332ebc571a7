//! PostgreSQL ContentStore implementation.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::Row;

use super::{expect_affected, get_enum, PostgresStorage};
use crate::models::{CaseStudy, CaseStudyInput, WaterProject, WaterProjectInput};
use crate::storage::helpers::now;
use crate::storage::{ContentStore, Result, StorageError};

fn case_study_from_row(row: &PgRow) -> Result<CaseStudy> {
    Ok(CaseStudy {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        slug: row.try_get("slug")?,
        summary: row.try_get("summary")?,
        body: row.try_get("body")?,
        image_url: row.try_get("image_url")?,
        published: row.try_get("published")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn water_project_from_row(row: &PgRow) -> Result<WaterProject> {
    Ok(WaterProject {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        location: row.try_get("location")?,
        description: row.try_get("description")?,
        liters_provided: row.try_get("liters_provided")?,
        families_helped: row.try_get("families_helped")?,
        status: get_enum(row, "status")?,
        image_url: row.try_get("image_url")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl ContentStore for PostgresStorage {
    async fn create_case_study(&self, input: CaseStudyInput) -> Result<CaseStudy> {
        let row = sqlx::query(
            "INSERT INTO case_studies
                (title, slug, summary, body, image_url, published, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
             RETURNING *",
        )
        .bind(&input.title)
        .bind(&input.slug)
        .bind(&input.summary)
        .bind(&input.body)
        .bind(&input.image_url)
        .bind(input.published)
        .bind(now())
        .fetch_one(&self.pool)
        .await?;
        case_study_from_row(&row)
    }

    async fn get_case_study(&self, id: i64) -> Result<Option<CaseStudy>> {
        let row = sqlx::query("SELECT * FROM case_studies WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(case_study_from_row).transpose()
    }

    async fn find_case_study_by_slug(&self, slug: &str) -> Result<Option<CaseStudy>> {
        let row = sqlx::query("SELECT * FROM case_studies WHERE slug = $1")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(case_study_from_row).transpose()
    }

    async fn list_case_studies(&self, published_only: bool) -> Result<Vec<CaseStudy>> {
        let rows = sqlx::query(
            "SELECT * FROM case_studies WHERE published OR NOT $1 ORDER BY id DESC",
        )
        .bind(published_only)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(case_study_from_row).collect()
    }

    async fn update_case_study(&self, id: i64, input: CaseStudyInput) -> Result<CaseStudy> {
        let row = sqlx::query(
            "UPDATE case_studies SET
                title = $2, slug = $3, summary = $4, body = $5, image_url = $6,
                published = $7, updated_at = $8
             WHERE id = $1
             RETURNING *",
        )
        .bind(id)
        .bind(&input.title)
        .bind(&input.slug)
        .bind(&input.summary)
        .bind(&input.body)
        .bind(&input.image_url)
        .bind(input.published)
        .bind(now())
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StorageError::NotFound)?;
        case_study_from_row(&row)
    }

    async fn delete_case_study(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM case_studies WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        expect_affected(result)
    }

    async fn create_water_project(&self, input: WaterProjectInput) -> Result<WaterProject> {
        let row = sqlx::query(
            "INSERT INTO water_projects
                (name, location, description, liters_provided, families_helped, status,
                 image_url, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
             RETURNING *",
        )
        .bind(&input.name)
        .bind(&input.location)
        .bind(&input.description)
        .bind(input.liters_provided)
        .bind(input.families_helped)
        .bind(input.status.as_str())
        .bind(&input.image_url)
        .bind(now())
        .fetch_one(&self.pool)
        .await?;
        water_project_from_row(&row)
    }

    async fn get_water_project(&self, id: i64) -> Result<Option<WaterProject>> {
        let row = sqlx::query("SELECT * FROM water_projects WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(water_project_from_row).transpose()
    }

    async fn list_water_projects(&self) -> Result<Vec<WaterProject>> {
        let rows = sqlx::query("SELECT * FROM water_projects ORDER BY id DESC")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(water_project_from_row).collect()
    }

    async fn update_water_project(
        &self,
        id: i64,
        input: WaterProjectInput,
    ) -> Result<WaterProject> {
        let row = sqlx::query(
            "UPDATE water_projects SET
                name = $2, location = $3, description = $4, liters_provided = $5,
                families_helped = $6, status = $7, image_url = $8, updated_at = $9
             WHERE id = $1
             RETURNING *",
        )
        .bind(id)
        .bind(&input.name)
        .bind(&input.location)
        .bind(&input.description)
        .bind(input.liters_provided)
        .bind(input.families_helped)
        .bind(input.status.as_str())
        .bind(&input.image_url)
        .bind(now())
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StorageError::NotFound)?;
        water_project_from_row(&row)
    }

    async fn delete_water_project(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM water_projects WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        expect_affected(result)
    }
}
