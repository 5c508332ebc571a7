//! SQLite ContentStore implementation.

use async_trait::async_trait;
use sea_query::{Asterisk, Expr, Order, Query, SqliteQueryBuilder};
use sea_query_binder::SqlxBinder;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use super::{get_enum, get_ts, SqliteStorage};
use crate::models::{CaseStudy, CaseStudyInput, WaterProject, WaterProjectInput};
use crate::storage::helpers::{now, ts_to_text};
use crate::storage::schema::{CaseStudies, WaterProjects};
use crate::storage::{ContentStore, Result, StorageError};

fn case_study_from_row(row: &SqliteRow) -> Result<CaseStudy> {
    Ok(CaseStudy {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        slug: row.try_get("slug")?,
        summary: row.try_get("summary")?,
        body: row.try_get("body")?,
        image_url: row.try_get("image_url")?,
        published: row.try_get("published")?,
        created_at: get_ts(row, "created_at")?,
        updated_at: get_ts(row, "updated_at")?,
    })
}

fn water_project_from_row(row: &SqliteRow) -> Result<WaterProject> {
    Ok(WaterProject {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        location: row.try_get("location")?,
        description: row.try_get("description")?,
        liters_provided: row.try_get("liters_provided")?,
        families_helped: row.try_get("families_helped")?,
        status: get_enum(row, "status")?,
        image_url: row.try_get("image_url")?,
        created_at: get_ts(row, "created_at")?,
        updated_at: get_ts(row, "updated_at")?,
    })
}

#[async_trait]
impl ContentStore for SqliteStorage {
    async fn create_case_study(&self, input: CaseStudyInput) -> Result<CaseStudy> {
        let ts = ts_to_text(&now());
        let (sql, values) = Query::insert()
            .into_table(CaseStudies::Table)
            .columns([
                CaseStudies::Title,
                CaseStudies::Slug,
                CaseStudies::Summary,
                CaseStudies::Body,
                CaseStudies::ImageUrl,
                CaseStudies::Published,
                CaseStudies::CreatedAt,
                CaseStudies::UpdatedAt,
            ])
            .values([
                input.title.into(),
                input.slug.into(),
                input.summary.into(),
                input.body.into(),
                input.image_url.into(),
                input.published.into(),
                ts.clone().into(),
                ts.into(),
            ])?
            .returning_all()
            .build_sqlx(SqliteQueryBuilder);

        let row = sqlx::query_with(&sql, values).fetch_one(&self.pool).await?;
        case_study_from_row(&row)
    }

    async fn get_case_study(&self, id: i64) -> Result<Option<CaseStudy>> {
        let (sql, values) = Query::select()
            .column(Asterisk)
            .from(CaseStudies::Table)
            .and_where(Expr::col(CaseStudies::Id).eq(id))
            .build_sqlx(SqliteQueryBuilder);

        let row = sqlx::query_with(&sql, values)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(case_study_from_row).transpose()
    }

    async fn find_case_study_by_slug(&self, slug: &str) -> Result<Option<CaseStudy>> {
        let (sql, values) = Query::select()
            .column(Asterisk)
            .from(CaseStudies::Table)
            .and_where(Expr::col(CaseStudies::Slug).eq(slug))
            .build_sqlx(SqliteQueryBuilder);

        let row = sqlx::query_with(&sql, values)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(case_study_from_row).transpose()
    }

    async fn list_case_studies(&self, published_only: bool) -> Result<Vec<CaseStudy>> {
        let mut query = Query::select();
        query.column(Asterisk).from(CaseStudies::Table);
        if published_only {
            query.and_where(Expr::col(CaseStudies::Published).eq(true));
        }
        let (sql, values) = query
            .order_by(CaseStudies::Id, Order::Desc)
            .build_sqlx(SqliteQueryBuilder);

        let rows = sqlx::query_with(&sql, values).fetch_all(&self.pool).await?;
        rows.iter().map(case_study_from_row).collect()
    }

    async fn update_case_study(&self, id: i64, input: CaseStudyInput) -> Result<CaseStudy> {
        let (sql, values) = Query::update()
            .table(CaseStudies::Table)
            .values([
                (CaseStudies::Title, input.title.into()),
                (CaseStudies::Slug, input.slug.into()),
                (CaseStudies::Summary, input.summary.into()),
                (CaseStudies::Body, input.body.into()),
                (CaseStudies::ImageUrl, input.image_url.into()),
                (CaseStudies::Published, input.published.into()),
                (CaseStudies::UpdatedAt, ts_to_text(&now()).into()),
            ])
            .and_where(Expr::col(CaseStudies::Id).eq(id))
            .returning_all()
            .build_sqlx(SqliteQueryBuilder);

        let row = sqlx::query_with(&sql, values)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StorageError::NotFound)?;
        case_study_from_row(&row)
    }

    async fn delete_case_study(&self, id: i64) -> Result<()> {
        let (sql, values) = Query::delete()
            .from_table(CaseStudies::Table)
            .and_where(Expr::col(CaseStudies::Id).eq(id))
            .build_sqlx(SqliteQueryBuilder);

        let result = sqlx::query_with(&sql, values).execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }

    async fn create_water_project(&self, input: WaterProjectInput) -> Result<WaterProject> {
        let ts = ts_to_text(&now());
        let (sql, values) = Query::insert()
            .into_table(WaterProjects::Table)
            .columns([
                WaterProjects::Name,
                WaterProjects::Location,
                WaterProjects::Description,
                WaterProjects::LitersProvided,
                WaterProjects::FamiliesHelped,
                WaterProjects::Status,
                WaterProjects::ImageUrl,
                WaterProjects::CreatedAt,
                WaterProjects::UpdatedAt,
            ])
            .values([
                input.name.into(),
                input.location.into(),
                input.description.into(),
                input.liters_provided.into(),
                input.families_helped.into(),
                input.status.as_str().into(),
                input.image_url.into(),
                ts.clone().into(),
                ts.into(),
            ])?
            .returning_all()
            .build_sqlx(SqliteQueryBuilder);

        let row = sqlx::query_with(&sql, values).fetch_one(&self.pool).await?;
        water_project_from_row(&row)
    }

    async fn get_water_project(&self, id: i64) -> Result<Option<WaterProject>> {
        let (sql, values) = Query::select()
            .column(Asterisk)
            .from(WaterProjects::Table)
            .and_where(Expr::col(WaterProjects::Id).eq(id))
            .build_sqlx(SqliteQueryBuilder);

        let row = sqlx::query_with(&sql, values)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(water_project_from_row).transpose()
    }

    async fn list_water_projects(&self) -> Result<Vec<WaterProject>> {
        let (sql, values) = Query::select()
            .column(Asterisk)
            .from(WaterProjects::Table)
            .order_by(WaterProjects::Id, Order::Desc)
            .build_sqlx(SqliteQueryBuilder);

        let rows = sqlx::query_with(&sql, values).fetch_all(&self.pool).await?;
        rows.iter().map(water_project_from_row).collect()
    }

    async fn update_water_project(
        &self,
        id: i64,
        input: WaterProjectInput,
    ) -> Result<WaterProject> {
        let (sql, values) = Query::update()
            .table(WaterProjects::Table)
            .values([
                (WaterProjects::Name, input.name.into()),
                (WaterProjects::Location, input.location.into()),
                (WaterProjects::Description, input.description.into()),
                (WaterProjects::LitersProvided, input.liters_provided.into()),
                (WaterProjects::FamiliesHelped, input.families_helped.into()),
                (WaterProjects::Status, input.status.as_str().into()),
                (WaterProjects::ImageUrl, input.image_url.into()),
                (WaterProjects::UpdatedAt, ts_to_text(&now()).into()),
            ])
            .and_where(Expr::col(WaterProjects::Id).eq(id))
            .returning_all()
            .build_sqlx(SqliteQueryBuilder);

        let row = sqlx::query_with(&sql, values)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StorageError::NotFound)?;
        water_project_from_row(&row)
    }

    async fn delete_water_project(&self, id: i64) -> Result<()> {
        let (sql, values) = Query::delete()
            .from_table(WaterProjects::Table)
            .and_where(Expr::col(WaterProjects::Id).eq(id))
            .build_sqlx(SqliteQueryBuilder);

        let result = sqlx::query_with(&sql, values).execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }
}
