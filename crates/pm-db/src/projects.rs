//! Project repository
//!
//! Database operations for projects.

use async_trait::async_trait;
use chrono::NaiveDate;
use pm_core::Id;
use pm_models::{Methodology, Priority, Project, ProjectStatus};
use sqlx::PgPool;

use crate::repository::{Repository, RepositoryError, RepositoryResult};

/// DTO for creating a project
#[derive(Debug, Clone)]
pub struct CreateProjectDto {
    pub title: String,
    pub description: Option<String>,
    pub client_name: Option<String>,
    pub repository_url: Option<String>,
    pub status: ProjectStatus,
    pub priority: Priority,
    pub technology_stack: Vec<String>,
    pub methodology: Methodology,
    pub requirements: Option<String>,
    pub project_owner: Id,
    pub assigned_employees: Vec<Id>,
    pub organization_id: Id,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub progress: i32,
}

/// DTO for updating a project
#[derive(Debug, Clone, Default)]
pub struct UpdateProjectDto {
    pub title: Option<String>,
    pub description: Option<String>,
    pub client_name: Option<String>,
    pub repository_url: Option<String>,
    pub status: Option<ProjectStatus>,
    pub priority: Option<Priority>,
    pub technology_stack: Option<Vec<String>>,
    pub methodology: Option<Methodology>,
    pub requirements: Option<String>,
    pub project_owner: Option<Id>,
    pub assigned_employees: Option<Vec<Id>>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub actual_end_date: Option<NaiveDate>,
    pub progress: Option<i32>,
}

/// Project counts for a member or a whole organization
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, sqlx::FromRow)]
pub struct ProjectCounts {
    pub total: i64,
    pub completed: i64,
}

/// Project repository implementation
#[derive(Clone)]
pub struct ProjectRepository {
    pool: PgPool,
}

impl ProjectRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a project scoped to an organization
    pub async fn find_in_organization(
        &self,
        id: Id,
        organization_id: Id,
    ) -> RepositoryResult<Option<Project>> {
        let row = sqlx::query_as::<_, Project>(
            "SELECT * FROM projects WHERE id = $1 AND organization_id = $2",
        )
        .bind(id)
        .bind(organization_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// Projects of an organization, newest first.
    ///
    /// With `member` set, only projects that user owns or is assigned to.
    pub async fn list_visible(
        &self,
        organization_id: Id,
        member: Option<Id>,
    ) -> RepositoryResult<Vec<Project>> {
        let rows = sqlx::query_as::<_, Project>(
            r#"
            SELECT * FROM projects
            WHERE organization_id = $1
              AND ($2::uuid IS NULL OR project_owner = $2 OR $2 = ANY(assigned_employees))
            ORDER BY created_at DESC
            "#,
        )
        .bind(organization_id)
        .bind(member)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn find_by_title(
        &self,
        organization_id: Id,
        title: &str,
    ) -> RepositoryResult<Option<Project>> {
        let row = sqlx::query_as::<_, Project>(
            r#"
            SELECT * FROM projects
            WHERE organization_id = $1 AND title = $2
            ORDER BY created_at ASC
            LIMIT 1
            "#,
        )
        .bind(organization_id)
        .bind(title)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// Replace the assignee list
    pub async fn set_assigned_employees(
        &self,
        id: Id,
        employee_ids: &[Id],
    ) -> RepositoryResult<Project> {
        sqlx::query_as::<_, Project>(
            r#"
            UPDATE projects SET assigned_employees = $1, updated_at = NOW()
            WHERE id = $2
            RETURNING *
            "#,
        )
        .bind(employee_ids)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepositoryError::NotFound("Project"))
    }

    /// Total and completed projects, optionally restricted to those a user
    /// owns or is assigned to.
    pub async fn counts(
        &self,
        organization_id: Id,
        member: Option<Id>,
    ) -> RepositoryResult<ProjectCounts> {
        let counts = sqlx::query_as::<_, ProjectCounts>(
            r#"
            SELECT COUNT(*) AS total,
                   COUNT(*) FILTER (WHERE status = 'completed') AS completed
            FROM projects
            WHERE organization_id = $1
              AND ($2::uuid IS NULL OR project_owner = $2 OR $2 = ANY(assigned_employees))
            "#,
        )
        .bind(organization_id)
        .bind(member)
        .fetch_one(&self.pool)
        .await?;

        Ok(counts)
    }
}

#[async_trait]
impl Repository<Project, CreateProjectDto, UpdateProjectDto> for ProjectRepository {
    async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<Project>> {
        let row = sqlx::query_as::<_, Project>("SELECT * FROM projects WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    async fn create(&self, dto: CreateProjectDto) -> RepositoryResult<Project> {
        let row = sqlx::query_as::<_, Project>(
            r#"
            INSERT INTO projects (
                id, title, description, client_name, repository_url, status, priority,
                technology_stack, methodology, requirements, project_owner,
                assigned_employees, organization_id, start_date, end_date, progress
            ) VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16
            )
            RETURNING *
            "#,
        )
        .bind(Id::new_v4())
        .bind(&dto.title)
        .bind(&dto.description)
        .bind(&dto.client_name)
        .bind(&dto.repository_url)
        .bind(dto.status)
        .bind(dto.priority)
        .bind(&dto.technology_stack)
        .bind(dto.methodology)
        .bind(&dto.requirements)
        .bind(dto.project_owner)
        .bind(&dto.assigned_employees)
        .bind(dto.organization_id)
        .bind(dto.start_date)
        .bind(dto.end_date)
        .bind(dto.progress)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn update(&self, id: Id, dto: UpdateProjectDto) -> RepositoryResult<Project> {
        sqlx::query_as::<_, Project>(
            r#"
            UPDATE projects SET
                title = COALESCE($1, title),
                description = COALESCE($2, description),
                client_name = COALESCE($3, client_name),
                repository_url = COALESCE($4, repository_url),
                status = COALESCE($5, status),
                priority = COALESCE($6, priority),
                technology_stack = COALESCE($7, technology_stack),
                methodology = COALESCE($8, methodology),
                requirements = COALESCE($9, requirements),
                project_owner = COALESCE($10, project_owner),
                assigned_employees = COALESCE($11, assigned_employees),
                start_date = COALESCE($12, start_date),
                end_date = COALESCE($13, end_date),
                actual_end_date = COALESCE($14, actual_end_date),
                progress = COALESCE($15, progress),
                updated_at = NOW()
            WHERE id = $16
            RETURNING *
            "#,
        )
        .bind(&dto.title)
        .bind(&dto.description)
        .bind(&dto.client_name)
        .bind(&dto.repository_url)
        .bind(dto.status)
        .bind(dto.priority)
        .bind(&dto.technology_stack)
        .bind(dto.methodology)
        .bind(&dto.requirements)
        .bind(dto.project_owner)
        .bind(&dto.assigned_employees)
        .bind(dto.start_date)
        .bind(dto.end_date)
        .bind(dto.actual_end_date)
        .bind(dto.progress)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepositoryError::NotFound("Project"))
    }

    /// Tasks go with the project (ON DELETE CASCADE).
    async fn delete(&self, id: Id) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound("Project"));
        }

        Ok(())
    }
}
