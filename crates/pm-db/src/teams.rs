//! Team repository

use async_trait::async_trait;
use pm_core::Id;
use pm_models::Team;
use sqlx::PgPool;

use crate::repository::{Repository, RepositoryError, RepositoryResult};

#[derive(Debug, Clone)]
pub struct CreateTeamDto {
    pub name: String,
    pub description: Option<String>,
    pub manager_id: Option<Id>,
    pub members: Vec<Id>,
    pub organization_id: Id,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateTeamDto {
    pub name: Option<String>,
    pub description: Option<String>,
    pub manager_id: Option<Id>,
    pub members: Option<Vec<Id>>,
}

#[derive(Clone)]
pub struct TeamRepository {
    pool: PgPool,
}

impl TeamRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_for_organization(&self, organization_id: Id) -> RepositoryResult<Vec<Team>> {
        let rows = sqlx::query_as::<_, Team>(
            "SELECT * FROM teams WHERE organization_id = $1 ORDER BY name ASC",
        )
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn find_in_organization(
        &self,
        id: Id,
        organization_id: Id,
    ) -> RepositoryResult<Option<Team>> {
        let row = sqlx::query_as::<_, Team>(
            "SELECT * FROM teams WHERE id = $1 AND organization_id = $2",
        )
        .bind(id)
        .bind(organization_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }
}

#[async_trait]
impl Repository<Team, CreateTeamDto, UpdateTeamDto> for TeamRepository {
    async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<Team>> {
        let row = sqlx::query_as::<_, Team>("SELECT * FROM teams WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    async fn create(&self, dto: CreateTeamDto) -> RepositoryResult<Team> {
        let row = sqlx::query_as::<_, Team>(
            r#"
            INSERT INTO teams (id, name, description, manager_id, members, organization_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(Id::new_v4())
        .bind(&dto.name)
        .bind(&dto.description)
        .bind(dto.manager_id)
        .bind(&dto.members)
        .bind(dto.organization_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn update(&self, id: Id, dto: UpdateTeamDto) -> RepositoryResult<Team> {
        sqlx::query_as::<_, Team>(
            r#"
            UPDATE teams SET
                name = COALESCE($1, name),
                description = COALESCE($2, description),
                manager_id = COALESCE($3, manager_id),
                members = COALESCE($4, members),
                updated_at = NOW()
            WHERE id = $5
            RETURNING *
            "#,
        )
        .bind(&dto.name)
        .bind(&dto.description)
        .bind(dto.manager_id)
        .bind(&dto.members)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepositoryError::NotFound("Team"))
    }

    async fn delete(&self, id: Id) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM teams WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound("Team"));
        }

        Ok(())
    }
}
