//! Organization repository

use pm_core::Id;
use pm_models::{Industry, NewUser, Organization, OrganizationSummary, User};
use sqlx::PgPool;

use crate::repository::{RepositoryError, RepositoryResult};
use crate::users::{insert_tracker, insert_user};

#[derive(Clone)]
pub struct OrganizationRepository {
    pool: PgPool,
}

impl OrganizationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create an organization, its admin user and the admin's tracker in one
    /// transaction.
    pub async fn create_with_admin(
        &self,
        name: &str,
        industry: Industry,
        admin: &NewUser,
        password_hash: &str,
    ) -> RepositoryResult<(Organization, User)> {
        let mut tx = self.pool.begin().await?;

        let organization_id = Id::new_v4();
        sqlx::query("INSERT INTO organizations (id, name, industry) VALUES ($1, $2, $3)")
            .bind(organization_id)
            .bind(name)
            .bind(industry)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                RepositoryError::from(e).on_unique_violation("Organization name already exists")
            })?;

        let user = insert_user(&mut tx, admin, password_hash, organization_id).await?;

        let organization = sqlx::query_as::<_, Organization>(
            r#"
            UPDATE organizations SET admin_id = $1, updated_at = NOW()
            WHERE id = $2
            RETURNING *
            "#,
        )
        .bind(user.id)
        .bind(organization_id)
        .fetch_one(&mut *tx)
        .await?;

        insert_tracker(&mut tx, user.id, organization_id).await?;
        tx.commit().await?;

        tracing::info!(organization_id = %organization.id, "Organization created");
        Ok((organization, user))
    }

    pub async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<Organization>> {
        let row = sqlx::query_as::<_, Organization>("SELECT * FROM organizations WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    pub async fn find_by_name(&self, name: &str) -> RepositoryResult<Option<Organization>> {
        let row = sqlx::query_as::<_, Organization>("SELECT * FROM organizations WHERE name = $1")
            .bind(name.trim())
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    pub async fn name_exists(&self, name: &str) -> RepositoryResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM organizations WHERE name = $1)",
        )
        .bind(name.trim())
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    /// Public directory shown on the login screen
    pub async fn list_public(&self, limit: i64) -> RepositoryResult<Vec<OrganizationSummary>> {
        let rows = sqlx::query_as::<_, OrganizationSummary>(
            r#"
            SELECT id, name, industry
            FROM organizations
            ORDER BY name ASC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
