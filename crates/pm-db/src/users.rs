//! User repository
//!
//! Database operations for users.

use chrono::{DateTime, Utc};
use pm_core::Id;
use pm_models::{Designation, NewUser, Role, User, UserSummary};
use sqlx::{PgConnection, PgPool};

use crate::repository::{RepositoryError, RepositoryResult};

/// DTO for profile edits; `None` leaves the column unchanged
#[derive(Debug, Clone, Default)]
pub struct UpdateProfileDto {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    pub avatar_url: Option<String>,
}

/// Insert a user inside an open transaction.
pub(crate) async fn insert_user(
    conn: &mut PgConnection,
    new: &NewUser,
    password_hash: &str,
    organization_id: Id,
) -> RepositoryResult<User> {
    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (
            id, username, email, first_name, last_name, role, password_hash,
            organization_id, department, designation, phone_number
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        RETURNING *
        "#,
    )
    .bind(Id::new_v4())
    .bind(&new.username)
    .bind(new.email.to_lowercase())
    .bind(&new.first_name)
    .bind(&new.last_name)
    .bind(new.role)
    .bind(password_hash)
    .bind(organization_id)
    .bind(&new.department)
    .bind(new.designation)
    .bind(&new.phone_number)
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| RepositoryError::from(e).on_unique_violation("User already exists"))?;

    Ok(user)
}

/// Insert the empty activity tracker every user owns.
pub(crate) async fn insert_tracker(
    conn: &mut PgConnection,
    user_id: Id,
    organization_id: Id,
) -> RepositoryResult<()> {
    sqlx::query(
        r#"
        INSERT INTO trackers (id, user_id, organization_id)
        VALUES ($1, $2, $3)
        ON CONFLICT (user_id) DO NOTHING
        "#,
    )
    .bind(Id::new_v4())
    .bind(user_id)
    .bind(organization_id)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// User repository implementation
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a user together with their tracker
    pub async fn create_with_tracker(
        &self,
        new: &NewUser,
        password_hash: &str,
        organization_id: Id,
    ) -> RepositoryResult<User> {
        let mut tx = self.pool.begin().await?;
        let user = insert_user(&mut tx, new, password_hash, organization_id).await?;
        insert_tracker(&mut tx, user.id, organization_id).await?;
        tx.commit().await?;

        Ok(user)
    }

    pub async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// Find a user of an organization by id
    pub async fn find_in_organization(
        &self,
        id: Id,
        organization_id: Id,
    ) -> RepositoryResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE id = $1 AND organization_id = $2",
        )
        .bind(id)
        .bind(organization_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Find a user by email (case-insensitive)
    pub async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email.trim().to_lowercase())
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    pub async fn find_by_email_in_organization(
        &self,
        email: &str,
        organization_id: Id,
    ) -> RepositoryResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE email = $1 AND organization_id = $2",
        )
        .bind(email.trim().to_lowercase())
        .bind(organization_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    pub async fn find_by_phone(&self, phone_number: &str) -> RepositoryResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE phone_number = $1 ORDER BY created_at LIMIT 1",
        )
        .bind(phone_number.trim())
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Check if an email is already registered anywhere
    pub async fn email_exists(&self, email: &str) -> RepositoryResult<bool> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
                .bind(email.trim().to_lowercase())
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    /// All users of an organization sorted by first name
    pub async fn list_by_organization(&self, organization_id: Id) -> RepositoryResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT * FROM users
            WHERE organization_id = $1
            ORDER BY first_name ASC, last_name ASC
            "#,
        )
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    /// The earliest registered admin of an organization
    pub async fn find_admin_in_organization(
        &self,
        organization_id: Id,
    ) -> RepositoryResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT * FROM users
            WHERE organization_id = $1 AND role = $2
            ORDER BY created_at ASC
            LIMIT 1
            "#,
        )
        .bind(organization_id)
        .bind(Role::Admin)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    pub async fn count_managers(&self, organization_id: Id) -> RepositoryResult<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM users WHERE organization_id = $1 AND designation = $2",
        )
        .bind(organization_id)
        .bind(Designation::Manager)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    /// Compact projections of the given users of one organization, in no
    /// particular order. Ids from other organizations are skipped.
    pub async fn find_summaries(
        &self,
        ids: &[Id],
        organization_id: Id,
    ) -> RepositoryResult<Vec<UserSummary>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, UserSummary>(
            r#"
            SELECT id, first_name, last_name, email, role, designation
            FROM users
            WHERE id = ANY($1) AND organization_id = $2
            "#,
        )
        .bind(ids)
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// The subset of `ids` that are not users of the organization
    pub async fn outside_organization(
        &self,
        ids: &[Id],
        organization_id: Id,
    ) -> RepositoryResult<Vec<Id>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_scalar::<_, Id>(
            r#"
            SELECT requested.id
            FROM UNNEST($1::uuid[]) AS requested(id)
            WHERE NOT EXISTS (
                SELECT 1 FROM users
                WHERE users.id = requested.id AND users.organization_id = $2
            )
            "#,
        )
        .bind(ids)
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Change designation and the role that follows from it
    pub async fn update_designation(
        &self,
        id: Id,
        designation: Designation,
        role: Role,
    ) -> RepositoryResult<User> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET designation = $1, role = $2, updated_at = NOW()
            WHERE id = $3
            RETURNING *
            "#,
        )
        .bind(designation)
        .bind(role)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepositoryError::NotFound("User"))
    }

    pub async fn update_last_login(&self, id: Id, at: DateTime<Utc>) -> RepositoryResult<()> {
        sqlx::query("UPDATE users SET last_login_at = $1, updated_at = NOW() WHERE id = $2")
            .bind(at)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Store a pending password-reset code
    pub async fn set_reset_otp(
        &self,
        id: Id,
        otp: &str,
        expires_at: DateTime<Utc>,
    ) -> RepositoryResult<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET reset_password_otp = $1, reset_password_expires = $2, updated_at = NOW()
            WHERE id = $3
            "#,
        )
        .bind(otp)
        .bind(expires_at)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Replace the password hash and clear any pending reset code
    pub async fn reset_password(&self, id: Id, password_hash: &str) -> RepositoryResult<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET password_hash = $1, reset_password_otp = NULL,
                reset_password_expires = NULL, updated_at = NOW()
            WHERE id = $2
            "#,
        )
        .bind(password_hash)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn update_profile(&self, id: Id, dto: UpdateProfileDto) -> RepositoryResult<User> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET
                first_name = COALESCE($1, first_name),
                last_name = COALESCE($2, last_name),
                phone_number = COALESCE($3, phone_number),
                avatar_url = COALESCE($4, avatar_url),
                updated_at = NOW()
            WHERE id = $5
            RETURNING *
            "#,
        )
        .bind(&dto.first_name)
        .bind(&dto.last_name)
        .bind(&dto.phone_number)
        .bind(&dto.avatar_url)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepositoryError::NotFound("User"))
    }

    pub async fn set_on_leave(&self, id: Id, on_leave: bool) -> RepositoryResult<()> {
        sqlx::query("UPDATE users SET is_currently_on_leave = $1, updated_at = NOW() WHERE id = $2")
            .bind(on_leave)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support;

    #[sqlx::test]
    async fn test_summaries_are_organization_scoped(pool: PgPool) {
        let acme = test_support::organization(&pool, "acme").await;
        let rival = test_support::organization(&pool, "rival").await;
        let repo = UserRepository::new(pool);

        let summaries = repo
            .find_summaries(&[acme.id, rival.id], acme.organization_id)
            .await
            .unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].id, acme.id);
    }

    #[sqlx::test]
    async fn test_outside_organization(pool: PgPool) {
        let acme = test_support::organization(&pool, "acme").await;
        let rival = test_support::organization(&pool, "rival").await;
        let dev = test_support::employee(&pool, acme.organization_id, "Dev", Designation::Developer).await;
        let repo = UserRepository::new(pool);
        let ghost = Id::new_v4();

        let mut outside = repo
            .outside_organization(&[acme.id, dev.id, rival.id, ghost], acme.organization_id)
            .await
            .unwrap();
        outside.sort_unstable();
        let mut expected = vec![rival.id, ghost];
        expected.sort_unstable();
        assert_eq!(outside, expected);

        assert!(repo
            .outside_organization(&[acme.id, dev.id], acme.organization_id)
            .await
            .unwrap()
            .is_empty());
    }
}
