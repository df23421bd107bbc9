//! Leave repository

use chrono::{DateTime, NaiveDate, Utc};
use pm_core::Id;
use pm_models::{Leave, LeaveStatus, LeaveType};
use sqlx::PgPool;

use crate::repository::{RepositoryError, RepositoryResult};

/// DTO for a new leave request
#[derive(Debug, Clone)]
pub struct CreateLeaveDto {
    pub user_id: Id,
    pub organization_id: Id,
    pub leave_type: LeaveType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: Option<String>,
    pub number_of_days: f64,
}

#[derive(Clone)]
pub struct LeaveRepository {
    pool: PgPool,
}

impl LeaveRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, dto: CreateLeaveDto) -> RepositoryResult<Leave> {
        let row = sqlx::query_as::<_, Leave>(
            r#"
            INSERT INTO leaves (
                id, user_id, organization_id, leave_type, start_date, end_date,
                reason, number_of_days, status
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(Id::new_v4())
        .bind(dto.user_id)
        .bind(dto.organization_id)
        .bind(dto.leave_type)
        .bind(dto.start_date)
        .bind(dto.end_date)
        .bind(&dto.reason)
        .bind(dto.number_of_days)
        .bind(LeaveStatus::Pending)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn find_in_organization(
        &self,
        id: Id,
        organization_id: Id,
    ) -> RepositoryResult<Option<Leave>> {
        let row = sqlx::query_as::<_, Leave>(
            "SELECT * FROM leaves WHERE id = $1 AND organization_id = $2",
        )
        .bind(id)
        .bind(organization_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// A user's leaves, newest first, optionally of one status
    pub async fn list_for_user(
        &self,
        user_id: Id,
        organization_id: Id,
        status: Option<LeaveStatus>,
    ) -> RepositoryResult<Vec<Leave>> {
        let rows = sqlx::query_as::<_, Leave>(
            r#"
            SELECT * FROM leaves
            WHERE user_id = $1 AND organization_id = $2
              AND ($3::text IS NULL OR status = $3)
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .bind(organization_id)
        .bind(status)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Every leave of an organization, newest first
    pub async fn list_for_organization(&self, organization_id: Id) -> RepositoryResult<Vec<Leave>> {
        let rows = sqlx::query_as::<_, Leave>(
            "SELECT * FROM leaves WHERE organization_id = $1 ORDER BY created_at DESC",
        )
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Pending requests, oldest first
    pub async fn list_pending(&self, organization_id: Id) -> RepositoryResult<Vec<Leave>> {
        let rows = sqlx::query_as::<_, Leave>(
            r#"
            SELECT * FROM leaves
            WHERE organization_id = $1 AND status = $2
            ORDER BY created_at ASC
            "#,
        )
        .bind(organization_id)
        .bind(LeaveStatus::Pending)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Approved leaves intersecting `[first, last]`, by start date
    pub async fn list_approved_overlapping(
        &self,
        organization_id: Id,
        first: NaiveDate,
        last: NaiveDate,
    ) -> RepositoryResult<Vec<Leave>> {
        let rows = sqlx::query_as::<_, Leave>(
            r#"
            SELECT * FROM leaves
            WHERE organization_id = $1 AND status = $2
              AND start_date <= $4 AND end_date >= $3
            ORDER BY start_date ASC
            "#,
        )
        .bind(organization_id)
        .bind(LeaveStatus::Approved)
        .bind(first)
        .bind(last)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Move a pending leave to approved
    pub async fn approve(
        &self,
        id: Id,
        approved_by: Id,
        at: DateTime<Utc>,
    ) -> RepositoryResult<Leave> {
        sqlx::query_as::<_, Leave>(
            r#"
            UPDATE leaves
            SET status = $1, approved_by = $2, approval_date = $3, updated_at = NOW()
            WHERE id = $4 AND status = $5
            RETURNING *
            "#,
        )
        .bind(LeaveStatus::Approved)
        .bind(approved_by)
        .bind(at)
        .bind(id)
        .bind(LeaveStatus::Pending)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepositoryError::NotFound("Leave request"))
    }

    /// Move a pending leave to rejected
    pub async fn reject(
        &self,
        id: Id,
        rejected_by: Id,
        reason: Option<&str>,
        at: DateTime<Utc>,
    ) -> RepositoryResult<Leave> {
        sqlx::query_as::<_, Leave>(
            r#"
            UPDATE leaves
            SET status = $1, approved_by = $2, approval_date = $3,
                rejection_reason = $4, updated_at = NOW()
            WHERE id = $5 AND status = $6
            RETURNING *
            "#,
        )
        .bind(LeaveStatus::Rejected)
        .bind(rejected_by)
        .bind(at)
        .bind(reason)
        .bind(id)
        .bind(LeaveStatus::Pending)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepositoryError::NotFound("Leave request"))
    }

    pub async fn delete(&self, id: Id) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM leaves WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound("Leave request"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support;

    async fn pending(pool: &PgPool, user: &pm_models::User) -> Leave {
        let start = Utc::now().date_naive();
        LeaveRepository::new(pool.clone())
            .create(CreateLeaveDto {
                user_id: user.id,
                organization_id: user.organization_id,
                leave_type: LeaveType::FullDay,
                start_date: start,
                end_date: start,
                reason: Some("Dentist".into()),
                number_of_days: 1.0,
            })
            .await
            .unwrap()
    }

    #[sqlx::test]
    async fn test_approve_moves_pending_once(pool: PgPool) {
        let admin = test_support::organization(&pool, "acme").await;
        let leave = pending(&pool, &admin).await;
        assert_eq!(leave.status, LeaveStatus::Pending);

        let repo = LeaveRepository::new(pool);
        let now = Utc::now();
        let approved = repo.approve(leave.id, admin.id, now).await.unwrap();
        assert_eq!(approved.status, LeaveStatus::Approved);
        assert_eq!(approved.approved_by, Some(admin.id));

        assert!(matches!(
            repo.approve(leave.id, admin.id, now).await,
            Err(RepositoryError::NotFound(_))
        ));
        assert!(matches!(
            repo.reject(leave.id, admin.id, None, now).await,
            Err(RepositoryError::NotFound(_))
        ));

        let today = now.date_naive();
        let active = repo
            .list_approved_overlapping(admin.organization_id, today, today)
            .await
            .unwrap();
        assert_eq!(active.len(), 1);
    }

    #[sqlx::test]
    async fn test_reject_keeps_reason(pool: PgPool) {
        let admin = test_support::organization(&pool, "acme").await;
        let leave = pending(&pool, &admin).await;

        let rejected = LeaveRepository::new(pool)
            .reject(leave.id, admin.id, Some("Release week"), Utc::now())
            .await
            .unwrap();
        assert_eq!(rejected.status, LeaveStatus::Rejected);
        assert_eq!(rejected.rejection_reason.as_deref(), Some("Release week"));
    }
}
