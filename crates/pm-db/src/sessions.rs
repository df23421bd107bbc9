//! Online session repository
//!
//! Attendance sessions opened at login and closed at logout, by an admin or
//! by the stale-session sweep.

use chrono::{DateTime, Utc};
use pm_core::Id;
use pm_models::OnlineSession;
use sqlx::PgPool;

use crate::repository::{RepositoryError, RepositoryResult};

/// Client details recorded with a new session
#[derive(Debug, Clone, Default)]
pub struct ClientInfo {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

#[derive(Clone)]
pub struct SessionRepository {
    pool: PgPool,
}

impl SessionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Replace every previous session of the user with a fresh active one.
    pub async fn start(
        &self,
        user_id: Id,
        organization_id: Id,
        client: &ClientInfo,
        at: DateTime<Utc>,
    ) -> RepositoryResult<OnlineSession> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM online_sessions WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        let session = sqlx::query_as::<_, OnlineSession>(
            r#"
            INSERT INTO online_sessions (
                id, user_id, organization_id, login_at, ip_address, user_agent, is_active
            ) VALUES ($1, $2, $3, $4, $5, $6, TRUE)
            RETURNING *
            "#,
        )
        .bind(Id::new_v4())
        .bind(user_id)
        .bind(organization_id)
        .bind(at)
        .bind(&client.ip_address)
        .bind(&client.user_agent)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(session)
    }

    pub async fn find_in_organization(
        &self,
        id: Id,
        organization_id: Id,
    ) -> RepositoryResult<Option<OnlineSession>> {
        let row = sqlx::query_as::<_, OnlineSession>(
            "SELECT * FROM online_sessions WHERE id = $1 AND organization_id = $2",
        )
        .bind(id)
        .bind(organization_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// An active session belonging to `user_id`
    pub async fn find_active_for_user(
        &self,
        id: Id,
        user_id: Id,
    ) -> RepositoryResult<Option<OnlineSession>> {
        let row = sqlx::query_as::<_, OnlineSession>(
            "SELECT * FROM online_sessions WHERE id = $1 AND user_id = $2 AND is_active",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// Close an active session at `at`. Returns the closed session.
    pub async fn close(&self, mut session: OnlineSession, at: DateTime<Utc>) -> RepositoryResult<OnlineSession> {
        session.close(at);

        sqlx::query_as::<_, OnlineSession>(
            r#"
            UPDATE online_sessions
            SET logout_at = $1, duration = $2, is_active = FALSE
            WHERE id = $3
            RETURNING *
            "#,
        )
        .bind(session.logout_at)
        .bind(session.duration)
        .bind(session.id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepositoryError::NotFound("Session"))
    }

    /// A user's sessions, newest first, optionally limited to logins within
    /// `[from, to)`.
    pub async fn list_for_user(
        &self,
        user_id: Id,
        organization_id: Id,
        range: Option<(DateTime<Utc>, DateTime<Utc>)>,
    ) -> RepositoryResult<Vec<OnlineSession>> {
        let (from, to) = range.unzip();
        let rows = sqlx::query_as::<_, OnlineSession>(
            r#"
            SELECT * FROM online_sessions
            WHERE user_id = $1 AND organization_id = $2
              AND ($3::timestamptz IS NULL OR login_at >= $3)
              AND ($4::timestamptz IS NULL OR login_at < $4)
            ORDER BY login_at DESC
            "#,
        )
        .bind(user_id)
        .bind(organization_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Every session of an organization, newest first, optionally limited to
    /// logins within `[from, to)`.
    pub async fn list_for_organization(
        &self,
        organization_id: Id,
        range: Option<(DateTime<Utc>, DateTime<Utc>)>,
    ) -> RepositoryResult<Vec<OnlineSession>> {
        let (from, to) = range.unzip();
        let rows = sqlx::query_as::<_, OnlineSession>(
            r#"
            SELECT * FROM online_sessions
            WHERE organization_id = $1
              AND ($2::timestamptz IS NULL OR login_at >= $2)
              AND ($3::timestamptz IS NULL OR login_at < $3)
            ORDER BY login_at DESC
            "#,
        )
        .bind(organization_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn list_active(&self, organization_id: Id) -> RepositoryResult<Vec<OnlineSession>> {
        let rows = sqlx::query_as::<_, OnlineSession>(
            r#"
            SELECT * FROM online_sessions
            WHERE organization_id = $1 AND is_active
            ORDER BY login_at DESC
            "#,
        )
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Close, in one statement, every active session that logged in before
    /// `cutoff`. `None` sweeps all organizations. Returns the number closed.
    pub async fn close_stale(
        &self,
        organization_id: Option<Id>,
        cutoff: DateTime<Utc>,
        at: DateTime<Utc>,
    ) -> RepositoryResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE online_sessions
            SET is_active = FALSE,
                logout_at = $1,
                duration = GREATEST(EXTRACT(EPOCH FROM ($1 - login_at))::BIGINT, 0)
            WHERE is_active
              AND login_at < $2
              AND ($3::uuid IS NULL OR organization_id = $3)
            "#,
        )
        .bind(at)
        .bind(cutoff)
        .bind(organization_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support;
    use chrono::{Duration, SubsecRound};

    #[sqlx::test]
    async fn test_start_replaces_previous_sessions(pool: PgPool) {
        let admin = test_support::organization(&pool, "acme").await;
        let repo = SessionRepository::new(pool);
        let now = Utc::now().trunc_subsecs(0);

        let first = repo
            .start(admin.id, admin.organization_id, &ClientInfo::default(), now - Duration::hours(1))
            .await
            .unwrap();
        let second = repo
            .start(admin.id, admin.organization_id, &ClientInfo::default(), now)
            .await
            .unwrap();

        let sessions = repo
            .list_for_user(admin.id, admin.organization_id, None)
            .await
            .unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].id, second.id);
        assert!(sessions[0].is_active);
        assert!(repo.find_active_for_user(first.id, admin.id).await.unwrap().is_none());
    }

    #[sqlx::test]
    async fn test_close_stale_only_touches_old_sessions(pool: PgPool) {
        let acme = test_support::organization(&pool, "acme").await;
        let rival = test_support::organization(&pool, "rival").await;
        let fresh = test_support::employee(&pool, acme.organization_id, "Fay", pm_models::Designation::Developer).await;
        let repo = SessionRepository::new(pool);
        let now = Utc::now().trunc_subsecs(0);
        let client = ClientInfo::default();

        let stale = repo
            .start(acme.id, acme.organization_id, &client, now - Duration::hours(30))
            .await
            .unwrap();
        repo.start(fresh.id, fresh.organization_id, &client, now - Duration::hours(1))
            .await
            .unwrap();
        repo.start(rival.id, rival.organization_id, &client, now - Duration::hours(30))
            .await
            .unwrap();

        let cutoff = now - Duration::hours(24);
        let closed = repo
            .close_stale(Some(acme.organization_id), cutoff, now)
            .await
            .unwrap();
        assert_eq!(closed, 1);

        let stale = repo
            .find_in_organization(stale.id, acme.organization_id)
            .await
            .unwrap()
            .unwrap();
        assert!(!stale.is_active);
        assert_eq!(stale.logout_at, Some(now));
        assert_eq!(stale.duration, 30 * 3600);
        assert_eq!(repo.list_active(acme.organization_id).await.unwrap().len(), 1);

        assert_eq!(repo.close_stale(None, cutoff, now).await.unwrap(), 1);
        assert!(repo.list_active(rival.organization_id).await.unwrap().is_empty());
    }
}
