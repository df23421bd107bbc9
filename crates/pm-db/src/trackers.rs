//! Tracker repository

use pm_core::Id;
use pm_models::Tracker;
use sqlx::PgPool;

use crate::repository::{RepositoryError, RepositoryResult};
use crate::users::insert_tracker;

#[derive(Clone)]
pub struct TrackerRepository {
    pool: PgPool,
}

impl TrackerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The user's tracker, created empty if missing
    pub async fn ensure(&self, user_id: Id, organization_id: Id) -> RepositoryResult<Tracker> {
        let mut conn = self.pool.acquire().await?;
        insert_tracker(&mut conn, user_id, organization_id).await?;

        sqlx::query_as::<_, Tracker>("SELECT * FROM trackers WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&mut *conn)
            .await?
            .ok_or(RepositoryError::NotFound("Tracker"))
    }

    /// Write back a recomputed snapshot
    pub async fn save(&self, tracker: &Tracker) -> RepositoryResult<Tracker> {
        sqlx::query_as::<_, Tracker>(
            r#"
            UPDATE trackers SET
                total_projects = $1,
                completed_projects = $2,
                total_tasks = $3,
                completed_tasks = $4,
                tasks_by_status = $5,
                tasks_by_priority = $6,
                total_hours_worked = $7,
                last_activity_date = $8,
                streak = $9,
                updated_at = NOW()
            WHERE id = $10
            RETURNING *
            "#,
        )
        .bind(tracker.total_projects)
        .bind(tracker.completed_projects)
        .bind(tracker.total_tasks)
        .bind(tracker.completed_tasks)
        .bind(&tracker.tasks_by_status)
        .bind(&tracker.tasks_by_priority)
        .bind(tracker.total_hours_worked)
        .bind(tracker.last_activity_date)
        .bind(tracker.streak)
        .bind(tracker.id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepositoryError::NotFound("Tracker"))
    }
}
