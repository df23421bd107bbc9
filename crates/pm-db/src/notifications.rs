//! Notification repository

use pm_core::Id;
use pm_models::{Notification, NotificationStatus, NotificationType};
use sqlx::PgPool;

use crate::repository::RepositoryResult;

#[derive(Debug, Clone)]
pub struct CreateNotificationDto {
    pub recipient_id: Id,
    pub sender_id: Id,
    pub organization_id: Id,
    pub kind: NotificationType,
    pub title: String,
    pub message: String,
    pub task_id: Option<Id>,
}

#[derive(Clone)]
pub struct NotificationRepository {
    pool: PgPool,
}

impl NotificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, dto: CreateNotificationDto) -> RepositoryResult<Notification> {
        let row = sqlx::query_as::<_, Notification>(
            r#"
            INSERT INTO notifications (
                id, recipient_id, sender_id, organization_id, notification_type,
                title, message, task_id, status
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(Id::new_v4())
        .bind(dto.recipient_id)
        .bind(dto.sender_id)
        .bind(dto.organization_id)
        .bind(dto.kind)
        .bind(&dto.title)
        .bind(&dto.message)
        .bind(dto.task_id)
        .bind(NotificationStatus::Unread)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    /// A recipient's notifications, newest first
    pub async fn list_for_recipient(
        &self,
        recipient_id: Id,
        organization_id: Id,
        limit: i64,
    ) -> RepositoryResult<Vec<Notification>> {
        let rows = sqlx::query_as::<_, Notification>(
            r#"
            SELECT * FROM notifications
            WHERE recipient_id = $1 AND organization_id = $2
            ORDER BY created_at DESC
            LIMIT $3
            "#,
        )
        .bind(recipient_id)
        .bind(organization_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Mark one of the recipient's notifications read. `None` when the id
    /// does not name a notification addressed to them.
    pub async fn mark_read(
        &self,
        id: Id,
        recipient_id: Id,
    ) -> RepositoryResult<Option<Notification>> {
        let row = sqlx::query_as::<_, Notification>(
            r#"
            UPDATE notifications SET status = $1
            WHERE id = $2 AND recipient_id = $3
            RETURNING *
            "#,
        )
        .bind(NotificationStatus::Read)
        .bind(id)
        .bind(recipient_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }
}
