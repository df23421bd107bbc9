//! Notification representer

use chrono::{DateTime, Utc};
use pm_core::Id;
use pm_models::{Notification, NotificationStatus, NotificationType, UserSummary};
use serde::Serialize;

use super::People;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationRepresentation {
    pub id: Id,
    pub recipient_id: Id,
    pub sender: Option<UserSummary>,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub title: String,
    pub message: String,
    pub task_id: Option<Id>,
    pub status: NotificationStatus,
    pub created_at: DateTime<Utc>,
}

impl NotificationRepresentation {
    pub fn represent(notification: Notification, people: &People) -> Self {
        Self {
            sender: people.get(notification.sender_id),
            id: notification.id,
            recipient_id: notification.recipient_id,
            kind: notification.kind,
            title: notification.title,
            message: notification.message,
            task_id: notification.task_id,
            status: notification.status,
            created_at: notification.created_at,
        }
    }
}
