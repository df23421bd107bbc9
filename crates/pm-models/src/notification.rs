//! Notifications
//!
//! Table: notifications

use chrono::{DateTime, Utc};
use pm_core::Id;
use serde::Serialize;
use sqlx::FromRow;

text_enum! {
    pub enum NotificationType {
        TaskReport => "task_report",
        General => "general",
        LeaveRequest => "leave_request",
    }
}

impl Default for NotificationType {
    fn default() -> Self {
        NotificationType::General
    }
}

text_enum! {
    pub enum NotificationStatus {
        Unread => "unread",
        Read => "read",
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Id,
    pub recipient_id: Id,
    pub sender_id: Id,
    pub organization_id: Id,
    #[serde(rename = "type")]
    #[sqlx(rename = "notification_type")]
    pub kind: NotificationType,
    pub title: String,
    pub message: String,
    pub task_id: Option<Id>,
    pub status: NotificationStatus,
    pub created_at: DateTime<Utc>,
}

impl_entity!(Notification);
