//! Task model
//!
//! Table: tasks, task_comments

use chrono::{DateTime, NaiveDate, Utc};
use pm_core::Id;
use serde::Serialize;
use sqlx::FromRow;

use crate::project::Priority;

/// Category given to tasks created without one
pub const DEFAULT_CATEGORY: &str = "General";

text_enum! {
    pub enum TaskStatus {
        Todo => "todo",
        InProgress => "in-progress",
        Blocked => "blocked",
        Completed => "completed",
    }
}

impl Default for TaskStatus {
    fn default() -> Self {
        TaskStatus::Todo
    }
}

impl TaskStatus {
    /// Case-insensitive parse
    pub fn parse_loose(value: &str) -> Result<Self, crate::UnknownVariant> {
        value.trim().to_lowercase().parse()
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Id,
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    pub status: TaskStatus,
    pub priority: Priority,
    pub assigned_employees: Vec<Id>,
    pub assigned_team: Option<Id>,
    pub project_id: Id,
    pub organization_id: Id,
    pub created_by: Id,
    pub due_date: Option<NaiveDate>,
    pub completed_at: Option<DateTime<Utc>>,
    /// Minutes logged against the task
    pub time_spent: i32,
    pub is_blocked: bool,
    pub block_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl_entity!(Task);

impl Task {
    pub fn is_assigned(&self, user_id: Id) -> bool {
        self.assigned_employees.contains(&user_id)
    }

    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }

    /// Set the status, stamping `completed_at` on completion and clearing
    /// it for every other status.
    pub fn set_status(&mut self, status: TaskStatus, now: DateTime<Utc>) {
        self.status = status;
        self.completed_at = match status {
            TaskStatus::Completed => self.completed_at.or(Some(now)),
            _ => None,
        };
    }

    /// Not completed and due before `today`
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.is_completed() && self.due_date.is_some_and(|due| due < today)
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TaskComment {
    pub id: Id,
    pub task_id: Id,
    pub user_id: Id,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task() -> Task {
        Task {
            id: Id::new_v4(),
            title: "Write docs".into(),
            description: None,
            category: DEFAULT_CATEGORY.into(),
            status: TaskStatus::Todo,
            priority: Priority::Medium,
            assigned_employees: vec![],
            assigned_team: None,
            project_id: Id::new_v4(),
            organization_id: Id::new_v4(),
            created_by: Id::new_v4(),
            due_date: None,
            completed_at: None,
            time_spent: 0,
            is_blocked: false,
            block_reason: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_set_status_maintains_completed_at() {
        let now = Utc::now();
        let mut t = task();

        t.set_status(TaskStatus::Completed, now);
        assert_eq!(t.completed_at, Some(now));

        t.set_status(TaskStatus::InProgress, now);
        assert!(t.completed_at.is_none());
    }

    #[test]
    fn test_parse_loose() {
        assert_eq!(TaskStatus::parse_loose("In-Progress"), Ok(TaskStatus::InProgress));
        assert!(TaskStatus::parse_loose("done").is_err());
    }

    #[test]
    fn test_overdue() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
        let mut t = task();
        assert!(!t.is_overdue(today));

        t.due_date = NaiveDate::from_ymd_opt(2024, 6, 9);
        assert!(t.is_overdue(today));

        t.set_status(TaskStatus::Completed, Utc::now());
        assert!(!t.is_overdue(today));
    }
}
