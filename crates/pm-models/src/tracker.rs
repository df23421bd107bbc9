//! Per-user activity tracker
//!
//! Table: trackers. A denormalized snapshot recomputed whenever it is read.

use chrono::{DateTime, NaiveDate, Utc};
use pm_core::Id;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

use crate::project::Priority;
use crate::task::TaskStatus;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStatusCounts {
    pub todo: i64,
    pub in_progress: i64,
    pub blocked: i64,
    pub completed: i64,
}

impl TaskStatusCounts {
    pub fn record(&mut self, status: TaskStatus, count: i64) {
        match status {
            TaskStatus::Todo => self.todo += count,
            TaskStatus::InProgress => self.in_progress += count,
            TaskStatus::Blocked => self.blocked += count,
            TaskStatus::Completed => self.completed += count,
        }
    }

    pub fn total(&self) -> i64 {
        self.todo + self.in_progress + self.blocked + self.completed
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorityCounts {
    pub low: i64,
    pub medium: i64,
    pub high: i64,
}

impl PriorityCounts {
    pub fn record(&mut self, priority: Priority, count: i64) {
        match priority {
            Priority::Low => self.low += count,
            Priority::Medium => self.medium += count,
            Priority::High => self.high += count,
        }
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Tracker {
    pub id: Id,
    pub user_id: Id,
    pub organization_id: Id,
    pub total_projects: i64,
    pub completed_projects: i64,
    pub total_tasks: i64,
    pub completed_tasks: i64,
    pub tasks_by_status: Json<TaskStatusCounts>,
    pub tasks_by_priority: Json<PriorityCounts>,
    pub total_hours_worked: f64,
    pub last_activity_date: Option<NaiveDate>,
    pub streak: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl_entity!(Tracker);
