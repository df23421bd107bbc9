//! Project model
//!
//! Table: projects

use chrono::{DateTime, NaiveDate, Utc};
use pm_core::Id;
use serde::Serialize;
use sqlx::FromRow;

/// Title of the per-organization catch-all project that receives tasks
/// created without an explicit project.
pub const GENERAL_PROJECT_TITLE: &str = "General Deliverables";

text_enum! {
    pub enum ProjectStatus {
        NotStarted => "not-started",
        Ongoing => "ongoing",
        OnHold => "on-hold",
        Delayed => "delayed",
        Completed => "completed",
    }
}

impl Default for ProjectStatus {
    fn default() -> Self {
        ProjectStatus::NotStarted
    }
}

text_enum! {
    /// Priority shared by projects and tasks
    pub enum Priority {
        Low => "low",
        Medium => "medium",
        High => "high",
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Medium
    }
}

impl Priority {
    /// Case-insensitive parse
    pub fn parse_loose(value: &str) -> Result<Self, crate::UnknownVariant> {
        value.trim().to_lowercase().parse()
    }

    /// Sort rank, high first
    pub fn rank(&self) -> u8 {
        match self {
            Priority::High => 0,
            Priority::Medium => 1,
            Priority::Low => 2,
        }
    }
}

text_enum! {
    pub enum Methodology {
        Agile => "Agile",
        Scrum => "Scrum",
        Waterfall => "Waterfall",
        Kanban => "Kanban",
        Hybrid => "Hybrid",
    }
}

impl Default for Methodology {
    fn default() -> Self {
        Methodology::Agile
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Id,
    pub title: String,
    pub description: Option<String>,
    pub client_name: Option<String>,
    pub repository_url: Option<String>,
    pub status: ProjectStatus,
    pub priority: Priority,
    pub technology_stack: Vec<String>,
    pub methodology: Methodology,
    pub requirements: Option<String>,
    pub project_owner: Id,
    pub assigned_employees: Vec<Id>,
    pub organization_id: Id,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub actual_end_date: Option<NaiveDate>,
    pub progress: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl_entity!(Project);

impl Project {
    pub fn is_assigned(&self, user_id: Id) -> bool {
        self.assigned_employees.contains(&user_id)
    }

    pub fn is_owned_by(&self, user_id: Id) -> bool {
        self.project_owner == user_id
    }

    /// Owner or assignee
    pub fn involves(&self, user_id: Id) -> bool {
        self.is_owned_by(user_id) || self.is_assigned(user_id)
    }
}
