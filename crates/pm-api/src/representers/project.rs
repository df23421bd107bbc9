//! Project representer

use chrono::{DateTime, NaiveDate, Utc};
use pm_core::Id;
use pm_models::{Methodology, Priority, Project, ProjectStatus, UserSummary};
use serde::Serialize;

use super::task::TaskRepresentation;
use super::People;

/// Project with owner and assignees resolved
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRepresentation {
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
    pub project_owner: Option<UserSummary>,
    pub assigned_employees: Vec<UserSummary>,
    pub organization_id: Id,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub actual_end_date: Option<NaiveDate>,
    pub progress: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tasks: Option<Vec<TaskRepresentation>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProjectRepresentation {
    /// Ids of every user the representation needs
    pub fn people_ids(project: &Project) -> impl Iterator<Item = Id> + '_ {
        std::iter::once(project.project_owner).chain(project.assigned_employees.iter().copied())
    }

    pub fn represent(project: Project, people: &People) -> Self {
        Self {
            project_owner: people.get(project.project_owner),
            assigned_employees: people.pick(&project.assigned_employees),
            id: project.id,
            title: project.title,
            description: project.description,
            client_name: project.client_name,
            repository_url: project.repository_url,
            status: project.status,
            priority: project.priority,
            technology_stack: project.technology_stack,
            methodology: project.methodology,
            requirements: project.requirements,
            organization_id: project.organization_id,
            start_date: project.start_date,
            end_date: project.end_date,
            actual_end_date: project.actual_end_date,
            progress: project.progress,
            tasks: None,
            created_at: project.created_at,
            updated_at: project.updated_at,
        }
    }

    pub fn with_tasks(mut self, tasks: Vec<TaskRepresentation>) -> Self {
        self.tasks = Some(tasks);
        self
    }
}
