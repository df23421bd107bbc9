//! Task representer

use chrono::{DateTime, NaiveDate, Utc};
use pm_core::Id;
use pm_models::{Priority, Task, TaskComment, TaskStatus, UserSummary};
use serde::Serialize;

use super::People;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentRepresentation {
    pub id: Id,
    pub text: String,
    pub user: Option<UserSummary>,
    pub created_at: DateTime<Utc>,
}

impl CommentRepresentation {
    pub fn represent(comment: TaskComment, people: &People) -> Self {
        Self {
            id: comment.id,
            user: people.get(comment.user_id),
            text: comment.text,
            created_at: comment.created_at,
        }
    }
}

/// Task with assignees and creator resolved
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRepresentation {
    pub id: Id,
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    pub status: TaskStatus,
    pub priority: Priority,
    pub assigned_employees: Vec<UserSummary>,
    pub assigned_team: Option<Id>,
    pub project_id: Id,
    pub organization_id: Id,
    pub created_by: Option<UserSummary>,
    pub due_date: Option<NaiveDate>,
    pub completed_at: Option<DateTime<Utc>>,
    pub time_spent: i32,
    pub is_blocked: bool,
    pub block_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<Vec<CommentRepresentation>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TaskRepresentation {
    pub fn people_ids(task: &Task) -> impl Iterator<Item = Id> + '_ {
        std::iter::once(task.created_by).chain(task.assigned_employees.iter().copied())
    }

    pub fn represent(task: Task, people: &People) -> Self {
        Self {
            assigned_employees: people.pick(&task.assigned_employees),
            created_by: people.get(task.created_by),
            id: task.id,
            title: task.title,
            description: task.description,
            category: task.category,
            status: task.status,
            priority: task.priority,
            assigned_team: task.assigned_team,
            project_id: task.project_id,
            organization_id: task.organization_id,
            due_date: task.due_date,
            completed_at: task.completed_at,
            time_spent: task.time_spent,
            is_blocked: task.is_blocked,
            block_reason: task.block_reason,
            comments: None,
            created_at: task.created_at,
            updated_at: task.updated_at,
        }
    }

    /// Represent many tasks against one set of people
    pub fn represent_all(tasks: Vec<Task>, people: &People) -> Vec<Self> {
        tasks.into_iter().map(|t| Self::represent(t, people)).collect()
    }

    pub fn with_comments(mut self, comments: Vec<CommentRepresentation>) -> Self {
        self.comments = Some(comments);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::representers::fixtures::summary;

    #[test]
    fn test_task_and_comment_representation() {
        let author = summary("Ada");
        let task = Task {
            id: Id::new_v4(),
            title: "Write docs".into(),
            description: None,
            category: "Documentation".into(),
            status: TaskStatus::InProgress,
            priority: Priority::Low,
            assigned_employees: vec![author.id],
            assigned_team: None,
            project_id: Id::new_v4(),
            organization_id: Id::new_v4(),
            created_by: author.id,
            due_date: None,
            completed_at: None,
            time_spent: 30,
            is_blocked: false,
            block_reason: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let comment = TaskComment {
            id: Id::new_v4(),
            task_id: task.id,
            user_id: author.id,
            text: "Started".into(),
            created_at: Utc::now(),
        };

        let people = People::from_summaries(vec![author.clone()]);
        let rep = TaskRepresentation::represent(task, &people)
            .with_comments(vec![CommentRepresentation::represent(comment, &people)]);

        let json = serde_json::to_value(&rep).unwrap();
        assert_eq!(json["status"], "in-progress");
        assert_eq!(json["createdBy"]["firstName"], "Ada");
        assert_eq!(json["assignedEmployees"].as_array().map(Vec::len), Some(1));
        assert_eq!(json["comments"][0]["user"]["email"], "ada@example.com");
    }
}
