//! Contracts for tasks

use chrono::NaiveDate;
use pm_core::error::ValidationErrors;
use pm_core::Id;
use pm_models::{Priority, TaskStatus};
use serde::Deserialize;

use crate::base::{
    validate_max_length, validate_not_blank, validate_present, Contract, ValidationResult,
};

/// Body of `POST /api/tasks` and `PUT /api/tasks/:id`.
///
/// `priority` and `status` are accepted in any letter case.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskParams {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub priority: Option<String>,
    pub status: Option<String>,
    pub assigned_employees: Option<Vec<Id>>,
    pub assigned_team: Option<Id>,
    pub project_id: Option<Id>,
    pub due_date: Option<NaiveDate>,
}

impl TaskParams {
    /// Parsed priority, `None` when absent. Call after validation.
    pub fn priority(&self) -> Option<Priority> {
        self.priority.as_deref().and_then(|p| Priority::parse_loose(p).ok())
    }

    /// Parsed status, `None` when absent. Call after validation.
    pub fn status(&self) -> Option<TaskStatus> {
        self.status.as_deref().and_then(|s| TaskStatus::parse_loose(s).ok())
    }

    /// Trimmed category, `None` when blank.
    pub fn category(&self) -> Option<String> {
        self.category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
    }
}

fn validate_enums(params: &TaskParams, errors: &mut ValidationErrors) {
    if let Some(priority) = params.priority.as_deref() {
        if Priority::parse_loose(priority).is_err() {
            errors.add("priority", "is not a valid priority");
        }
    }
    if let Some(status) = params.status.as_deref() {
        if TaskStatus::parse_loose(status).is_err() {
            errors.add("status", "is not a valid status");
        }
    }
}

pub struct TaskCreateContract;

impl Contract<TaskParams> for TaskCreateContract {
    fn validate(&self, params: &TaskParams) -> ValidationResult {
        let mut errors = ValidationErrors::new();
        validate_present("title", params.title.as_deref(), &mut errors);
        validate_max_length("title", params.title.as_deref(), 200, &mut errors);
        validate_enums(params, &mut errors);
        errors.into_result()
    }
}

pub struct TaskUpdateContract;

impl Contract<TaskParams> for TaskUpdateContract {
    fn validate(&self, params: &TaskParams) -> ValidationResult {
        let mut errors = ValidationErrors::new();
        validate_not_blank("title", params.title.as_deref(), &mut errors);
        validate_max_length("title", params.title.as_deref(), 200, &mut errors);
        validate_enums(params, &mut errors);
        errors.into_result()
    }
}

/// Body of `PATCH /api/tasks/:id/status`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusChangeParams {
    pub status: Option<String>,
}

impl StatusChangeParams {
    pub fn status(&self) -> Result<TaskStatus, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        match self.status.as_deref().map(TaskStatus::parse_loose) {
            Some(Ok(status)) => return Ok(status),
            _ => errors.add_base("Invalid status value"),
        }
        Err(errors)
    }
}

/// Body of `POST /api/tasks/:id/comments`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommentParams {
    pub text: Option<String>,
}

pub struct CommentContract;

impl Contract<CommentParams> for CommentContract {
    fn validate(&self, params: &CommentParams) -> ValidationResult {
        let mut errors = ValidationErrors::new();
        validate_present("text", params.text.as_deref(), &mut errors);
        validate_max_length("text", params.text.as_deref(), 5000, &mut errors);
        errors.into_result()
    }
}

/// Body of `PATCH /api/tasks/:id/time-spent`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TimeSpentParams {
    pub minutes: Option<i64>,
}

impl TimeSpentParams {
    /// Minutes to add; must be present and non-negative.
    pub fn minutes(&self) -> Result<i32, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        match self.minutes.map(i32::try_from) {
            Some(Ok(minutes)) if minutes >= 0 => return Ok(minutes),
            _ => errors.add_base("Invalid time value"),
        }
        Err(errors)
    }
}

/// Body of `PATCH /api/tasks/:id/block`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockParams {
    #[serde(default)]
    pub is_blocked: bool,
    pub block_reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_requires_title() {
        assert!(TaskCreateContract.validate(&TaskParams::default()).is_err());

        let params = TaskParams {
            title: Some("Fix login".into()),
            priority: Some("HIGH".into()),
            ..Default::default()
        };
        assert!(TaskCreateContract.validate(&params).is_ok());
        assert_eq!(params.priority(), Some(Priority::High));
    }

    #[test]
    fn test_invalid_priority_and_status() {
        let params = TaskParams {
            title: Some("x".into()),
            priority: Some("urgent".into()),
            status: Some("done".into()),
            ..Default::default()
        };
        let errors = TaskUpdateContract.validate(&params).unwrap_err();
        assert!(errors.has_error("priority"));
        assert!(errors.has_error("status"));
    }

    #[test]
    fn test_category_blank_is_none() {
        let params = TaskParams {
            category: Some("  ".into()),
            ..Default::default()
        };
        assert_eq!(params.category(), None);
    }

    #[test]
    fn test_status_change_params() {
        let params = StatusChangeParams { status: Some("Completed".into()) };
        assert_eq!(params.status(), Ok(TaskStatus::Completed));
        assert!(StatusChangeParams { status: None }.status().is_err());
        assert!(StatusChangeParams { status: Some("archived".into()) }.status().is_err());
    }

    #[test]
    fn test_time_spent_minutes() {
        assert_eq!(TimeSpentParams { minutes: Some(45) }.minutes(), Ok(45));
        assert!(TimeSpentParams { minutes: Some(-1) }.minutes().is_err());
        assert!(TimeSpentParams { minutes: None }.minutes().is_err());
        assert!(TimeSpentParams { minutes: Some(i64::MAX) }.minutes().is_err());
    }

    #[test]
    fn test_comment_contract() {
        assert!(CommentContract.validate(&CommentParams { text: Some(" ".into()) }).is_err());
        assert!(CommentContract.validate(&CommentParams { text: Some("LGTM".into()) }).is_ok());
    }
}
