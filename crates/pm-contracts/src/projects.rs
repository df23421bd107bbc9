//! Contracts for projects

use chrono::NaiveDate;
use pm_core::error::ValidationErrors;
use pm_core::Id;
use pm_models::{Methodology, Priority, Project, ProjectStatus};
use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;

use crate::base::{
    validate_max_length, validate_not_blank, validate_present, Contract, ValidationResult,
};

/// Repository links must be absolute http(s) URLs
static REPOSITORY_URL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?://[^\s/$.?#].[^\s]*$").unwrap());

const TITLE_MAX_LENGTH: usize = 200;

/// Body of `POST /api/projects` and `PUT /api/projects/:id`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectParams {
    pub title: Option<String>,
    pub description: Option<String>,
    pub client_name: Option<String>,
    pub repository_url: Option<String>,
    pub status: Option<ProjectStatus>,
    pub priority: Option<Priority>,
    pub technology_stack: Option<Vec<String>>,
    pub methodology: Option<Methodology>,
    pub requirements: Option<String>,
    pub project_owner: Option<Id>,
    pub assigned_employees: Option<Vec<Id>>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub actual_end_date: Option<NaiveDate>,
    pub progress: Option<i32>,
}

impl ProjectParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_owner(mut self, owner: Id) -> Self {
        self.project_owner = Some(owner);
        self
    }

    pub fn with_status(mut self, status: ProjectStatus) -> Self {
        self.status = Some(status);
        self
    }
}

/// Validations shared by create and update
fn validate_common(params: &ProjectParams, errors: &mut ValidationErrors) {
    validate_max_length("title", params.title.as_deref(), TITLE_MAX_LENGTH, errors);

    if let Some(progress) = params.progress {
        if !(0..=100).contains(&progress) {
            errors.add("progress", "must be between 0 and 100");
        }
    }

    if let Some(url) = params.repository_url.as_deref().filter(|u| !u.is_empty()) {
        if !REPOSITORY_URL_PATTERN.is_match(url) {
            errors.add("repositoryUrl", "is not a valid URL");
        }
    }
}

fn validate_dates(start: Option<NaiveDate>, end: Option<NaiveDate>, errors: &mut ValidationErrors) {
    if let (Some(start), Some(end)) = (start, end) {
        if end < start {
            errors.add("endDate", "must not be before the start date");
        }
    }
}

/// Contract for creating a new project
pub struct ProjectCreateContract;

impl Contract<ProjectParams> for ProjectCreateContract {
    fn validate(&self, params: &ProjectParams) -> ValidationResult {
        let mut errors = ValidationErrors::new();

        validate_present("title", params.title.as_deref(), &mut errors);
        if params.project_owner.is_none() {
            errors.add("projectOwner", "is required");
        }
        validate_common(params, &mut errors);
        validate_dates(params.start_date, params.end_date, &mut errors);

        errors.into_result()
    }
}

/// Contract for updating an existing project
pub struct ProjectUpdateContract<'a> {
    project: &'a Project,
}

impl<'a> ProjectUpdateContract<'a> {
    pub fn new(project: &'a Project) -> Self {
        Self { project }
    }
}

impl<'a> Contract<ProjectParams> for ProjectUpdateContract<'a> {
    fn validate(&self, params: &ProjectParams) -> ValidationResult {
        let mut errors = ValidationErrors::new();

        validate_not_blank("title", params.title.as_deref(), &mut errors);
        validate_common(params, &mut errors);

        // Compare against the stored values for whichever side is not changing
        let start = params.start_date.or(Some(self.project.start_date));
        let end = params.end_date.or(self.project.end_date);
        validate_dates(start, end, &mut errors);

        errors.into_result()
    }
}

/// Body of `POST /api/projects/:id/assign-employees`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignEmployeesParams {
    pub employee_ids: Option<serde_json::Value>,
}

impl AssignEmployeesParams {
    /// The requested assignee ids. Anything but an array of UUIDs is rejected.
    pub fn employee_ids(&self) -> Result<Vec<Id>, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let Some(serde_json::Value::Array(values)) = &self.employee_ids else {
            errors.add_base("employeeIds must be an array");
            return Err(errors);
        };

        let mut ids = Vec::with_capacity(values.len());
        for value in values {
            match value.as_str().and_then(|s| s.parse::<Id>().ok()) {
                Some(id) if !ids.contains(&id) => ids.push(id),
                Some(_) => {}
                None => errors.add("employeeIds", format!("contains an invalid id: {}", value)),
            }
        }

        errors.into_result().map(|()| ids)
    }
}
