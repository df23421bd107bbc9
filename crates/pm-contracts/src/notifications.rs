//! Contracts for notifications

use pm_core::error::ValidationErrors;
use pm_core::Id;
use pm_models::NotificationType;
use serde::Deserialize;

use crate::base::{validate_max_length, validate_present, Contract, ValidationResult};

/// Body of `POST /api/notifications`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationParams {
    pub recipient_id: Option<Id>,
    #[serde(rename = "type")]
    pub kind: Option<NotificationType>,
    pub title: Option<String>,
    pub message: Option<String>,
    pub task_id: Option<Id>,
}

pub struct NotificationContract;

impl Contract<NotificationParams> for NotificationContract {
    fn validate(&self, params: &NotificationParams) -> ValidationResult {
        let mut errors = ValidationErrors::new();
        validate_present("title", params.title.as_deref(), &mut errors);
        validate_present("message", params.message.as_deref(), &mut errors);
        validate_max_length("title", params.title.as_deref(), 200, &mut errors);
        errors.into_result()
    }
}
