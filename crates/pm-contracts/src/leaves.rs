//! Contracts for leave requests

use chrono::NaiveDate;
use pm_core::error::ValidationErrors;
use pm_models::LeaveType;
use serde::Deserialize;

use crate::base::{validate_max_length, Contract, ValidationResult};

/// Body of `POST /api/leave/apply`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveParams {
    pub leave_type: Option<LeaveType>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub reason: Option<String>,
}

/// The validated request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LeaveRequest {
    pub leave_type: LeaveType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub number_of_days: f64,
}

impl LeaveParams {
    /// Call after validation; `None` when a required field is missing.
    pub fn request(&self) -> Option<LeaveRequest> {
        let (leave_type, start_date, end_date) =
            (self.leave_type?, self.start_date?, self.end_date?);
        Some(LeaveRequest {
            leave_type,
            start_date,
            end_date,
            number_of_days: leave_type.days_between(start_date, end_date),
        })
    }
}

pub struct LeaveApplicationContract;

impl Contract<LeaveParams> for LeaveApplicationContract {
    fn validate(&self, params: &LeaveParams) -> ValidationResult {
        let mut errors = ValidationErrors::new();

        if params.leave_type.is_none() {
            errors.add("leaveType", "is required");
        }
        if params.start_date.is_none() {
            errors.add("startDate", "is required");
        }
        if params.end_date.is_none() {
            errors.add("endDate", "is required");
        }
        if let (Some(start), Some(end)) = (params.start_date, params.end_date) {
            if end < start {
                errors.add("endDate", "must not be before the start date");
            }
            if params.leave_type == Some(LeaveType::HalfDay) && start != end {
                errors.add("endDate", "must equal the start date for a half day");
            }
        }
        validate_max_length("reason", params.reason.as_deref(), 1000, &mut errors);

        errors.into_result()
    }
}

/// Body of `POST /api/leave/:id/reject`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectLeaveParams {
    pub rejection_reason: Option<String>,
}
