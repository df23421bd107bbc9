//! Leave requests
//!
//! Table: leaves

use chrono::{DateTime, NaiveDate, Utc};
use pm_core::Id;
use serde::Serialize;
use sqlx::FromRow;

text_enum! {
    pub enum LeaveType {
        FullDay => "Full Day",
        HalfDay => "Half Day",
        SickLeave => "Sick Leave",
        PaidLeave => "Paid Leave",
        WorkFromHome => "Work From Home",
    }
}

impl LeaveType {
    /// Days charged for a leave spanning `start..=end`.
    ///
    /// Half days always count 0.5; everything else counts every calendar
    /// day in the range, both ends included.
    pub fn days_between(&self, start: NaiveDate, end: NaiveDate) -> f64 {
        match self {
            LeaveType::HalfDay => 0.5,
            _ => ((end - start).num_days().abs() + 1) as f64,
        }
    }
}

text_enum! {
    pub enum LeaveStatus {
        Pending => "pending",
        Approved => "approved",
        Rejected => "rejected",
    }
}

impl Default for LeaveStatus {
    fn default() -> Self {
        LeaveStatus::Pending
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Leave {
    pub id: Id,
    pub user_id: Id,
    pub organization_id: Id,
    pub leave_type: LeaveType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: Option<String>,
    pub number_of_days: f64,
    pub status: LeaveStatus,
    pub approved_by: Option<Id>,
    pub approval_date: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl_entity!(Leave);

impl Leave {
    pub fn is_pending(&self) -> bool {
        self.status == LeaveStatus::Pending
    }

    pub fn covers(&self, day: NaiveDate) -> bool {
        self.start_date <= day && day <= self.end_date
    }

    /// Whole days left after `today`, zero on the last day.
    pub fn days_remaining(&self, today: NaiveDate) -> i64 {
        (self.end_date - today).num_days().max(0)
    }

    /// Whether any part of the leave falls within `first..=last`.
    pub fn overlaps(&self, first: NaiveDate, last: NaiveDate) -> bool {
        self.start_date <= last && self.end_date >= first
    }
}
