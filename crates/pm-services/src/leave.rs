//! Leave rules

use chrono::NaiveDate;
use pm_core::{PmError, PmResult};
use pm_models::Leave;
use serde::Serialize;

pub const ALREADY_PROCESSED: &str = "Leave request is already processed";

/// Only pending requests may be approved, rejected or cancelled
pub fn ensure_pending(leave: &Leave) -> PmResult<()> {
    if leave.is_pending() {
        Ok(())
    } else {
        Err(PmError::bad_request(ALREADY_PROCESSED))
    }
}

/// Whether approving `leave` puts its owner on leave right now
pub fn starts_leave_today(leave: &Leave, today: NaiveDate) -> bool {
    leave.covers(today)
}

/// First and last day of a calendar month; `None` for an invalid month.
pub fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((first, next.pred_opt()?))
}

/// An approved leave in progress, with the days still to go
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveLeave {
    #[serde(flatten)]
    pub leave: Leave,
    pub days_remaining: i64,
}

pub fn active_leaves(leaves: Vec<Leave>, today: NaiveDate) -> Vec<ActiveLeave> {
    leaves
        .into_iter()
        .filter(|leave| leave.covers(today))
        .map(|leave| ActiveLeave {
            days_remaining: leave.days_remaining(today),
            leave,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pm_core::Id;
    use pm_models::{LeaveStatus, LeaveType};

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    fn leave(status: LeaveStatus, start: NaiveDate, end: NaiveDate) -> Leave {
        Leave {
            id: Id::new_v4(),
            user_id: Id::new_v4(),
            organization_id: Id::new_v4(),
            leave_type: LeaveType::FullDay,
            start_date: start,
            end_date: end,
            reason: None,
            number_of_days: LeaveType::FullDay.days_between(start, end),
            status,
            approved_by: None,
            approval_date: None,
            rejection_reason: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_ensure_pending() {
        assert!(ensure_pending(&leave(LeaveStatus::Pending, date(1, 1), date(1, 2))).is_ok());
        let err = ensure_pending(&leave(LeaveStatus::Approved, date(1, 1), date(1, 2))).unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.to_string(), ALREADY_PROCESSED);
    }

    #[test]
    fn test_month_bounds() {
        assert_eq!(month_bounds(2024, 2), Some((date(2, 1), date(2, 29))));
        assert_eq!(
            month_bounds(2024, 12),
            Some((date(12, 1), date(12, 31)))
        );
        assert_eq!(month_bounds(2024, 13), None);
        assert_eq!(month_bounds(2024, 0), None);
    }

    #[test]
    fn test_active_leaves() {
        let today = date(3, 10);
        let active = active_leaves(
            vec![
                leave(LeaveStatus::Approved, date(3, 8), date(3, 12)),
                leave(LeaveStatus::Approved, date(3, 11), date(3, 12)),
            ],
            today,
        );
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].days_remaining, 2);
        assert!(starts_leave_today(&active[0].leave, today));
    }
}
