//! Task state transitions

use chrono::{DateTime, NaiveDate, Utc};
use pm_core::{Id, PmError, PmResult};
use pm_models::{Role, Task, TaskStatus};

pub const STATUS_LOCKED: &str = "Resource Lock: Completed tasks cannot be reverted or modified.";
pub const EMPLOYEE_UPDATE_DENIED: &str = "Employees can only update task status";
pub const BLOCK_DENIED: &str = "Only admins can block/unblock tasks";

/// Move a task to `status`, maintaining `completed_at`. Completed tasks are
/// locked. Returns the previous status.
pub fn change_status(task: &mut Task, status: TaskStatus, now: DateTime<Utc>) -> PmResult<TaskStatus> {
    if task.is_completed() {
        return Err(PmError::forbidden(STATUS_LOCKED));
    }

    let previous = task.status;
    task.set_status(status, now);
    Ok(previous)
}

/// Block or unblock a task. Blocking moves it to `blocked`, unblocking back
/// to `todo`. Returns the previous block flag.
pub fn set_blocked(
    task: &mut Task,
    blocked: bool,
    reason: Option<String>,
    now: DateTime<Utc>,
) -> bool {
    let previous = task.is_blocked;
    task.is_blocked = blocked;
    task.block_reason = if blocked { reason } else { None };
    task.set_status(
        if blocked {
            TaskStatus::Blocked
        } else {
            TaskStatus::Todo
        },
        now,
    );
    previous
}

/// Employees may only work on (comment, log time) tasks assigned to them.
pub fn ensure_can_work_on(task: &Task, user_id: Id, role: Role, message: &str) -> PmResult<()> {
    if role.is_admin() || task.is_assigned(user_id) {
        Ok(())
    } else {
        Err(PmError::forbidden(message))
    }
}

/// A requested due date that differs from the stored one
pub fn due_date_change(current: Option<NaiveDate>, requested: Option<NaiveDate>) -> Option<NaiveDate> {
    requested.filter(|date| Some(*date) != current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pm_models::{Priority, DEFAULT_CATEGORY};

    fn task() -> Task {
        let now = Utc::now();
        Task {
            id: Id::new_v4(),
            title: "Fix login".into(),
            description: None,
            category: DEFAULT_CATEGORY.into(),
            status: TaskStatus::Todo,
            priority: Priority::Medium,
            assigned_employees: vec![],
            assigned_team: None,
            project_id: Id::new_v4(),
            organization_id: Id::new_v4(),
            created_by: Id::new_v4(),
            due_date: None,
            completed_at: None,
            time_spent: 0,
            is_blocked: false,
            block_reason: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_completion_stamps_and_locks() {
        let mut task = task();
        let now = Utc::now();

        let previous = change_status(&mut task, TaskStatus::Completed, now).unwrap();
        assert_eq!(previous, TaskStatus::Todo);
        assert_eq!(task.completed_at, Some(now));

        let err = change_status(&mut task, TaskStatus::Todo, now).unwrap_err();
        assert_eq!(err.status_code(), 403);
        assert_eq!(err.to_string(), STATUS_LOCKED);
        assert_eq!(task.status, TaskStatus::Completed);
    }

    #[test]
    fn test_block_and_unblock() {
        let mut task = task();
        let now = Utc::now();

        assert!(!set_blocked(&mut task, true, Some("Waiting on API keys".into()), now));
        assert_eq!(task.status, TaskStatus::Blocked);
        assert_eq!(task.block_reason.as_deref(), Some("Waiting on API keys"));

        assert!(set_blocked(&mut task, false, Some("ignored".into()), now));
        assert_eq!(task.status, TaskStatus::Todo);
        assert_eq!(task.block_reason, None);
    }

    #[test]
    fn test_employees_must_be_assigned() {
        let mut task = task();
        let user = Id::new_v4();

        assert!(ensure_can_work_on(&task, user, Role::Employee, "no").is_err());
        assert!(ensure_can_work_on(&task, user, Role::Admin, "no").is_ok());

        task.assigned_employees.push(user);
        assert!(ensure_can_work_on(&task, user, Role::Employee, "no").is_ok());
    }

    #[test]
    fn test_due_date_change() {
        let d1 = NaiveDate::from_ymd_opt(2024, 7, 1);
        let d2 = NaiveDate::from_ymd_opt(2024, 7, 2);
        assert_eq!(due_date_change(d1, d1), None);
        assert_eq!(due_date_change(d1, None), None);
        assert_eq!(due_date_change(d1, d2), d2);
        assert_eq!(due_date_change(None, d2), d2);
    }
}
