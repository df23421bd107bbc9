//! Tracker recomputation and the daily activity streak

use chrono::{Duration, NaiveDate};
use pm_core::Id;
use pm_db::ProjectCounts;
use pm_models::{Priority, PriorityCounts, TaskStatus, TaskStatusCounts, Tracker};
use serde::Serialize;
use sqlx::types::Json;

use crate::attendance::round2;

/// Aggregates shared by the personal and organization trackers
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackerStats {
    pub total_projects: i64,
    pub completed_projects: i64,
    pub total_tasks: i64,
    pub completed_tasks: i64,
    pub tasks_by_status: TaskStatusCounts,
    pub tasks_by_priority: PriorityCounts,
    pub total_hours_worked: f64,
}

impl TrackerStats {
    pub fn compute(
        projects: ProjectCounts,
        statuses: &[(TaskStatus, i64)],
        priorities: &[(Priority, i64)],
        minutes_logged: i64,
    ) -> Self {
        let mut tasks_by_status = TaskStatusCounts::default();
        for (status, count) in statuses {
            tasks_by_status.record(*status, *count);
        }

        let mut tasks_by_priority = PriorityCounts::default();
        for (priority, count) in priorities {
            tasks_by_priority.record(*priority, *count);
        }

        Self {
            total_projects: projects.total,
            completed_projects: projects.completed,
            total_tasks: tasks_by_status.total(),
            completed_tasks: tasks_by_status.completed,
            tasks_by_status,
            tasks_by_priority,
            total_hours_worked: round2(minutes_logged as f64 / 60.0),
        }
    }

    pub fn apply_to(&self, tracker: &mut Tracker) {
        tracker.total_projects = self.total_projects;
        tracker.completed_projects = self.completed_projects;
        tracker.total_tasks = self.total_tasks;
        tracker.completed_tasks = self.completed_tasks;
        tracker.tasks_by_status = Json(self.tasks_by_status);
        tracker.tasks_by_priority = Json(self.tasks_by_priority);
        tracker.total_hours_worked = self.total_hours_worked;
    }
}

/// Organization-wide tracker; computed on demand, never stored
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationTracker {
    pub organization_id: Id,
    #[serde(flatten)]
    pub stats: TrackerStats,
}

/// Streak state after observing today's activity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Streak {
    pub days: i32,
    pub last_activity_date: Option<NaiveDate>,
}

/// Advance a daily streak.
///
/// The streak grows at most once per day. Activity today continues it when
/// the last active day was yesterday (or tasks were touched yesterday) and
/// restarts it at one otherwise. Without activity today the streak survives
/// until a full day is missed, then drops to zero.
pub fn next_streak(
    current: Streak,
    today: NaiveDate,
    active_today: bool,
    active_yesterday: bool,
) -> Streak {
    let yesterday = today - Duration::days(1);

    if active_today {
        let days = match current.last_activity_date {
            Some(last) if last == today => current.days.max(1),
            Some(last) if last == yesterday => current.days + 1,
            _ if active_yesterday => 2,
            _ => 1,
        };
        return Streak {
            days,
            last_activity_date: Some(today),
        };
    }

    match current.last_activity_date {
        Some(last) if last >= yesterday => current,
        _ => Streak {
            days: 0,
            last_activity_date: current.last_activity_date,
        },
    }
}
