//! Weekly and summary task reports
//!
//! Weeks run Monday to Sunday in UTC.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use pm_core::Id;
use pm_db::TaskReportCounts;
use serde::Serialize;

use crate::attendance::day_bounds;

pub const DEFAULT_WEEKS: usize = 4;
pub const MAX_WEEKS: usize = 52;

/// `weeks` query value; anything unparsable or below one falls back to the
/// default, large values are capped.
pub fn parse_weeks(raw: Option<&str>) -> usize {
    match raw.and_then(|w| w.trim().parse::<usize>().ok()) {
        Some(0) | None => DEFAULT_WEEKS,
        Some(weeks) => weeks.min(MAX_WEEKS),
    }
}

/// The Monday starting the week that contains `day`
pub fn week_start(day: NaiveDate) -> NaiveDate {
    day - Duration::days(day.weekday().num_days_from_monday() as i64)
}

/// One reporting week; `weeks_ago` 0 is the current week.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeekWindow {
    pub weeks_ago: usize,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl WeekWindow {
    pub fn new(today: NaiveDate, weeks_ago: usize) -> Self {
        let start = week_start(today) - Duration::weeks(weeks_ago as i64);
        Self {
            weeks_ago,
            start,
            end: start + Duration::days(6),
        }
    }

    /// `[Monday midnight, next Monday midnight)`
    pub fn bounds(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        let (from, _) = day_bounds(self.start);
        let (_, to) = day_bounds(self.end);
        (from, to)
    }

    pub fn label(&self) -> String {
        match self.weeks_ago {
            0 => "This Week".to_string(),
            1 => "Last Week".to_string(),
            _ => format!(
                "{} - {}",
                self.start.format("%b %-d"),
                self.end.format("%b %-d")
            ),
        }
    }
}

/// The `count` most recent weeks, oldest first
pub fn week_windows(today: NaiveDate, count: usize) -> Vec<WeekWindow> {
    (0..count).rev().map(|i| WeekWindow::new(today, i)).collect()
}

/// Rounded percentage, zero for an empty set
pub fn completion_rate(completed: i64, total: i64) -> i64 {
    if total > 0 {
        ((completed as f64 / total as f64) * 100.0).round() as i64
    } else {
        0
    }
}

/// The assignee filter a caller may apply: only admins narrow reports to
/// one employee.
pub fn report_assignee(is_admin: bool, employee_id: Option<Id>) -> Option<Id> {
    employee_id.filter(|_| is_admin)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyReport {
    pub week: String,
    pub week_number: usize,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total: i64,
    pub completed: i64,
    pub in_progress: i64,
    pub pending: i64,
    pub blocked: i64,
    pub completion_rate: i64,
}

impl WeeklyReport {
    pub fn new(window: &WeekWindow, weeks: usize, counts: TaskReportCounts) -> Self {
        Self {
            week: window.label(),
            week_number: weeks - window.weeks_ago,
            start_date: window.start,
            end_date: window.end,
            total: counts.total,
            completed: counts.completed,
            in_progress: counts.in_progress,
            pending: counts.pending,
            blocked: counts.blocked,
            completion_rate: completion_rate(counts.completed, counts.total),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryReport {
    pub total: i64,
    pub completed: i64,
    pub in_progress: i64,
    pub pending: i64,
    pub overdue: i64,
    pub completion_percentage: i64,
}

impl From<TaskReportCounts> for SummaryReport {
    fn from(counts: TaskReportCounts) -> Self {
        Self {
            total: counts.total,
            completed: counts.completed,
            in_progress: counts.in_progress,
            pending: counts.pending,
            overdue: counts.overdue,
            completion_percentage: completion_rate(counts.completed, counts.total),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    #[test]
    fn test_week_start_is_monday() {
        // 2024-06-12 is a Wednesday, 2024-06-16 a Sunday
        assert_eq!(week_start(date(6, 12)), date(6, 10));
        assert_eq!(week_start(date(6, 16)), date(6, 10));
        assert_eq!(week_start(date(6, 10)), date(6, 10));
    }

    #[test]
    fn test_windows_oldest_first_with_labels() {
        let windows = week_windows(date(6, 12), 3);
        assert_eq!(windows.len(), 3);
        assert_eq!(windows[0].start, date(5, 27));
        assert_eq!(windows[0].end, date(6, 2));
        assert_eq!(windows[0].label(), "May 27 - Jun 2");
        assert_eq!(windows[1].label(), "Last Week");
        assert_eq!(windows[2].label(), "This Week");
    }

    #[test]
    fn test_week_bounds_cover_sunday() {
        let window = WeekWindow::new(date(6, 12), 0);
        let (from, to) = window.bounds();
        assert_eq!(from.date_naive(), date(6, 10));
        assert_eq!(to.date_naive(), date(6, 17));
    }

    #[test]
    fn test_parse_weeks() {
        assert_eq!(parse_weeks(None), 4);
        assert_eq!(parse_weeks(Some("abc")), 4);
        assert_eq!(parse_weeks(Some("0")), 4);
        assert_eq!(parse_weeks(Some("8")), 8);
        assert_eq!(parse_weeks(Some("500")), MAX_WEEKS);
    }

    #[test]
    fn test_completion_rate_rounds() {
        assert_eq!(completion_rate(0, 0), 0);
        assert_eq!(completion_rate(1, 3), 33);
        assert_eq!(completion_rate(2, 3), 67);
    }

    #[test]
    fn test_weekly_report_numbering() {
        let window = WeekWindow::new(date(6, 12), 1);
        let counts = TaskReportCounts {
            total: 4,
            completed: 1,
            ..Default::default()
        };
        let report = WeeklyReport::new(&window, 4, counts);
        assert_eq!(report.week_number, 3);
        assert_eq!(report.completion_rate, 25);
    }

    #[test]
    fn test_employee_filter_for_admins_only() {
        let id = Id::new_v4();
        assert_eq!(report_assignee(true, Some(id)), Some(id));
        assert_eq!(report_assignee(false, Some(id)), None);
    }
}
