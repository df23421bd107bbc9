//! Attendance arithmetic over online sessions
//!
//! Session durations are stored in seconds; every total here is derived
//! from whole minutes (`duration / 60`).

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Duration, NaiveDate, Utc};
use pm_core::Id;
use pm_models::OnlineSession;
use serde::Serialize;

/// Totals over a set of sessions
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceStats {
    pub total_sessions: usize,
    pub total_hours: i64,
    pub total_minutes: i64,
    pub total_days: usize,
    pub average_hours_per_day: f64,
}

impl AttendanceStats {
    pub fn from_sessions(sessions: &[OnlineSession]) -> Self {
        let total_minutes = total_minutes(sessions);
        let total_days = sessions
            .iter()
            .map(|s| s.login_at.date_naive())
            .collect::<BTreeSet<_>>()
            .len();

        let average_hours_per_day = if total_days > 0 {
            round2(total_minutes as f64 / 60.0 / total_days as f64)
        } else {
            0.0
        };

        Self {
            total_sessions: sessions.len(),
            total_hours: total_minutes / 60,
            total_minutes,
            total_days,
            average_hours_per_day,
        }
    }
}

/// Sum of whole minutes across sessions
pub fn total_minutes(sessions: &[OnlineSession]) -> i64 {
    sessions.iter().map(OnlineSession::duration_minutes).sum()
}

/// Sessions of one user within an organization-wide listing
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAttendance {
    pub user_id: Id,
    pub total_sessions: usize,
    pub total_minutes: i64,
    pub total_hours: i64,
    pub last_login: Option<DateTime<Utc>>,
    pub sessions: Vec<OnlineSession>,
}

/// Group sessions per user, keeping the order in which users first appear.
pub fn group_by_user(sessions: Vec<OnlineSession>) -> Vec<UserAttendance> {
    let mut order: Vec<Id> = Vec::new();
    let mut groups: HashMap<Id, Vec<OnlineSession>> = HashMap::new();

    for session in sessions {
        if !groups.contains_key(&session.user_id) {
            order.push(session.user_id);
        }
        groups.entry(session.user_id).or_default().push(session);
    }

    order
        .into_iter()
        .filter_map(|user_id| groups.remove(&user_id).map(|s| (user_id, s)))
        .map(|(user_id, sessions)| {
            let total_minutes = total_minutes(&sessions);
            UserAttendance {
                user_id,
                total_sessions: sessions.len(),
                total_minutes,
                total_hours: total_minutes / 60,
                last_login: sessions.iter().map(|s| s.login_at).max(),
                sessions,
            }
        })
        .collect()
}

/// One user's share of a day
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyUserSummary {
    pub user_id: Id,
    pub total_minutes: i64,
    /// Hours to two decimals
    pub total_hours: f64,
    pub sessions: Vec<OnlineSession>,
}

pub fn daily_summary(sessions: Vec<OnlineSession>) -> Vec<DailyUserSummary> {
    group_by_user(sessions)
        .into_iter()
        .map(|group| DailyUserSummary {
            user_id: group.user_id,
            total_minutes: group.total_minutes,
            total_hours: round2(group.total_minutes as f64 / 60.0),
            sessions: group.sessions,
        })
        .collect()
}

/// `[midnight, next midnight)` of a UTC day
pub fn day_bounds(date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = date.and_time(chrono::NaiveTime::MIN).and_utc();
    (start, start + Duration::days(1))
}

/// `[start midnight, midnight after end)`: both days included
pub fn range_bounds(start: NaiveDate, end: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let (from, _) = day_bounds(start);
    let (_, to) = day_bounds(end);
    (from, to)
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
