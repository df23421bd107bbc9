//! Attendance representers

use pm_models::UserSummary;
use pm_services::attendance::{DailyUserSummary, UserAttendance};
use serde::Serialize;

use super::People;

#[derive(Debug, Clone, Serialize)]
pub struct UserAttendanceRepresentation {
    pub user: Option<UserSummary>,
    #[serde(flatten)]
    pub attendance: UserAttendance,
}

impl UserAttendanceRepresentation {
    pub fn represent_all(groups: Vec<UserAttendance>, people: &People) -> Vec<Self> {
        groups
            .into_iter()
            .map(|attendance| Self {
                user: people.get(attendance.user_id),
                attendance,
            })
            .collect()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DailyAttendanceRepresentation {
    pub user: Option<UserSummary>,
    #[serde(flatten)]
    pub summary: DailyUserSummary,
}

impl DailyAttendanceRepresentation {
    pub fn represent_all(summaries: Vec<DailyUserSummary>, people: &People) -> Vec<Self> {
        summaries
            .into_iter()
            .map(|summary| Self {
                user: people.get(summary.user_id),
                summary,
            })
            .collect()
    }
}
