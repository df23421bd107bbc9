//! Leave representers

use pm_models::{Leave, UserSummary};
use pm_services::leave::ActiveLeave;
use serde::Serialize;

use super::People;

/// A leave request with its requester and approver resolved
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveRepresentation {
    #[serde(flatten)]
    pub leave: Leave,
    pub user: Option<UserSummary>,
    pub approver: Option<UserSummary>,
}

impl LeaveRepresentation {
    pub fn represent_all(leaves: Vec<Leave>, people: &People) -> Vec<Self> {
        leaves
            .into_iter()
            .map(|leave| Self {
                user: people.get(leave.user_id),
                approver: leave.approved_by.and_then(|id| people.get(id)),
                leave,
            })
            .collect()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ActiveLeaveRepresentation {
    #[serde(flatten)]
    pub active: ActiveLeave,
    pub user: Option<UserSummary>,
}

impl ActiveLeaveRepresentation {
    pub fn represent_all(active: Vec<ActiveLeave>, people: &People) -> Vec<Self> {
        active
            .into_iter()
            .map(|active| Self {
                user: people.get(active.leave.user_id),
                active,
            })
            .collect()
    }
}
