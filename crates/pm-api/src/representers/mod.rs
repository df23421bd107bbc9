//! API Representers
//!
//! Convert stored entities into response payloads, replacing user ids with
//! user summaries where the client expects people.

pub mod attendance;
pub mod audit;
pub mod leave;
pub mod notification;
pub mod project;
pub mod task;
pub mod team;

use std::collections::HashMap;

use pm_core::Id;
use pm_db::{PgPool, UserRepository};
use pm_models::UserSummary;

use crate::error::ApiResult;

pub use attendance::{DailyAttendanceRepresentation, UserAttendanceRepresentation};
pub use audit::AuditLogRepresentation;
pub use leave::{ActiveLeaveRepresentation, LeaveRepresentation};
pub use notification::NotificationRepresentation;
pub use project::ProjectRepresentation;
pub use task::{CommentRepresentation, TaskRepresentation};
pub use team::TeamRepresentation;

/// User summaries keyed by id, loaded in one query
#[derive(Debug, Clone, Default)]
pub struct People(HashMap<Id, UserSummary>);

impl People {
    /// Load summaries for `ids` within one organization. Users that no
    /// longer exist, or belong elsewhere, are absent.
    pub async fn load(
        pool: &PgPool,
        organization_id: Id,
        ids: impl IntoIterator<Item = Id>,
    ) -> ApiResult<Self> {
        let mut ids: Vec<Id> = ids.into_iter().collect();
        ids.sort_unstable();
        ids.dedup();

        let summaries = UserRepository::new(pool.clone())
            .find_summaries(&ids, organization_id)
            .await?;
        Ok(Self::from_summaries(summaries))
    }

    pub fn from_summaries(summaries: impl IntoIterator<Item = UserSummary>) -> Self {
        People(summaries.into_iter().map(|s| (s.id, s)).collect())
    }

    pub fn get(&self, id: Id) -> Option<UserSummary> {
        self.0.get(&id).cloned()
    }

    /// Resolve several ids, keeping their order and skipping unknown users
    pub fn pick(&self, ids: &[Id]) -> Vec<UserSummary> {
        ids.iter().filter_map(|id| self.0.get(id).cloned()).collect()
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pick_keeps_order_and_skips_unknown() {
        let ada = fixtures::summary("Ada");
        let bob = fixtures::summary("Bob");
        let people = People::from_summaries(vec![ada.clone(), bob.clone()]);

        let picked = people.pick(&[bob.id, Id::new_v4(), ada.id]);
        assert_eq!(picked, vec![bob, ada.clone()]);
        assert_eq!(people.get(ada.id), Some(ada));
    }
}
