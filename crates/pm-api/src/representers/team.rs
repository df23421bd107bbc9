//! Team representer

use chrono::{DateTime, Utc};
use pm_core::Id;
use pm_models::{Team, UserSummary};
use serde::Serialize;

use super::People;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamRepresentation {
    pub id: Id,
    pub name: String,
    pub description: Option<String>,
    pub manager: Option<UserSummary>,
    pub members: Vec<UserSummary>,
    pub organization_id: Id,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TeamRepresentation {
    pub fn people_ids(team: &Team) -> impl Iterator<Item = Id> + '_ {
        team.manager_id.into_iter().chain(team.members.iter().copied())
    }

    pub fn represent(team: Team, people: &People) -> Self {
        Self {
            manager: team.manager_id.and_then(|id| people.get(id)),
            members: people.pick(&team.members),
            id: team.id,
            name: team.name,
            description: team.description,
            organization_id: team.organization_id,
            created_at: team.created_at,
            updated_at: team.updated_at,
        }
    }
}
