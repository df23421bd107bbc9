//! Teams
//!
//! Table: teams

use chrono::{DateTime, Utc};
use pm_core::Id;
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: Id,
    pub name: String,
    pub description: Option<String>,
    pub manager_id: Option<Id>,
    pub members: Vec<Id>,
    pub organization_id: Id,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl_entity!(Team);
