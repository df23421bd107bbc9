//! Audit log representer

use chrono::{DateTime, Utc};
use pm_core::Id;
use pm_models::{AuditAction, AuditEntityType, AuditLog, ChangeDetails, UserSummary};
use serde::Serialize;

use super::People;

/// One history entry with its author resolved
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogRepresentation {
    pub id: Id,
    pub entity_type: AuditEntityType,
    pub entity_id: Id,
    pub action: AuditAction,
    pub changed_by: Id,
    pub user: Option<UserSummary>,
    pub change_details: Option<ChangeDetails>,
    pub description: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl AuditLogRepresentation {
    pub fn represent_all(logs: Vec<AuditLog>, people: &People) -> Vec<Self> {
        logs.into_iter()
            .map(|log| Self {
                id: log.id,
                entity_type: log.entity_type,
                entity_id: log.entity_id,
                action: log.action,
                changed_by: log.changed_by,
                user: people.get(log.changed_by),
                change_details: log.change_details.map(|details| details.0),
                description: log.description,
                timestamp: log.timestamp,
            })
            .collect()
    }
}
