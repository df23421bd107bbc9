//! Audit log entries
//!
//! Table: audit_logs. Rows are append-only; the table rejects updates.

use chrono::{DateTime, Utc};
use pm_core::Id;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

text_enum! {
    pub enum AuditEntityType {
        Project => "project",
        Task => "task",
        Assignment => "assignment",
        Requirement => "requirement",
        Deadline => "deadline",
    }
}

text_enum! {
    pub enum AuditAction {
        Create => "create",
        Update => "update",
        Delete => "delete",
        StatusChange => "status_change",
        AssignmentChange => "assignment_change",
        DeadlineChange => "deadline_change",
        RequirementChange => "requirement_change",
    }
}

/// Before/after values of a single changed field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeDetails {
    pub field_changed: String,
    pub old_value: serde_json::Value,
    pub new_value: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AuditLog {
    pub id: Id,
    pub entity_type: AuditEntityType,
    pub entity_id: Id,
    pub action: AuditAction,
    pub changed_by: Id,
    pub organization_id: Id,
    pub change_details: Option<Json<ChangeDetails>>,
    pub description: Option<String>,
    pub ip_address: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl pm_core::Identifiable for AuditLog {
    fn id(&self) -> Id {
        self.id
    }
}

impl pm_core::OrganizationScoped for AuditLog {
    fn organization_id(&self) -> Id {
        self.organization_id
    }
}
