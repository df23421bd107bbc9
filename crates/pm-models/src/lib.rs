//! # pm-models
//!
//! Domain models for ProManager.
//!
//! Every entity is a plain struct that maps one-to-one onto its table
//! (`sqlx::FromRow`) and serializes to the camelCase JSON the API returns.
//! Closed vocabularies (designations, statuses, leave types, ...) are
//! text-backed enums stored as `TEXT` columns.

#[macro_use]
mod macros;

pub mod audit_log;
pub mod designation;
pub mod leave;
pub mod notification;
pub mod organization;
pub mod project;
pub mod session;
pub mod task;
pub mod team;
pub mod tracker;
pub mod user;

pub use audit_log::{AuditAction, AuditEntityType, AuditLog, ChangeDetails};
pub use designation::{Designation, Role};
pub use leave::{Leave, LeaveStatus, LeaveType};
pub use notification::{Notification, NotificationStatus, NotificationType};
pub use organization::{Industry, Organization, OrganizationSummary};
pub use project::{Methodology, Priority, Project, ProjectStatus, GENERAL_PROJECT_TITLE};
pub use session::OnlineSession;
pub use task::{Task, TaskComment, TaskStatus, DEFAULT_CATEGORY};
pub use team::Team;
pub use tracker::{PriorityCounts, TaskStatusCounts, Tracker};
pub use user::{NewUser, User, UserSummary};

/// Returned when text does not name a variant of a text-backed enum
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{value}' is not a valid {kind}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}
