//! # pm-db
//!
//! Database layer for ProManager.
//!
//! - Connection pool management and migrations
//! - One repository per table, all scoped by organization where it matters
//! - Aggregate queries backing trackers and reports
//!
//! ## Example
//!
//! ```ignore
//! use pm_db::{Database, DatabaseConfig, ProjectRepository};
//!
//! let db = Database::connect(&DatabaseConfig::with_url(url)).await?;
//! db.migrate().await?;
//!
//! let projects = ProjectRepository::new(db.pool().clone());
//! let visible = projects.list_visible(org_id, Some(user_id)).await?;
//! ```

pub mod audit_logs;
pub mod leaves;
pub mod notifications;
pub mod organizations;
pub mod pool;
pub mod projects;
pub mod repository;
pub mod sessions;
pub mod tasks;
pub mod teams;
pub mod trackers;
pub mod users;

#[cfg(test)]
mod test_support;

// Re-exports
pub use audit_logs::{AuditLogRepository, CreateAuditLogDto};
pub use leaves::{CreateLeaveDto, LeaveRepository};
pub use notifications::{CreateNotificationDto, NotificationRepository};
pub use organizations::OrganizationRepository;
pub use pool::{ping, Database, DatabaseConfig};
pub use projects::{CreateProjectDto, ProjectCounts, ProjectRepository, UpdateProjectDto};
pub use repository::{Repository, RepositoryError, RepositoryResult};
pub use sessions::{ClientInfo, SessionRepository};
pub use tasks::{CreateTaskDto, TaskFilter, TaskReportCounts, TaskRepository, UpdateTaskDto};
pub use teams::{CreateTeamDto, TeamRepository, UpdateTeamDto};
pub use trackers::TrackerRepository;
pub use users::{UpdateProfileDto, UserRepository};

pub use sqlx::PgPool;
