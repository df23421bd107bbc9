//! API handlers

pub mod attendance;
pub mod auth;
pub mod leave;
pub mod notifications;
pub mod projects;
pub mod reports;
pub mod tasks;
pub mod teams;
pub mod tracker;

use axum::Json;
use pm_core::Id;
use pm_db::{PgPool, TaskRepository, TeamRepository, UserRepository};
use serde::Serialize;

use crate::error::{ApiError, ApiResult};

pub(crate) const OWNER_OUTSIDE_ORGANIZATION: &str = "Project owner must belong to your organization";
pub(crate) const ASSIGNEES_OUTSIDE_ORGANIZATION: &str =
    "Assigned employees must belong to your organization";

/// `{ "message": ... }`
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

pub fn message(text: impl Into<String>) -> Json<MessageResponse> {
    Json(MessageResponse {
        message: text.into(),
    })
}

/// Reject with 400 unless every id names a user of the organization
pub(crate) async fn ensure_users_in_organization(
    pool: &PgPool,
    organization_id: Id,
    ids: &[Id],
    message: &str,
) -> ApiResult<()> {
    let outside = UserRepository::new(pool.clone())
        .outside_organization(ids, organization_id)
        .await?;
    if !outside.is_empty() {
        tracing::debug!(?outside, %organization_id, "rejected users from another organization");
        return Err(ApiError::bad_request(message));
    }
    Ok(())
}

pub(crate) async fn ensure_team_in_organization(
    pool: &PgPool,
    organization_id: Id,
    team_id: Id,
) -> ApiResult<()> {
    TeamRepository::new(pool.clone())
        .find_in_organization(team_id, organization_id)
        .await?
        .ok_or_else(|| ApiError::bad_request("Assigned team must belong to your organization"))?;
    Ok(())
}

pub(crate) async fn ensure_task_in_organization(
    pool: &PgPool,
    organization_id: Id,
    task_id: Id,
) -> ApiResult<()> {
    TaskRepository::new(pool.clone())
        .find_in_organization(task_id, organization_id)
        .await?
        .ok_or_else(|| ApiError::bad_request("Task must belong to your organization"))?;
    Ok(())
}
