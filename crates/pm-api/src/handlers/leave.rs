//! Leave API handlers
//!
//! Routes under `/api/leave`.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::Utc;
use pm_contracts::leaves::{LeaveApplicationContract, LeaveParams, RejectLeaveParams};
use pm_contracts::Contract;
use pm_core::Id;
use pm_db::{CreateLeaveDto, LeaveRepository, UserRepository};
use pm_models::{Leave, LeaveStatus};
use pm_services::leave as rules;
use serde::{Deserialize, Serialize};

use super::message;
use crate::error::{ApiError, ApiResult};
use crate::extractors::{ApiPath, ApiQuery, AppState, AuthenticatedUser, JsonBody};
use crate::representers::{ActiveLeaveRepresentation, LeaveRepresentation, People};

async fn find_leave(repo: &LeaveRepository, id: Id, organization_id: Id) -> ApiResult<Leave> {
    repo.find_in_organization(id, organization_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Leave request"))
}

async fn represent_all(
    state: &AppState,
    organization_id: Id,
    leaves: Vec<Leave>,
) -> ApiResult<Vec<LeaveRepresentation>> {
    let people = People::load(
        state.pool()?,
        organization_id,
        leaves
            .iter()
            .flat_map(|l| std::iter::once(l.user_id).chain(l.approved_by)),
    )
    .await?;
    Ok(LeaveRepresentation::represent_all(leaves, &people))
}

async fn represent(state: &AppState, leave: Leave) -> ApiResult<LeaveRepresentation> {
    represent_all(state, leave.organization_id, vec![leave])
        .await?
        .pop()
        .ok_or_else(|| ApiError::internal("Leave representation missing"))
}

/// POST /api/leave/apply
pub async fn apply(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    JsonBody(params): JsonBody<LeaveParams>,
) -> ApiResult<impl IntoResponse> {
    user.require_org_member()?;
    LeaveApplicationContract.validate(&params)?;
    let request = params
        .request()
        .ok_or_else(|| ApiError::bad_request("Leave type, start date, and end date are required"))?;

    let leave = LeaveRepository::new(state.pool()?.clone())
        .create(CreateLeaveDto {
            user_id: user.id,
            organization_id: user.organization_id,
            leave_type: request.leave_type,
            start_date: request.start_date,
            end_date: request.end_date,
            reason: params.reason.clone(),
            number_of_days: request.number_of_days,
        })
        .await?;

    tracing::info!(leave_id = %leave.id, user_id = %user.id, "Leave requested");

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "message": "Leave request submitted successfully",
            "leave": leave,
        })),
    ))
}

/// GET /api/leave/personal
pub async fn personal(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<impl IntoResponse> {
    user.require_org_member()?;

    let leaves = LeaveRepository::new(state.pool()?.clone())
        .list_for_user(user.id, user.organization_id, None)
        .await?;
    Ok(Json(represent_all(&state, user.organization_id, leaves).await?))
}

/// GET /api/leave/personal/:status
pub async fn personal_by_status(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ApiPath(status): ApiPath<String>,
) -> ApiResult<impl IntoResponse> {
    user.require_org_member()?;
    let status: LeaveStatus = status
        .parse()
        .map_err(|_| ApiError::bad_request("Invalid status"))?;

    let leaves = LeaveRepository::new(state.pool()?.clone())
        .list_for_user(user.id, user.organization_id, Some(status))
        .await?;
    Ok(Json(represent_all(&state, user.organization_id, leaves).await?))
}

/// GET /api/leave/organization/all
pub async fn organization_all(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<impl IntoResponse> {
    user.require_admin()?;
    user.require_org_member()?;

    let leaves = LeaveRepository::new(state.pool()?.clone())
        .list_for_organization(user.organization_id)
        .await?;
    Ok(Json(represent_all(&state, user.organization_id, leaves).await?))
}

/// GET /api/leave/organization/pending
pub async fn organization_pending(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<impl IntoResponse> {
    user.require_admin()?;
    user.require_org_member()?;

    let leaves = LeaveRepository::new(state.pool()?.clone())
        .list_pending(user.organization_id)
        .await?;
    Ok(Json(represent_all(&state, user.organization_id, leaves).await?))
}

/// POST /api/leave/:id/approve
///
/// Flags the requester as on leave when the approved range covers today.
pub async fn approve(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ApiPath(id): ApiPath<Id>,
) -> ApiResult<impl IntoResponse> {
    user.require_admin()?;
    user.require_org_member()?;

    let pool = state.pool()?;
    let repo = LeaveRepository::new(pool.clone());
    let leave = find_leave(&repo, id, user.organization_id).await?;
    rules::ensure_pending(&leave)?;

    let now = Utc::now();
    let leave = repo.approve(leave.id, user.id, now).await?;
    if rules::starts_leave_today(&leave, now.date_naive()) {
        UserRepository::new(pool.clone())
            .set_on_leave(leave.user_id, true)
            .await?;
    }

    tracing::info!(leave_id = %leave.id, approved_by = %user.id, "Leave approved");

    Ok(Json(serde_json::json!({
        "message": "Leave request approved successfully",
        "leave": represent(&state, leave).await?,
    })))
}

/// POST /api/leave/:id/reject
pub async fn reject(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ApiPath(id): ApiPath<Id>,
    body: Option<JsonBody<RejectLeaveParams>>,
) -> ApiResult<impl IntoResponse> {
    user.require_admin()?;
    user.require_org_member()?;

    let repo = LeaveRepository::new(state.pool()?.clone());
    let leave = find_leave(&repo, id, user.organization_id).await?;
    rules::ensure_pending(&leave)?;

    let reason = body
        .and_then(|JsonBody(params)| params.rejection_reason)
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty());
    let leave = repo
        .reject(leave.id, user.id, reason.as_deref(), Utc::now())
        .await?;

    Ok(Json(serde_json::json!({
        "message": "Leave request rejected successfully",
        "leave": represent(&state, leave).await?,
    })))
}

/// GET /api/leave/organization/on-leave
pub async fn on_leave(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<impl IntoResponse> {
    user.require_admin()?;
    user.require_org_member()?;

    let today = Utc::now().date_naive();
    let pool = state.pool()?;
    let leaves = LeaveRepository::new(pool.clone())
        .list_approved_overlapping(user.organization_id, today, today)
        .await?;

    let active = rules::active_leaves(leaves, today);
    let people = People::load(
        pool,
        user.organization_id,
        active.iter().map(|a| a.leave.user_id),
    )
    .await?;
    Ok(Json(ActiveLeaveRepresentation::represent_all(active, &people)))
}

/// GET /api/leave/employee/:userId
pub async fn employee(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ApiPath(user_id): ApiPath<Id>,
) -> ApiResult<impl IntoResponse> {
    user.require_admin()?;
    user.require_org_member()?;

    let leaves = LeaveRepository::new(state.pool()?.clone())
        .list_for_user(user_id, user.organization_id, None)
        .await?;
    if leaves.is_empty() {
        return Err(ApiError::NotFound("No leave records found".into()));
    }
    Ok(Json(represent_all(&state, user.organization_id, leaves).await?))
}

#[derive(Debug, Default, Deserialize)]
pub struct CalendarQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct LeaveCalendar {
    pub year: i32,
    pub month: u32,
    pub leaves: Vec<LeaveRepresentation>,
}

/// GET /api/leave/organization/calendar?year&month
pub async fn calendar(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ApiQuery(query): ApiQuery<CalendarQuery>,
) -> ApiResult<impl IntoResponse> {
    user.require_admin()?;
    user.require_org_member()?;

    let (Some(year), Some(month)) = (query.year, query.month) else {
        return Err(ApiError::bad_request("Year and month are required"));
    };
    let (first, last) = rules::month_bounds(year, month)
        .ok_or_else(|| ApiError::bad_request("Invalid year or month"))?;

    let leaves = LeaveRepository::new(state.pool()?.clone())
        .list_approved_overlapping(user.organization_id, first, last)
        .await?;

    Ok(Json(LeaveCalendar {
        year,
        month,
        leaves: represent_all(&state, user.organization_id, leaves).await?,
    }))
}

/// DELETE /api/leave/:id
///
/// Employees may cancel only their own requests.
pub async fn cancel(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ApiPath(id): ApiPath<Id>,
) -> ApiResult<impl IntoResponse> {
    user.require_org_member()?;

    let repo = LeaveRepository::new(state.pool()?.clone());
    let leave = find_leave(&repo, id, user.organization_id).await?;

    if user.is_employee() && leave.user_id != user.id {
        return Err(ApiError::forbidden("Not authorized to cancel this leave"));
    }
    if !leave.is_pending() {
        return Err(ApiError::bad_request("Can only cancel pending leave requests"));
    }

    repo.delete(leave.id).await?;
    Ok(message("Leave request cancelled successfully"))
}
