//! Attendance API handlers
//!
//! Routes under `/api/attendance`. Attendance is derived from the online
//! sessions opened at login.

use axum::{extract::State, response::IntoResponse, Json};
use chrono::{DateTime, NaiveDate, Utc};
use pm_core::Id;
use pm_db::SessionRepository;
use pm_models::{OnlineSession, UserSummary};
use pm_services::attendance::{self, AttendanceStats};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::extractors::{ApiPath, ApiQuery, AppState, AuthenticatedUser};
use crate::representers::{DailyAttendanceRepresentation, People, UserAttendanceRepresentation};

#[derive(Debug, Serialize)]
pub struct SessionsWithStats {
    pub sessions: Vec<OnlineSession>,
    pub stats: AttendanceStats,
}

impl SessionsWithStats {
    fn new(sessions: Vec<OnlineSession>) -> Self {
        Self {
            stats: AttendanceStats::from_sessions(&sessions),
            sessions,
        }
    }
}

async fn sessions_with_stats(state: &AppState, user_id: Id, organization_id: Id) -> ApiResult<SessionsWithStats> {
    let sessions = SessionRepository::new(state.pool()?.clone())
        .list_for_user(user_id, organization_id, None)
        .await?;
    Ok(SessionsWithStats::new(sessions))
}

/// GET /api/attendance/personal
pub async fn personal(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<impl IntoResponse> {
    user.require_org_member()?;
    Ok(Json(sessions_with_stats(&state, user.id, user.organization_id).await?))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeAttendance {
    pub sessions: Vec<OnlineSession>,
    pub total_hours: i64,
    pub total_minutes: i64,
}

/// GET /api/attendance/personal/range?startDate&endDate
///
/// Both dates are inclusive.
pub async fn personal_range(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ApiQuery(query): ApiQuery<RangeQuery>,
) -> ApiResult<impl IntoResponse> {
    user.require_org_member()?;
    let (Some(start), Some(end)) = (query.start_date, query.end_date) else {
        return Err(ApiError::bad_request("startDate and endDate are required"));
    };
    if end < start {
        return Err(ApiError::bad_request("endDate must not be before startDate"));
    }

    let sessions = SessionRepository::new(state.pool()?.clone())
        .list_for_user(
            user.id,
            user.organization_id,
            Some(attendance::range_bounds(start, end)),
        )
        .await?;

    let total_minutes = attendance::total_minutes(&sessions);
    Ok(Json(RangeAttendance {
        sessions,
        total_hours: total_minutes / 60,
        total_minutes,
    }))
}

/// GET /api/attendance/organization/all
pub async fn organization_all(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<impl IntoResponse> {
    user.require_admin()?;
    user.require_org_member()?;

    let pool = state.pool()?;
    let sessions = SessionRepository::new(pool.clone())
        .list_for_organization(user.organization_id, None)
        .await?;
    let groups = attendance::group_by_user(sessions);
    let people = People::load(pool, user.organization_id, groups.iter().map(|g| g.user_id)).await?;

    Ok(Json(UserAttendanceRepresentation::represent_all(groups, &people)))
}

/// GET /api/attendance/employee/:userId
pub async fn employee(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ApiPath(user_id): ApiPath<Id>,
) -> ApiResult<impl IntoResponse> {
    user.require_admin()?;
    user.require_org_member()?;
    Ok(Json(sessions_with_stats(&state, user_id, user.organization_id).await?))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveSession {
    pub session_id: Id,
    pub user: Option<UserSummary>,
    pub login_at: DateTime<Utc>,
    /// Minutes since login
    pub duration: i64,
}

/// GET /api/attendance/organization/active
pub async fn organization_active(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<impl IntoResponse> {
    user.require_admin()?;
    user.require_org_member()?;

    let pool = state.pool()?;
    let sessions = SessionRepository::new(pool.clone())
        .list_active(user.organization_id)
        .await?;
    let people = People::load(
        pool,
        user.organization_id,
        sessions.iter().map(|s| s.user_id),
    )
    .await?;

    let now = Utc::now();
    let active: Vec<ActiveSession> = sessions
        .into_iter()
        .map(|session| ActiveSession {
            session_id: session.id,
            user: people.get(session.user_id),
            login_at: session.login_at,
            duration: session.minutes_since_login(now),
        })
        .collect();

    Ok(Json(active))
}

#[derive(Debug, Default, Deserialize)]
pub struct DailyQuery {
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub summary: Vec<DailyAttendanceRepresentation>,
}

/// GET /api/attendance/organization/daily-summary?date
///
/// Defaults to today (UTC).
pub async fn daily_summary(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ApiQuery(query): ApiQuery<DailyQuery>,
) -> ApiResult<impl IntoResponse> {
    user.require_admin()?;
    user.require_org_member()?;

    let date = query.date.unwrap_or_else(|| Utc::now().date_naive());
    let pool = state.pool()?;
    let sessions = SessionRepository::new(pool.clone())
        .list_for_organization(user.organization_id, Some(attendance::day_bounds(date)))
        .await?;

    let summaries = attendance::daily_summary(sessions);
    let people = People::load(
        pool,
        user.organization_id,
        summaries.iter().map(|s| s.user_id),
    )
    .await?;

    Ok(Json(DailySummary {
        date,
        summary: DailyAttendanceRepresentation::represent_all(summaries, &people),
    }))
}
