//! Tracker API handlers
//!
//! Routes under `/api/tracker`.

use axum::{extract::State, response::IntoResponse, Json};
use chrono::{Duration, Utc};
use pm_core::Id;
use pm_db::{PgPool, ProjectRepository, TaskRepository, TrackerRepository};
use pm_models::Designation;
use pm_services::attendance::day_bounds;
use pm_services::tracker::{next_streak, OrganizationTracker, Streak, TrackerStats};

use crate::error::ApiResult;
use crate::extractors::{AppState, AuthenticatedUser};

/// Aggregate projects and tasks of an organization. With `member`, only
/// projects the user owns or is assigned to and tasks assigned to them.
async fn compute_stats(pool: &PgPool, organization_id: Id, member: Option<Id>) -> ApiResult<TrackerStats> {
    let projects = ProjectRepository::new(pool.clone());
    let tasks = TaskRepository::new(pool.clone());

    let (project_counts, statuses, priorities, minutes) = tokio::try_join!(
        projects.counts(organization_id, member),
        tasks.status_counts(organization_id, member),
        tasks.priority_counts(organization_id, member),
        tasks.total_time_spent(organization_id, member),
    )?;

    Ok(TrackerStats::compute(
        project_counts,
        &statuses,
        &priorities,
        minutes,
    ))
}

/// GET /api/tracker
///
/// Recomputes and stores the caller's tracker, advancing the daily streak.
pub async fn personal(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<impl IntoResponse> {
    user.require_org_member()?;

    let pool = state.pool()?;
    let trackers = TrackerRepository::new(pool.clone());
    let mut tracker = trackers.ensure(user.id, user.organization_id).await?;

    let stats = compute_stats(pool, user.organization_id, Some(user.id)).await?;
    stats.apply_to(&mut tracker);

    let today = Utc::now().date_naive();
    let (today_start, tomorrow_start) = day_bounds(today);
    let (yesterday_start, _) = day_bounds(today - Duration::days(1));

    let tasks = TaskRepository::new(pool.clone());
    let (touched_today, touched_yesterday) = tokio::try_join!(
        tasks.count_updated_between(user.id, today_start, tomorrow_start),
        tasks.count_updated_between(user.id, yesterday_start, today_start),
    )?;

    let streak = next_streak(
        Streak {
            days: tracker.streak,
            last_activity_date: tracker.last_activity_date,
        },
        today,
        touched_today > 0,
        touched_yesterday > 0,
    );
    tracker.streak = streak.days;
    tracker.last_activity_date = streak.last_activity_date;

    let tracker = trackers.save(&tracker).await?;
    tracing::debug!(user_id = %user.id, streak = tracker.streak, "Tracker refreshed");

    Ok(Json(tracker))
}

/// GET /api/tracker/organization
pub async fn organization(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<impl IntoResponse> {
    user.require_designation(&[Designation::TeamLead])?;
    user.require_org_member()?;

    let stats = compute_stats(state.pool()?, user.organization_id, None).await?;
    Ok(Json(OrganizationTracker {
        organization_id: user.organization_id,
        stats,
    }))
}
