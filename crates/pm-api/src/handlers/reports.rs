//! Report API handlers
//!
//! Routes under `/api/reports`.

use axum::{extract::State, response::IntoResponse, Json};
use chrono::Utc;
use pm_core::Id;
use pm_db::TaskRepository;
use pm_services::reports::{self, SummaryReport, WeeklyReport};
use serde::Deserialize;

use crate::error::ApiResult;
use crate::extractors::{ApiQuery, AppState, AuthenticatedUser};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyQuery {
    pub weeks: Option<String>,
    pub employee_id: Option<Id>,
}

/// GET /api/reports/weekly?weeks=4&employeeId
///
/// Counts tasks created in each week, oldest week first.
pub async fn weekly(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ApiQuery(query): ApiQuery<WeeklyQuery>,
) -> ApiResult<impl IntoResponse> {
    user.require_org_member()?;

    let weeks = reports::parse_weeks(query.weeks.as_deref());
    let assignee = reports::report_assignee(user.is_admin(), query.employee_id);
    let today = Utc::now().date_naive();

    let tasks = TaskRepository::new(state.pool()?.clone());
    let mut report = Vec::with_capacity(weeks);
    for window in reports::week_windows(today, weeks) {
        let counts = tasks
            .report_counts(user.organization_id, assignee, Some(window.bounds()), today)
            .await?;
        report.push(WeeklyReport::new(&window, weeks, counts));
    }

    Ok(Json(report))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryQuery {
    pub employee_id: Option<Id>,
}

/// GET /api/reports/summary?employeeId
pub async fn summary(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ApiQuery(query): ApiQuery<SummaryQuery>,
) -> ApiResult<impl IntoResponse> {
    user.require_org_member()?;

    let assignee = reports::report_assignee(user.is_admin(), query.employee_id);
    let counts = TaskRepository::new(state.pool()?.clone())
        .report_counts(user.organization_id, assignee, None, Utc::now().date_naive())
        .await?;

    Ok(Json(SummaryReport::from(counts)))
}
