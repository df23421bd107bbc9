//! API routes
//!
//! Every resource lives under `/api`.

use axum::{
    routing::{delete, get, patch, post, put},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::extractors::AppState;
use crate::handlers::{
    attendance, auth, leave, notifications, projects, reports, tasks, teams, tracker,
};

/// Create the complete API router
pub fn router() -> Router<AppState> {
    Router::new().nest("/api", api_router())
}

fn api_router() -> Router<AppState> {
    Router::new()
        .route("/ping", get(ping))
        .nest("/auth", auth_router())
        .nest("/projects", projects_router())
        .nest("/tasks", tasks_router())
        .nest("/attendance", attendance_router())
        .nest("/leave", leave_router())
        .nest("/tracker", tracker_router())
        .nest("/notifications", notifications_router())
        .nest("/teams", teams_router())
        .nest("/reports", reports_router())
}

fn auth_router() -> Router<AppState> {
    Router::new()
        .route("/create-organization", post(auth::create_organization))
        .route("/register-employee", post(auth::register_employee))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
        .route("/organizations", get(auth::organizations))
        .route("/organization-users", get(auth::organization_users))
        .route("/active-employees", get(auth::active_employees))
        .route("/cleanup-sessions", post(auth::cleanup_sessions))
        .route("/terminate-session/:session_id", post(auth::terminate_session))
        .route("/update-role/:user_id", patch(auth::update_role))
        .route("/forgot-password", post(auth::forgot_password))
        .route("/reset-password", post(auth::reset_password))
        .route("/employees", get(auth::employees))
        .route("/update-profile", patch(auth::update_profile))
}

fn projects_router() -> Router<AppState> {
    Router::new()
        .route("/", get(projects::list_projects).post(projects::create_project))
        .route(
            "/:id",
            get(projects::get_project)
                .put(projects::update_project)
                .delete(projects::delete_project),
        )
        .route("/:id/assign-employees", post(projects::assign_employees))
        .route("/:id/history", get(projects::project_history))
}

fn tasks_router() -> Router<AppState> {
    Router::new()
        .route("/", get(tasks::list_tasks).post(tasks::create_task))
        .route("/project/:project_id", get(tasks::list_project_tasks))
        .route(
            "/:id",
            get(tasks::get_task)
                .put(tasks::update_task)
                .delete(tasks::delete_task),
        )
        .route("/:id/status", patch(tasks::update_status))
        .route("/:id/comments", post(tasks::add_comment))
        .route("/:id/time-spent", patch(tasks::update_time_spent))
        .route("/:id/block", patch(tasks::block_task))
        .route("/:id/history", get(tasks::task_history))
}

fn attendance_router() -> Router<AppState> {
    Router::new()
        .route("/personal", get(attendance::personal))
        .route("/personal/range", get(attendance::personal_range))
        .route("/organization/all", get(attendance::organization_all))
        .route("/organization/active", get(attendance::organization_active))
        .route("/organization/daily-summary", get(attendance::daily_summary))
        .route("/employee/:user_id", get(attendance::employee))
}

fn leave_router() -> Router<AppState> {
    Router::new()
        .route("/apply", post(leave::apply))
        .route("/personal", get(leave::personal))
        .route("/personal/:status", get(leave::personal_by_status))
        .route("/organization/all", get(leave::organization_all))
        .route("/organization/pending", get(leave::organization_pending))
        .route("/organization/on-leave", get(leave::on_leave))
        .route("/organization/calendar", get(leave::calendar))
        .route("/employee/:user_id", get(leave::employee))
        .route("/:id/approve", post(leave::approve))
        .route("/:id/reject", post(leave::reject))
        .route("/:id", delete(leave::cancel))
}

fn tracker_router() -> Router<AppState> {
    Router::new()
        .route("/", get(tracker::personal))
        .route("/organization", get(tracker::organization))
}

fn notifications_router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(notifications::list_notifications).post(notifications::create_notification),
        )
        .route("/:id/read", patch(notifications::mark_read))
}

fn teams_router() -> Router<AppState> {
    Router::new()
        .route("/", get(teams::list_teams).post(teams::create_team))
        .route("/:id", put(teams::update_team))
}

fn reports_router() -> Router<AppState> {
    Router::new()
        .route("/weekly", get(reports::weekly))
        .route("/summary", get(reports::summary))
}

#[derive(Serialize)]
struct Ping {
    status: &'static str,
    timestamp: DateTime<Utc>,
}

async fn ping() -> Json<Ping> {
    Json(Ping {
        status: "ok",
        timestamp: Utc::now(),
    })
}
