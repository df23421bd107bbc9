//! Task API handlers
//!
//! Routes under `/api/tasks`.

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use pm_auth::{ProjectVisibility, TaskVisibility};
use pm_contracts::tasks::{
    BlockParams, CommentContract, CommentParams, StatusChangeParams, TaskCreateContract,
    TaskParams, TaskUpdateContract, TimeSpentParams,
};
use pm_contracts::Contract;
use pm_core::Id;
use pm_db::{
    AuditLogRepository, CreateProjectDto, CreateTaskDto, PgPool, ProjectRepository, Repository,
    TaskFilter, TaskRepository, UpdateTaskDto,
};
use pm_models::{
    AuditAction, AuditEntityType, Methodology, Priority, Project, ProjectStatus, Task,
    TaskStatus, DEFAULT_CATEGORY, GENERAL_PROJECT_TITLE,
};
use pm_services::tasks::{self as rules, BLOCK_DENIED, EMPLOYEE_UPDATE_DENIED};
use pm_services::AuditEntry;
use serde::Deserialize;

use super::{
    ensure_team_in_organization, ensure_users_in_organization, message,
    ASSIGNEES_OUTSIDE_ORGANIZATION,
};
use crate::error::{ApiError, ApiResult};
use crate::extractors::{ApiPath, ApiQuery, AppState, AuthenticatedUser, JsonBody, RequestClient};
use crate::representers::{
    AuditLogRepresentation, CommentRepresentation, People, TaskRepresentation,
};

pub(crate) const TIME_SPENT_LIMIT: &str = "Total time spent exceeds the supported maximum";

async fn find_task(repo: &TaskRepository, id: Id, organization_id: Id) -> ApiResult<Task> {
    repo.find_in_organization(id, organization_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Task"))
}

async fn represent(state: &AppState, task: Task) -> ApiResult<TaskRepresentation> {
    let people = People::load(
        state.pool()?,
        task.organization_id,
        TaskRepresentation::people_ids(&task),
    )
    .await?;
    Ok(TaskRepresentation::represent(task, &people))
}

/// The task with its comments, as returned by single-task endpoints
async fn represent_with_comments(state: &AppState, task: Task) -> ApiResult<TaskRepresentation> {
    let pool = state.pool()?;
    let comments = TaskRepository::new(pool.clone()).comments(task.id).await?;
    let people = People::load(
        pool,
        task.organization_id,
        TaskRepresentation::people_ids(&task).chain(comments.iter().map(|c| c.user_id)),
    )
    .await?;

    let comments = comments
        .into_iter()
        .map(|c| CommentRepresentation::represent(c, &people))
        .collect();
    Ok(TaskRepresentation::represent(task, &people).with_comments(comments))
}

/// Assignees and team named in `params` must belong to the organization
async fn ensure_assignment_in_organization(
    pool: &PgPool,
    organization_id: Id,
    params: &TaskParams,
) -> ApiResult<()> {
    if let Some(assigned) = &params.assigned_employees {
        ensure_users_in_organization(pool, organization_id, assigned, ASSIGNEES_OUTSIDE_ORGANIZATION)
            .await?;
    }
    if let Some(team) = params.assigned_team {
        ensure_team_in_organization(pool, organization_id, team).await?;
    }
    Ok(())
}

fn audit_entry(task: &Task, action: AuditAction, changed_by: Id) -> AuditEntry {
    AuditEntry::new(
        AuditEntityType::Task,
        task.id,
        action,
        changed_by,
        task.organization_id,
    )
}

/// The organization's catch-all project, created on first use
async fn general_project(repo: &ProjectRepository, user: &AuthenticatedUser) -> ApiResult<Project> {
    if let Some(project) = repo
        .find_by_title(user.organization_id, GENERAL_PROJECT_TITLE)
        .await?
    {
        return Ok(project);
    }

    let project = repo
        .create(CreateProjectDto {
            title: GENERAL_PROJECT_TITLE.to_string(),
            description: Some("Automatic bucket for independent tasks and deliverables.".into()),
            client_name: None,
            repository_url: None,
            status: ProjectStatus::Ongoing,
            priority: Priority::default(),
            technology_stack: Vec::new(),
            methodology: Methodology::default(),
            requirements: None,
            project_owner: user.id,
            assigned_employees: Vec::new(),
            organization_id: user.organization_id,
            start_date: Utc::now().date_naive(),
            end_date: None,
            progress: 0,
        })
        .await?;

    tracing::info!(project_id = %project.id, organization_id = %user.organization_id, "General project created");
    Ok(project)
}

/// POST /api/tasks
pub async fn create_task(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    RequestClient(client): RequestClient,
    JsonBody(params): JsonBody<TaskParams>,
) -> ApiResult<impl IntoResponse> {
    user.require_staff()?;
    user.require_org_member()?;
    TaskCreateContract.validate(&params)?;

    let pool = state.pool()?;
    ensure_assignment_in_organization(pool, user.organization_id, &params).await?;
    let projects = ProjectRepository::new(pool.clone());
    let project = match params.project_id {
        Some(project_id) => projects
            .find_in_organization(project_id, user.organization_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Target project not found".into()))?,
        None => general_project(&projects, &user).await?,
    };

    let dto = CreateTaskDto {
        title: params.title.as_deref().unwrap_or_default().trim().to_string(),
        description: params.description.clone(),
        category: params
            .category()
            .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
        status: TaskStatus::Todo,
        priority: params.priority().unwrap_or_default(),
        assigned_employees: params.assigned_employees.clone().unwrap_or_default(),
        assigned_team: params.assigned_team,
        project_id: project.id,
        organization_id: user.organization_id,
        created_by: user.id,
        due_date: params.due_date,
    };

    let task = TaskRepository::new(pool.clone()).create(dto).await?;
    state
        .audit
        .record(
            audit_entry(&task, AuditAction::Create, user.id)
                .describe(format!("Created task: {}", task.title))
                .from_ip(client.ip_address),
        )
        .await;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "message": "Task created successfully",
            "task": represent(&state, task).await?,
        })),
    ))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskListQuery {
    pub project_id: Option<Id>,
}

/// GET /api/tasks
pub async fn list_tasks(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ApiQuery(query): ApiQuery<TaskListQuery>,
) -> ApiResult<impl IntoResponse> {
    user.require_staff()?;
    user.require_org_member()?;

    let visibility = TaskVisibility::for_user(&user);
    let mut filter = TaskFilter::organization(user.organization_id).with_project(query.project_id);
    if let Some(member) = visibility.member() {
        filter = filter.with_member(member, visibility.categories());
    }

    let pool = state.pool()?;
    let tasks = TaskRepository::new(pool.clone()).list(&filter).await?;
    let people = People::load(
        pool,
        user.organization_id,
        tasks.iter().flat_map(TaskRepresentation::people_ids),
    )
    .await?;

    Ok(Json(TaskRepresentation::represent_all(tasks, &people)))
}

/// GET /api/tasks/project/:projectId
pub async fn list_project_tasks(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ApiPath(project_id): ApiPath<Id>,
) -> ApiResult<impl IntoResponse> {
    user.require_org_member()?;

    let pool = state.pool()?;
    let project = ProjectRepository::new(pool.clone())
        .find_in_organization(project_id, user.organization_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Project"))?;

    if user.is_employee() && !ProjectVisibility::for_user(&user).admits(&project) {
        return Err(ApiError::forbidden(
            "Not authorized to view tasks for this project",
        ));
    }

    let tasks = TaskRepository::new(pool.clone()).list_by_project(project.id).await?;
    let people = People::load(
        pool,
        user.organization_id,
        tasks.iter().flat_map(TaskRepresentation::people_ids),
    )
    .await?;

    Ok(Json(TaskRepresentation::represent_all(tasks, &people)))
}

/// GET /api/tasks/:id
pub async fn get_task(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ApiPath(id): ApiPath<Id>,
) -> ApiResult<impl IntoResponse> {
    user.require_org_member()?;

    let task = find_task(&TaskRepository::new(state.pool()?.clone()), id, user.organization_id).await?;
    Ok(Json(represent_with_comments(&state, task).await?))
}

/// PATCH /api/tasks/:id/status
pub async fn update_status(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    RequestClient(client): RequestClient,
    ApiPath(id): ApiPath<Id>,
    JsonBody(params): JsonBody<StatusChangeParams>,
) -> ApiResult<impl IntoResponse> {
    user.require_org_member()?;
    let status = params.status()?;

    let repo = TaskRepository::new(state.pool()?.clone());
    let mut task = find_task(&repo, id, user.organization_id).await?;
    let previous = rules::change_status(&mut task, status, Utc::now())?;
    let task = repo.save_state(&task).await?;

    state
        .audit
        .record(
            audit_entry(&task, AuditAction::StatusChange, user.id)
                .change("status", previous, status)
                .describe(format!("Updated task status: {}", task.title))
                .from_ip(client.ip_address),
        )
        .await;

    Ok(Json(serde_json::json!({
        "message": "Task status updated successfully",
        "task": represent(&state, task).await?,
    })))
}

/// PUT /api/tasks/:id
///
/// Full edit for admins; employees are limited to the status endpoint.
pub async fn update_task(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    RequestClient(client): RequestClient,
    ApiPath(id): ApiPath<Id>,
    JsonBody(params): JsonBody<TaskParams>,
) -> ApiResult<impl IntoResponse> {
    user.require_org_member()?;

    let pool = state.pool()?;
    let repo = TaskRepository::new(pool.clone());
    let task = find_task(&repo, id, user.organization_id).await?;
    if user.is_employee() {
        return Err(ApiError::forbidden(EMPLOYEE_UPDATE_DENIED));
    }
    TaskUpdateContract.validate(&params)?;
    ensure_assignment_in_organization(pool, user.organization_id, &params).await?;

    let due_date = rules::due_date_change(task.due_date, params.due_date);
    let dto = UpdateTaskDto {
        title: params.title.as_deref().map(|t| t.trim().to_string()),
        description: params.description.clone(),
        category: params.category(),
        priority: params.priority(),
        assigned_employees: params.assigned_employees.clone(),
        assigned_team: params.assigned_team,
        due_date,
    };
    let updated = repo.update(task.id, dto).await?;

    if let Some(due_date) = due_date {
        state
            .audit
            .record(
                audit_entry(&updated, AuditAction::DeadlineChange, user.id)
                    .change("dueDate", task.due_date, due_date)
                    .describe(format!("Updated dueDate for task: {}", updated.title))
                    .from_ip(client.ip_address),
            )
            .await;
    }

    Ok(Json(serde_json::json!({
        "message": "Task updated successfully",
        "task": represent(&state, updated).await?,
    })))
}

/// POST /api/tasks/:id/comments
pub async fn add_comment(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ApiPath(id): ApiPath<Id>,
    JsonBody(params): JsonBody<CommentParams>,
) -> ApiResult<impl IntoResponse> {
    user.require_org_member()?;
    CommentContract.validate(&params)?;

    let repo = TaskRepository::new(state.pool()?.clone());
    let task = find_task(&repo, id, user.organization_id).await?;
    rules::ensure_can_work_on(&task, user.id, user.role, "Not authorized to comment on this task")?;

    let text = params.text.as_deref().unwrap_or_default().trim();
    repo.add_comment(task.id, user.id, text).await?;
    let task = find_task(&repo, id, user.organization_id).await?;

    Ok(Json(serde_json::json!({
        "message": "Comment added successfully",
        "task": represent_with_comments(&state, task).await?,
    })))
}

/// PATCH /api/tasks/:id/time-spent
pub async fn update_time_spent(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    RequestClient(client): RequestClient,
    ApiPath(id): ApiPath<Id>,
    JsonBody(params): JsonBody<TimeSpentParams>,
) -> ApiResult<impl IntoResponse> {
    user.require_org_member()?;
    let minutes = params.minutes()?;

    let repo = TaskRepository::new(state.pool()?.clone());
    let task = find_task(&repo, id, user.organization_id).await?;
    rules::ensure_can_work_on(&task, user.id, user.role, "Not authorized to update this task")?;

    let updated = repo
        .add_time_spent(task.id, minutes)
        .await?
        .ok_or_else(|| ApiError::bad_request(TIME_SPENT_LIMIT))?;
    state
        .audit
        .record(
            audit_entry(&updated, AuditAction::Update, user.id)
                .change("timeSpent", task.time_spent, updated.time_spent)
                .describe(format!("Updated time spent on task: {}", updated.title))
                .from_ip(client.ip_address),
        )
        .await;

    Ok(Json(serde_json::json!({
        "message": "Time spent updated successfully",
        "task": represent(&state, updated).await?,
    })))
}

/// PATCH /api/tasks/:id/block
pub async fn block_task(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    RequestClient(client): RequestClient,
    ApiPath(id): ApiPath<Id>,
    JsonBody(params): JsonBody<BlockParams>,
) -> ApiResult<impl IntoResponse> {
    user.require_org_member()?;

    let repo = TaskRepository::new(state.pool()?.clone());
    let mut task = find_task(&repo, id, user.organization_id).await?;
    user.require_admin_role(BLOCK_DENIED)?;

    let blocked = params.is_blocked;
    let reason = params
        .block_reason
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty());
    let previous = rules::set_blocked(&mut task, blocked, reason, Utc::now());
    let task = repo.save_state(&task).await?;

    let verb = if blocked { "Blocked" } else { "Unblocked" };
    state
        .audit
        .record(
            audit_entry(&task, AuditAction::Update, user.id)
                .change("isBlocked", previous, blocked)
                .describe(format!("{} task: {}", verb, task.title))
                .from_ip(client.ip_address),
        )
        .await;

    Ok(Json(serde_json::json!({
        "message": format!("Task {} successfully", verb.to_lowercase()),
        "task": represent(&state, task).await?,
    })))
}

/// DELETE /api/tasks/:id
pub async fn delete_task(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    RequestClient(client): RequestClient,
    ApiPath(id): ApiPath<Id>,
) -> ApiResult<impl IntoResponse> {
    user.require_admin()?;
    user.require_org_member()?;

    let repo = TaskRepository::new(state.pool()?.clone());
    let task = find_task(&repo, id, user.organization_id).await?;
    repo.delete(task.id).await?;

    state
        .audit
        .record(
            audit_entry(&task, AuditAction::Delete, user.id)
                .describe(format!("Deleted task: {}", task.title))
                .from_ip(client.ip_address),
        )
        .await;

    Ok(message("Task deleted successfully"))
}

/// GET /api/tasks/:id/history
pub async fn task_history(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ApiPath(id): ApiPath<Id>,
) -> ApiResult<impl IntoResponse> {
    user.require_org_member()?;

    let pool = state.pool()?;
    let task = find_task(&TaskRepository::new(pool.clone()), id, user.organization_id).await?;
    let logs = AuditLogRepository::new(pool.clone())
        .list_for_entity(task.id, user.organization_id)
        .await?;

    let people = People::load(
        pool,
        user.organization_id,
        logs.iter().map(|log| log.changed_by),
    )
    .await?;
    Ok(Json(AuditLogRepresentation::represent_all(logs, &people)))
}

#[cfg(test)]
mod tests {
    use super::super::ASSIGNEES_OUTSIDE_ORGANIZATION;
    use crate::test_support::TestApp;
    use axum::http::StatusCode;
    use pm_db::{CreateTeamDto, PgPool, Repository, TeamRepository};
    use pm_models::Designation;
    use serde_json::{json, Value};

    fn sorted_titles(body: &Value) -> Vec<String> {
        let mut titles: Vec<String> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["title"].as_str().unwrap().to_string())
            .collect();
        titles.sort_unstable();
        titles
    }

    #[sqlx::test(migrations = "../pm-db/migrations")]
    async fn test_list_follows_designation(pool: PgPool) {
        let app = TestApp::new(pool);
        let admin = app.organization("acme").await;
        let org = admin.organization_id;

        for category in ["Bugs", "QA", "Requirement", "Deployment", "Client", "General"] {
            let (status, _) = app
                .send(
                    "POST",
                    "/api/tasks",
                    &admin,
                    Some(json!({ "title": category, "category": category })),
                )
                .await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let cases = [
            (Designation::Tester, vec!["Bugs", "QA"]),
            (Designation::BusinessAnalyst, vec!["Requirement"]),
            (Designation::DevOps, vec!["Deployment"]),
            (Designation::BusinessDevelopment, vec!["Client"]),
            (Designation::Developer, vec![]),
            (Designation::TeamLead, vec![]),
        ];
        for (designation, expected) in cases {
            let member = app.employee(org, "Staff", designation).await;
            let (status, body) = app.send("GET", "/api/tasks", &member, None).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(sorted_titles(&body), expected, "{designation:?}");
        }

        let manager = app.employee(org, "Mia", Designation::Manager).await;
        let (_, body) = app.send("GET", "/api/tasks", &manager, None).await;
        assert_eq!(body.as_array().unwrap().len(), 6);
    }

    #[sqlx::test(migrations = "../pm-db/migrations")]
    async fn test_list_admits_assignments_and_narrows_by_project(pool: PgPool) {
        let app = TestApp::new(pool);
        let admin = app.organization("acme").await;
        let dev = app.employee(admin.organization_id, "Dana", Designation::Developer).await;

        let (_, body) = app
            .send(
                "POST",
                "/api/projects",
                &admin,
                Some(json!({ "title": "Portal", "projectOwner": admin.id })),
            )
            .await;
        let portal = body["project"]["id"].as_str().unwrap().to_string();

        app.send(
            "POST",
            "/api/tasks",
            &admin,
            Some(json!({ "title": "Assigned", "projectId": portal, "assignedEmployees": [dev.id] })),
        )
        .await;
        app.send(
            "POST",
            "/api/tasks",
            &admin,
            Some(json!({ "title": "Loose", "assignedEmployees": [dev.id] })),
        )
        .await;
        app.send("POST", "/api/tasks", &admin, Some(json!({ "title": "Hidden", "projectId": portal })))
            .await;
        app.send("POST", "/api/tasks", &dev, Some(json!({ "title": "Mine" }))).await;

        let (_, body) = app.send("GET", "/api/tasks", &dev, None).await;
        assert_eq!(sorted_titles(&body), vec!["Assigned", "Loose", "Mine"]);

        let (_, body) = app
            .send("GET", &format!("/api/tasks?projectId={portal}"), &dev, None)
            .await;
        assert_eq!(sorted_titles(&body), vec!["Assigned"]);
    }

    #[sqlx::test(migrations = "../pm-db/migrations")]
    async fn test_create_rejects_foreign_assignment(pool: PgPool) {
        let app = TestApp::new(pool.clone());
        let admin = app.organization("acme").await;
        let rival = app.organization("rival").await;
        let rival_team = TeamRepository::new(pool)
            .create(CreateTeamDto {
                name: "Rival squad".into(),
                description: None,
                manager_id: Some(rival.id),
                members: vec![rival.id],
                organization_id: rival.organization_id,
            })
            .await
            .unwrap();

        let (status, body) = app
            .send(
                "POST",
                "/api/tasks",
                &admin,
                Some(json!({ "title": "Ship it", "assignedEmployees": [rival.id] })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], ASSIGNEES_OUTSIDE_ORGANIZATION);

        let (status, body) = app
            .send(
                "POST",
                "/api/tasks",
                &admin,
                Some(json!({ "title": "Ship it", "assignedTeam": rival_team.id })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Assigned team must belong to your organization");

        let (_, body) = app.send("GET", "/api/projects", &admin, None).await;
        assert_eq!(body, json!([]));
    }

    #[sqlx::test(migrations = "../pm-db/migrations")]
    async fn test_update_rejects_foreign_assignees(pool: PgPool) {
        let app = TestApp::new(pool);
        let admin = app.organization("acme").await;
        let rival = app.organization("rival").await;

        let (status, body) = app
            .send("POST", "/api/tasks", &admin, Some(json!({ "title": "Ship it" })))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        let id = body["task"]["id"].as_str().unwrap().to_string();

        let (status, body) = app
            .send(
                "PUT",
                &format!("/api/tasks/{id}"),
                &admin,
                Some(json!({ "assignedEmployees": [rival.id] })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], ASSIGNEES_OUTSIDE_ORGANIZATION);

        let (_, body) = app.send("GET", &format!("/api/tasks/{id}"), &admin, None).await;
        assert_eq!(body["assignedEmployees"], json!([]));
    }

    #[sqlx::test(migrations = "../pm-db/migrations")]
    async fn test_time_spent_cannot_overflow(pool: PgPool) {
        let app = TestApp::new(pool);
        let admin = app.organization("acme").await;

        let (_, body) = app
            .send("POST", "/api/tasks", &admin, Some(json!({ "title": "Long haul" })))
            .await;
        let id = body["task"]["id"].as_str().unwrap().to_string();
        let uri = format!("/api/tasks/{id}/time-spent");

        let (status, _) = app
            .send("PATCH", &uri, &admin, Some(json!({ "minutes": i32::MAX - 10 })))
            .await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = app
            .send("PATCH", &uri, &admin, Some(json!({ "minutes": 20 })))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], super::TIME_SPENT_LIMIT);

        let (_, body) = app.send("GET", &format!("/api/tasks/{id}"), &admin, None).await;
        assert_eq!(body["timeSpent"], i32::MAX - 10);
    }
}
