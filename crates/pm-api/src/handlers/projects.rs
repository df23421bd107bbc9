//! Project API handlers
//!
//! Routes under `/api/projects`.

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use pm_auth::ProjectVisibility;
use pm_contracts::projects::{
    AssignEmployeesParams, ProjectCreateContract, ProjectParams, ProjectUpdateContract,
};
use pm_contracts::Contract;
use pm_core::Id;
use pm_db::{
    AuditLogRepository, CreateProjectDto, PgPool, ProjectRepository, Repository, TaskRepository,
    UpdateProjectDto,
};
use pm_models::{AuditAction, AuditEntityType, Project};
use pm_services::AuditEntry;

use super::{
    ensure_users_in_organization, message, ASSIGNEES_OUTSIDE_ORGANIZATION,
    OWNER_OUTSIDE_ORGANIZATION,
};
use crate::error::{ApiError, ApiResult};
use crate::extractors::{ApiPath, AppState, AuthenticatedUser, JsonBody, RequestClient};
use crate::representers::{
    AuditLogRepresentation, People, ProjectRepresentation, TaskRepresentation,
};

async fn find_project(repo: &ProjectRepository, id: Id, organization_id: Id) -> ApiResult<Project> {
    repo.find_in_organization(id, organization_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Project"))
}

async fn represent(state: &AppState, project: Project) -> ApiResult<ProjectRepresentation> {
    let people = People::load(
        state.pool()?,
        project.organization_id,
        ProjectRepresentation::people_ids(&project),
    ).await?;
    Ok(ProjectRepresentation::represent(project, &people))
}

/// Owner and assignees named in `params` must be users of the organization
async fn ensure_people_in_organization(
    pool: &PgPool,
    organization_id: Id,
    params: &ProjectParams,
) -> ApiResult<()> {
    if let Some(owner) = params.project_owner {
        ensure_users_in_organization(pool, organization_id, &[owner], OWNER_OUTSIDE_ORGANIZATION)
            .await?;
    }
    if let Some(assigned) = &params.assigned_employees {
        ensure_users_in_organization(pool, organization_id, assigned, ASSIGNEES_OUTSIDE_ORGANIZATION)
            .await?;
    }
    Ok(())
}

fn audit_entry(project: &Project, action: AuditAction, changed_by: Id) -> AuditEntry {
    AuditEntry::new(
        AuditEntityType::Project,
        project.id,
        action,
        changed_by,
        project.organization_id,
    )
}

/// POST /api/projects
pub async fn create_project(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    RequestClient(client): RequestClient,
    JsonBody(params): JsonBody<ProjectParams>,
) -> ApiResult<impl IntoResponse> {
    user.require_admin()?;
    user.require_org_member()?;
    ProjectCreateContract.validate(&params)?;

    let pool = state.pool()?;
    let owner = params
        .project_owner
        .ok_or_else(|| ApiError::bad_request("Title and project owner are required"))?;
    ensure_people_in_organization(pool, user.organization_id, &params).await?;

    let dto = CreateProjectDto {
        title: params.title.unwrap_or_default().trim().to_string(),
        description: params.description,
        client_name: params.client_name,
        repository_url: params.repository_url,
        status: params.status.unwrap_or_default(),
        priority: params.priority.unwrap_or_default(),
        technology_stack: params.technology_stack.unwrap_or_default(),
        methodology: params.methodology.unwrap_or_default(),
        requirements: params.requirements,
        project_owner: owner,
        assigned_employees: params.assigned_employees.unwrap_or_default(),
        organization_id: user.organization_id,
        start_date: params.start_date.unwrap_or_else(|| Utc::now().date_naive()),
        end_date: params.end_date,
        progress: params.progress.unwrap_or(0),
    };

    let project = ProjectRepository::new(pool.clone()).create(dto).await?;
    state
        .audit
        .record(
            audit_entry(&project, AuditAction::Create, user.id)
                .describe(format!("Created project: {}", project.title))
                .from_ip(client.ip_address),
        )
        .await;

    tracing::info!(project_id = %project.id, created_by = %user.id, "Project created");

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "message": "Project created successfully",
            "project": represent(&state, project).await?,
        })),
    ))
}

/// GET /api/projects
pub async fn list_projects(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<impl IntoResponse> {
    user.require_staff()?;
    user.require_org_member()?;

    let pool = state.pool()?;
    let visibility = ProjectVisibility::for_user(&user);
    let projects = ProjectRepository::new(pool.clone())
        .list_visible(user.organization_id, visibility.member())
        .await?;

    let people = People::load(
        pool,
        user.organization_id,
        projects.iter().flat_map(ProjectRepresentation::people_ids),
    )
    .await?;
    let projects: Vec<ProjectRepresentation> = projects
        .into_iter()
        .map(|p| ProjectRepresentation::represent(p, &people))
        .collect();

    Ok(Json(projects))
}

/// GET /api/projects/:id
pub async fn get_project(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ApiPath(id): ApiPath<Id>,
) -> ApiResult<impl IntoResponse> {
    user.require_org_member()?;

    let pool = state.pool()?;
    let project = find_project(&ProjectRepository::new(pool.clone()), id, user.organization_id).await?;

    if user.is_employee() && !ProjectVisibility::for_user(&user).admits(&project) {
        return Err(ApiError::forbidden("Not authorized to view this project"));
    }

    let tasks = TaskRepository::new(pool.clone()).list_by_project(project.id).await?;
    let people = People::load(
        pool,
        user.organization_id,
        ProjectRepresentation::people_ids(&project)
            .chain(tasks.iter().flat_map(TaskRepresentation::people_ids)),
    )
    .await?;

    let tasks = TaskRepresentation::represent_all(tasks, &people);
    Ok(Json(
        ProjectRepresentation::represent(project, &people).with_tasks(tasks),
    ))
}

fn update_dto(params: ProjectParams) -> UpdateProjectDto {
    UpdateProjectDto {
        title: params.title.map(|t| t.trim().to_string()),
        description: params.description,
        client_name: params.client_name,
        repository_url: params.repository_url,
        status: params.status,
        priority: params.priority,
        technology_stack: params.technology_stack,
        methodology: params.methodology,
        requirements: params.requirements,
        project_owner: params.project_owner,
        assigned_employees: params.assigned_employees,
        start_date: params.start_date,
        end_date: params.end_date,
        actual_end_date: params.actual_end_date,
        progress: params.progress,
    }
}

/// PUT /api/projects/:id
pub async fn update_project(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    RequestClient(client): RequestClient,
    ApiPath(id): ApiPath<Id>,
    JsonBody(params): JsonBody<ProjectParams>,
) -> ApiResult<impl IntoResponse> {
    user.require_admin()?;
    user.require_org_member()?;

    let pool = state.pool()?;
    let repo = ProjectRepository::new(pool.clone());
    let project = find_project(&repo, id, user.organization_id).await?;
    ProjectUpdateContract::new(&project).validate(&params)?;
    ensure_people_in_organization(pool, user.organization_id, &params).await?;

    let dto = update_dto(params);
    let entries = pm_services::projects::update_entries(&project, &dto, user.id);
    let updated = repo.update(project.id, dto).await?;

    state
        .audit
        .record_all(
            entries
                .into_iter()
                .map(|entry| entry.from_ip(client.ip_address.clone())),
        )
        .await;

    Ok(Json(serde_json::json!({
        "message": "Project updated successfully",
        "project": represent(&state, updated).await?,
    })))
}

/// POST /api/projects/:id/assign-employees
pub async fn assign_employees(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    RequestClient(client): RequestClient,
    ApiPath(id): ApiPath<Id>,
    JsonBody(params): JsonBody<AssignEmployeesParams>,
) -> ApiResult<impl IntoResponse> {
    user.require_admin()?;
    user.require_org_member()?;
    let employee_ids = params.employee_ids()?;

    let pool = state.pool()?;
    let repo = ProjectRepository::new(pool.clone());
    let project = find_project(&repo, id, user.organization_id).await?;
    ensure_users_in_organization(
        pool,
        user.organization_id,
        &employee_ids,
        ASSIGNEES_OUTSIDE_ORGANIZATION,
    )
    .await?;
    let updated = repo.set_assigned_employees(project.id, &employee_ids).await?;

    state
        .audit
        .record(
            audit_entry(&project, AuditAction::AssignmentChange, user.id)
                .change("assignedEmployees", &project.assigned_employees, &employee_ids)
                .describe(format!("Updated project assignments for: {}", project.title))
                .from_ip(client.ip_address),
        )
        .await;

    Ok(Json(serde_json::json!({
        "message": "Employees assigned successfully",
        "project": represent(&state, updated).await?,
    })))
}

/// DELETE /api/projects/:id
///
/// Removes the project together with its tasks.
pub async fn delete_project(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    RequestClient(client): RequestClient,
    ApiPath(id): ApiPath<Id>,
) -> ApiResult<impl IntoResponse> {
    user.require_admin()?;
    user.require_org_member()?;

    let repo = ProjectRepository::new(state.pool()?.clone());
    let project = find_project(&repo, id, user.organization_id).await?;
    repo.delete(project.id).await?;

    state
        .audit
        .record(
            audit_entry(&project, AuditAction::Delete, user.id)
                .describe(format!("Deleted project: {}", project.title))
                .from_ip(client.ip_address),
        )
        .await;

    Ok(message("Project deleted successfully"))
}

/// GET /api/projects/:id/history
pub async fn project_history(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ApiPath(id): ApiPath<Id>,
) -> ApiResult<impl IntoResponse> {
    user.require_admin()?;
    user.require_org_member()?;

    let pool = state.pool()?;
    let project = find_project(&ProjectRepository::new(pool.clone()), id, user.organization_id).await?;
    let logs = AuditLogRepository::new(pool.clone())
        .list_for_entity(project.id, user.organization_id)
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
    use super::super::{ASSIGNEES_OUTSIDE_ORGANIZATION, OWNER_OUTSIDE_ORGANIZATION};
    use crate::test_support::TestApp;
    use axum::http::StatusCode;
    use pm_db::PgPool;
    use pm_models::Designation;
    use serde_json::json;

    async fn project_id(app: &TestApp, admin: &pm_models::User) -> String {
        let (status, body) = app
            .send(
                "POST",
                "/api/projects",
                admin,
                Some(json!({ "title": "Portal", "projectOwner": admin.id })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        body["project"]["id"].as_str().unwrap().to_string()
    }

    #[sqlx::test(migrations = "../pm-db/migrations")]
    async fn test_create_rejects_foreign_assignees(pool: PgPool) {
        let app = TestApp::new(pool);
        let admin = app.organization("acme").await;
        let rival = app.organization("rival").await;

        let (status, body) = app
            .send(
                "POST",
                "/api/projects",
                &admin,
                Some(json!({
                    "title": "Portal",
                    "projectOwner": admin.id,
                    "assignedEmployees": [rival.id],
                })),
            )
            .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], ASSIGNEES_OUTSIDE_ORGANIZATION);
    }

    #[sqlx::test(migrations = "../pm-db/migrations")]
    async fn test_update_rejects_foreign_owner(pool: PgPool) {
        let app = TestApp::new(pool);
        let admin = app.organization("acme").await;
        let rival = app.organization("rival").await;
        let id = project_id(&app, &admin).await;

        let (status, body) = app
            .send(
                "PUT",
                &format!("/api/projects/{id}"),
                &admin,
                Some(json!({ "projectOwner": rival.id })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], OWNER_OUTSIDE_ORGANIZATION);

        let (status, body) = app
            .send(
                "PUT",
                &format!("/api/projects/{id}"),
                &admin,
                Some(json!({ "assignedEmployees": [rival.id] })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], ASSIGNEES_OUTSIDE_ORGANIZATION);

        let (_, body) = app.send("GET", &format!("/api/projects/{id}"), &admin, None).await;
        assert_eq!(body["projectOwner"]["id"], json!(admin.id));
        assert_eq!(body["assignedEmployees"], json!([]));
    }

    #[sqlx::test(migrations = "../pm-db/migrations")]
    async fn test_assign_employees_stays_inside_organization(pool: PgPool) {
        let app = TestApp::new(pool);
        let admin = app.organization("acme").await;
        let rival = app.organization("rival").await;
        let dev = app
            .employee(admin.organization_id, "Dana", Designation::Developer)
            .await;
        let id = project_id(&app, &admin).await;

        let (status, body) = app
            .send(
                "POST",
                &format!("/api/projects/{id}/assign-employees"),
                &admin,
                Some(json!({ "employeeIds": [dev.id, rival.id] })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], ASSIGNEES_OUTSIDE_ORGANIZATION);
        assert!(!body.to_string().contains(&rival.email));

        let (status, body) = app
            .send(
                "POST",
                &format!("/api/projects/{id}/assign-employees"),
                &admin,
                Some(json!({ "employeeIds": [dev.id] })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["project"]["assignedEmployees"][0]["email"], dev.email);
    }

    #[sqlx::test(migrations = "../pm-db/migrations")]
    async fn test_employee_sees_only_own_projects(pool: PgPool) {
        let app = TestApp::new(pool);
        let admin = app.organization("acme").await;
        let dev = app
            .employee(admin.organization_id, "Dana", Designation::Developer)
            .await;
        let lead = app
            .employee(admin.organization_id, "Bea", Designation::BusinessDevelopment)
            .await;

        let assigned = project_id(&app, &admin).await;
        project_id(&app, &admin).await;
        app.send(
            "POST",
            &format!("/api/projects/{assigned}/assign-employees"),
            &admin,
            Some(json!({ "employeeIds": [dev.id] })),
        )
        .await;

        let (_, body) = app.send("GET", "/api/projects", &dev, None).await;
        let ids: Vec<&str> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec![assigned.as_str()]);

        let (_, body) = app.send("GET", "/api/projects", &lead, None).await;
        assert_eq!(body.as_array().unwrap().len(), 2);
    }
}
