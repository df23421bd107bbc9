//! Team API handlers
//!
//! Routes under `/api/teams`.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use pm_contracts::teams::{TeamCreateContract, TeamParams, TeamUpdateContract};
use pm_contracts::Contract;
use pm_core::Id;
use pm_db::{CreateTeamDto, PgPool, Repository, TeamRepository, UpdateTeamDto};
use pm_models::Team;

use super::ensure_users_in_organization;
use crate::error::{ApiError, ApiResult};
use crate::extractors::{ApiPath, AppState, AuthenticatedUser, JsonBody};
use crate::representers::{People, TeamRepresentation};

async fn represent(state: &AppState, team: Team) -> ApiResult<TeamRepresentation> {
    let people = People::load(
        state.pool()?,
        team.organization_id,
        TeamRepresentation::people_ids(&team),
    )
    .await?;
    Ok(TeamRepresentation::represent(team, &people))
}

pub(crate) const MANAGER_OUTSIDE_ORGANIZATION: &str = "Team manager must belong to your organization";
pub(crate) const MEMBERS_OUTSIDE_ORGANIZATION: &str = "Team members must belong to your organization";

async fn ensure_people_in_organization(
    pool: &PgPool,
    organization_id: Id,
    params: &TeamParams,
) -> ApiResult<()> {
    if let Some(manager) = params.manager_id {
        ensure_users_in_organization(pool, organization_id, &[manager], MANAGER_OUTSIDE_ORGANIZATION)
            .await?;
    }
    if let Some(members) = &params.members {
        ensure_users_in_organization(pool, organization_id, members, MEMBERS_OUTSIDE_ORGANIZATION)
            .await?;
    }
    Ok(())
}

/// GET /api/teams
pub async fn list_teams(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<impl IntoResponse> {
    user.require_org_member()?;

    let pool = state.pool()?;
    let teams = TeamRepository::new(pool.clone())
        .list_for_organization(user.organization_id)
        .await?;
    let people = People::load(
        pool,
        user.organization_id,
        teams.iter().flat_map(TeamRepresentation::people_ids),
    )
    .await?;

    let teams: Vec<TeamRepresentation> = teams
        .into_iter()
        .map(|t| TeamRepresentation::represent(t, &people))
        .collect();
    Ok(Json(teams))
}

/// POST /api/teams
pub async fn create_team(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    JsonBody(params): JsonBody<TeamParams>,
) -> ApiResult<impl IntoResponse> {
    user.require_admin()?;
    user.require_org_member()?;
    TeamCreateContract.validate(&params)?;

    let pool = state.pool()?;
    ensure_people_in_organization(pool, user.organization_id, &params).await?;
    let team = TeamRepository::new(pool.clone())
        .create(CreateTeamDto {
            name: params.name.as_deref().unwrap_or_default().trim().to_string(),
            description: params.description,
            manager_id: Some(params.manager_id.unwrap_or(user.id)),
            members: params.members.unwrap_or_default(),
            organization_id: user.organization_id,
        })
        .await?;

    tracing::info!(team_id = %team.id, created_by = %user.id, "Team created");

    Ok((StatusCode::CREATED, Json(represent(&state, team).await?)))
}

/// PUT /api/teams/:id
pub async fn update_team(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ApiPath(id): ApiPath<Id>,
    JsonBody(params): JsonBody<TeamParams>,
) -> ApiResult<impl IntoResponse> {
    user.require_admin()?;
    user.require_org_member()?;
    TeamUpdateContract.validate(&params)?;

    let pool = state.pool()?;
    let repo = TeamRepository::new(pool.clone());
    let team = repo
        .find_in_organization(id, user.organization_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Team"))?;
    ensure_people_in_organization(pool, user.organization_id, &params).await?;

    let team = repo
        .update(
            team.id,
            UpdateTeamDto {
                name: params.name.map(|n| n.trim().to_string()),
                description: params.description,
                manager_id: params.manager_id,
                members: params.members,
            },
        )
        .await?;

    Ok(Json(represent(&state, team).await?))
}

#[cfg(test)]
mod tests {
    use super::{MANAGER_OUTSIDE_ORGANIZATION, MEMBERS_OUTSIDE_ORGANIZATION};
    use crate::test_support::TestApp;
    use axum::http::StatusCode;
    use pm_db::PgPool;
    use pm_models::Designation;
    use serde_json::json;

    #[sqlx::test(migrations = "../pm-db/migrations")]
    async fn test_create_rejects_foreign_people(pool: PgPool) {
        let app = TestApp::new(pool);
        let admin = app.organization("acme").await;
        let rival = app.organization("rival").await;

        let (status, body) = app
            .send(
                "POST",
                "/api/teams",
                &admin,
                Some(json!({ "name": "Core", "managerId": rival.id })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], MANAGER_OUTSIDE_ORGANIZATION);

        let (status, body) = app
            .send(
                "POST",
                "/api/teams",
                &admin,
                Some(json!({ "name": "Core", "members": [admin.id, rival.id] })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], MEMBERS_OUTSIDE_ORGANIZATION);
    }

    #[sqlx::test(migrations = "../pm-db/migrations")]
    async fn test_update_rejects_foreign_people(pool: PgPool) {
        let app = TestApp::new(pool);
        let admin = app.organization("acme").await;
        let rival = app.organization("rival").await;
        let dev = app
            .employee(admin.organization_id, "Dana", Designation::Developer)
            .await;

        let (status, body) = app
            .send(
                "POST",
                "/api/teams",
                &admin,
                Some(json!({ "name": "Core", "members": [dev.id] })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        let uri = format!("/api/teams/{}", body["id"].as_str().unwrap());

        let (status, body) = app
            .send("PUT", &uri, &admin, Some(json!({ "managerId": rival.id })))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], MANAGER_OUTSIDE_ORGANIZATION);

        let (status, body) = app
            .send("PUT", &uri, &admin, Some(json!({ "members": [rival.id] })))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], MEMBERS_OUTSIDE_ORGANIZATION);

        let (_, body) = app.send("GET", "/api/teams", &admin, None).await;
        assert_eq!(body[0]["members"][0]["email"], dev.email);
        assert_eq!(body[0]["manager"]["id"], json!(admin.id));
    }
}
