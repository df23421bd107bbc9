//! Registration, login, sessions and account maintenance
//!
//! Routes under `/api/auth`.

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use pm_auth::{hash_password, verify_password, ResetCode};
use pm_contracts::auth::{
    CreateOrganizationParams, EmployeeRegistrationContract, ForgotPasswordParams, LoginContract,
    LoginParams, OrganizationRegistrationContract, PasswordResetContract, ProfileContract,
    RegisterEmployeeParams, ResetChannel, ResetPasswordParams, UpdateProfileParams,
    UpdateRoleParams,
};
use pm_contracts::Contract;
use pm_core::Id;
use pm_db::{OrganizationRepository, SessionRepository, UpdateProfileDto, UserRepository};
use pm_models::{Designation, OrganizationSummary, Role, User, UserSummary};
use pm_services::OtpDestination;
use serde::{Deserialize, Serialize};

use super::message;
use crate::error::{ApiError, ApiResult};
use crate::extractors::{ApiPath, AppState, AuthenticatedUser, JsonBody, RequestClient};
use crate::representers::People;

const PUBLIC_ORGANIZATION_LIMIT: i64 = 50;

/// A user together with the organization it belongs to
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(flatten)]
    pub user: User,
    pub organization: Option<OrganizationSummary>,
}

async fn profile(state: &AppState, user: User) -> ApiResult<UserProfile> {
    let organization = OrganizationRepository::new(state.pool()?.clone())
        .find_by_id(user.organization_id)
        .await?
        .map(|o| o.summary());
    Ok(UserProfile { user, organization })
}

/// POST /api/auth/create-organization
pub async fn create_organization(
    State(state): State<AppState>,
    JsonBody(params): JsonBody<CreateOrganizationParams>,
) -> ApiResult<impl IntoResponse> {
    OrganizationRegistrationContract::new(state.config.auth.password_min_length)
        .validate(&params)?;

    let pool = state.pool()?;
    let organizations = OrganizationRepository::new(pool.clone());
    let users = UserRepository::new(pool.clone());

    let name = params.organization_name();
    if organizations.name_exists(name).await? {
        return Err(ApiError::bad_request("Organization already exists"));
    }
    if users.email_exists(&params.email()).await? {
        return Err(ApiError::bad_request("Email already registered"));
    }

    let password_hash = hash_password(params.password())?;
    let (organization, admin) = organizations
        .create_with_admin(
            name,
            params.industry.unwrap_or_default(),
            &params.new_admin(),
            &password_hash,
        )
        .await
        .map_err(|e| e.on_unique_violation("Email already registered"))?;

    let token = state
        .jwt
        .create_token(admin.id, admin.role, organization.id)?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "message": "Organization and admin created successfully",
            "token": token,
            "organization": organization.summary(),
            "user": admin,
        })),
    ))
}

/// POST /api/auth/register-employee
pub async fn register_employee(
    State(state): State<AppState>,
    JsonBody(params): JsonBody<RegisterEmployeeParams>,
) -> ApiResult<impl IntoResponse> {
    EmployeeRegistrationContract::new(state.config.auth.password_min_length)
        .validate(&params)?;

    let pool = state.pool()?;
    let organization_name = params
        .organization_name
        .as_deref()
        .map(str::trim)
        .unwrap_or_default();
    let organization = OrganizationRepository::new(pool.clone())
        .find_by_name(organization_name)
        .await?
        .ok_or_else(|| {
            ApiError::bad_request(format!(
                "Organization \"{}\" not found. Please check the name and try again.",
                organization_name
            ))
        })?;

    let users = UserRepository::new(pool.clone());
    if users.email_exists(&params.email()).await? {
        return Err(ApiError::bad_request("Email already registered"));
    }

    let password_hash = hash_password(params.password())?;
    let employee = users
        .create_with_tracker(&params.new_employee(&organization), &password_hash, organization.id)
        .await
        .map_err(|e| e.on_unique_violation("Email already registered"))?;

    tracing::info!(
        user_id = %employee.id,
        organization_id = %organization.id,
        designation = %employee.designation,
        "Employee registered"
    );

    let token = state
        .jwt
        .create_token(employee.id, employee.role, organization.id)?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "message": "Employee registered successfully",
            "token": token,
            "user": employee,
        })),
    ))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    RequestClient(client): RequestClient,
    JsonBody(params): JsonBody<LoginParams>,
) -> ApiResult<impl IntoResponse> {
    LoginContract.validate(&params)?;

    let email = params.email();
    let organization_id = params
        .organization_id
        .ok_or_else(|| ApiError::bad_request("Please provide email, password and organization"))?;
    tracing::debug!(%email, %organization_id, "Login attempt");

    let pool = state.pool()?;
    let users = UserRepository::new(pool.clone());
    let user = match users
        .find_by_email_in_organization(&email, organization_id)
        .await?
    {
        Some(user) => user,
        None => {
            tracing::info!(%email, %organization_id, "Login failed: unknown user");
            return Err(ApiError::unauthorized("Invalid credentials"));
        }
    };

    if !verify_password(params.password.as_deref().unwrap_or_default(), &user.password_hash) {
        tracing::info!(user_id = %user.id, "Login failed: password mismatch");
        return Err(ApiError::unauthorized("Invalid credentials"));
    }
    if !user.is_active {
        return Err(ApiError::forbidden("User account is disabled"));
    }

    let now = Utc::now();
    let session = SessionRepository::new(pool.clone())
        .start(user.id, organization_id, &client, now)
        .await?;
    users.update_last_login(user.id, now).await?;

    let token = state.jwt.create_token(user.id, user.role, organization_id)?;
    let mut user = user;
    user.last_login_at = Some(now);

    Ok(Json(serde_json::json!({
        "message": "Login successful",
        "token": token,
        "sessionId": session.id,
        "user": profile(&state, user).await?,
    })))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogoutParams {
    pub session_id: Option<Id>,
}

/// POST /api/auth/logout
pub async fn logout(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    body: Option<JsonBody<LogoutParams>>,
) -> ApiResult<impl IntoResponse> {
    let params = body.map(|JsonBody(p)| p).unwrap_or_default();

    if let Some(session_id) = params.session_id {
        let sessions = SessionRepository::new(state.pool()?.clone());
        if let Some(session) = sessions.find_active_for_user(session_id, user.id).await? {
            let closed = sessions.close(session, Utc::now()).await?;
            tracing::debug!(session_id = %closed.id, duration = closed.duration, "Session closed");
        }
    }

    Ok(message("Logout successful"))
}

/// GET /api/auth/me
pub async fn me(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<impl IntoResponse> {
    let stored = UserRepository::new(state.pool()?.clone())
        .find_by_id(user.id)
        .await?
        .ok_or_else(|| ApiError::not_found("User"))?;

    Ok(Json(profile(&state, stored).await?))
}

/// GET /api/auth/organizations
pub async fn organizations(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let organizations = OrganizationRepository::new(state.pool()?.clone())
        .list_public(PUBLIC_ORGANIZATION_LIMIT)
        .await?;
    Ok(Json(organizations))
}

/// GET /api/auth/organization-users
pub async fn organization_users(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<impl IntoResponse> {
    user.require_admin()?;
    user.require_org_member()?;

    let users = UserRepository::new(state.pool()?.clone())
        .list_by_organization(user.organization_id)
        .await?;
    Ok(Json(users))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ActiveEmployee {
    session_id: Id,
    user: Option<UserSummary>,
    login_at: chrono::DateTime<Utc>,
}

/// GET /api/auth/active-employees
pub async fn active_employees(
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

    let active: Vec<ActiveEmployee> = sessions
        .into_iter()
        .map(|s| ActiveEmployee {
            session_id: s.id,
            user: people.get(s.user_id),
            login_at: s.login_at,
        })
        .collect();
    Ok(Json(active))
}

/// POST /api/auth/cleanup-sessions
pub async fn cleanup_sessions(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<impl IntoResponse> {
    user.require_admin()?;
    user.require_org_member()?;

    let now = Utc::now();
    let cutoff = state
        .config
        .sessions
        .stale_cutoff(now)
        .ok_or_else(|| ApiError::internal("Session staleness window is out of range"))?;
    let purged = SessionRepository::new(state.pool()?.clone())
        .close_stale(Some(user.organization_id), cutoff, now)
        .await?;

    tracing::info!(organization_id = %user.organization_id, purged, "Stale sessions closed");
    Ok(message(format!("Purged {} stale or incomplete sessions", purged)))
}

/// POST /api/auth/terminate-session/:sessionId
pub async fn terminate_session(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ApiPath(session_id): ApiPath<Id>,
) -> ApiResult<impl IntoResponse> {
    user.require_admin()?;
    user.require_org_member()?;

    let sessions = SessionRepository::new(state.pool()?.clone());
    let session = sessions
        .find_in_organization(session_id, user.organization_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Session"))?;

    if session.is_active {
        sessions.close(session, Utc::now()).await?;
    }

    Ok(message("Session terminated successfully"))
}

/// PATCH /api/auth/update-role/:userId
pub async fn update_role(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ApiPath(user_id): ApiPath<Id>,
    JsonBody(params): JsonBody<UpdateRoleParams>,
) -> ApiResult<impl IntoResponse> {
    user.require_admin()?;
    user.require_org_member()?;
    let designation = params.designation()?;

    let users = UserRepository::new(state.pool()?.clone());
    users
        .find_in_organization(user_id, user.organization_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found in your organization".into()))?;

    if user_id == user.id && designation != Designation::Manager {
        let managers = users.count_managers(user.organization_id).await?;
        if managers <= 1 {
            return Err(ApiError::bad_request(
                "Action restricted: You are the last Manager. Promote another user first.",
            ));
        }
    }

    let updated = users
        .update_designation(user_id, designation, Role::for_designation(designation))
        .await?;

    tracing::info!(
        user_id = %updated.id,
        changed_by = %user.id,
        designation = %designation,
        "Designation changed"
    );
    Ok(message(format!("User moved to {} designation", designation)))
}

/// POST /api/auth/forgot-password
pub async fn forgot_password(
    State(state): State<AppState>,
    JsonBody(params): JsonBody<ForgotPasswordParams>,
) -> ApiResult<impl IntoResponse> {
    let channel = params
        .channel()
        .ok_or_else(|| ApiError::bad_request("Email or Phone Number is required"))?;

    let users = UserRepository::new(state.pool()?.clone());
    let (user, destination) = match channel {
        ResetChannel::Phone(phone) => {
            let user = users
                .find_by_phone(&phone)
                .await?
                .ok_or_else(|| ApiError::bad_request("User not found with this phone number"))?;
            (user, OtpDestination::Phone(phone))
        }
        ResetChannel::Email(email) => {
            let user = users
                .find_by_email(&email)
                .await?
                .ok_or_else(|| ApiError::bad_request("User not found with this email"))?;
            (user, OtpDestination::Email(email))
        }
    };

    let ttl = state.config.auth.otp_ttl_seconds;
    let code = ResetCode::generate(Utc::now(), ttl);
    users.set_reset_otp(user.id, &code.code, code.expires_at).await?;

    if let Err(e) = state.otp.deliver(&destination, &code.code, ttl / 60).await {
        tracing::warn!(
            user_id = %user.id,
            destination = %destination.masked(),
            error = %e,
            "Reset code delivery failed"
        );
        return Ok(Json(serde_json::json!({
            "message": "OTP delivery failed. Please try again later.",
            "error": e.to_string(),
        })));
    }

    let text = match destination {
        OtpDestination::Phone(_) => "OTP sent to your phone number",
        OtpDestination::Email(_) => "OTP sent to your registered email",
    };
    Ok(Json(serde_json::json!({ "message": text })))
}

/// POST /api/auth/reset-password
pub async fn reset_password(
    State(state): State<AppState>,
    JsonBody(params): JsonBody<ResetPasswordParams>,
) -> ApiResult<impl IntoResponse> {
    PasswordResetContract::new(state.config.auth.password_min_length).validate(&params)?;

    let users = UserRepository::new(state.pool()?.clone());
    let user = match params.channel() {
        Some(ResetChannel::Phone(phone)) => users.find_by_phone(&phone).await?,
        Some(ResetChannel::Email(email)) => users.find_by_email(&email).await?,
        None => None,
    };

    let otp = params.otp.as_deref().unwrap_or_default().trim();
    let user = user
        .filter(|u| u.reset_otp_matches(otp, Utc::now()))
        .ok_or_else(|| ApiError::bad_request("Invalid or expired OTP"))?;

    let password_hash = hash_password(params.new_password.as_deref().unwrap_or_default())?;
    users.reset_password(user.id, &password_hash).await?;

    tracing::info!(user_id = %user.id, "Password reset");
    Ok(message("Password has been reset successfully. Please login."))
}

/// GET /api/auth/employees
pub async fn employees(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<impl IntoResponse> {
    user.require_org_member()?;

    let employees: Vec<UserSummary> = UserRepository::new(state.pool()?.clone())
        .list_by_organization(user.organization_id)
        .await?
        .iter()
        .map(User::summary)
        .collect();
    Ok(Json(employees))
}

/// PATCH /api/auth/update-profile
pub async fn update_profile(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    JsonBody(params): JsonBody<UpdateProfileParams>,
) -> ApiResult<impl IntoResponse> {
    ProfileContract.validate(&params)?;

    let dto = UpdateProfileDto {
        first_name: params.first_name.map(|n| n.trim().to_string()),
        last_name: params.last_name.map(|n| n.trim().to_string()),
        phone_number: params.phone_number,
        avatar_url: params.avatar_url,
    };
    let updated = UserRepository::new(state.pool()?.clone())
        .update_profile(user.id, dto)
        .await?;

    Ok(Json(serde_json::json!({
        "message": "Profile updated successfully",
        "user": profile(&state, updated).await?,
    })))
}

#[cfg(test)]
mod tests {
    use crate::test_support::TestApp;
    use axum::http::StatusCode;
    use pm_auth::hash_password;
    use pm_db::{OrganizationRepository, PgPool, SessionRepository};
    use pm_models::{Designation, Industry, NewUser, Role};
    use serde_json::json;

    #[sqlx::test(migrations = "../pm-db/migrations")]
    async fn test_login_replaces_previous_session(pool: PgPool) {
        let app = TestApp::new(pool.clone());
        let admin = NewUser {
            username: "owner".into(),
            email: "owner@acme.test".into(),
            first_name: "Olive".into(),
            last_name: "Owner".into(),
            designation: Designation::Manager,
            role: Role::Admin,
            department: None,
            phone_number: None,
        };
        let (organization, admin) = OrganizationRepository::new(pool.clone())
            .create_with_admin("acme", Industry::default(), &admin, &hash_password("s3cret-pass").unwrap())
            .await
            .unwrap();
        let credentials = json!({
            "email": "Owner@Acme.test",
            "password": "s3cret-pass",
            "organizationId": organization.id,
        });

        let (status, first) = app
            .send("POST", "/api/auth/login", &admin, Some(credentials.clone()))
            .await;
        assert_eq!(status, StatusCode::OK);
        let (status, second) = app
            .send("POST", "/api/auth/login", &admin, Some(credentials))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_ne!(first["sessionId"], second["sessionId"]);

        let sessions = SessionRepository::new(pool)
            .list_for_user(admin.id, organization.id, None)
            .await
            .unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(json!(sessions[0].id), second["sessionId"]);
    }

    #[sqlx::test(migrations = "../pm-db/migrations")]
    async fn test_login_with_wrong_password(pool: PgPool) {
        let app = TestApp::new(pool);
        let admin = app.organization("acme").await;

        let (status, body) = app
            .send(
                "POST",
                "/api/auth/login",
                &admin,
                Some(json!({
                    "email": admin.email,
                    "password": "whatever",
                    "organizationId": admin.organization_id,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Invalid credentials");
    }
}
