//! Axum extractors and shared application state

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    async_trait,
    extract::{ConnectInfo, FromRef, FromRequest, FromRequestParts},
    http::{header, request::Parts},
};
use pm_auth::{extract_bearer_token, messages, CurrentUser, JwtService};
use pm_core::config::AppConfig;
use pm_db::{AuditLogRepository, ClientInfo, PgPool, UserRepository};
use pm_services::{AuditRecorder, AuditStore, LogOtpDelivery, MemoryAuditStore, OtpDelivery};

use crate::error::{ApiError, ApiResult};

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub jwt: JwtService,
    pub audit: AuditRecorder,
    pub otp: Arc<dyn OtpDelivery>,
    db: Option<PgPool>,
}

impl AppState {
    /// State backed by `db`. Without a pool every data route answers 500;
    /// audit entries then go to memory.
    pub fn new(config: AppConfig, db: Option<PgPool>) -> Self {
        let jwt = JwtService::new(
            config.auth.jwt_secret.as_bytes(),
            config.auth.token_expiration_seconds,
        );
        let store: Arc<dyn AuditStore> = match &db {
            Some(pool) => Arc::new(AuditLogRepository::new(pool.clone())),
            None => Arc::new(MemoryAuditStore::new()),
        };

        Self {
            config: Arc::new(config),
            jwt,
            audit: AuditRecorder::new(store),
            otp: Arc::new(LogOtpDelivery),
            db,
        }
    }

    pub fn with_otp_delivery(mut self, otp: Arc<dyn OtpDelivery>) -> Self {
        self.otp = otp;
        self
    }

    pub fn with_audit_store(mut self, store: Arc<dyn AuditStore>) -> Self {
        self.audit = AuditRecorder::new(store);
        self
    }

    pub fn pool(&self) -> ApiResult<&PgPool> {
        self.db
            .as_ref()
            .ok_or_else(|| ApiError::internal("Database not configured"))
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(AppConfig::default(), None)
    }
}

/// Authenticated user extractor
///
/// Reads the bearer token, verifies it and loads the user it names.
pub struct AuthenticatedUser(pub CurrentUser);

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(extract_bearer_token)
            .ok_or_else(|| ApiError::unauthorized(messages::NO_TOKEN))?;

        let claims = app_state.jwt.validate_token(token).map_err(|e| {
            tracing::debug!(error = %e, "rejected bearer token");
            ApiError::unauthorized(messages::INVALID_TOKEN)
        })?;

        let users = UserRepository::new(app_state.pool()?.clone());
        let user = users
            .find_by_id(claims.sub)
            .await?
            .ok_or_else(|| ApiError::unauthorized(messages::INVALID_TOKEN))?;

        Ok(AuthenticatedUser(CurrentUser::from_user(&user, &claims)))
    }
}

impl std::ops::Deref for AuthenticatedUser {
    type Target = CurrentUser;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Caller address and user agent
///
/// The first `X-Forwarded-For` hop wins over the socket address.
pub struct RequestClient(pub ClientInfo);

#[async_trait]
impl<S> FromRequestParts<S> for RequestClient
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let forwarded = parts
            .headers
            .get("x-forwarded-for")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(',').next())
            .map(|ip| ip.trim().to_string())
            .filter(|ip| !ip.is_empty());

        let ip_address = forwarded.or_else(|| {
            parts
                .extensions
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip().to_string())
        });

        let user_agent = parts
            .headers
            .get(header::USER_AGENT)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        Ok(RequestClient(ClientInfo {
            ip_address,
            user_agent,
        }))
    }
}

/// JSON body whose rejections use the API error shape
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);

/// Path parameters whose rejections use the API error shape
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

/// Query string whose rejections use the API error shape
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts(builder: axum::http::request::Builder) -> Parts {
        let (parts, _) = builder.body(()).unwrap().into_parts();
        parts
    }

    #[tokio::test]
    async fn test_request_client_prefers_forwarded_for() {
        let mut parts = parts(
            Request::builder()
                .header("x-forwarded-for", "203.0.113.7, 10.0.0.1")
                .header("user-agent", "curl/8.0"),
        );
        let RequestClient(client) = RequestClient::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert_eq!(client.ip_address.as_deref(), Some("203.0.113.7"));
        assert_eq!(client.user_agent.as_deref(), Some("curl/8.0"));
    }

    #[tokio::test]
    async fn test_missing_token_is_rejected_before_touching_the_database() {
        let state = AppState::default();
        let mut parts = parts(Request::builder());
        let err = AuthenticatedUser::from_request_parts(&mut parts, &state)
            .await
            .err()
            .unwrap();
        assert_eq!(err.message(), messages::NO_TOKEN);
    }

    #[tokio::test]
    async fn test_garbage_token_is_invalid() {
        let state = AppState::default();
        let mut parts = parts(Request::builder().header("authorization", "Bearer not-a-jwt"));
        let err = AuthenticatedUser::from_request_parts(&mut parts, &state)
            .await
            .err()
            .unwrap();
        assert_eq!(err.message(), messages::INVALID_TOKEN);
    }

    #[test]
    fn test_pool_missing_is_internal_error() {
        let state = AppState::default();
        assert!(state.pool().is_err());
    }
}
