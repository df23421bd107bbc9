//! Router fixtures backed by a migrated test database

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use pm_core::config::AppConfig;
use pm_core::Id;
use pm_db::{OrganizationRepository, PgPool, UserRepository};
use pm_models::{Designation, Industry, NewUser, Role, User};
use serde_json::Value;
use tower::ServiceExt;

use crate::extractors::AppState;
use crate::routes::router;

pub struct TestApp {
    pub state: AppState,
    pub pool: PgPool,
}

impl TestApp {
    pub fn new(pool: PgPool) -> Self {
        Self {
            state: AppState::new(AppConfig::default(), Some(pool.clone())),
            pool,
        }
    }

    fn router(&self) -> Router {
        router().with_state(self.state.clone())
    }

    pub fn token_for(&self, user: &User) -> String {
        self.state
            .jwt
            .create_token(user.id, user.role, user.organization_id)
            .unwrap()
    }

    /// A fresh organization and its admin
    pub async fn organization(&self, name: &str) -> User {
        let admin = new_user(&format!("admin@{name}.test"), "Admin", Designation::Manager, Role::Admin);
        let (_, user) = OrganizationRepository::new(self.pool.clone())
            .create_with_admin(name, Industry::default(), &admin, "not-a-real-hash")
            .await
            .unwrap();
        user
    }

    pub async fn employee(&self, organization_id: Id, first_name: &str, designation: Designation) -> User {
        let email = format!("{}.{}@staff.test", first_name.to_lowercase(), Id::new_v4().simple());
        UserRepository::new(self.pool.clone())
            .create_with_tracker(
                &new_user(&email, first_name, designation, Role::Employee),
                "not-a-real-hash",
                organization_id,
            )
            .await
            .unwrap()
    }

    /// Send a request as `user` and decode the JSON answer
    pub async fn send(&self, method: &str, uri: &str, user: &User, body: Option<Value>) -> (StatusCode, Value) {
        let mut request = Request::builder()
            .method(method)
            .uri(uri)
            .header("authorization", format!("Bearer {}", self.token_for(user)));
        let body = match body {
            Some(json) => {
                request = request.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self.router().oneshot(request.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }
}

fn new_user(email: &str, first_name: &str, designation: Designation, role: Role) -> NewUser {
    NewUser {
        username: NewUser::default_username(email),
        email: email.to_string(),
        first_name: first_name.to_string(),
        last_name: "Test".to_string(),
        designation,
        role,
        department: None,
        phone_number: None,
    }
}
