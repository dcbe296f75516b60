use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use common::{AppError, AppResult, JwtConfig};
use domain::{User, UserRole};
use user_service_lib::api::{create_router, AppState};
use user_service_lib::repository::UserRepository;
use user_service_lib::service::{Authenticator, UserManager};

#[derive(Default)]
struct FakeUsers {
    rows: Mutex<HashMap<Uuid, User>>,
}

#[async_trait]
impl UserRepository for FakeUsers {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.rows.lock().unwrap().get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn create(
        &self,
        email: String,
        password_hash: String,
        name: String,
        role: UserRole,
    ) -> AppResult<User> {
        let mut user = User::new(Uuid::new_v4(), email, password_hash, name);
        user.role = role;
        self.rows.lock().unwrap().insert(user.id, user.clone());
        Ok(user)
    }

    async fn set_role(&self, id: Uuid, role: UserRole) -> AppResult<User> {
        let mut rows = self.rows.lock().unwrap();
        let user = rows.get_mut(&id).ok_or(AppError::NotFound)?;
        user.role = role;
        Ok(user.clone())
    }
}

fn app() -> Router {
    let repo: Arc<dyn UserRepository> = Arc::new(FakeUsers::default());
    let jwt = JwtConfig {
        secret: "integration-secret-integration-secret".to_string(),
        expiration_hours: 1,
    };
    let state = AppState::new(
        Arc::new(Authenticator::new(repo.clone(), jwt)),
        Arc::new(UserManager::new(repo)),
        None,
    );
    create_router(state)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn register_login_and_fetch_profile() {
    let app = app();

    let (status, created) = send(
        &app,
        post_json(
            "/users",
            json!({"name": "Ana", "email": "ana@example.com", "password": "password123"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["role"], "USER");
    assert!(created.get("password_hash").is_none());

    let (status, login) = send(
        &app,
        post_json(
            "/auth/login",
            json!({"email": "ana@example.com", "password": "password123"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(login["token_type"], "Bearer");
    assert_eq!(login["user"]["email"], "ana@example.com");

    let token = login["access_token"].as_str().unwrap();
    let (status, profile) = send(
        &app,
        Request::get("/auth/profile")
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["id"], created["id"]);
}

#[tokio::test]
async fn duplicate_registration_conflicts() {
    let app = app();
    let body = json!({"name": "Ana", "email": "ana@example.com", "password": "password123"});

    let (status, _) = send(&app, post_json("/users", body.clone())).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, error) = send(&app, post_json("/users", body)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error["error"]["code"], "CONFLICT");
}

#[tokio::test]
async fn invalid_registration_rejected() {
    let app = app();
    let (status, error) = send(
        &app,
        post_json(
            "/users",
            json!({"name": "A", "email": "not-an-email", "password": "short"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn bad_credentials_are_unauthorized() {
    let app = app();
    let (status, error) = send(
        &app,
        post_json(
            "/auth/login",
            json!({"email": "ghost@example.com", "password": "password123"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error["error"]["code"], "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn profile_requires_token() {
    let app = app();
    let (status, _) = send(
        &app,
        Request::get("/auth/profile").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn health_without_database_is_ok() {
    let app = app();
    let (status, body) = send(&app, Request::get("/health").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}
