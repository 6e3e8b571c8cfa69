//! Common test utilities for integration tests.

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use dj_api::{routes, AppState, AuthConfig, JwtValidator};
use dj_core::asset_code::{AssetCodeGenerator, CodeVersion};
use dj_core::db::{create_pool, run_migrations, seed_reference_data};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::{json, Value};
use tower::ServiceExt;

pub const TEST_SECRET: &[u8] = b"integration-test-secret";

/// State over a fresh, migrated and seeded in-memory database with auth
/// disabled.
pub async fn create_test_state() -> AppState {
    let pool = create_pool("sqlite::memory:")
        .await
        .expect("Failed to create SQLite pool");
    run_migrations(&pool).await.expect("Failed to run migrations");
    seed_reference_data(&pool)
        .await
        .expect("Failed to seed reference data");
    AppState::new(pool, AssetCodeGenerator::new(CodeVersion::Current))
}

pub async fn create_test_router() -> (Router, AppState) {
    let state = create_test_state().await;
    (routes::create_router(state.clone()), state)
}

pub fn auth_config() -> AuthConfig {
    AuthConfig {
        tenant_id: "tenant-test".into(),
        client_id: "app-test".into(),
        ..Default::default()
    }
}

/// Router that requires bearer tokens signed with [`TEST_SECRET`].
pub async fn create_authenticated_router() -> Router {
    let state = create_test_state()
        .await
        .with_auth(JwtValidator::with_shared_secret(auth_config(), TEST_SECRET));
    routes::create_router(state)
}

pub fn token(roles: &[&str]) -> String {
    let claims = json!({
        "sub": "subject-1",
        "exp": chrono::Utc::now().timestamp() + 600,
        "iss": "https://login.microsoftonline.com/tenant-test/v2.0",
        "aud": "api://app-test",
        "oid": "oid-1",
        "name": "An Janssens",
        "preferred_username": "an.janssens@diepenbeek.be",
        "roles": roles,
    });
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(TEST_SECRET),
    )
    .expect("Failed to sign token")
}

pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn text_request(method: Method, uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "text/csv")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn with_bearer(mut request: Request<Body>, token: &str) -> Request<Body> {
    request.headers_mut().insert(
        header::AUTHORIZATION,
        format!("Bearer {}", token).parse().unwrap(),
    );
    request
}

/// Sends a request and returns the status and raw body.
pub async fn send_request_raw(app: Router, request: Request<Body>) -> (StatusCode, String) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8_lossy(&bytes).to_string())
}

/// Sends a request and parses the body as JSON (`Null` for empty bodies).
pub async fn send_request(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let (status, body) = send_request_raw(app, request).await;
    let value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_str(&body).unwrap_or_else(|e| panic!("invalid JSON {}: {}", body, e))
    };
    (status, value)
}

/// Id of a seeded asset type.
pub async fn asset_type_id(app: &Router, code: &str) -> String {
    let (status, body) = send_request(app.clone(), get_request("/api/v1/asset-types")).await;
    assert_eq!(status, StatusCode::OK);
    body.as_array()
        .unwrap()
        .iter()
        .find(|t| t["code"] == code)
        .unwrap_or_else(|| panic!("asset type {} not seeded", code))["id"]
        .as_str()
        .unwrap()
        .to_string()
}

/// Creates an asset through the API and returns its JSON.
pub async fn create_asset(app: &Router, body: Value) -> Value {
    let (status, created) = send_request(
        app.clone(),
        json_request(Method::POST, "/api/v1/assets", body),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create failed: {}", created);
    created
}
