//! Bearer authentication and role checks.

use axum::http::{Method, StatusCode};
use serde_json::json;

use super::common::{
    create_authenticated_router, get_request, json_request, send_request, send_request_raw,
    token, with_bearer,
};

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let app = create_authenticated_router().await;

    let (status, body) = send_request(app, get_request("/api/v1/assets")).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_garbage_token_is_unauthorized() {
    let app = create_authenticated_router().await;

    let (status, _) = send_request_raw(
        app,
        with_bearer(get_request("/api/v1/assets"), "not-a-jwt"),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_valid_token_reads() {
    let app = create_authenticated_router().await;

    let (status, body) = send_request(
        app,
        with_bearer(get_request("/api/v1/asset-types"), &token(&[])),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 7);
}

#[tokio::test]
async fn test_reference_mutation_requires_admin() {
    let app = create_authenticated_router().await;
    let body = json!({ "code": "GH", "name": "Gemeentehuis" });

    let (status, error) = send_request(
        app.clone(),
        with_bearer(
            json_request(Method::POST, "/api/v1/buildings", body.clone()),
            &token(&["Reader"]),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(error["code"], "FORBIDDEN");

    let (status, created) = send_request(
        app,
        with_bearer(
            json_request(Method::POST, "/api/v1/buildings", body),
            &token(&["Admin"]),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["code"], "GH");
}

#[tokio::test]
async fn test_events_record_token_user() {
    let app = create_authenticated_router().await;
    let user = token(&[]);

    let (_, types) = send_request(
        app.clone(),
        with_bearer(get_request("/api/v1/asset-types"), &user),
    )
    .await;
    let lap = types
        .as_array()
        .unwrap()
        .iter()
        .find(|t| t["code"] == "LAP")
        .unwrap()["id"]
        .clone();

    let (status, asset) = send_request(
        app.clone(),
        with_bearer(
            json_request(
                Method::POST,
                "/api/v1/assets",
                json!({ "assetName": "Laptop", "assetTypeId": lap, "serialNumber": "AUTH-1" }),
            ),
            &user,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, events) = send_request(
        app,
        with_bearer(
            get_request(&format!(
                "/api/v1/assets/{}/events",
                asset["id"].as_str().unwrap()
            )),
            &user,
        ),
    )
    .await;
    assert_eq!(events[0]["performedBy"], "an.janssens@diepenbeek.be");
}

#[tokio::test]
async fn test_health_needs_no_token() {
    let app = create_authenticated_router().await;
    let (status, _) = send_request_raw(app, get_request("/health/live")).await;
    assert_eq!(status, StatusCode::OK);
}
