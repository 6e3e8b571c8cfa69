//! Health and metrics endpoints.

use axum::http::StatusCode;

use super::common::{create_test_router, get_request, send_request, send_request_raw};

#[tokio::test]
async fn test_health_reports_database() {
    let (app, _state) = create_test_router().await;

    let (status, body) = send_request(app, get_request("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"]["connected"], true);
    assert_eq!(body["database"]["backend"], "sqlite");
    assert_eq!(body["authEnabled"], false);
    assert_eq!(body["graphConfigured"], false);
}

#[tokio::test]
async fn test_probes() {
    for path in ["/health/live", "/health/ready"] {
        let (app, _) = create_test_router().await;
        let (status, _) = send_request_raw(app, get_request(path)).await;
        assert_eq!(status, StatusCode::OK, "{}", path);
    }
}

#[tokio::test]
async fn test_metrics_without_recorder() {
    let (app, _) = create_test_router().await;
    let (status, _) = send_request_raw(app, get_request("/metrics")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}
