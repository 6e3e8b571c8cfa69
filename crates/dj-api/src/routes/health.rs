//! Health check endpoints.

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use std::time::Instant;

use crate::dto::{DatabaseHealth, HealthResponse, ProbeResponse};
use crate::state::AppState;

static START_TIME: std::sync::OnceLock<Instant> = std::sync::OnceLock::new();

pub fn init_start_time() {
    START_TIME.get_or_init(Instant::now);
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/health/ready", get(readiness_check))
        .route("/health/live", get(liveness_check))
}

/// Overall health with database details.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "System is healthy", body = HealthResponse),
        (status = 503, description = "Database unreachable", body = HealthResponse)
    ),
    tag = "Health"
)]
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let db_healthy = state.db.is_healthy().await;
    let uptime = START_TIME.get().map(|t| t.elapsed().as_secs()).unwrap_or(0);

    let http_status = if db_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        http_status,
        Json(HealthResponse {
            status: if db_healthy { "healthy" } else { "unhealthy" }.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            database: DatabaseHealth {
                connected: db_healthy,
                backend: state.db.db_type().to_string(),
                pool_size: state.db.pool_size(),
                idle_connections: state.db.idle_connections(),
            },
            graph_configured: state.user_directory.is_some(),
            auth_enabled: state.auth.is_some(),
            uptime_seconds: uptime,
        }),
    )
}

/// Ready when the database answers.
#[utoipa::path(
    get,
    path = "/health/ready",
    responses(
        (status = 200, description = "Ready", body = ProbeResponse),
        (status = 503, description = "Not ready", body = ProbeResponse)
    ),
    tag = "Health"
)]
pub async fn readiness_check(State(state): State<AppState>) -> (StatusCode, Json<ProbeResponse>) {
    if state.db.is_healthy().await {
        (
            StatusCode::OK,
            Json(ProbeResponse {
                status: "ready".to_string(),
            }),
        )
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ProbeResponse {
                status: "not_ready".to_string(),
            }),
        )
    }
}

/// The process is up.
#[utoipa::path(
    get,
    path = "/health/live",
    responses((status = 200, description = "Alive", body = ProbeResponse)),
    tag = "Health"
)]
pub async fn liveness_check() -> Json<ProbeResponse> {
    Json(ProbeResponse {
        status: "alive".to_string(),
    })
}
