//! Lease contract endpoints. Leases are created under `/assets/{id}/leases`.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use dj_core::models::LeaseUpdate;
use dj_core::services::lease_service::MAX_EXPIRY_WINDOW_DAYS;
use uuid::Uuid;

use crate::auth::AuthenticatedUser;
use crate::dto::{ExpiringLeasesQuery, LeaseResponse};
use crate::error::{ApiError, ErrorResponse};
use crate::state::AppState;

const DEFAULT_EXPIRY_WINDOW_DAYS: i64 = 30;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/expiring", get(expiring_leases))
        .route(
            "/:id",
            get(get_lease).put(update_lease).delete(delete_lease),
        )
        .route("/:id/end", post(end_lease))
}

/// Active leases ending within `days` (default 30).
#[utoipa::path(
    get,
    path = "/api/v1/leases/expiring",
    params(ExpiringLeasesQuery),
    responses(
        (status = 200, description = "Leases ending soon", body = [LeaseResponse]),
        (status = 400, description = "Window out of range", body = ErrorResponse)
    ),
    tag = "Leases"
)]
pub async fn expiring_leases(
    State(state): State<AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    Query(query): Query<ExpiringLeasesQuery>,
) -> Result<Json<Vec<LeaseResponse>>, ApiError> {
    let days = query.days.unwrap_or(DEFAULT_EXPIRY_WINDOW_DAYS);
    if !(0..=MAX_EXPIRY_WINDOW_DAYS).contains(&days) {
        return Err(ApiError::BadRequest(format!(
            "days must be between 0 and {}",
            MAX_EXPIRY_WINDOW_DAYS
        )));
    }
    let today = Utc::now().date_naive();
    let leases = state.leases.expiring(days, today).await?;
    Ok(Json(LeaseResponse::list(leases, today)))
}

#[utoipa::path(
    get,
    path = "/api/v1/leases/{id}",
    params(("id" = Uuid, Path, description = "Lease id")),
    responses(
        (status = 200, description = "Lease", body = LeaseResponse),
        (status = 404, description = "Not found", body = ErrorResponse)
    ),
    tag = "Leases"
)]
pub async fn get_lease(
    State(state): State<AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<LeaseResponse>, ApiError> {
    let lease = state.leases.get(id).await?;
    Ok(Json(LeaseResponse::on(lease, Utc::now().date_naive())))
}

#[utoipa::path(
    put,
    path = "/api/v1/leases/{id}",
    params(("id" = Uuid, Path, description = "Lease id")),
    request_body = LeaseUpdate,
    responses(
        (status = 200, description = "Updated lease", body = LeaseResponse),
        (status = 400, description = "End date before start date", body = ErrorResponse),
        (status = 404, description = "Not found", body = ErrorResponse)
    ),
    tag = "Leases"
)]
pub async fn update_lease(
    State(state): State<AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(update): Json<LeaseUpdate>,
) -> Result<Json<LeaseResponse>, ApiError> {
    let lease = state.leases.update(id, update).await?;
    Ok(Json(LeaseResponse::on(lease, Utc::now().date_naive())))
}

/// Ends a lease early and records a `LeaseEnded` event on its asset.
#[utoipa::path(
    post,
    path = "/api/v1/leases/{id}/end",
    params(("id" = Uuid, Path, description = "Lease id")),
    responses(
        (status = 200, description = "Lease ended", body = LeaseResponse),
        (status = 404, description = "Not found", body = ErrorResponse)
    ),
    tag = "Leases"
)]
pub async fn end_lease(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<LeaseResponse>, ApiError> {
    let lease = state.leases.end(id, Some(user.actor())).await?;
    Ok(Json(LeaseResponse::on(lease, Utc::now().date_naive())))
}

#[utoipa::path(
    delete,
    path = "/api/v1/leases/{id}",
    params(("id" = Uuid, Path, description = "Lease id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not found", body = ErrorResponse)
    ),
    tag = "Leases"
)]
pub async fn delete_lease(
    State(state): State<AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.leases.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
