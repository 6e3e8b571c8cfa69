//! Read-only Microsoft Graph lookups: directory users and Intune devices.
//!
//! Both answer 503 when Graph is not configured and 502 when Graph fails.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use dj_connectors::graph::{MAX_SEARCH_RESULTS, MIN_SEARCH_LENGTH};
use dj_connectors::{DeviceManagement, DirectoryUser, ManagedDevice, UserDirectory};
use validator::Validate;

use crate::auth::AuthenticatedUser;
use crate::dto::{DeviceQuery, UserSearchQuery};
use crate::error::{ApiError, ErrorResponse};
use crate::state::AppState;

const DEFAULT_SEARCH_RESULTS: usize = 10;

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(search_users))
        .route("/users/:id", get(get_user))
}

pub fn device_routes() -> Router<AppState> {
    Router::new()
        .route("/devices", get(find_devices))
        .route("/devices/:id", get(get_device))
}

pub(crate) fn user_directory(state: &AppState) -> Result<Arc<dyn UserDirectory>, ApiError> {
    state
        .user_directory
        .clone()
        .ok_or_else(|| ApiError::ServiceUnavailable("Microsoft Graph is not configured".into()))
}

pub(crate) fn device_management(state: &AppState) -> Result<Arc<dyn DeviceManagement>, ApiError> {
    state
        .device_management
        .clone()
        .ok_or_else(|| ApiError::ServiceUnavailable("Intune is not configured".into()))
}

/// Users whose display name, mail or UPN starts with `q`.
#[utoipa::path(
    get,
    path = "/api/v1/graph/users",
    params(UserSearchQuery),
    responses(
        (status = 200, description = "Matching users"),
        (status = 502, description = "Graph lookup failed", body = ErrorResponse),
        (status = 503, description = "Graph not configured", body = ErrorResponse)
    ),
    tag = "Graph"
)]
pub async fn search_users(
    State(state): State<AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    Query(query): Query<UserSearchQuery>,
) -> Result<Json<Vec<DirectoryUser>>, ApiError> {
    query.validate()?;
    let directory = user_directory(&state)?;
    if query.q.trim().chars().count() < MIN_SEARCH_LENGTH {
        return Ok(Json(Vec::new()));
    }
    let limit = query
        .limit
        .unwrap_or(DEFAULT_SEARCH_RESULTS)
        .min(MAX_SEARCH_RESULTS);
    Ok(Json(directory.search_users(&query.q, limit).await?))
}

/// A user by object id or user principal name.
#[utoipa::path(
    get,
    path = "/api/v1/graph/users/{id}",
    params(("id" = String, Path, description = "Object id or UPN")),
    responses(
        (status = 200, description = "User"),
        (status = 404, description = "Not found", body = ErrorResponse),
        (status = 503, description = "Graph not configured", body = ErrorResponse)
    ),
    tag = "Graph"
)]
pub async fn get_user(
    State(state): State<AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<Json<DirectoryUser>, ApiError> {
    let directory = user_directory(&state)?;
    Ok(Json(directory.get_user(&id).await?))
}

/// Devices by serial number or by assigned user. One of the two is required.
#[utoipa::path(
    get,
    path = "/api/v1/intune/devices",
    params(DeviceQuery),
    responses(
        (status = 200, description = "Managed devices"),
        (status = 400, description = "Neither serialNumber nor userPrincipalName given", body = ErrorResponse),
        (status = 502, description = "Intune lookup failed", body = ErrorResponse),
        (status = 503, description = "Intune not configured", body = ErrorResponse)
    ),
    tag = "Intune"
)]
pub async fn find_devices(
    State(state): State<AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    Query(query): Query<DeviceQuery>,
) -> Result<Json<Vec<ManagedDevice>>, ApiError> {
    let devices = device_management(&state)?;
    let serial = query.serial_number.as_deref().map(str::trim).filter(|s| !s.is_empty());
    let upn = query
        .user_principal_name
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());
    let found = match (serial, upn) {
        (Some(serial), _) => devices.find_by_serial(serial).await?,
        (None, Some(upn)) => devices.devices_for_user(upn).await?,
        (None, None) => {
            return Err(ApiError::BadRequest(
                "serialNumber or userPrincipalName is required".into(),
            ))
        }
    };
    Ok(Json(found))
}

#[utoipa::path(
    get,
    path = "/api/v1/intune/devices/{id}",
    params(("id" = String, Path, description = "Intune device id")),
    responses(
        (status = 200, description = "Managed device"),
        (status = 404, description = "Not found", body = ErrorResponse),
        (status = 503, description = "Intune not configured", body = ErrorResponse)
    ),
    tag = "Intune"
)]
pub async fn get_device(
    State(state): State<AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<Json<ManagedDevice>, ApiError> {
    let devices = device_management(&state)?;
    Ok(Json(devices.get_device(&id).await?))
}
