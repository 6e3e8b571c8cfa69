//! Asset endpoints.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use dj_connectors::ManagedDevice;
use chrono::Utc;
use dj_core::models::{Asset, AssetEvent, AssetUpdate, NewAsset};
use dj_core::services::{BulkCreateRequest, NewLease};
use uuid::Uuid;
use validator::Validate;

use crate::auth::{AuthenticatedUser, RequireAdmin};
use crate::dto::{AssetPage, LeaseResponse, ListAssetsQuery};
use crate::error::{ApiError, ErrorResponse};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_assets).post(create_asset))
        .route("/bulk", post(bulk_create_assets))
        .route("/by-code/:code", get(get_asset_by_code))
        .route("/by-serial/:serial", get(get_asset_by_serial))
        .route(
            "/:id",
            get(get_asset).put(update_asset).delete(delete_asset),
        )
        .route("/:id/deactivate", post(deactivate_asset))
        .route("/:id/reactivate", post(reactivate_asset))
        .route("/:id/events", get(asset_history))
        .route("/:id/leases", get(list_asset_leases).post(create_asset_lease))
        .route("/:id/intune", get(asset_intune_devices))
}

/// List assets with filters and pagination.
#[utoipa::path(
    get,
    path = "/api/v1/assets",
    params(ListAssetsQuery),
    responses(
        (status = 200, description = "One page of assets", body = AssetPage),
        (status = 422, description = "Invalid filter", body = ErrorResponse)
    ),
    tag = "Assets"
)]
pub async fn list_assets(
    State(state): State<AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    Query(query): Query<ListAssetsQuery>,
) -> Result<Json<AssetPage>, ApiError> {
    query.validate()?;
    let page = state
        .assets
        .list(&query.filter()?, &query.pagination())
        .await?;
    Ok(Json(page.into()))
}

/// Create an asset. The asset code is generated unless `assetCode` is given.
#[utoipa::path(
    post,
    path = "/api/v1/assets",
    request_body = NewAsset,
    responses(
        (status = 201, description = "Asset created", body = Asset),
        (status = 400, description = "Unknown or inactive reference", body = ErrorResponse),
        (status = 409, description = "Asset code or serial number in use", body = ErrorResponse),
        (status = 422, description = "Invalid field", body = ErrorResponse)
    ),
    tag = "Assets"
)]
pub async fn create_asset(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(request): Json<NewAsset>,
) -> Result<(StatusCode, Json<Asset>), ApiError> {
    let asset = state.assets.create(request, Some(user.actor())).await?;
    Ok((StatusCode::CREATED, Json(asset)))
}

/// Create up to 100 assets at once, optionally from a template.
#[utoipa::path(
    post,
    path = "/api/v1/assets/bulk",
    request_body = BulkCreateRequest,
    responses(
        (status = 201, description = "Assets created", body = [Asset]),
        (status = 400, description = "Quantity out of range or unknown template", body = ErrorResponse)
    ),
    tag = "Assets"
)]
pub async fn bulk_create_assets(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(request): Json<BulkCreateRequest>,
) -> Result<(StatusCode, Json<Vec<Asset>>), ApiError> {
    let assets = state.assets.bulk_create(request, Some(user.actor())).await?;
    Ok((StatusCode::CREATED, Json(assets)))
}

#[utoipa::path(
    get,
    path = "/api/v1/assets/{id}",
    params(("id" = Uuid, Path, description = "Asset id")),
    responses(
        (status = 200, description = "Asset", body = Asset),
        (status = 404, description = "Not found", body = ErrorResponse)
    ),
    tag = "Assets"
)]
pub async fn get_asset(
    State(state): State<AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Asset>, ApiError> {
    Ok(Json(state.assets.get(id).await?))
}

/// Look up an asset by its code, e.g. from a scanned QR label.
#[utoipa::path(
    get,
    path = "/api/v1/assets/by-code/{code}",
    params(("code" = String, Path, description = "Asset code")),
    responses(
        (status = 200, description = "Asset", body = Asset),
        (status = 404, description = "Not found", body = ErrorResponse)
    ),
    tag = "Assets"
)]
pub async fn get_asset_by_code(
    State(state): State<AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    Path(code): Path<String>,
) -> Result<Json<Asset>, ApiError> {
    Ok(Json(state.assets.get_by_code(&code).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/assets/by-serial/{serial}",
    params(("serial" = String, Path, description = "Serial number")),
    responses(
        (status = 200, description = "Asset", body = Asset),
        (status = 404, description = "Not found", body = ErrorResponse)
    ),
    tag = "Assets"
)]
pub async fn get_asset_by_serial(
    State(state): State<AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    Path(serial): Path<String>,
) -> Result<Json<Asset>, ApiError> {
    Ok(Json(state.assets.get_by_serial(&serial).await?))
}

/// Partial update. Status, owner and service changes are recorded as events.
#[utoipa::path(
    put,
    path = "/api/v1/assets/{id}",
    params(("id" = Uuid, Path, description = "Asset id")),
    request_body = AssetUpdate,
    responses(
        (status = 200, description = "Updated asset", body = Asset),
        (status = 404, description = "Not found", body = ErrorResponse),
        (status = 409, description = "Serial number in use", body = ErrorResponse)
    ),
    tag = "Assets"
)]
pub async fn update_asset(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(update): Json<AssetUpdate>,
) -> Result<Json<Asset>, ApiError> {
    Ok(Json(
        state.assets.update(id, update, Some(user.actor())).await?,
    ))
}

/// Permanently delete an asset with its events and leases. Admin only;
/// prefer deactivation.
#[utoipa::path(
    delete,
    path = "/api/v1/assets/{id}",
    params(("id" = Uuid, Path, description = "Asset id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Admin role required", body = ErrorResponse),
        (status = 404, description = "Not found", body = ErrorResponse)
    ),
    tag = "Assets"
)]
pub async fn delete_asset(
    State(state): State<AppState>,
    RequireAdmin(user): RequireAdmin,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.assets.delete(id).await?;
    tracing::info!(asset_id = %id, user = %user.actor(), "Asset deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/v1/assets/{id}/deactivate",
    params(("id" = Uuid, Path, description = "Asset id")),
    responses(
        (status = 200, description = "Asset deactivated", body = Asset),
        (status = 404, description = "Not found", body = ErrorResponse)
    ),
    tag = "Assets"
)]
pub async fn deactivate_asset(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Asset>, ApiError> {
    Ok(Json(state.assets.deactivate(id, Some(user.actor())).await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/assets/{id}/reactivate",
    params(("id" = Uuid, Path, description = "Asset id")),
    responses(
        (status = 200, description = "Asset reactivated", body = Asset),
        (status = 404, description = "Not found", body = ErrorResponse)
    ),
    tag = "Assets"
)]
pub async fn reactivate_asset(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Asset>, ApiError> {
    Ok(Json(state.assets.reactivate(id, Some(user.actor())).await?))
}

/// History of an asset, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/assets/{id}/events",
    params(("id" = Uuid, Path, description = "Asset id")),
    responses(
        (status = 200, description = "Events", body = [AssetEvent]),
        (status = 404, description = "Not found", body = ErrorResponse)
    ),
    tag = "Assets"
)]
pub async fn asset_history(
    State(state): State<AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<AssetEvent>>, ApiError> {
    state.assets.get(id).await?;
    Ok(Json(state.assets.events().history(id).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/assets/{id}/leases",
    params(("id" = Uuid, Path, description = "Asset id")),
    responses(
        (status = 200, description = "Lease contracts", body = [LeaseResponse]),
        (status = 404, description = "Not found", body = ErrorResponse)
    ),
    tag = "Leases"
)]
pub async fn list_asset_leases(
    State(state): State<AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<LeaseResponse>>, ApiError> {
    let leases = state.leases.list_for_asset(id).await?;
    Ok(Json(LeaseResponse::list(leases, Utc::now().date_naive())))
}

#[utoipa::path(
    post,
    path = "/api/v1/assets/{id}/leases",
    params(("id" = Uuid, Path, description = "Asset id")),
    request_body = NewLease,
    responses(
        (status = 201, description = "Lease added", body = LeaseResponse),
        (status = 400, description = "End date before start date", body = ErrorResponse),
        (status = 404, description = "Not found", body = ErrorResponse)
    ),
    tag = "Leases"
)]
pub async fn create_asset_lease(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(request): Json<NewLease>,
) -> Result<(StatusCode, Json<LeaseResponse>), ApiError> {
    let lease = state
        .leases
        .create(id, request, Some(user.actor()))
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(LeaseResponse::on(lease, Utc::now().date_naive())),
    ))
}

/// Intune devices with the asset's serial number.
#[utoipa::path(
    get,
    path = "/api/v1/assets/{id}/intune",
    params(("id" = Uuid, Path, description = "Asset id")),
    responses(
        (status = 200, description = "Matching managed devices"),
        (status = 404, description = "Asset not found", body = ErrorResponse),
        (status = 502, description = "Intune lookup failed", body = ErrorResponse),
        (status = 503, description = "Intune not configured", body = ErrorResponse)
    ),
    tag = "Intune"
)]
pub async fn asset_intune_devices(
    State(state): State<AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<ManagedDevice>>, ApiError> {
    let devices = super::graph::device_management(&state)?;
    let asset = state.assets.get(id).await?;
    let Some(serial) = asset.serial_number.as_deref() else {
        return Ok(Json(Vec::new()));
    };
    Ok(Json(devices.find_by_serial(serial).await?))
}
