//! Reference data endpoints: asset types, categories, buildings, sectors and
//! services.
//!
//! Reads are open to every authenticated user; mutations require the admin
//! role. Codes are upper-cased and must be unique per entity. Deleting a row
//! that is still referenced answers 409; deactivate it through `PUT` with
//! `isActive: false` instead.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use dj_core::models::{
    AssetType, AssetTypeUpdate, Building, BuildingUpdate, Category, CategoryUpdate, Sector,
    SectorUpdate, Service, ServiceUpdate,
};
use dj_core::validation::{InputValidator, MAX_NOTES_LENGTH};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::auth::{AuthenticatedUser, RequireAdmin};
use crate::dto::ReferenceListQuery;
use crate::error::{ApiError, ErrorResponse};
use crate::state::AppState;

pub fn asset_type_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_asset_types).post(create_asset_type))
        .route(
            "/:id",
            get(get_asset_type)
                .put(update_asset_type)
                .delete(delete_asset_type),
        )
}

pub fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_categories).post(create_category))
        .route(
            "/:id",
            get(get_category).put(update_category).delete(delete_category),
        )
}

pub fn building_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_buildings).post(create_building))
        .route(
            "/:id",
            get(get_building).put(update_building).delete(delete_building),
        )
}

pub fn sector_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_sectors).post(create_sector))
        .route(
            "/:id",
            get(get_sector).put(update_sector).delete(delete_sector),
        )
        .route("/:id/services", get(list_sector_services))
}

pub fn service_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_services).post(create_service))
        .route(
            "/:id",
            get(get_service).put(update_service).delete(delete_service),
        )
}

// ============================================================================
// Request types
// ============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAssetTypeRequest {
    /// 2-10 uppercase letters or digits, e.g. `LAP`.
    pub code: String,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub description: Option<String>,
    pub category_id: Option<Uuid>,
    #[serde(default)]
    pub sort_order: i32,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryRequest {
    pub code: String,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub sort_order: i32,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBuildingRequest {
    pub code: String,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub address: Option<String>,
    #[serde(default)]
    pub sort_order: i32,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSectorRequest {
    pub code: String,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[serde(default)]
    pub sort_order: i32,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateServiceRequest {
    pub code: String,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub sector_id: Option<Uuid>,
    pub building_id: Option<Uuid>,
    #[serde(default)]
    pub sort_order: i32,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct AssetTypeListQuery {
    #[serde(default)]
    pub include_inactive: bool,
    pub category_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ServiceListQuery {
    #[serde(default)]
    pub include_inactive: bool,
    pub sector_id: Option<Uuid>,
}

fn duplicate(entity: &str, code: &str) -> ApiError {
    ApiError::Conflict(format!("{} code '{}' already exists", entity, code))
}

fn not_found(entity: &str, id: Uuid) -> ApiError {
    ApiError::NotFound(format!("{} {} not found", entity, id))
}

fn optional_text(field: &str, value: Option<&str>) -> Result<Option<String>, ApiError> {
    Ok(InputValidator::validate_optional_text(
        field,
        value,
        MAX_NOTES_LENGTH,
    )?)
}

/// Validated update text. `Some("")` is kept so the model clears the field.
fn update_text(field: &str, value: Option<String>) -> Result<Option<String>, ApiError> {
    match value {
        None => Ok(None),
        Some(raw) => Ok(Some(
            optional_text(field, Some(&raw))?.unwrap_or_default(),
        )),
    }
}

async fn ensure_category(state: &AppState, id: Option<Uuid>) -> Result<(), ApiError> {
    if let Some(id) = id {
        state
            .categories
            .get(id)
            .await?
            .ok_or_else(|| ApiError::BadRequest(format!("Category {} does not exist", id)))?;
    }
    Ok(())
}

async fn ensure_sector(state: &AppState, id: Option<Uuid>) -> Result<(), ApiError> {
    if let Some(id) = id {
        state
            .sectors
            .get(id)
            .await?
            .ok_or_else(|| ApiError::BadRequest(format!("Sector {} does not exist", id)))?;
    }
    Ok(())
}

async fn ensure_building(state: &AppState, id: Option<Uuid>) -> Result<(), ApiError> {
    if let Some(id) = id {
        state
            .stores
            .buildings
            .get(id)
            .await?
            .ok_or_else(|| ApiError::BadRequest(format!("Building {} does not exist", id)))?;
    }
    Ok(())
}

// ============================================================================
// Asset types
// ============================================================================

#[utoipa::path(
    get,
    path = "/api/v1/asset-types",
    params(AssetTypeListQuery),
    responses((status = 200, description = "Asset types", body = [AssetType])),
    tag = "Reference data"
)]
pub async fn list_asset_types(
    State(state): State<AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    Query(query): Query<AssetTypeListQuery>,
) -> Result<Json<Vec<AssetType>>, ApiError> {
    let types = match query.category_id {
        Some(category_id) => state.stores.asset_types.list_by_category(category_id).await?,
        None => state.stores.asset_types.list(query.include_inactive).await?,
    };
    Ok(Json(types))
}

#[utoipa::path(
    get,
    path = "/api/v1/asset-types/{id}",
    params(("id" = Uuid, Path, description = "Asset type id")),
    responses(
        (status = 200, description = "Asset type", body = AssetType),
        (status = 404, description = "Not found", body = ErrorResponse)
    ),
    tag = "Reference data"
)]
pub async fn get_asset_type(
    State(state): State<AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<AssetType>, ApiError> {
    let asset_type = state
        .stores
        .asset_types
        .get(id)
        .await?
        .ok_or_else(|| not_found("AssetType", id))?;
    Ok(Json(asset_type))
}

#[utoipa::path(
    post,
    path = "/api/v1/asset-types",
    request_body = CreateAssetTypeRequest,
    responses(
        (status = 201, description = "Asset type created", body = AssetType),
        (status = 403, description = "Admin role required", body = ErrorResponse),
        (status = 409, description = "Code already exists", body = ErrorResponse),
        (status = 422, description = "Invalid field", body = ErrorResponse)
    ),
    tag = "Reference data"
)]
pub async fn create_asset_type(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Json(request): Json<CreateAssetTypeRequest>,
) -> Result<(StatusCode, Json<AssetType>), ApiError> {
    request.validate()?;
    let code = InputValidator::validate_type_code(&request.code)?;
    let name = InputValidator::validate_name("name", &request.name)?;
    if state.stores.asset_types.code_exists(&code, None).await? {
        return Err(duplicate("Asset type", &code));
    }
    ensure_category(&state, request.category_id).await?;

    let mut asset_type = AssetType::new(code, name);
    asset_type.description = optional_text("description", request.description.as_deref())?;
    asset_type.category_id = request.category_id;
    asset_type.sort_order = request.sort_order;
    let created = state.stores.asset_types.create(&asset_type).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    put,
    path = "/api/v1/asset-types/{id}",
    params(("id" = Uuid, Path, description = "Asset type id")),
    request_body = AssetTypeUpdate,
    responses(
        (status = 200, description = "Updated asset type", body = AssetType),
        (status = 404, description = "Not found", body = ErrorResponse),
        (status = 409, description = "Code already exists", body = ErrorResponse)
    ),
    tag = "Reference data"
)]
pub async fn update_asset_type(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<Uuid>,
    Json(mut update): Json<AssetTypeUpdate>,
) -> Result<Json<AssetType>, ApiError> {
    if let Some(code) = update.code.take() {
        let code = InputValidator::validate_type_code(&code)?;
        if state.stores.asset_types.code_exists(&code, Some(id)).await? {
            return Err(duplicate("Asset type", &code));
        }
        update.code = Some(code);
    }
    if let Some(name) = update.name.take() {
        update.name = Some(InputValidator::validate_name("name", &name)?);
    }
    update.description = update_text("description", update.description.take())?;
    ensure_category(&state, update.category_id).await?;
    Ok(Json(state.stores.asset_types.update(id, update).await?))
}

#[utoipa::path(
    delete,
    path = "/api/v1/asset-types/{id}",
    params(("id" = Uuid, Path, description = "Asset type id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not found", body = ErrorResponse),
        (status = 409, description = "Still used by assets", body = ErrorResponse)
    ),
    tag = "Reference data"
)]
pub async fn delete_asset_type(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if !state.stores.asset_types.delete(id).await? {
        return Err(not_found("AssetType", id));
    }
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Categories
// ============================================================================

#[utoipa::path(
    get,
    path = "/api/v1/categories",
    params(ReferenceListQuery),
    responses((status = 200, description = "Categories", body = [Category])),
    tag = "Reference data"
)]
pub async fn list_categories(
    State(state): State<AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    Query(query): Query<ReferenceListQuery>,
) -> Result<Json<Vec<Category>>, ApiError> {
    Ok(Json(state.categories.list(query.include_inactive).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/categories/{id}",
    params(("id" = Uuid, Path, description = "Category id")),
    responses(
        (status = 200, description = "Category", body = Category),
        (status = 404, description = "Not found", body = ErrorResponse)
    ),
    tag = "Reference data"
)]
pub async fn get_category(
    State(state): State<AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Category>, ApiError> {
    let category = state
        .categories
        .get(id)
        .await?
        .ok_or_else(|| not_found("Category", id))?;
    Ok(Json(category))
}

#[utoipa::path(
    post,
    path = "/api/v1/categories",
    request_body = CreateCategoryRequest,
    responses(
        (status = 201, description = "Category created", body = Category),
        (status = 409, description = "Code already exists", body = ErrorResponse)
    ),
    tag = "Reference data"
)]
pub async fn create_category(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Json(request): Json<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<Category>), ApiError> {
    request.validate()?;
    let code = InputValidator::validate_reference_code("code", &request.code)?;
    let name = InputValidator::validate_name("name", &request.name)?;
    if state.categories.code_exists(&code, None).await? {
        return Err(duplicate("Category", &code));
    }

    let mut category = Category::new(code, name);
    category.description = optional_text("description", request.description.as_deref())?;
    category.sort_order = request.sort_order;
    let created = state.categories.create(&category).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    put,
    path = "/api/v1/categories/{id}",
    params(("id" = Uuid, Path, description = "Category id")),
    request_body = CategoryUpdate,
    responses(
        (status = 200, description = "Updated category", body = Category),
        (status = 404, description = "Not found", body = ErrorResponse)
    ),
    tag = "Reference data"
)]
pub async fn update_category(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<Uuid>,
    Json(mut update): Json<CategoryUpdate>,
) -> Result<Json<Category>, ApiError> {
    if let Some(code) = update.code.take() {
        let code = InputValidator::validate_reference_code("code", &code)?;
        if state.categories.code_exists(&code, Some(id)).await? {
            return Err(duplicate("Category", &code));
        }
        update.code = Some(code);
    }
    if let Some(name) = update.name.take() {
        update.name = Some(InputValidator::validate_name("name", &name)?);
    }
    update.description = update_text("description", update.description.take())?;
    Ok(Json(state.categories.update(id, update).await?))
}

#[utoipa::path(
    delete,
    path = "/api/v1/categories/{id}",
    params(("id" = Uuid, Path, description = "Category id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not found", body = ErrorResponse)
    ),
    tag = "Reference data"
)]
pub async fn delete_category(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if !state.categories.delete(id).await? {
        return Err(not_found("Category", id));
    }
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Buildings
// ============================================================================

#[utoipa::path(
    get,
    path = "/api/v1/buildings",
    params(ReferenceListQuery),
    responses((status = 200, description = "Buildings", body = [Building])),
    tag = "Reference data"
)]
pub async fn list_buildings(
    State(state): State<AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    Query(query): Query<ReferenceListQuery>,
) -> Result<Json<Vec<Building>>, ApiError> {
    Ok(Json(
        state.stores.buildings.list(query.include_inactive).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/buildings/{id}",
    params(("id" = Uuid, Path, description = "Building id")),
    responses(
        (status = 200, description = "Building", body = Building),
        (status = 404, description = "Not found", body = ErrorResponse)
    ),
    tag = "Reference data"
)]
pub async fn get_building(
    State(state): State<AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Building>, ApiError> {
    let building = state
        .stores
        .buildings
        .get(id)
        .await?
        .ok_or_else(|| not_found("Building", id))?;
    Ok(Json(building))
}

#[utoipa::path(
    post,
    path = "/api/v1/buildings",
    request_body = CreateBuildingRequest,
    responses(
        (status = 201, description = "Building created", body = Building),
        (status = 409, description = "Code already exists", body = ErrorResponse)
    ),
    tag = "Reference data"
)]
pub async fn create_building(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Json(request): Json<CreateBuildingRequest>,
) -> Result<(StatusCode, Json<Building>), ApiError> {
    request.validate()?;
    let code = InputValidator::validate_reference_code("code", &request.code)?;
    let name = InputValidator::validate_name("name", &request.name)?;
    if state.stores.buildings.code_exists(&code, None).await? {
        return Err(duplicate("Building", &code));
    }

    let mut building = Building::new(code, name);
    building.address = optional_text("address", request.address.as_deref())?;
    building.sort_order = request.sort_order;
    let created = state.stores.buildings.create(&building).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    put,
    path = "/api/v1/buildings/{id}",
    params(("id" = Uuid, Path, description = "Building id")),
    request_body = BuildingUpdate,
    responses(
        (status = 200, description = "Updated building", body = Building),
        (status = 404, description = "Not found", body = ErrorResponse)
    ),
    tag = "Reference data"
)]
pub async fn update_building(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<Uuid>,
    Json(mut update): Json<BuildingUpdate>,
) -> Result<Json<Building>, ApiError> {
    if let Some(code) = update.code.take() {
        let code = InputValidator::validate_reference_code("code", &code)?;
        if state.stores.buildings.code_exists(&code, Some(id)).await? {
            return Err(duplicate("Building", &code));
        }
        update.code = Some(code);
    }
    if let Some(name) = update.name.take() {
        update.name = Some(InputValidator::validate_name("name", &name)?);
    }
    update.address = update_text("address", update.address.take())?;
    Ok(Json(state.stores.buildings.update(id, update).await?))
}

#[utoipa::path(
    delete,
    path = "/api/v1/buildings/{id}",
    params(("id" = Uuid, Path, description = "Building id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not found", body = ErrorResponse)
    ),
    tag = "Reference data"
)]
pub async fn delete_building(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if !state.stores.buildings.delete(id).await? {
        return Err(not_found("Building", id));
    }
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Sectors
// ============================================================================

#[utoipa::path(
    get,
    path = "/api/v1/sectors",
    params(ReferenceListQuery),
    responses((status = 200, description = "Sectors", body = [Sector])),
    tag = "Reference data"
)]
pub async fn list_sectors(
    State(state): State<AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    Query(query): Query<ReferenceListQuery>,
) -> Result<Json<Vec<Sector>>, ApiError> {
    Ok(Json(state.sectors.list(query.include_inactive).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/sectors/{id}",
    params(("id" = Uuid, Path, description = "Sector id")),
    responses(
        (status = 200, description = "Sector", body = Sector),
        (status = 404, description = "Not found", body = ErrorResponse)
    ),
    tag = "Reference data"
)]
pub async fn get_sector(
    State(state): State<AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Sector>, ApiError> {
    let sector = state
        .sectors
        .get(id)
        .await?
        .ok_or_else(|| not_found("Sector", id))?;
    Ok(Json(sector))
}

/// Services belonging to a sector.
#[utoipa::path(
    get,
    path = "/api/v1/sectors/{id}/services",
    params(("id" = Uuid, Path, description = "Sector id")),
    responses(
        (status = 200, description = "Services of the sector", body = [Service]),
        (status = 404, description = "Not found", body = ErrorResponse)
    ),
    tag = "Reference data"
)]
pub async fn list_sector_services(
    State(state): State<AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Service>>, ApiError> {
    state
        .sectors
        .get(id)
        .await?
        .ok_or_else(|| not_found("Sector", id))?;
    Ok(Json(state.stores.services.list_by_sector(id).await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/sectors",
    request_body = CreateSectorRequest,
    responses(
        (status = 201, description = "Sector created", body = Sector),
        (status = 409, description = "Code already exists", body = ErrorResponse)
    ),
    tag = "Reference data"
)]
pub async fn create_sector(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Json(request): Json<CreateSectorRequest>,
) -> Result<(StatusCode, Json<Sector>), ApiError> {
    request.validate()?;
    let code = InputValidator::validate_reference_code("code", &request.code)?;
    let name = InputValidator::validate_name("name", &request.name)?;
    if state.sectors.code_exists(&code, None).await? {
        return Err(duplicate("Sector", &code));
    }

    let mut sector = Sector::new(code, name);
    sector.sort_order = request.sort_order;
    let created = state.sectors.create(&sector).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    put,
    path = "/api/v1/sectors/{id}",
    params(("id" = Uuid, Path, description = "Sector id")),
    request_body = SectorUpdate,
    responses(
        (status = 200, description = "Updated sector", body = Sector),
        (status = 404, description = "Not found", body = ErrorResponse)
    ),
    tag = "Reference data"
)]
pub async fn update_sector(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<Uuid>,
    Json(mut update): Json<SectorUpdate>,
) -> Result<Json<Sector>, ApiError> {
    if let Some(code) = update.code.take() {
        let code = InputValidator::validate_reference_code("code", &code)?;
        if state.sectors.code_exists(&code, Some(id)).await? {
            return Err(duplicate("Sector", &code));
        }
        update.code = Some(code);
    }
    if let Some(name) = update.name.take() {
        update.name = Some(InputValidator::validate_name("name", &name)?);
    }
    Ok(Json(state.sectors.update(id, update).await?))
}

/// Services of a deleted sector keep existing without a sector.
#[utoipa::path(
    delete,
    path = "/api/v1/sectors/{id}",
    params(("id" = Uuid, Path, description = "Sector id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not found", body = ErrorResponse)
    ),
    tag = "Reference data"
)]
pub async fn delete_sector(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if !state.sectors.delete(id).await? {
        return Err(not_found("Sector", id));
    }
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Services
// ============================================================================

#[utoipa::path(
    get,
    path = "/api/v1/services",
    params(ServiceListQuery),
    responses((status = 200, description = "Services", body = [Service])),
    tag = "Reference data"
)]
pub async fn list_services(
    State(state): State<AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    Query(query): Query<ServiceListQuery>,
) -> Result<Json<Vec<Service>>, ApiError> {
    let services = match query.sector_id {
        Some(sector_id) => state.stores.services.list_by_sector(sector_id).await?,
        None => state.stores.services.list(query.include_inactive).await?,
    };
    Ok(Json(services))
}

#[utoipa::path(
    get,
    path = "/api/v1/services/{id}",
    params(("id" = Uuid, Path, description = "Service id")),
    responses(
        (status = 200, description = "Service", body = Service),
        (status = 404, description = "Not found", body = ErrorResponse)
    ),
    tag = "Reference data"
)]
pub async fn get_service(
    State(state): State<AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Service>, ApiError> {
    let service = state
        .stores
        .services
        .get(id)
        .await?
        .ok_or_else(|| not_found("Service", id))?;
    Ok(Json(service))
}

#[utoipa::path(
    post,
    path = "/api/v1/services",
    request_body = CreateServiceRequest,
    responses(
        (status = 201, description = "Service created", body = Service),
        (status = 400, description = "Unknown sector or building", body = ErrorResponse),
        (status = 409, description = "Code already exists", body = ErrorResponse)
    ),
    tag = "Reference data"
)]
pub async fn create_service(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Json(request): Json<CreateServiceRequest>,
) -> Result<(StatusCode, Json<Service>), ApiError> {
    request.validate()?;
    let code = InputValidator::validate_reference_code("code", &request.code)?;
    let name = InputValidator::validate_name("name", &request.name)?;
    if state.stores.services.code_exists(&code, None).await? {
        return Err(duplicate("Service", &code));
    }
    ensure_sector(&state, request.sector_id).await?;
    ensure_building(&state, request.building_id).await?;

    let mut service = Service::new(code, name);
    service.sector_id = request.sector_id;
    service.building_id = request.building_id;
    service.sort_order = request.sort_order;
    let created = state.stores.services.create(&service).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    put,
    path = "/api/v1/services/{id}",
    params(("id" = Uuid, Path, description = "Service id")),
    request_body = ServiceUpdate,
    responses(
        (status = 200, description = "Updated service", body = Service),
        (status = 404, description = "Not found", body = ErrorResponse)
    ),
    tag = "Reference data"
)]
pub async fn update_service(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<Uuid>,
    Json(mut update): Json<ServiceUpdate>,
) -> Result<Json<Service>, ApiError> {
    if let Some(code) = update.code.take() {
        let code = InputValidator::validate_reference_code("code", &code)?;
        if state.stores.services.code_exists(&code, Some(id)).await? {
            return Err(duplicate("Service", &code));
        }
        update.code = Some(code);
    }
    if let Some(name) = update.name.take() {
        update.name = Some(InputValidator::validate_name("name", &name)?);
    }
    ensure_sector(&state, update.sector_id).await?;
    ensure_building(&state, update.building_id).await?;
    Ok(Json(state.stores.services.update(id, update).await?))
}

/// Assets of a deleted service keep existing without a service.
#[utoipa::path(
    delete,
    path = "/api/v1/services/{id}",
    params(("id" = Uuid, Path, description = "Service id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not found", body = ErrorResponse)
    ),
    tag = "Reference data"
)]
pub async fn delete_service(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if !state.stores.services.delete(id).await? {
        return Err(not_found("Service", id));
    }
    Ok(StatusCode::NO_CONTENT)
}
