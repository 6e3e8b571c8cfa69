//! Asset template endpoints. Templates prefill bulk creation.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use dj_core::models::{AssetTemplate, AssetTemplateUpdate};
use dj_core::validation::{InputValidator, MAX_NOTES_LENGTH};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::auth::AuthenticatedUser;
use crate::dto::ReferenceListQuery;
use crate::error::{ApiError, ErrorResponse};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_templates).post(create_template))
        .route(
            "/:id",
            get(get_template).put(update_template).delete(delete_template),
        )
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTemplateRequest {
    #[validate(length(min = 1, max = 200))]
    pub template_name: String,
    pub asset_type_id: Option<Uuid>,
    pub asset_name: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub service_id: Option<Uuid>,
    pub owner: Option<String>,
    pub notes: Option<String>,
}

async fn check_references(
    state: &AppState,
    asset_type_id: Option<Uuid>,
    service_id: Option<Uuid>,
) -> Result<(), ApiError> {
    if let Some(id) = asset_type_id {
        state
            .stores
            .asset_types
            .get(id)
            .await?
            .ok_or_else(|| ApiError::BadRequest(format!("Asset type {} does not exist", id)))?;
    }
    if let Some(id) = service_id {
        state
            .stores
            .services
            .get(id)
            .await?
            .ok_or_else(|| ApiError::BadRequest(format!("Service {} does not exist", id)))?;
    }
    Ok(())
}

fn text(field: &str, value: Option<&str>) -> Result<Option<String>, ApiError> {
    Ok(InputValidator::validate_optional_text(
        field,
        value,
        MAX_NOTES_LENGTH,
    )?)
}

#[utoipa::path(
    get,
    path = "/api/v1/templates",
    params(ReferenceListQuery),
    responses((status = 200, description = "Templates", body = [AssetTemplate])),
    tag = "Templates"
)]
pub async fn list_templates(
    State(state): State<AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    Query(query): Query<ReferenceListQuery>,
) -> Result<Json<Vec<AssetTemplate>>, ApiError> {
    Ok(Json(
        state.stores.templates.list(query.include_inactive).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/templates/{id}",
    params(("id" = Uuid, Path, description = "Template id")),
    responses(
        (status = 200, description = "Template", body = AssetTemplate),
        (status = 404, description = "Not found", body = ErrorResponse)
    ),
    tag = "Templates"
)]
pub async fn get_template(
    State(state): State<AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<AssetTemplate>, ApiError> {
    let template = state
        .stores
        .templates
        .get(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("AssetTemplate {} not found", id)))?;
    Ok(Json(template))
}

#[utoipa::path(
    post,
    path = "/api/v1/templates",
    request_body = CreateTemplateRequest,
    responses(
        (status = 201, description = "Template created", body = AssetTemplate),
        (status = 409, description = "Name already in use", body = ErrorResponse)
    ),
    tag = "Templates"
)]
pub async fn create_template(
    State(state): State<AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    Json(request): Json<CreateTemplateRequest>,
) -> Result<(StatusCode, Json<AssetTemplate>), ApiError> {
    request.validate()?;
    let name = InputValidator::validate_name("templateName", &request.template_name)?;
    if state.stores.templates.name_exists(&name, None).await? {
        return Err(ApiError::Conflict(format!(
            "Template '{}' already exists",
            name
        )));
    }
    check_references(&state, request.asset_type_id, request.service_id).await?;

    let mut template = AssetTemplate::new(name);
    template.asset_type_id = request.asset_type_id;
    template.asset_name = text("assetName", request.asset_name.as_deref())?;
    template.brand = text("brand", request.brand.as_deref())?;
    template.model = text("model", request.model.as_deref())?;
    template.service_id = request.service_id;
    template.owner = InputValidator::validate_owner(request.owner.as_deref())?;
    template.notes = text("notes", request.notes.as_deref())?;

    let created = state.stores.templates.create(&template).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    put,
    path = "/api/v1/templates/{id}",
    params(("id" = Uuid, Path, description = "Template id")),
    request_body = AssetTemplateUpdate,
    responses(
        (status = 200, description = "Updated template", body = AssetTemplate),
        (status = 404, description = "Not found", body = ErrorResponse),
        (status = 409, description = "Name already in use", body = ErrorResponse)
    ),
    tag = "Templates"
)]
pub async fn update_template(
    State(state): State<AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(mut update): Json<AssetTemplateUpdate>,
) -> Result<Json<AssetTemplate>, ApiError> {
    if let Some(name) = update.template_name.take() {
        let name = InputValidator::validate_name("templateName", &name)?;
        if state.stores.templates.name_exists(&name, Some(id)).await? {
            return Err(ApiError::Conflict(format!(
                "Template '{}' already exists",
                name
            )));
        }
        update.template_name = Some(name);
    }
    if let Some(owner) = update.owner.take() {
        update.owner = Some(
            InputValidator::validate_owner(Some(&owner))?.unwrap_or_default(),
        );
    }
    for (field, value) in [
        ("assetName", &mut update.asset_name),
        ("brand", &mut update.brand),
        ("model", &mut update.model),
        ("notes", &mut update.notes),
    ] {
        if let Some(raw) = value.take() {
            *value = Some(text(field, Some(&raw))?.unwrap_or_default());
        }
    }
    check_references(&state, update.asset_type_id, update.service_id).await?;
    Ok(Json(state.stores.templates.update(id, update).await?))
}

#[utoipa::path(
    delete,
    path = "/api/v1/templates/{id}",
    params(("id" = Uuid, Path, description = "Template id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not found", body = ErrorResponse)
    ),
    tag = "Templates"
)]
pub async fn delete_template(
    State(state): State<AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if !state.stores.templates.delete(id).await? {
        return Err(ApiError::NotFound(format!("AssetTemplate {} not found", id)));
    }
    Ok(StatusCode::NO_CONTENT)
}
