//! Asset code preview.

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use dj_core::services::CodePreviewRequest;
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::auth::AuthenticatedUser;
use crate::dto::CodePreviewResponse;
use crate::error::{ApiError, ErrorResponse};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/preview", get(preview_code_query).post(preview_code))
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct CodePreviewQuery {
    pub asset_type_id: Uuid,
    #[serde(default)]
    pub is_dummy: bool,
    pub purchase_date: Option<chrono::NaiveDate>,
    pub building_id: Option<Uuid>,
}

impl From<CodePreviewQuery> for CodePreviewRequest {
    fn from(query: CodePreviewQuery) -> Self {
        Self {
            asset_type_id: query.asset_type_id,
            is_dummy: query.is_dummy,
            purchase_date: query.purchase_date,
            building_id: query.building_id,
        }
    }
}

/// The code the next asset with these inputs would get. Nothing is reserved,
/// so a concurrent create may take it first.
#[utoipa::path(
    post,
    path = "/api/v1/codes/preview",
    request_body = CodePreviewRequest,
    responses(
        (status = 200, description = "Next asset code", body = CodePreviewResponse),
        (status = 400, description = "Unknown asset type or building", body = ErrorResponse),
        (status = 409, description = "Sequence exhausted", body = ErrorResponse)
    ),
    tag = "Assets"
)]
pub async fn preview_code(
    State(state): State<AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    Json(request): Json<CodePreviewRequest>,
) -> Result<Json<CodePreviewResponse>, ApiError> {
    let asset_code = state.assets.preview_code(&request).await?;
    Ok(Json(CodePreviewResponse { asset_code }))
}

#[utoipa::path(
    get,
    path = "/api/v1/codes/preview",
    params(CodePreviewQuery),
    responses(
        (status = 200, description = "Next asset code", body = CodePreviewResponse),
        (status = 400, description = "Unknown asset type or building", body = ErrorResponse)
    ),
    tag = "Assets"
)]
pub async fn preview_code_query(
    State(state): State<AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    Query(query): Query<CodePreviewQuery>,
) -> Result<Json<CodePreviewResponse>, ApiError> {
    let asset_code = state.assets.preview_code(&query.into()).await?;
    Ok(Json(CodePreviewResponse { asset_code }))
}
