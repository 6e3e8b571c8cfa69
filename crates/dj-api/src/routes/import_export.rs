//! CSV import and export.
//!
//! Import endpoints take the raw CSV text as the request body; comma and
//! semicolon delimiters are detected from the content.

use axum::{
    extract::{DefaultBodyLimit, Query, State},
    http::header,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use dj_core::csv::import_template;
use dj_core::services::{ImportOptions, ImportReport};
use tracing::info;
use validator::Validate;

use crate::auth::AuthenticatedUser;
use crate::dto::ListAssetsQuery;
use crate::error::{ApiError, ErrorResponse};
use crate::state::AppState;

/// Largest CSV file accepted for import.
pub const MAX_IMPORT_BYTES: usize = 10 * 1024 * 1024;

const CSV_CONTENT_TYPE: &str = "text/csv; charset=utf-8";

pub fn import_routes() -> Router<AppState> {
    Router::new()
        .route("/csv/validate", post(validate_csv))
        .route("/csv", post(import_csv))
        .layer(DefaultBodyLimit::max(MAX_IMPORT_BYTES))
}

pub fn export_routes() -> Router<AppState> {
    Router::new()
        .route("/csv", get(export_csv))
        .route("/template", get(download_template))
}

/// Dry run. Reports per-row errors without writing anything.
#[utoipa::path(
    post,
    path = "/api/v1/import/csv/validate",
    request_body(content = String, content_type = "text/csv"),
    responses(
        (status = 200, description = "Validation report", body = ImportReport),
        (status = 400, description = "Unreadable CSV", body = ErrorResponse)
    ),
    tag = "Import/Export"
)]
pub async fn validate_csv(
    State(state): State<AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    body: String,
) -> Result<Json<ImportReport>, ApiError> {
    Ok(Json(state.importer.validate(&body).await?))
}

/// Creates an asset for every valid row. With `stopOnError=true` nothing is
/// written when any row is invalid.
#[utoipa::path(
    post,
    path = "/api/v1/import/csv",
    params(("stopOnError" = Option<bool>, Query, description = "Write nothing when a row is invalid")),
    request_body(content = String, content_type = "text/csv"),
    responses(
        (status = 200, description = "Import report", body = ImportReport),
        (status = 400, description = "Unreadable CSV", body = ErrorResponse)
    ),
    tag = "Import/Export"
)]
pub async fn import_csv(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(options): Query<ImportOptions>,
    body: String,
) -> Result<Json<ImportReport>, ApiError> {
    let report = state
        .importer
        .import(&body, options, Some(user.actor()))
        .await?;
    info!(
        user = %user.actor(),
        imported = report.imported_rows,
        failed = report.failed_rows,
        "CSV import finished"
    );
    Ok(Json(report))
}

/// Assets matching the same filters as the asset list, unpaginated.
#[utoipa::path(
    get,
    path = "/api/v1/export/csv",
    params(ListAssetsQuery),
    responses(
        (status = 200, description = "CSV file", content_type = "text/csv", body = String),
        (status = 422, description = "Invalid filter", body = ErrorResponse)
    ),
    tag = "Import/Export"
)]
pub async fn export_csv(
    State(state): State<AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    Query(query): Query<ListAssetsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    query.validate()?;
    let csv = state.exporter.export(&query.filter()?).await?;
    let filename = format!(
        "attachment; filename=\"djoppie-assets-{}.csv\"",
        Utc::now().format("%Y%m%d")
    );
    Ok((
        [
            (header::CONTENT_TYPE, CSV_CONTENT_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, filename),
        ],
        csv,
    ))
}

/// Empty import file with comment lines describing each column.
#[utoipa::path(
    get,
    path = "/api/v1/export/template",
    responses((status = 200, description = "Import template", content_type = "text/csv", body = String)),
    tag = "Import/Export"
)]
pub async fn download_template(AuthenticatedUser(_user): AuthenticatedUser) -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, CSV_CONTENT_TYPE),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"djoppie-import-template.csv\"",
            ),
        ],
        import_template(),
    )
}
