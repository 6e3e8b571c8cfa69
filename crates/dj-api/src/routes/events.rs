//! Audit trail across the inventory.

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use dj_core::models::AssetEvent;

use crate::auth::AuthenticatedUser;
use crate::dto::RecentEventsQuery;
use crate::error::ApiError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/", get(recent_events))
}

/// Newest events first.
#[utoipa::path(
    get,
    path = "/api/v1/events",
    params(RecentEventsQuery),
    responses((status = 200, description = "Recent events", body = [AssetEvent])),
    tag = "Events"
)]
pub async fn recent_events(
    State(state): State<AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    Query(query): Query<RecentEventsQuery>,
) -> Result<Json<Vec<AssetEvent>>, ApiError> {
    Ok(Json(state.assets.events().recent(query.limit).await?))
}
