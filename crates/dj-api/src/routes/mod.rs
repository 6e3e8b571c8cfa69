//! API routes.

pub mod assets;
pub mod codes;
pub mod events;
pub mod graph;
pub mod health;
pub mod import_export;
pub mod leases;
pub mod metrics;
pub mod reference;
pub mod templates;

use crate::state::AppState;
use axum::Router;

/// Creates the main API router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", api_routes())
        // Unversioned prefix kept for clients built against the first release.
        .nest("/api", api_routes())
        .merge(health::routes())
        .merge(metrics::routes())
        .with_state(state)
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/assets", assets::routes())
        .nest("/asset-types", reference::asset_type_routes())
        .nest("/categories", reference::category_routes())
        .nest("/buildings", reference::building_routes())
        .nest("/sectors", reference::sector_routes())
        .nest("/services", reference::service_routes())
        .nest("/templates", templates::routes())
        .nest("/leases", leases::routes())
        .nest("/events", events::routes())
        .nest("/import", import_export::import_routes())
        .nest("/export", import_export::export_routes())
        .nest("/codes", codes::routes())
        .nest("/graph", graph::user_routes())
        .nest("/intune", graph::device_routes())
}
