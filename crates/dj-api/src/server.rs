//! API server implementation.

use axum::{middleware, Router};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use dj_core::models::{
    Asset, AssetEvent, AssetEventType, AssetStatus, AssetTemplate, AssetTemplateUpdate, AssetType,
    AssetTypeUpdate, AssetUpdate, Building, BuildingUpdate, Category, CategoryUpdate,
    LeaseContract, LeaseStatus, LeaseUpdate, NewAsset, Sector, SectorUpdate, Service,
    ServiceUpdate,
};
use dj_core::services::{
    BulkCreateRequest, CodePreviewRequest, ImportReport, NewLease, RowOutcome, RowStatus,
};

use crate::dto::{
    AssetPage, CodePreviewResponse, DatabaseHealth, HealthResponse, LeaseResponse, ProbeResponse,
};
use crate::error::{ErrorResponse, FieldError, ValidationErrorDetails};
use crate::middleware::{cors_layer, request_id, request_logging, security_headers, CorsConfig};
use crate::routes;
use crate::routes::reference::{
    CreateAssetTypeRequest, CreateBuildingRequest, CreateCategoryRequest, CreateSectorRequest,
    CreateServiceRequest,
};
use crate::routes::templates::CreateTemplateRequest;
use crate::state::AppState;

/// Largest JSON request body. CSV import routes allow more.
const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiServerConfig {
    pub bind_address: SocketAddr,
    pub request_timeout: Duration,
    pub enable_swagger: bool,
    pub cors: CorsConfig,
    /// Enables the development CORS origins.
    pub development: bool,
}

impl Default for ApiServerConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([0, 0, 0, 0], 8080)),
            request_timeout: Duration::from_secs(30),
            enable_swagger: true,
            cors: CorsConfig::default(),
            development: false,
        }
    }
}

/// OpenAPI documentation.
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health::health_check,
        crate::routes::health::readiness_check,
        crate::routes::health::liveness_check,
        crate::routes::metrics::prometheus_metrics,
        crate::routes::assets::list_assets,
        crate::routes::assets::create_asset,
        crate::routes::assets::bulk_create_assets,
        crate::routes::assets::get_asset,
        crate::routes::assets::get_asset_by_code,
        crate::routes::assets::get_asset_by_serial,
        crate::routes::assets::update_asset,
        crate::routes::assets::delete_asset,
        crate::routes::assets::deactivate_asset,
        crate::routes::assets::reactivate_asset,
        crate::routes::assets::asset_history,
        crate::routes::assets::list_asset_leases,
        crate::routes::assets::create_asset_lease,
        crate::routes::assets::asset_intune_devices,
        crate::routes::reference::list_asset_types,
        crate::routes::reference::get_asset_type,
        crate::routes::reference::create_asset_type,
        crate::routes::reference::update_asset_type,
        crate::routes::reference::delete_asset_type,
        crate::routes::reference::list_categories,
        crate::routes::reference::get_category,
        crate::routes::reference::create_category,
        crate::routes::reference::update_category,
        crate::routes::reference::delete_category,
        crate::routes::reference::list_buildings,
        crate::routes::reference::get_building,
        crate::routes::reference::create_building,
        crate::routes::reference::update_building,
        crate::routes::reference::delete_building,
        crate::routes::reference::list_sectors,
        crate::routes::reference::get_sector,
        crate::routes::reference::list_sector_services,
        crate::routes::reference::create_sector,
        crate::routes::reference::update_sector,
        crate::routes::reference::delete_sector,
        crate::routes::reference::list_services,
        crate::routes::reference::get_service,
        crate::routes::reference::create_service,
        crate::routes::reference::update_service,
        crate::routes::reference::delete_service,
        crate::routes::templates::list_templates,
        crate::routes::templates::get_template,
        crate::routes::templates::create_template,
        crate::routes::templates::update_template,
        crate::routes::templates::delete_template,
        crate::routes::leases::expiring_leases,
        crate::routes::leases::get_lease,
        crate::routes::leases::update_lease,
        crate::routes::leases::end_lease,
        crate::routes::leases::delete_lease,
        crate::routes::events::recent_events,
        crate::routes::import_export::validate_csv,
        crate::routes::import_export::import_csv,
        crate::routes::import_export::export_csv,
        crate::routes::import_export::download_template,
        crate::routes::codes::preview_code,
        crate::routes::codes::preview_code_query,
        crate::routes::graph::search_users,
        crate::routes::graph::get_user,
        crate::routes::graph::find_devices,
        crate::routes::graph::get_device,
    ),
    components(
        schemas(
            HealthResponse,
            DatabaseHealth,
            ProbeResponse,
            Asset,
            AssetStatus,
            AssetPage,
            NewAsset,
            AssetUpdate,
            BulkCreateRequest,
            CodePreviewRequest,
            CodePreviewResponse,
            AssetEvent,
            AssetEventType,
            AssetType,
            AssetTypeUpdate,
            CreateAssetTypeRequest,
            Category,
            CategoryUpdate,
            CreateCategoryRequest,
            Building,
            BuildingUpdate,
            CreateBuildingRequest,
            Sector,
            SectorUpdate,
            CreateSectorRequest,
            Service,
            ServiceUpdate,
            CreateServiceRequest,
            AssetTemplate,
            AssetTemplateUpdate,
            CreateTemplateRequest,
            LeaseContract,
            LeaseStatus,
            LeaseUpdate,
            LeaseResponse,
            NewLease,
            ImportReport,
            RowOutcome,
            RowStatus,
            ErrorResponse,
            ValidationErrorDetails,
            FieldError,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Metrics", description = "Prometheus metrics"),
        (name = "Assets", description = "Asset registration and lifecycle"),
        (name = "Reference data", description = "Asset types, categories, buildings, sectors and services"),
        (name = "Templates", description = "Defaults for bulk creation"),
        (name = "Leases", description = "Lease contracts"),
        (name = "Events", description = "Audit trail"),
        (name = "Import/Export", description = "CSV import and export"),
        (name = "Graph", description = "Entra ID directory lookups"),
        (name = "Intune", description = "Intune managed devices"),
    ),
    info(
        title = "Djoppie Inventory API",
        version = "0.1.0",
        description = "IT asset inventory for the municipality",
        license(name = "MIT"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// API server.
pub struct ApiServer {
    config: ApiServerConfig,
    state: AppState,
}

impl ApiServer {
    pub fn new(state: AppState, config: ApiServerConfig) -> Self {
        Self { config, state }
    }

    /// Server with the default configuration.
    pub fn with_state(state: AppState) -> Self {
        Self::new(state, ApiServerConfig::default())
    }

    /// Builds the router with all middleware applied.
    pub fn router(&self) -> Router {
        routes::health::init_start_time();

        let mut app = routes::create_router(self.state.clone());

        if self.config.enable_swagger {
            app = app.merge(
                SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()),
            );
        }

        // Innermost first.
        app.layer(middleware::from_fn(security_headers))
            .layer(middleware::from_fn(request_logging))
            .layer(middleware::from_fn(request_id))
            .layer(TraceLayer::new_for_http())
            .layer(TimeoutLayer::new(self.config.request_timeout))
            .layer(RequestBodyLimitLayer::new(
                routes::import_export::MAX_IMPORT_BYTES.max(MAX_BODY_BYTES),
            ))
            .layer(cors_layer(&self.config.cors, self.config.development))
            .layer(CatchPanicLayer::new())
    }

    /// Serves until Ctrl+C or SIGTERM.
    pub async fn run(self) -> Result<(), std::io::Error> {
        self.run_until(shutdown_signal()).await
    }

    /// Serves until `shutdown` completes.
    pub async fn run_until<F>(self, shutdown: F) -> Result<(), std::io::Error>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let app = self.router();
        let addr = self.config.bind_address;

        let listener = TcpListener::bind(addr).await?;
        info!(address = %addr, swagger = self.config.enable_swagger, "Starting API server");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("API server shut down gracefully");
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dj_core::asset_code::{AssetCodeGenerator, CodeVersion};
    use dj_core::db::create_pool;

    #[tokio::test]
    async fn test_router_builds() {
        let pool = create_pool("sqlite::memory:").await.unwrap();
        let state = AppState::new(pool, AssetCodeGenerator::new(CodeVersion::Current));
        let _router = ApiServer::with_state(state).router();
    }

    #[test]
    fn test_openapi_lists_asset_routes() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/v1/assets"));
        assert!(doc.paths.paths.contains_key("/api/v1/import/csv"));
        let components = doc.components.unwrap();
        assert!(components.security_schemes.contains_key("bearer"));
    }
}
