//! Application state shared across handlers.

use dj_connectors::{DeviceManagement, UserDirectory};
use dj_core::asset_code::AssetCodeGenerator;
use dj_core::db::{
    create_category_repository, create_sector_repository, CategoryRepository, DbPool,
    SectorRepository,
};
use dj_core::services::{
    AssetService, CsvExportService, CsvImportService, LeaseService, Stores,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use tracing::info;

use crate::auth::JwtValidator;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DbPool>,
    pub stores: Stores,
    pub categories: Arc<dyn CategoryRepository>,
    pub sectors: Arc<dyn SectorRepository>,
    pub assets: Arc<AssetService>,
    pub leases: Arc<LeaseService>,
    pub importer: Arc<CsvImportService>,
    pub exporter: Arc<CsvExportService>,
    /// `None` when authentication is disabled.
    pub auth: Option<Arc<JwtValidator>>,
    /// Graph user lookup, when Graph is configured.
    pub user_directory: Option<Arc<dyn UserDirectory>>,
    /// Intune device lookup, when Graph is configured.
    pub device_management: Option<Arc<dyn DeviceManagement>>,
    pub prometheus_handle: Option<Arc<PrometheusHandle>>,
}

impl AppState {
    /// State over `db` with authentication disabled and no Graph access.
    pub fn new(db: DbPool, generator: AssetCodeGenerator) -> Self {
        Self::with_location_codes(db, generator, false)
    }

    /// As [`AppState::new`], optionally adding building codes to generated
    /// asset codes.
    pub fn with_location_codes(
        db: DbPool,
        generator: AssetCodeGenerator,
        include_location: bool,
    ) -> Self {
        let stores = Stores::from_pool(&db);
        let assets = Arc::new(
            AssetService::new(stores.clone(), generator).with_location_codes(include_location),
        );
        let leases = Arc::new(LeaseService::new(
            stores.leases.clone(),
            stores.assets.clone(),
            assets.events().clone(),
        ));
        info!(
            backend = db.db_type(),
            code_version = ?generator.version(),
            include_location,
            "Application state initialized"
        );

        Self {
            categories: Arc::from(create_category_repository(&db)),
            sectors: Arc::from(create_sector_repository(&db)),
            importer: Arc::new(CsvImportService::new(assets.clone())),
            exporter: Arc::new(CsvExportService::new(stores.clone())),
            db: Arc::new(db),
            stores,
            assets,
            leases,
            auth: None,
            user_directory: None,
            device_management: None,
            prometheus_handle: None,
        }
    }

    pub fn with_auth(mut self, validator: JwtValidator) -> Self {
        self.auth = Some(Arc::new(validator));
        self
    }

    pub fn with_user_directory(mut self, directory: Arc<dyn UserDirectory>) -> Self {
        self.user_directory = Some(directory);
        self
    }

    pub fn with_device_management(mut self, devices: Arc<dyn DeviceManagement>) -> Self {
        self.device_management = Some(devices);
        self
    }

    pub fn with_prometheus_handle(mut self, handle: PrometheusHandle) -> Self {
        self.prometheus_handle = Some(Arc::new(handle));
        self
    }
}
