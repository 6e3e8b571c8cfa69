//! Business operations over the repositories.
//!
//! Services validate input, resolve references, allocate asset codes and
//! write the audit trail. They hold repositories as trait objects so tests
//! can run them against the in-memory mocks.

pub mod asset_service;
pub mod csv_export;
pub mod csv_import;
mod error;
pub mod event_service;
pub mod lease_service;

pub use asset_service::{AssetService, BulkCreateRequest, CodePreviewRequest, MAX_BULK_QUANTITY};
pub use csv_export::CsvExportService;
pub use csv_import::{CsvImportService, ImportOptions, ImportReport, RowOutcome, RowStatus};
pub use error::{ServiceError, ServiceResult};
pub use event_service::EventService;
pub use lease_service::{LeaseService, NewLease};

use std::sync::Arc;

use crate::db::mocks::{
    MockAssetEventRepository, MockAssetRepository, MockAssetTemplateRepository,
    MockAssetTypeRepository, MockBuildingRepository, MockLeaseContractRepository,
    MockServiceRepository,
};
use crate::db::{
    create_asset_event_repository, create_asset_repository, create_asset_type_repository,
    create_building_repository, create_lease_repository, create_service_repository,
    create_template_repository, AssetEventRepository, AssetRepository, AssetTemplateRepository,
    AssetTypeRepository, BuildingRepository, DbPool, LeaseContractRepository, ServiceRepository,
};

/// The repositories the services share.
#[derive(Clone)]
pub struct Stores {
    pub assets: Arc<dyn AssetRepository>,
    pub asset_types: Arc<dyn AssetTypeRepository>,
    pub buildings: Arc<dyn BuildingRepository>,
    pub services: Arc<dyn ServiceRepository>,
    pub templates: Arc<dyn AssetTemplateRepository>,
    pub events: Arc<dyn AssetEventRepository>,
    pub leases: Arc<dyn LeaseContractRepository>,
}

impl Stores {
    pub fn from_pool(pool: &DbPool) -> Self {
        Self {
            assets: Arc::from(create_asset_repository(pool)),
            asset_types: Arc::from(create_asset_type_repository(pool)),
            buildings: Arc::from(create_building_repository(pool)),
            services: Arc::from(create_service_repository(pool)),
            templates: Arc::from(create_template_repository(pool)),
            events: Arc::from(create_asset_event_repository(pool)),
            leases: Arc::from(create_lease_repository(pool)),
        }
    }

    /// Empty mock repositories.
    pub fn in_memory() -> Self {
        Self {
            assets: Arc::new(MockAssetRepository::new()),
            asset_types: Arc::new(MockAssetTypeRepository::new()),
            buildings: Arc::new(MockBuildingRepository::new()),
            services: Arc::new(MockServiceRepository::new()),
            templates: Arc::new(MockAssetTemplateRepository::new()),
            events: Arc::new(MockAssetEventRepository::new()),
            leases: Arc::new(MockLeaseContractRepository::new()),
        }
    }
}
