//! Mock implementations of repository traits for testing.
//!
//! These mocks keep their rows in memory and need no database connection.
//! Services and route handlers can be unit tested against them.

mod asset_repo;
mod asset_type_repo;
mod building_repo;
mod event_repo;
mod lease_repo;
mod service_repo;
mod template_repo;

pub use asset_repo::MockAssetRepository;
pub use asset_type_repo::MockAssetTypeRepository;
pub use building_repo::MockBuildingRepository;
pub use event_repo::MockAssetEventRepository;
pub use lease_repo::MockLeaseContractRepository;
pub use service_repo::MockServiceRepository;
pub use template_repo::MockAssetTemplateRepository;
