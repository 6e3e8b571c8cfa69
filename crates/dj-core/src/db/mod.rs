//! Database layer for Djoppie Inventory.
//!
//! Persistence for assets, reference data, events, lease contracts and
//! templates using SQLx, with SQLite for development and PostgreSQL for
//! production.

mod convert;
mod error;
pub mod mocks;
mod pagination;
mod pool;
pub mod retry;
mod schema;

pub mod asset_repo;
pub mod asset_type_repo;
pub mod building_repo;
pub mod category_repo;
pub mod event_repo;
pub mod lease_repo;
pub mod sector_repo;
pub mod seed;
pub mod service_repo;
pub mod template_repo;

pub use error::DbError;
pub use pagination::{PagedResult, Pagination, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
pub use pool::{
    create_pool, create_pool_with_options, create_pool_with_retry, escape_like_pattern,
    make_like_pattern, make_prefix_pattern, DbPool, PoolOptions,
};
pub use retry::{is_transient_error, with_retry, RetryConfig};
pub use schema::run_migrations;

// Repository traits
pub use asset_repo::AssetRepository;
pub use asset_type_repo::AssetTypeRepository;
pub use building_repo::BuildingRepository;
pub use category_repo::CategoryRepository;
pub use event_repo::AssetEventRepository;
pub use lease_repo::LeaseContractRepository;
pub use sector_repo::SectorRepository;
pub use service_repo::ServiceRepository;
pub use template_repo::AssetTemplateRepository;

// Factory functions
pub use asset_repo::create_asset_repository;
pub use asset_type_repo::create_asset_type_repository;
pub use building_repo::create_building_repository;
pub use category_repo::create_category_repository;
pub use event_repo::create_asset_event_repository;
pub use lease_repo::create_lease_repository;
pub use sector_repo::create_sector_repository;
pub use service_repo::create_service_repository;
pub use template_repo::create_template_repository;

pub use seed::seed_reference_data;
