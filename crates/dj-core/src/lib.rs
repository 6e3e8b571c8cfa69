//! # dj-core
//!
//! Domain models and business rules for Djoppie Inventory.
//!
//! This crate provides the inventory data models, asset-code generation, the
//! CSV codec, input validation and, with the `database` feature, persistence
//! and the services that tie them together.

pub mod asset_code;
pub mod csv;
pub mod models;
pub mod validation;

#[cfg(feature = "database")]
pub mod db;
#[cfg(feature = "database")]
pub mod services;

pub use asset_code::{AssetCodeError, AssetCodeGenerator, AssetCodeParts, CodeVersion};
pub use csv::CsvError;
pub use models::{
    Asset, AssetEvent, AssetEventType, AssetFilter, AssetStatus, AssetTemplate, AssetType,
    AssetUpdate, Building, Category, LeaseContract, LeaseStatus, NewAsset, Sector, Service,
};
pub use validation::{InputValidator, ODataSanitizer, ValidationError};

#[cfg(feature = "database")]
pub use services::{ServiceError, ServiceResult, Stores};
