//! Integration test modules.

pub mod asset_tests;
pub mod auth_tests;
pub mod common;
pub mod health_tests;
pub mod import_export_tests;
pub mod reference_tests;
