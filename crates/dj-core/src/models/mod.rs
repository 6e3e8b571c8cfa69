//! Inventory data models.
//!
//! Every entity carries audit timestamps and an `is_active` flag used for soft
//! deletion. Models serialize in camelCase because the web client consumes them
//! as-is.

mod asset;
mod event;
mod lease;
mod reference;
mod template;

pub use asset::{Asset, AssetFilter, AssetStatus, AssetUpdate, NewAsset};
pub use event::{AssetEvent, AssetEventType};
pub use lease::{LeaseContract, LeaseStatus, LeaseUpdate};
pub use reference::{
    AssetType, AssetTypeUpdate, Building, BuildingUpdate, Category, CategoryUpdate, Sector,
    SectorUpdate, Service, ServiceUpdate,
};
pub use template::{AssetTemplate, AssetTemplateUpdate};

/// Replaces `target` with `value` when the update carries one.
///
/// Empty strings clear optional text fields.
pub(crate) fn apply_text(target: &mut Option<String>, value: Option<String>) {
    if let Some(value) = value {
        let trimmed = value.trim();
        *target = if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        };
    }
}

pub(crate) fn apply<T>(target: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *target = value;
    }
}

pub(crate) fn apply_opt<T>(target: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *target = value;
    }
}
