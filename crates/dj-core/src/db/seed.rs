//! Default reference data.
//!
//! Seeds the categories and asset types every installation starts with. Rows
//! whose code already exists are left untouched, so the routine is safe to run
//! on every startup.

use super::{create_asset_type_repository, create_category_repository, DbError, DbPool};
use crate::models::{AssetType, Category};
use tracing::{debug, info};

/// `(code, name, sort_order)` for the default categories.
pub const DEFAULT_CATEGORIES: &[(&str, &str, i32)] = &[
    ("COMP", "Computing", 10),
    ("PERI", "Peripherals", 20),
    ("MOB", "Mobile", 30),
];

/// `(code, name, category code, sort_order)` for the default asset types.
pub const DEFAULT_ASSET_TYPES: &[(&str, &str, &str, i32)] = &[
    ("LAP", "Laptop", "COMP", 10),
    ("DESK", "Desktop", "COMP", 20),
    ("MON", "Monitor", "PERI", 30),
    ("PRN", "Printer", "PERI", 40),
    ("DOCK", "Docking station", "PERI", 50),
    ("PHN", "Phone", "MOB", 60),
    ("TAB", "Tablet", "MOB", 70),
];

/// Counts of rows inserted by [`seed_reference_data`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub categories: usize,
    pub asset_types: usize,
}

/// Inserts any missing default categories and asset types.
pub async fn seed_reference_data(pool: &DbPool) -> Result<SeedSummary, DbError> {
    let categories = create_category_repository(pool);
    let asset_types = create_asset_type_repository(pool);
    let mut summary = SeedSummary::default();

    for (code, name, sort_order) in DEFAULT_CATEGORIES {
        if categories.code_exists(code, None).await? {
            debug!(code, "Category already present");
            continue;
        }
        let mut category = Category::new(*code, *name);
        category.sort_order = *sort_order;
        categories.create(&category).await?;
        summary.categories += 1;
    }

    for (code, name, category_code, sort_order) in DEFAULT_ASSET_TYPES {
        if asset_types.code_exists(code, None).await? {
            debug!(code, "Asset type already present");
            continue;
        }
        let mut asset_type = AssetType::new(*code, *name);
        asset_type.sort_order = *sort_order;
        if let Some(category) = categories.get_by_code(category_code).await? {
            asset_type = asset_type.with_category(category.id);
        }
        asset_types.create(&asset_type).await?;
        summary.asset_types += 1;
    }

    if summary != SeedSummary::default() {
        info!(
            categories = summary.categories,
            asset_types = summary.asset_types,
            "Seeded reference data"
        );
    }
    Ok(summary)
}
