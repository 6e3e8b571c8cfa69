//! Reference data: categories, asset types, buildings, sectors and services.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{apply, apply_opt, apply_text};

/// Top-level grouping of asset types (e.g. "Computing", "Peripherals").
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub sort_order: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Category {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            code: code.into(),
            name: name.into(),
            description: None,
            sort_order: 0,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct CategoryUpdate {
    pub code: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub sort_order: Option<i32>,
    pub is_active: Option<bool>,
}

impl CategoryUpdate {
    pub fn apply_to(self, category: &mut Category) {
        apply(&mut category.code, self.code);
        apply(&mut category.name, self.name);
        apply_text(&mut category.description, self.description);
        apply(&mut category.sort_order, self.sort_order);
        apply(&mut category.is_active, self.is_active);
        category.updated_at = Utc::now();
    }
}

/// Kind of asset. Its code is the `TYPE` segment of generated asset codes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct AssetType {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub category_id: Option<Uuid>,
    pub sort_order: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AssetType {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            code: code.into(),
            name: name.into(),
            description: None,
            category_id: None,
            sort_order: 0,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_category(mut self, category_id: Uuid) -> Self {
        self.category_id = Some(category_id);
        self
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct AssetTypeUpdate {
    pub code: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<Uuid>,
    pub sort_order: Option<i32>,
    pub is_active: Option<bool>,
}

impl AssetTypeUpdate {
    pub fn apply_to(self, asset_type: &mut AssetType) {
        apply(&mut asset_type.code, self.code);
        apply(&mut asset_type.name, self.name);
        apply_text(&mut asset_type.description, self.description);
        apply_opt(&mut asset_type.category_id, self.category_id);
        apply(&mut asset_type.sort_order, self.sort_order);
        apply(&mut asset_type.is_active, self.is_active);
        asset_type.updated_at = Utc::now();
    }
}

/// Physical location. Its code is the optional `LOC` segment of asset codes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Building {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub address: Option<String>,
    pub sort_order: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Building {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            code: code.into(),
            name: name.into(),
            address: None,
            sort_order: 0,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct BuildingUpdate {
    pub code: Option<String>,
    pub name: Option<String>,
    pub address: Option<String>,
    pub sort_order: Option<i32>,
    pub is_active: Option<bool>,
}

impl BuildingUpdate {
    pub fn apply_to(self, building: &mut Building) {
        apply(&mut building.code, self.code);
        apply(&mut building.name, self.name);
        apply_text(&mut building.address, self.address);
        apply(&mut building.sort_order, self.sort_order);
        apply(&mut building.is_active, self.is_active);
        building.updated_at = Utc::now();
    }
}

/// Group of services (a municipal department cluster).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Sector {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub sort_order: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Sector {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            code: code.into(),
            name: name.into(),
            sort_order: 0,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct SectorUpdate {
    pub code: Option<String>,
    pub name: Option<String>,
    pub sort_order: Option<i32>,
    pub is_active: Option<bool>,
}

impl SectorUpdate {
    pub fn apply_to(self, sector: &mut Sector) {
        apply(&mut sector.code, self.code);
        apply(&mut sector.name, self.name);
        apply(&mut sector.sort_order, self.sort_order);
        apply(&mut sector.is_active, self.is_active);
        sector.updated_at = Utc::now();
    }
}

/// Organizational department that owns assets.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub sector_id: Option<Uuid>,
    pub building_id: Option<Uuid>,
    pub sort_order: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Service {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            code: code.into(),
            name: name.into(),
            sector_id: None,
            building_id: None,
            sort_order: 0,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_sector(mut self, sector_id: Uuid) -> Self {
        self.sector_id = Some(sector_id);
        self
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ServiceUpdate {
    pub code: Option<String>,
    pub name: Option<String>,
    pub sector_id: Option<Uuid>,
    pub building_id: Option<Uuid>,
    pub sort_order: Option<i32>,
    pub is_active: Option<bool>,
}

impl ServiceUpdate {
    pub fn apply_to(self, service: &mut Service) {
        apply(&mut service.code, self.code);
        apply(&mut service.name, self.name);
        apply_opt(&mut service.sector_id, self.sector_id);
        apply_opt(&mut service.building_id, self.building_id);
        apply(&mut service.sort_order, self.sort_order);
        apply(&mut service.is_active, self.is_active);
        service.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_entities_are_active() {
        assert!(Category::new("COMP", "Computing").is_active);
        assert!(AssetType::new("LAP", "Laptop").is_active);
        assert!(Building::new("GH", "Gemeentehuis").is_active);
        assert!(Sector::new("ORG", "Organisatie").is_active);
        assert!(Service::new("IT", "ICT").is_active);
    }

    #[test]
    fn test_update_clears_description_with_empty_string() {
        let mut category = Category::new("COMP", "Computing");
        category.description = Some("old".into());
        CategoryUpdate {
            description: Some("  ".into()),
            ..Default::default()
        }
        .apply_to(&mut category);
        assert!(category.description.is_none());
        assert_eq!(category.name, "Computing");
    }

    #[test]
    fn test_service_update_keeps_unset_fields() {
        let sector = Uuid::new_v4();
        let mut service = Service::new("IT", "ICT").with_sector(sector);
        ServiceUpdate {
            name: Some("ICT-dienst".into()),
            ..Default::default()
        }
        .apply_to(&mut service);
        assert_eq!(service.name, "ICT-dienst");
        assert_eq!(service.sector_id, Some(sector));
        assert_eq!(service.code, "IT");
    }

    #[test]
    fn test_serializes_camel_case() {
        let asset_type = AssetType::new("LAP", "Laptop");
        let json = serde_json::to_value(&asset_type).unwrap();
        assert_eq!(json["isActive"], true);
        assert!(json.get("sortOrder").is_some());
    }
}
