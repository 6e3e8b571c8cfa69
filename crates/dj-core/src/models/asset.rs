//! Asset model and its lifecycle status.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::{apply, apply_opt, apply_text};

/// Lifecycle status of a physical asset.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum AssetStatus {
    InUse,
    #[default]
    Stock,
    Repair,
    Defective,
    Decommissioned,
    New,
}

impl AssetStatus {
    pub const ALL: [AssetStatus; 6] = [
        AssetStatus::InUse,
        AssetStatus::Stock,
        AssetStatus::Repair,
        AssetStatus::Defective,
        AssetStatus::Decommissioned,
        AssetStatus::New,
    ];

    pub fn as_db_str(&self) -> &'static str {
        match self {
            AssetStatus::InUse => "in_use",
            AssetStatus::Stock => "stock",
            AssetStatus::Repair => "repair",
            AssetStatus::Defective => "defective",
            AssetStatus::Decommissioned => "decommissioned",
            AssetStatus::New => "new",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "in_use" => Some(AssetStatus::InUse),
            "stock" => Some(AssetStatus::Stock),
            "repair" => Some(AssetStatus::Repair),
            "defective" => Some(AssetStatus::Defective),
            "decommissioned" => Some(AssetStatus::Decommissioned),
            "new" => Some(AssetStatus::New),
            _ => None,
        }
    }

    /// Lenient parse for user input and CSV files.
    ///
    /// Accepts the English names, their snake_case form and the Dutch labels
    /// shown in the web client, ignoring case, spaces and dashes.
    pub fn parse_lenient(input: &str) -> Option<Self> {
        let normalized: String = input
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .flat_map(char::to_lowercase)
            .collect();

        match normalized.as_str() {
            "inuse" | "ingebruik" | "active" => Some(AssetStatus::InUse),
            "stock" | "instock" | "voorraad" => Some(AssetStatus::Stock),
            "repair" | "herstelling" | "inherstelling" => Some(AssetStatus::Repair),
            "defective" | "defect" | "broken" => Some(AssetStatus::Defective),
            "decommissioned" | "uitdienst" | "afgevoerd" | "retired" => {
                Some(AssetStatus::Decommissioned)
            }
            "new" | "nieuw" => Some(AssetStatus::New),
            _ => None,
        }
    }
}

impl fmt::Display for AssetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AssetStatus::InUse => "InUse",
            AssetStatus::Stock => "Stock",
            AssetStatus::Repair => "Repair",
            AssetStatus::Defective => "Defective",
            AssetStatus::Decommissioned => "Decommissioned",
            AssetStatus::New => "New",
        };
        f.write_str(label)
    }
}

impl FromStr for AssetStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AssetStatus::parse_lenient(s).ok_or_else(|| format!("Unknown asset status: '{}'", s))
    }
}

/// A tracked physical item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub id: Uuid,
    /// Generated or explicit code, e.g. `LAP-24-GH-00012`. Unique.
    pub asset_code: String,
    pub asset_name: String,
    pub asset_type_id: Option<Uuid>,
    pub status: AssetStatus,
    /// Placeholder assets numbered in the reserved dummy band.
    pub is_dummy: bool,
    pub service_id: Option<Uuid>,
    pub building_id: Option<Uuid>,
    /// Display name or UPN of the person using the asset.
    pub owner: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    /// Manufacturer serial number. Unique when present.
    pub serial_number: Option<String>,
    pub purchase_date: Option<NaiveDate>,
    pub installation_date: Option<NaiveDate>,
    pub warranty_expiry: Option<NaiveDate>,
    pub notes: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Asset {
    /// Materializes a new asset once its code has been allocated.
    pub fn from_new(new: NewAsset, asset_code: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            asset_code,
            asset_name: new.asset_name,
            asset_type_id: Some(new.asset_type_id),
            status: new.status,
            is_dummy: new.is_dummy,
            service_id: new.service_id,
            building_id: new.building_id,
            owner: new.owner,
            brand: new.brand,
            model: new.model,
            serial_number: new.serial_number,
            purchase_date: new.purchase_date,
            installation_date: new.installation_date,
            warranty_expiry: new.warranty_expiry,
            notes: new.notes,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// True when the warranty has lapsed on `today`.
    pub fn warranty_expired(&self, today: NaiveDate) -> bool {
        self.warranty_expiry.map(|d| d < today).unwrap_or(false)
    }
}

/// Input for creating an asset. The code is generated unless `asset_code` is set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct NewAsset {
    pub asset_code: Option<String>,
    pub asset_name: String,
    pub asset_type_id: Uuid,
    #[serde(default)]
    pub status: AssetStatus,
    #[serde(default)]
    pub is_dummy: bool,
    pub service_id: Option<Uuid>,
    pub building_id: Option<Uuid>,
    pub owner: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub purchase_date: Option<NaiveDate>,
    pub installation_date: Option<NaiveDate>,
    pub warranty_expiry: Option<NaiveDate>,
    pub notes: Option<String>,
}

/// Partial update. `None` leaves a field untouched; an empty string clears text.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct AssetUpdate {
    pub asset_name: Option<String>,
    pub asset_type_id: Option<Uuid>,
    pub status: Option<AssetStatus>,
    pub service_id: Option<Uuid>,
    pub building_id: Option<Uuid>,
    pub owner: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub purchase_date: Option<NaiveDate>,
    pub installation_date: Option<NaiveDate>,
    pub warranty_expiry: Option<NaiveDate>,
    pub notes: Option<String>,
}

impl AssetUpdate {
    pub fn is_empty(&self) -> bool {
        self.asset_name.is_none()
            && self.asset_type_id.is_none()
            && self.status.is_none()
            && self.service_id.is_none()
            && self.building_id.is_none()
            && self.owner.is_none()
            && self.brand.is_none()
            && self.model.is_none()
            && self.serial_number.is_none()
            && self.purchase_date.is_none()
            && self.installation_date.is_none()
            && self.warranty_expiry.is_none()
            && self.notes.is_none()
    }

    pub fn apply_to(self, asset: &mut Asset) {
        apply(&mut asset.asset_name, self.asset_name);
        apply_opt(&mut asset.asset_type_id, self.asset_type_id);
        apply(&mut asset.status, self.status);
        apply_opt(&mut asset.service_id, self.service_id);
        apply_opt(&mut asset.building_id, self.building_id);
        apply_text(&mut asset.owner, self.owner);
        apply_text(&mut asset.brand, self.brand);
        apply_text(&mut asset.model, self.model);
        apply_text(&mut asset.serial_number, self.serial_number);
        apply_opt(&mut asset.purchase_date, self.purchase_date);
        apply_opt(&mut asset.installation_date, self.installation_date);
        apply_opt(&mut asset.warranty_expiry, self.warranty_expiry);
        apply_text(&mut asset.notes, self.notes);
        asset.updated_at = Utc::now();
    }
}

/// Criteria for listing assets. Unset fields do not filter.
#[derive(Debug, Clone, Default)]
pub struct AssetFilter {
    pub status: Option<AssetStatus>,
    pub asset_type_id: Option<Uuid>,
    pub service_id: Option<Uuid>,
    pub building_id: Option<Uuid>,
    pub owner: Option<String>,
    pub is_dummy: Option<bool>,
    pub include_inactive: bool,
    /// Free text matched against code, name, serial, owner, brand and model.
    pub search: Option<String>,
}

impl AssetFilter {
    /// In-memory evaluation, kept in line with the SQL filters.
    pub fn matches(&self, asset: &Asset) -> bool {
        if !self.include_inactive && !asset.is_active {
            return false;
        }
        if self.status.is_some_and(|s| s != asset.status) {
            return false;
        }
        if self.asset_type_id.is_some() && self.asset_type_id != asset.asset_type_id {
            return false;
        }
        if self.service_id.is_some() && self.service_id != asset.service_id {
            return false;
        }
        if self.building_id.is_some() && self.building_id != asset.building_id {
            return false;
        }
        if self.is_dummy.is_some_and(|d| d != asset.is_dummy) {
            return false;
        }
        if let Some(owner) = &self.owner {
            let owner = owner.to_lowercase();
            if !asset
                .owner
                .as_deref()
                .is_some_and(|o| o.to_lowercase().contains(&owner))
            {
                return false;
            }
        }
        if let Some(search) = &self.search {
            let needle = search.to_lowercase();
            let haystack = [
                Some(asset.asset_code.as_str()),
                Some(asset.asset_name.as_str()),
                asset.serial_number.as_deref(),
                asset.owner.as_deref(),
                asset.brand.as_deref(),
                asset.model.as_deref(),
            ];
            if !haystack
                .iter()
                .flatten()
                .any(|field| field.to_lowercase().contains(&needle))
            {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Asset {
        Asset::from_new(
            NewAsset {
                asset_name: "Laptop Jan".into(),
                asset_type_id: Uuid::new_v4(),
                serial_number: Some("5CD1234XYZ".into()),
                owner: Some("jan.peeters@diepenbeek.be".into()),
                brand: Some("HP".into()),
                ..Default::default()
            },
            "LAP-24-00001".into(),
        )
    }

    #[test]
    fn test_status_db_round_trip() {
        for status in AssetStatus::ALL {
            assert_eq!(AssetStatus::from_db_str(status.as_db_str()), Some(status));
        }
        assert_eq!(AssetStatus::from_db_str("InUse"), None);
    }

    #[test]
    fn test_status_lenient_parse() {
        assert_eq!(AssetStatus::parse_lenient("InUse"), Some(AssetStatus::InUse));
        assert_eq!(AssetStatus::parse_lenient("in use"), Some(AssetStatus::InUse));
        assert_eq!(AssetStatus::parse_lenient("In-Gebruik"), Some(AssetStatus::InUse));
        assert_eq!(AssetStatus::parse_lenient("DEFECT"), Some(AssetStatus::Defective));
        assert_eq!(AssetStatus::parse_lenient("uit_dienst"), Some(AssetStatus::Decommissioned));
        assert_eq!(AssetStatus::parse_lenient("nieuw"), Some(AssetStatus::New));
        assert_eq!(AssetStatus::parse_lenient("lost"), None);
        assert!("".parse::<AssetStatus>().is_err());
    }

    #[test]
    fn test_status_serializes_as_pascal_name() {
        assert_eq!(serde_json::to_string(&AssetStatus::InUse).unwrap(), "\"InUse\"");
        assert_eq!(AssetStatus::Decommissioned.to_string(), "Decommissioned");
    }

    #[test]
    fn test_update_diff_application() {
        let mut asset = sample();
        AssetUpdate {
            status: Some(AssetStatus::Repair),
            owner: Some(String::new()),
            ..Default::default()
        }
        .apply_to(&mut asset);
        assert_eq!(asset.status, AssetStatus::Repair);
        assert!(asset.owner.is_none());
        assert_eq!(asset.brand.as_deref(), Some("HP"));
    }

    #[test]
    fn test_update_is_empty() {
        assert!(AssetUpdate::default().is_empty());
        assert!(!AssetUpdate {
            notes: Some("x".into()),
            ..Default::default()
        }
        .is_empty());
    }

    #[test]
    fn test_filter_excludes_inactive_by_default() {
        let mut asset = sample();
        asset.is_active = false;
        assert!(!AssetFilter::default().matches(&asset));
        assert!(AssetFilter {
            include_inactive: true,
            ..Default::default()
        }
        .matches(&asset));
    }

    #[test]
    fn test_filter_search_is_case_insensitive() {
        let asset = sample();
        let filter = AssetFilter {
            search: Some("5cd1234".into()),
            ..Default::default()
        };
        assert!(filter.matches(&asset));
        let filter = AssetFilter {
            search: Some("lenovo".into()),
            ..Default::default()
        };
        assert!(!filter.matches(&asset));
    }

    #[test]
    fn test_filter_by_status_and_dummy() {
        let asset = sample();
        assert!(!AssetFilter {
            status: Some(AssetStatus::InUse),
            ..Default::default()
        }
        .matches(&asset));
        assert!(AssetFilter {
            is_dummy: Some(false),
            ..Default::default()
        }
        .matches(&asset));
    }

    #[test]
    fn test_warranty_expired() {
        let mut asset = sample();
        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        assert!(!asset.warranty_expired(today));
        asset.warranty_expiry = NaiveDate::from_ymd_opt(2025, 5, 31);
        assert!(asset.warranty_expired(today));
    }
}
