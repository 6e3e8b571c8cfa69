//! Request and response types that are not domain models.

use dj_core::db::{PagedResult, Pagination};
use chrono::NaiveDate;
use dj_core::models::{Asset, AssetFilter, AssetStatus, LeaseContract, LeaseStatus};
use dj_core::validation::InputValidator;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::error::ApiError;

// ============================================================================
// Assets
// ============================================================================

/// Query parameters for listing assets.
#[derive(Debug, Default, Deserialize, Validate, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListAssetsQuery {
    /// Status name, English or Dutch (`InGebruik`, `Herstelling`, ...).
    pub status: Option<String>,
    pub asset_type_id: Option<Uuid>,
    pub service_id: Option<Uuid>,
    pub building_id: Option<Uuid>,
    /// Substring of the owner.
    pub owner: Option<String>,
    pub is_dummy: Option<bool>,
    #[serde(default)]
    pub include_inactive: bool,
    /// Free text over code, name, serial, owner, brand and model.
    #[validate(length(max = 100))]
    pub search: Option<String>,
    #[validate(range(min = 1))]
    pub page: Option<u32>,
    #[validate(range(min = 1, max = 100))]
    pub page_size: Option<u32>,
}

impl ListAssetsQuery {
    pub fn filter(&self) -> Result<AssetFilter, ApiError> {
        let status = match self.status.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(AssetStatus::parse_lenient(raw).ok_or_else(|| {
                ApiError::validation_field(
                    "status",
                    "invalid_value",
                    &format!("Unknown asset status '{}'", raw),
                )
            })?),
        };
        let owner = match self.owner.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(InputValidator::sanitize_text(raw, 254)),
        };
        Ok(AssetFilter {
            status,
            asset_type_id: self.asset_type_id,
            service_id: self.service_id,
            building_id: self.building_id,
            owner,
            is_dummy: self.is_dummy,
            include_inactive: self.include_inactive,
            search: self
                .search
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from),
        })
    }

    pub fn pagination(&self) -> Pagination {
        Pagination::from_query(self.page, self.page_size)
    }
}

/// One page of assets.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssetPage {
    pub items: Vec<Asset>,
    pub total_count: u64,
    pub page_number: u32,
    pub page_size: u32,
    pub total_pages: u32,
    pub has_previous_page: bool,
    pub has_next_page: bool,
}

impl From<PagedResult<Asset>> for AssetPage {
    fn from(page: PagedResult<Asset>) -> Self {
        Self {
            items: page.items,
            total_count: page.total_count,
            page_number: page.page_number,
            page_size: page.page_size,
            total_pages: page.total_pages,
            has_previous_page: page.has_previous_page,
            has_next_page: page.has_next_page,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CodePreviewResponse {
    pub asset_code: String,
}

// ============================================================================
// Reference data
// ============================================================================

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ReferenceListQuery {
    #[serde(default)]
    pub include_inactive: bool,
}

// ============================================================================
// Events and leases
// ============================================================================

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct RecentEventsQuery {
    /// Number of events, default 50, at most 500.
    pub limit: Option<u32>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ExpiringLeasesQuery {
    /// Window in days, default 30, at most 365.
    pub days: Option<i64>,
}

/// A lease contract with its status on the day of the request.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeaseResponse {
    #[serde(flatten)]
    pub lease: LeaseContract,
    pub status: LeaseStatus,
}

impl LeaseResponse {
    pub fn on(lease: LeaseContract, today: NaiveDate) -> Self {
        let status = lease.status_on(today);
        Self { lease, status }
    }

    pub fn list(leases: Vec<LeaseContract>, today: NaiveDate) -> Vec<Self> {
        leases.into_iter().map(|l| Self::on(l, today)).collect()
    }
}

// ============================================================================
// Graph and Intune
// ============================================================================

#[derive(Debug, Deserialize, Validate, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct UserSearchQuery {
    /// Prefix of display name, mail or UPN. At least 2 characters.
    #[validate(length(min = 1, max = 100))]
    pub q: String,
    #[validate(range(min = 1, max = 50))]
    pub limit: Option<usize>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct DeviceQuery {
    pub serial_number: Option<String>,
    pub user_principal_name: Option<String>,
}

// ============================================================================
// Health
// ============================================================================

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// `healthy` or `unhealthy`.
    pub status: String,
    pub version: String,
    pub database: DatabaseHealth,
    pub graph_configured: bool,
    pub auth_enabled: bool,
    pub uptime_seconds: u64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseHealth {
    pub connected: bool,
    pub backend: String,
    pub pool_size: u32,
    pub idle_connections: usize,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProbeResponse {
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_parses_dutch_status() {
        let query = ListAssetsQuery {
            status: Some("herstelling".into()),
            search: Some("  elitebook ".into()),
            ..Default::default()
        };
        let filter = query.filter().unwrap();
        assert_eq!(filter.status, Some(AssetStatus::Repair));
        assert_eq!(filter.search.as_deref(), Some("elitebook"));
    }

    #[test]
    fn test_filter_rejects_unknown_status() {
        let query = ListAssetsQuery {
            status: Some("kapot-ish".into()),
            ..Default::default()
        };
        assert!(matches!(query.filter(), Err(ApiError::ValidationError(_))));
    }

    #[test]
    fn test_lease_response_flattens_contract() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2027, 12, 31).unwrap();
        let lease = LeaseContract::new(uuid::Uuid::new_v4(), "LC-2024-001", start, end);
        let today = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();
        let json = serde_json::to_value(LeaseResponse::on(lease, today)).unwrap();
        assert_eq!(json["contractNumber"], "LC-2024-001");
        assert_eq!(json["status"], "Active");
    }

    #[test]
    fn test_pagination_defaults() {
        let pagination = ListAssetsQuery::default().pagination();
        assert_eq!(pagination.page, 1);
        assert_eq!(pagination.per_page, 25);
    }
}
