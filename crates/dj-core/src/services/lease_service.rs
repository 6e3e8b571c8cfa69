//! Lease contracts per asset.

use chrono::{Duration, NaiveDate};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use super::{EventService, ServiceError, ServiceResult};
use crate::db::{AssetRepository, LeaseContractRepository};
use crate::models::{AssetEvent, AssetEventType, LeaseContract, LeaseUpdate};
use crate::validation::{InputValidator, MAX_NAME_LENGTH, MAX_NOTES_LENGTH};

/// Upper bound for the "expiring within" window.
pub const MAX_EXPIRY_WINDOW_DAYS: i64 = 365;

#[derive(Debug, Clone, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct NewLease {
    pub contract_number: String,
    pub vendor: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub monthly_rate_cents: Option<i64>,
    pub notes: Option<String>,
}

#[derive(Clone)]
pub struct LeaseService {
    leases: Arc<dyn LeaseContractRepository>,
    assets: Arc<dyn AssetRepository>,
    events: EventService,
}

impl LeaseService {
    pub fn new(
        leases: Arc<dyn LeaseContractRepository>,
        assets: Arc<dyn AssetRepository>,
        events: EventService,
    ) -> Self {
        Self {
            leases,
            assets,
            events,
        }
    }

    pub async fn list_for_asset(&self, asset_id: Uuid) -> ServiceResult<Vec<LeaseContract>> {
        self.require_asset(asset_id).await?;
        Ok(self.leases.list_for_asset(asset_id).await?)
    }

    pub async fn get(&self, id: Uuid) -> ServiceResult<LeaseContract> {
        self.leases
            .get(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("LeaseContract", id))
    }

    pub async fn create(
        &self,
        asset_id: Uuid,
        new: NewLease,
        actor: Option<&str>,
    ) -> ServiceResult<LeaseContract> {
        self.require_asset(asset_id).await?;
        check_dates(new.start_date, new.end_date)?;
        check_rate(new.monthly_rate_cents)?;

        let mut lease = LeaseContract::new(
            asset_id,
            InputValidator::validate_reference_code("contractNumber", &new.contract_number)?,
            new.start_date,
            new.end_date,
        );
        lease.vendor = InputValidator::validate_optional_text(
            "vendor",
            new.vendor.as_deref(),
            MAX_NAME_LENGTH,
        )?;
        lease.notes = InputValidator::validate_optional_text(
            "notes",
            new.notes.as_deref(),
            MAX_NOTES_LENGTH,
        )?;
        lease.monthly_rate_cents = new.monthly_rate_cents;

        let created = self.leases.create(&lease).await?;
        self.events
            .append(
                AssetEvent::new(
                    asset_id,
                    AssetEventType::LeaseAdded,
                    format!(
                        "Lease {} from {} until {}",
                        created.contract_number, created.start_date, created.end_date
                    ),
                )
                .performed_by(actor),
            )
            .await;
        info!(lease_id = %created.id, asset_id = %asset_id, "Lease contract created");
        Ok(created)
    }

    /// Partial update; the merged start and end dates must stay ordered.
    pub async fn update(&self, id: Uuid, mut update: LeaseUpdate) -> ServiceResult<LeaseContract> {
        let current = self.get(id).await?;
        check_dates(
            update.start_date.unwrap_or(current.start_date),
            update.end_date.unwrap_or(current.end_date),
        )?;
        check_rate(update.monthly_rate_cents)?;
        if let Some(number) = &update.contract_number {
            update.contract_number = Some(InputValidator::validate_reference_code(
                "contractNumber",
                number,
            )?);
        }
        Ok(self.leases.update(id, update).await?)
    }

    /// Marks the lease inactive. Ending an inactive lease is a no-op.
    pub async fn end(&self, id: Uuid, actor: Option<&str>) -> ServiceResult<LeaseContract> {
        let mut lease = self.get(id).await?;
        if !lease.is_active {
            return Ok(lease);
        }
        self.leases.set_active(id, false).await?;
        lease.is_active = false;

        self.events
            .append(
                AssetEvent::new(
                    lease.asset_id,
                    AssetEventType::LeaseEnded,
                    format!("Lease {} ended", lease.contract_number),
                )
                .performed_by(actor),
            )
            .await;
        Ok(lease)
    }

    /// Active leases ending between `today` and `today + days`, soonest first.
    pub async fn expiring(&self, days: i64, today: NaiveDate) -> ServiceResult<Vec<LeaseContract>> {
        let days = days.clamp(0, MAX_EXPIRY_WINDOW_DAYS);
        Ok(self
            .leases
            .list_ending_between(today, today + Duration::days(days))
            .await?)
    }

    pub async fn delete(&self, id: Uuid) -> ServiceResult<()> {
        if !self.leases.delete(id).await? {
            return Err(ServiceError::not_found("LeaseContract", id));
        }
        Ok(())
    }

    async fn require_asset(&self, asset_id: Uuid) -> ServiceResult<()> {
        match self.assets.get(asset_id).await? {
            Some(_) => Ok(()),
            None => Err(ServiceError::not_found("Asset", asset_id)),
        }
    }
}

fn check_dates(start: NaiveDate, end: NaiveDate) -> ServiceResult<()> {
    if end < start {
        return Err(ServiceError::Invalid(format!(
            "Lease end date {} is before start date {}",
            end, start
        )));
    }
    Ok(())
}

fn check_rate(rate: Option<i64>) -> ServiceResult<()> {
    if rate.is_some_and(|r| r < 0) {
        return Err(ServiceError::Invalid(
            "Monthly rate cannot be negative".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::mocks::{
        MockAssetEventRepository, MockAssetRepository, MockLeaseContractRepository,
    };
    use crate::models::{Asset, LeaseStatus, NewAsset};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn setup() -> (LeaseService, Asset, Arc<MockAssetEventRepository>) {
        let asset = Asset::from_new(
            NewAsset {
                asset_name: "Laptop".into(),
                asset_type_id: Uuid::new_v4(),
                ..Default::default()
            },
            "LAP-24-00001".into(),
        );
        let events = Arc::new(MockAssetEventRepository::new());
        let service = LeaseService::new(
            Arc::new(MockLeaseContractRepository::new()),
            Arc::new(MockAssetRepository::with_assets(vec![asset.clone()])),
            EventService::new(events.clone()),
        );
        (service, asset, events)
    }

    fn lease(number: &str, start: NaiveDate, end: NaiveDate) -> NewLease {
        NewLease {
            contract_number: number.into(),
            vendor: Some("Realdolmen".into()),
            start_date: start,
            end_date: end,
            monthly_rate_cents: Some(4_250),
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_create_records_event() {
        let (service, asset, events) = setup();
        let created = service
            .create(
                asset.id,
                lease("l-2024-001", date(2024, 1, 1), date(2027, 12, 31)),
                Some("admin"),
            )
            .await
            .unwrap();
        assert_eq!(created.contract_number, "L-2024-001");
        assert_eq!(created.status_on(date(2025, 6, 1)), LeaseStatus::Active);

        let history = events.snapshot().await;
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].event_type, AssetEventType::LeaseAdded);
    }

    #[tokio::test]
    async fn test_rejects_reversed_dates_and_negative_rate() {
        let (service, asset, _) = setup();
        let err = service
            .create(asset.id, lease("L1", date(2025, 1, 1), date(2024, 1, 1)), None)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Invalid(_)));

        let mut negative = lease("L1", date(2024, 1, 1), date(2025, 1, 1));
        negative.monthly_rate_cents = Some(-1);
        assert!(service.create(asset.id, negative, None).await.is_err());
    }

    #[tokio::test]
    async fn test_update_checks_merged_dates() {
        let (service, asset, _) = setup();
        let created = service
            .create(asset.id, lease("L1", date(2024, 1, 1), date(2025, 1, 1)), None)
            .await
            .unwrap();
        let err = service
            .update(
                created.id,
                LeaseUpdate {
                    end_date: Some(date(2023, 6, 1)),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Invalid(_)));
    }

    #[tokio::test]
    async fn test_unknown_asset() {
        let (service, _, _) = setup();
        let err = service
            .create(Uuid::new_v4(), lease("L1", date(2024, 1, 1), date(2025, 1, 1)), None)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_end_and_expiring() {
        let (service, asset, events) = setup();
        let today = date(2025, 3, 1);
        let soon = service
            .create(asset.id, lease("L1", date(2022, 3, 1), date(2025, 3, 20)), None)
            .await
            .unwrap();
        service
            .create(asset.id, lease("L2", date(2022, 3, 1), date(2026, 3, 1)), None)
            .await
            .unwrap();

        let expiring = service.expiring(30, today).await.unwrap();
        assert_eq!(expiring.len(), 1);
        assert_eq!(expiring[0].id, soon.id);

        let ended = service.end(soon.id, None).await.unwrap();
        assert!(!ended.is_active);
        assert!(service.expiring(30, today).await.unwrap().is_empty());
        // Window is capped at a year.
        assert_eq!(service.expiring(10_000, today).await.unwrap().len(), 1);

        let types: Vec<AssetEventType> =
            events.snapshot().await.iter().map(|e| e.event_type).collect();
        assert_eq!(types.last(), Some(&AssetEventType::LeaseEnded));
    }
}
