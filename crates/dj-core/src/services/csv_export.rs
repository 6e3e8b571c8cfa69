//! CSV export of filtered asset lists.

use std::collections::HashMap;
use tracing::info;
use uuid::Uuid;

use super::{ServiceResult, Stores};
use crate::csv::{export_assets, ExportRecord};
use crate::models::AssetFilter;

pub struct CsvExportService {
    stores: Stores,
}

impl CsvExportService {
    pub fn new(stores: Stores) -> Self {
        Self { stores }
    }

    /// Writes every asset matching `filter` in import column order, with type
    /// and service ids resolved to their codes.
    pub async fn export(&self, filter: &AssetFilter) -> ServiceResult<String> {
        let assets = self.stores.assets.list_all(filter).await?;

        let type_codes: HashMap<Uuid, String> = self
            .stores
            .asset_types
            .list(true)
            .await?
            .into_iter()
            .map(|t| (t.id, t.code))
            .collect();
        let service_codes: HashMap<Uuid, String> = self
            .stores
            .services
            .list(true)
            .await?
            .into_iter()
            .map(|s| (s.id, s.code))
            .collect();

        let records: Vec<ExportRecord<'_>> = assets
            .iter()
            .map(|asset| ExportRecord {
                asset,
                asset_type_code: asset
                    .asset_type_id
                    .and_then(|id| type_codes.get(&id))
                    .map(String::as_str)
                    .unwrap_or_default(),
                service_code: asset
                    .service_id
                    .and_then(|id| service_codes.get(&id))
                    .map(String::as_str),
            })
            .collect();

        info!(count = records.len(), "Exporting assets to CSV");
        Ok(export_assets(&records))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::mocks::{MockAssetTypeRepository, MockServiceRepository};
    use crate::models::{Asset, AssetStatus, AssetType, NewAsset, Service};
    use std::sync::Arc;

    async fn stores_with_assets() -> Stores {
        let laptop = AssetType::new("LAP", "Laptop");
        let ict = Service::new("ICT", "ICT-dienst");
        let mut stores = Stores::in_memory();
        stores.asset_types = Arc::new(MockAssetTypeRepository::with_types(vec![laptop.clone()]));
        stores.services = Arc::new(MockServiceRepository::with_services(vec![ict.clone()]));

        let mut first = Asset::from_new(
            NewAsset {
                asset_name: "Laptop Jan".into(),
                asset_type_id: laptop.id,
                status: AssetStatus::InUse,
                service_id: Some(ict.id),
                serial_number: Some("5CD1234XYZ".into()),
                model: Some("EliteBook 840, G10".into()),
                ..Default::default()
            },
            "LAP-24-00001".into(),
        );
        first.owner = Some("jan.peeters@diepenbeek.be".into());
        let second = Asset::from_new(
            NewAsset {
                asset_name: "Reserve".into(),
                asset_type_id: laptop.id,
                is_dummy: true,
                ..Default::default()
            },
            "DUM-LAP-24-90001".into(),
        );
        stores.assets.create(&first).await.unwrap();
        stores.assets.create(&second).await.unwrap();
        stores
    }

    #[tokio::test]
    async fn test_export_resolves_codes() {
        let exporter = CsvExportService::new(stores_with_assets().await);
        let csv = exporter.export(&AssetFilter::default()).await.unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert!(lines[0].starts_with("SerialNumber,AssetTypeCode,Status"));
        assert!(lines[0].ends_with(",AssetCode"));
        assert_eq!(lines.len(), 3);
        assert!(csv.contains(
            "5CD1234XYZ,LAP,InUse,,false,Laptop Jan,ICT,jan.peeters@diepenbeek.be,,\"EliteBook 840, G10\",,,,LAP-24-00001"
        ));
    }

    #[tokio::test]
    async fn test_export_applies_filter() {
        let exporter = CsvExportService::new(stores_with_assets().await);
        let filter = AssetFilter {
            is_dummy: Some(true),
            ..Default::default()
        };
        let csv = exporter.export(&filter).await.unwrap();
        assert_eq!(csv.lines().count(), 2);
        assert!(csv.contains("DUM-LAP-24-90001"));
    }
}
