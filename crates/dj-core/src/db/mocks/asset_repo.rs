//! Mock implementation of AssetRepository for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::db::{AssetRepository, DbError, PagedResult, Pagination};
use crate::models::{Asset, AssetFilter, AssetUpdate};

/// Mock implementation of AssetRepository using in-memory storage.
///
/// Enforces the same uniqueness rules as the database: asset codes are unique
/// and serial numbers are unique when present.
pub struct MockAssetRepository {
    assets: Arc<RwLock<HashMap<Uuid, Asset>>>,
    forced_conflicts: AtomicU32,
}

impl Default for MockAssetRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl MockAssetRepository {
    pub fn new() -> Self {
        Self {
            assets: Arc::new(RwLock::new(HashMap::new())),
            forced_conflicts: AtomicU32::new(0),
        }
    }

    /// Creates a mock repository pre-populated with assets.
    pub fn with_assets(assets: Vec<Asset>) -> Self {
        let map = assets.into_iter().map(|a| (a.id, a)).collect();
        Self {
            assets: Arc::new(RwLock::new(map)),
            forced_conflicts: AtomicU32::new(0),
        }
    }

    /// Makes the next `count` inserts fail with a unique violation, simulating
    /// a concurrent writer that grabbed the same code.
    pub fn fail_next_inserts(&self, count: u32) {
        self.forced_conflicts.store(count, Ordering::SeqCst);
    }

    pub async fn snapshot(&self) -> Vec<Asset> {
        self.assets.read().await.values().cloned().collect()
    }

    fn sorted(mut assets: Vec<Asset>) -> Vec<Asset> {
        assets.sort_by(|a, b| a.asset_code.cmp(&b.asset_code));
        assets
    }
}

fn serial_taken(assets: &HashMap<Uuid, Asset>, serial: &str, exclude_id: Option<Uuid>) -> bool {
    assets.values().any(|a| {
        Some(a.id) != exclude_id
            && a.serial_number
                .as_deref()
                .is_some_and(|s| s.eq_ignore_ascii_case(serial))
    })
}

#[async_trait]
impl AssetRepository for MockAssetRepository {
    async fn list_filtered(
        &self,
        filter: &AssetFilter,
        pagination: &Pagination,
    ) -> Result<PagedResult<Asset>, DbError> {
        let all = self.list_all(filter).await?;
        Ok(PagedResult::from_vec(all, pagination))
    }

    async fn list_all(&self, filter: &AssetFilter) -> Result<Vec<Asset>, DbError> {
        let assets = self.assets.read().await;
        let matching = assets.values().filter(|a| filter.matches(a)).cloned().collect();
        Ok(Self::sorted(matching))
    }

    async fn count(&self, filter: &AssetFilter) -> Result<u64, DbError> {
        let assets = self.assets.read().await;
        Ok(assets.values().filter(|a| filter.matches(a)).count() as u64)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Asset>, DbError> {
        Ok(self.assets.read().await.get(&id).cloned())
    }

    async fn get_by_code(&self, asset_code: &str) -> Result<Option<Asset>, DbError> {
        let assets = self.assets.read().await;
        Ok(assets
            .values()
            .find(|a| a.asset_code.eq_ignore_ascii_case(asset_code))
            .cloned())
    }

    async fn get_by_serial(&self, serial_number: &str) -> Result<Option<Asset>, DbError> {
        let assets = self.assets.read().await;
        Ok(assets
            .values()
            .find(|a| {
                a.serial_number
                    .as_deref()
                    .is_some_and(|s| s.eq_ignore_ascii_case(serial_number))
            })
            .cloned())
    }

    async fn code_exists(&self, asset_code: &str) -> Result<bool, DbError> {
        Ok(self.get_by_code(asset_code).await?.is_some())
    }

    async fn serial_exists(
        &self,
        serial_number: &str,
        exclude_id: Option<Uuid>,
    ) -> Result<bool, DbError> {
        let assets = self.assets.read().await;
        Ok(serial_taken(&assets, serial_number, exclude_id))
    }

    async fn codes_with_prefix(&self, prefix: &str) -> Result<Vec<String>, DbError> {
        let assets = self.assets.read().await;
        let mut codes: Vec<String> = assets
            .values()
            .filter(|a| a.asset_code.starts_with(prefix))
            .map(|a| a.asset_code.clone())
            .collect();
        codes.sort();
        Ok(codes)
    }

    async fn create(&self, asset: &Asset) -> Result<Asset, DbError> {
        let mut assets = self.assets.write().await;

        let forced = self.forced_conflicts.load(Ordering::SeqCst);
        if forced > 0 {
            self.forced_conflicts.store(forced - 1, Ordering::SeqCst);
            return Err(DbError::Constraint(format!(
                "UNIQUE constraint failed: assets.asset_code ({})",
                asset.asset_code
            )));
        }

        if assets
            .values()
            .any(|a| a.asset_code.eq_ignore_ascii_case(&asset.asset_code))
        {
            return Err(DbError::Constraint(format!(
                "UNIQUE constraint failed: assets.asset_code ({})",
                asset.asset_code
            )));
        }
        if let Some(serial) = &asset.serial_number {
            if serial_taken(&assets, serial, None) {
                return Err(DbError::Constraint(format!(
                    "UNIQUE constraint failed: assets.serial_number ({})",
                    serial
                )));
            }
        }

        assets.insert(asset.id, asset.clone());
        Ok(asset.clone())
    }

    async fn update(&self, id: Uuid, update: AssetUpdate) -> Result<Asset, DbError> {
        let mut assets = self.assets.write().await;

        if let Some(serial) = update.serial_number.as_deref().filter(|s| !s.is_empty()) {
            if serial_taken(&assets, serial, Some(id)) {
                return Err(DbError::Constraint(format!(
                    "UNIQUE constraint failed: assets.serial_number ({})",
                    serial
                )));
            }
        }

        let asset = assets
            .get_mut(&id)
            .ok_or_else(|| DbError::not_found("Asset", id))?;
        update.apply_to(asset);
        Ok(asset.clone())
    }

    async fn set_active(&self, id: Uuid, active: bool) -> Result<bool, DbError> {
        let mut assets = self.assets.write().await;
        match assets.get_mut(&id) {
            Some(asset) => {
                asset.is_active = active;
                asset.updated_at = chrono::Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DbError> {
        Ok(self.assets.write().await.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewAsset;

    fn asset(code: &str, serial: Option<&str>) -> Asset {
        Asset::from_new(
            NewAsset {
                asset_name: format!("Asset {}", code),
                asset_type_id: Uuid::new_v4(),
                serial_number: serial.map(str::to_string),
                ..Default::default()
            },
            code.to_string(),
        )
    }

    #[tokio::test]
    async fn test_duplicate_code_is_constraint_error() {
        let repo = MockAssetRepository::new();
        repo.create(&asset("LAP-24-00001", None)).await.unwrap();
        let err = repo.create(&asset("LAP-24-00001", None)).await.unwrap_err();
        assert!(err.is_unique_violation());
    }

    #[tokio::test]
    async fn test_duplicate_serial_is_constraint_error() {
        let repo = MockAssetRepository::new();
        repo.create(&asset("LAP-24-00001", Some("SN1"))).await.unwrap();
        let err = repo
            .create(&asset("LAP-24-00002", Some("sn1")))
            .await
            .unwrap_err();
        assert!(err.is_unique_violation());
    }

    #[tokio::test]
    async fn test_forced_conflicts_are_consumed() {
        let repo = MockAssetRepository::new();
        repo.fail_next_inserts(1);
        assert!(repo.create(&asset("LAP-24-00001", None)).await.is_err());
        assert!(repo.create(&asset("LAP-24-00001", None)).await.is_ok());
    }

    #[tokio::test]
    async fn test_max_sequence_for_prefix_respects_band() {
        let repo = MockAssetRepository::with_assets(vec![
            asset("LAP-24-00003", None),
            asset("LAP-24-00007", None),
            asset("LAP-24-90002", None),
            asset("LAP-24-GEM-00042", None),
        ]);
        let max = repo
            .max_sequence_for_prefix("LAP-24-", 1..=90000)
            .await
            .unwrap();
        assert_eq!(max, Some(7));
        let max = repo
            .max_sequence_for_prefix("LAP-24-", 90001..=99999)
            .await
            .unwrap();
        assert_eq!(max, Some(90002));
    }
}
