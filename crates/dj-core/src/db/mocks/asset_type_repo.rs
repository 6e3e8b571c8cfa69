//! Mock implementation of AssetTypeRepository for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::db::{DbError, AssetTypeRepository};
use crate::models::{AssetType, AssetTypeUpdate};

/// Mock implementation of AssetTypeRepository using in-memory storage.
pub struct MockAssetTypeRepository {
    rows: Arc<RwLock<HashMap<Uuid, AssetType>>>,
}

impl Default for MockAssetTypeRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl MockAssetTypeRepository {
    pub fn new() -> Self {
        Self::with_types(Vec::new())
    }

    pub fn with_types(types: Vec<AssetType>) -> Self {
        let map = types.into_iter().map(|r| (r.id, r)).collect();
        Self {
            rows: Arc::new(RwLock::new(map)),
        }
    }
}

#[async_trait]
impl AssetTypeRepository for MockAssetTypeRepository {
    async fn list(&self, include_inactive: bool) -> Result<Vec<AssetType>, DbError> {
        let rows = self.rows.read().await;
        let mut result: Vec<AssetType> = rows
            .values()
            .filter(|r| include_inactive || r.is_active)
            .cloned()
            .collect();
        result.sort_by(|a, b| a.sort_order.cmp(&b.sort_order).then(a.name.cmp(&b.name)));
        Ok(result)
    }

    async fn list_by_category(&self, category_id: Uuid) -> Result<Vec<AssetType>, DbError> {
        let all = self.list(false).await?;
        Ok(all
            .into_iter()
            .filter(|t| t.category_id == Some(category_id))
            .collect())
    }

    async fn get(&self, id: Uuid) -> Result<Option<AssetType>, DbError> {
        Ok(self.rows.read().await.get(&id).cloned())
    }

    async fn get_by_code(&self, code: &str) -> Result<Option<AssetType>, DbError> {
        let rows = self.rows.read().await;
        Ok(rows.values().find(|r| r.code.eq_ignore_ascii_case(code)).cloned())
    }

    async fn code_exists(&self, code: &str, exclude_id: Option<Uuid>) -> Result<bool, DbError> {
        let rows = self.rows.read().await;
        Ok(rows
            .values()
            .any(|r| Some(r.id) != exclude_id && r.code.eq_ignore_ascii_case(code)))
    }

    async fn create(&self, asset_type: &AssetType) -> Result<AssetType, DbError> {
        let mut rows = self.rows.write().await;
        if rows.values().any(|r| r.code.eq_ignore_ascii_case(&asset_type.code)) {
            return Err(DbError::Constraint(format!(
                "UNIQUE constraint failed: asset_types.code ({})",
                asset_type.code
            )));
        }
        rows.insert(asset_type.id, asset_type.clone());
        Ok(asset_type.clone())
    }

    async fn update(&self, id: Uuid, update: AssetTypeUpdate) -> Result<AssetType, DbError> {
        let mut rows = self.rows.write().await;
        let asset_type = rows
            .get_mut(&id)
            .ok_or_else(|| DbError::not_found("AssetType", id))?;
        update.apply_to(asset_type);
        Ok(asset_type.clone())
    }

    async fn set_active(&self, id: Uuid, active: bool) -> Result<bool, DbError> {
        let mut rows = self.rows.write().await;
        Ok(rows
            .get_mut(&id)
            .map(|r| r.is_active = active)
            .is_some())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DbError> {
        Ok(self.rows.write().await.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_code_lookup_ignores_case() {
        let repo = MockAssetTypeRepository::with_types(vec![AssetType::new("LAP", "Laptop")]);
        assert!(repo.get_by_code("lap").await.unwrap().is_some());
        assert!(repo.code_exists("Lap", None).await.unwrap());
    }

    #[tokio::test]
    async fn test_inactive_hidden_from_default_list() {
        let repo = MockAssetTypeRepository::new();
        let t = repo.create(&AssetType::new("MON", "Monitor")).await.unwrap();
        repo.set_active(t.id, false).await.unwrap();
        assert!(repo.list(false).await.unwrap().is_empty());
        assert_eq!(repo.list(true).await.unwrap().len(), 1);
    }
}
