//! Mock implementation of BuildingRepository for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::db::{DbError, BuildingRepository};
use crate::models::{Building, BuildingUpdate};

/// Mock implementation of BuildingRepository using in-memory storage.
pub struct MockBuildingRepository {
    rows: Arc<RwLock<HashMap<Uuid, Building>>>,
}

impl Default for MockBuildingRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBuildingRepository {
    pub fn new() -> Self {
        Self::with_buildings(Vec::new())
    }

    pub fn with_buildings(buildings: Vec<Building>) -> Self {
        let map = buildings.into_iter().map(|r| (r.id, r)).collect();
        Self {
            rows: Arc::new(RwLock::new(map)),
        }
    }
}

#[async_trait]
impl BuildingRepository for MockBuildingRepository {
    async fn list(&self, include_inactive: bool) -> Result<Vec<Building>, DbError> {
        let rows = self.rows.read().await;
        let mut result: Vec<Building> = rows
            .values()
            .filter(|r| include_inactive || r.is_active)
            .cloned()
            .collect();
        result.sort_by(|a, b| a.sort_order.cmp(&b.sort_order).then(a.name.cmp(&b.name)));
        Ok(result)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Building>, DbError> {
        Ok(self.rows.read().await.get(&id).cloned())
    }

    async fn get_by_code(&self, code: &str) -> Result<Option<Building>, DbError> {
        let rows = self.rows.read().await;
        Ok(rows.values().find(|r| r.code.eq_ignore_ascii_case(code)).cloned())
    }

    async fn code_exists(&self, code: &str, exclude_id: Option<Uuid>) -> Result<bool, DbError> {
        let rows = self.rows.read().await;
        Ok(rows
            .values()
            .any(|r| Some(r.id) != exclude_id && r.code.eq_ignore_ascii_case(code)))
    }

    async fn create(&self, building: &Building) -> Result<Building, DbError> {
        let mut rows = self.rows.write().await;
        if rows.values().any(|r| r.code.eq_ignore_ascii_case(&building.code)) {
            return Err(DbError::Constraint(format!(
                "UNIQUE constraint failed: buildings.code ({})",
                building.code
            )));
        }
        rows.insert(building.id, building.clone());
        Ok(building.clone())
    }

    async fn update(&self, id: Uuid, update: BuildingUpdate) -> Result<Building, DbError> {
        let mut rows = self.rows.write().await;
        let building = rows
            .get_mut(&id)
            .ok_or_else(|| DbError::not_found("Building", id))?;
        update.apply_to(building);
        Ok(building.clone())
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
