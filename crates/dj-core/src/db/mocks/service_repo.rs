//! Mock implementation of ServiceRepository for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::db::{DbError, ServiceRepository};
use crate::models::{Service, ServiceUpdate};

/// Mock implementation of ServiceRepository using in-memory storage.
pub struct MockServiceRepository {
    rows: Arc<RwLock<HashMap<Uuid, Service>>>,
}

impl Default for MockServiceRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl MockServiceRepository {
    pub fn new() -> Self {
        Self::with_services(Vec::new())
    }

    pub fn with_services(services: Vec<Service>) -> Self {
        let map = services.into_iter().map(|r| (r.id, r)).collect();
        Self {
            rows: Arc::new(RwLock::new(map)),
        }
    }
}

#[async_trait]
impl ServiceRepository for MockServiceRepository {
    async fn list(&self, include_inactive: bool) -> Result<Vec<Service>, DbError> {
        let rows = self.rows.read().await;
        let mut result: Vec<Service> = rows
            .values()
            .filter(|r| include_inactive || r.is_active)
            .cloned()
            .collect();
        result.sort_by(|a, b| a.sort_order.cmp(&b.sort_order).then(a.name.cmp(&b.name)));
        Ok(result)
    }

    async fn list_by_sector(&self, sector_id: Uuid) -> Result<Vec<Service>, DbError> {
        let all = self.list(false).await?;
        Ok(all
            .into_iter()
            .filter(|s| s.sector_id == Some(sector_id))
            .collect())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Service>, DbError> {
        Ok(self.rows.read().await.get(&id).cloned())
    }

    async fn get_by_code(&self, code: &str) -> Result<Option<Service>, DbError> {
        let rows = self.rows.read().await;
        Ok(rows.values().find(|r| r.code.eq_ignore_ascii_case(code)).cloned())
    }

    async fn code_exists(&self, code: &str, exclude_id: Option<Uuid>) -> Result<bool, DbError> {
        let rows = self.rows.read().await;
        Ok(rows
            .values()
            .any(|r| Some(r.id) != exclude_id && r.code.eq_ignore_ascii_case(code)))
    }

    async fn create(&self, service: &Service) -> Result<Service, DbError> {
        let mut rows = self.rows.write().await;
        if rows.values().any(|r| r.code.eq_ignore_ascii_case(&service.code)) {
            return Err(DbError::Constraint(format!(
                "UNIQUE constraint failed: services.code ({})",
                service.code
            )));
        }
        rows.insert(service.id, service.clone());
        Ok(service.clone())
    }

    async fn update(&self, id: Uuid, update: ServiceUpdate) -> Result<Service, DbError> {
        let mut rows = self.rows.write().await;
        let service = rows
            .get_mut(&id)
            .ok_or_else(|| DbError::not_found("Service", id))?;
        update.apply_to(service);
        Ok(service.clone())
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
