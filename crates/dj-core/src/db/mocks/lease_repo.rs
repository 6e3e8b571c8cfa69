//! Mock implementation of LeaseContractRepository for testing.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::db::{DbError, LeaseContractRepository};
use crate::models::{LeaseContract, LeaseUpdate};

#[derive(Default)]
pub struct MockLeaseContractRepository {
    leases: Arc<RwLock<HashMap<Uuid, LeaseContract>>>,
}

impl MockLeaseContractRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LeaseContractRepository for MockLeaseContractRepository {
    async fn list_for_asset(&self, asset_id: Uuid) -> Result<Vec<LeaseContract>, DbError> {
        let leases = self.leases.read().await;
        let mut result: Vec<LeaseContract> = leases
            .values()
            .filter(|l| l.asset_id == asset_id)
            .cloned()
            .collect();
        result.sort_by(|a, b| b.start_date.cmp(&a.start_date));
        Ok(result)
    }

    async fn list_ending_between(
        &self,
        from: NaiveDate,
        until: NaiveDate,
    ) -> Result<Vec<LeaseContract>, DbError> {
        let leases = self.leases.read().await;
        let mut result: Vec<LeaseContract> = leases
            .values()
            .filter(|l| l.is_active && l.end_date >= from && l.end_date <= until)
            .cloned()
            .collect();
        result.sort_by_key(|l| l.end_date);
        Ok(result)
    }

    async fn get(&self, id: Uuid) -> Result<Option<LeaseContract>, DbError> {
        Ok(self.leases.read().await.get(&id).cloned())
    }

    async fn create(&self, lease: &LeaseContract) -> Result<LeaseContract, DbError> {
        self.leases.write().await.insert(lease.id, lease.clone());
        Ok(lease.clone())
    }

    async fn update(&self, id: Uuid, update: LeaseUpdate) -> Result<LeaseContract, DbError> {
        let mut leases = self.leases.write().await;
        let lease = leases
            .get_mut(&id)
            .ok_or_else(|| DbError::not_found("LeaseContract", id))?;
        update.apply_to(lease);
        Ok(lease.clone())
    }

    async fn set_active(&self, id: Uuid, active: bool) -> Result<bool, DbError> {
        let mut leases = self.leases.write().await;
        Ok(leases
            .get_mut(&id)
            .map(|l| {
                l.is_active = active;
                l.updated_at = Utc::now();
            })
            .is_some())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DbError> {
        Ok(self.leases.write().await.remove(&id).is_some())
    }
}
