//! Mock implementation of AssetEventRepository for testing.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::db::{AssetEventRepository, DbError};
use crate::models::AssetEvent;

/// Append-only in-memory event log.
#[derive(Default)]
pub struct MockAssetEventRepository {
    events: Arc<RwLock<Vec<AssetEvent>>>,
}

impl MockAssetEventRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded events in insertion order.
    pub async fn snapshot(&self) -> Vec<AssetEvent> {
        self.events.read().await.clone()
    }
}

#[async_trait]
impl AssetEventRepository for MockAssetEventRepository {
    async fn insert(&self, event: &AssetEvent) -> Result<AssetEvent, DbError> {
        self.events.write().await.push(event.clone());
        Ok(event.clone())
    }

    async fn list_for_asset(&self, asset_id: Uuid) -> Result<Vec<AssetEvent>, DbError> {
        let events = self.events.read().await;
        let mut result: Vec<AssetEvent> = events
            .iter()
            .filter(|e| e.asset_id == asset_id)
            .cloned()
            .collect();
        result.sort_by(|a, b| b.event_date.cmp(&a.event_date));
        Ok(result)
    }

    async fn list_recent(&self, limit: u32) -> Result<Vec<AssetEvent>, DbError> {
        let mut result = self.events.read().await.clone();
        result.sort_by(|a, b| b.event_date.cmp(&a.event_date));
        result.truncate(limit as usize);
        Ok(result)
    }
}
