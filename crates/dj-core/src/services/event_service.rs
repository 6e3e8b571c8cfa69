//! Asset history.

use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

use super::ServiceResult;
use crate::db::AssetEventRepository;
use crate::models::{AssetEvent, AssetEventType};

pub const DEFAULT_RECENT_LIMIT: u32 = 50;
pub const MAX_RECENT_LIMIT: u32 = 500;

/// Writes and reads the append-only event log.
#[derive(Clone)]
pub struct EventService {
    repo: Arc<dyn AssetEventRepository>,
}

impl EventService {
    pub fn new(repo: Arc<dyn AssetEventRepository>) -> Self {
        Self { repo }
    }

    pub async fn record(
        &self,
        asset_id: Uuid,
        event_type: AssetEventType,
        description: impl Into<String>,
        actor: Option<&str>,
    ) -> ServiceResult<AssetEvent> {
        let event = AssetEvent::new(asset_id, event_type, description).performed_by(actor);
        Ok(self.repo.insert(&event).await?)
    }

    /// Records a field change with its before and after values.
    pub async fn record_change(
        &self,
        asset_id: Uuid,
        event_type: AssetEventType,
        description: impl Into<String>,
        old_value: Option<String>,
        new_value: Option<String>,
        actor: Option<&str>,
    ) -> ServiceResult<AssetEvent> {
        let event = AssetEvent::new(asset_id, event_type, description)
            .with_change(old_value, new_value)
            .performed_by(actor);
        Ok(self.repo.insert(&event).await?)
    }

    /// Inserts an event, logging instead of failing. The change it describes
    /// has already been committed.
    pub(crate) async fn append(&self, event: AssetEvent) {
        if let Err(e) = self.repo.insert(&event).await {
            warn!(
                asset_id = %event.asset_id,
                event_type = %event.event_type,
                error = %e,
                "Failed to write asset event"
            );
        }
    }

    /// Events of one asset, newest first.
    pub async fn history(&self, asset_id: Uuid) -> ServiceResult<Vec<AssetEvent>> {
        Ok(self.repo.list_for_asset(asset_id).await?)
    }

    /// Newest events across the inventory. `limit` is clamped to
    /// `1..=MAX_RECENT_LIMIT`.
    pub async fn recent(&self, limit: Option<u32>) -> ServiceResult<Vec<AssetEvent>> {
        let limit = limit
            .unwrap_or(DEFAULT_RECENT_LIMIT)
            .clamp(1, MAX_RECENT_LIMIT);
        Ok(self.repo.list_recent(limit).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::mocks::MockAssetEventRepository;

    #[tokio::test]
    async fn test_record_and_history() {
        let service = EventService::new(Arc::new(MockAssetEventRepository::new()));
        let asset_id = Uuid::new_v4();

        service
            .record(asset_id, AssetEventType::Created, "Created", Some("admin"))
            .await
            .unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        service
            .record_change(
                asset_id,
                AssetEventType::StatusChanged,
                "Status changed",
                Some("Stock".into()),
                Some("InUse".into()),
                None,
            )
            .await
            .unwrap();
        service
            .record(Uuid::new_v4(), AssetEventType::Created, "Other", None)
            .await
            .unwrap();

        let history = service.history(asset_id).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].event_type, AssetEventType::StatusChanged);
        assert_eq!(history[1].performed_by.as_deref(), Some("admin"));
    }

    #[tokio::test]
    async fn test_recent_clamps_limit() {
        let service = EventService::new(Arc::new(MockAssetEventRepository::new()));
        for _ in 0..3 {
            service
                .record(Uuid::new_v4(), AssetEventType::Note, "n", None)
                .await
                .unwrap();
        }
        assert_eq!(service.recent(Some(0)).await.unwrap().len(), 1);
        assert_eq!(service.recent(None).await.unwrap().len(), 3);
    }
}
