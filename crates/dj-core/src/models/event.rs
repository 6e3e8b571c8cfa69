//! Append-only asset history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum AssetEventType {
    Created,
    Updated,
    StatusChanged,
    OwnerChanged,
    ServiceChanged,
    Imported,
    LeaseAdded,
    LeaseEnded,
    Deactivated,
    Reactivated,
    Note,
}

impl AssetEventType {
    pub fn as_db_str(&self) -> &'static str {
        match self {
            AssetEventType::Created => "created",
            AssetEventType::Updated => "updated",
            AssetEventType::StatusChanged => "status_changed",
            AssetEventType::OwnerChanged => "owner_changed",
            AssetEventType::ServiceChanged => "service_changed",
            AssetEventType::Imported => "imported",
            AssetEventType::LeaseAdded => "lease_added",
            AssetEventType::LeaseEnded => "lease_ended",
            AssetEventType::Deactivated => "deactivated",
            AssetEventType::Reactivated => "reactivated",
            AssetEventType::Note => "note",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "created" => Some(AssetEventType::Created),
            "updated" => Some(AssetEventType::Updated),
            "status_changed" => Some(AssetEventType::StatusChanged),
            "owner_changed" => Some(AssetEventType::OwnerChanged),
            "service_changed" => Some(AssetEventType::ServiceChanged),
            "imported" => Some(AssetEventType::Imported),
            "lease_added" => Some(AssetEventType::LeaseAdded),
            "lease_ended" => Some(AssetEventType::LeaseEnded),
            "deactivated" => Some(AssetEventType::Deactivated),
            "reactivated" => Some(AssetEventType::Reactivated),
            "note" => Some(AssetEventType::Note),
            _ => None,
        }
    }
}

impl fmt::Display for AssetEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_db_str())
    }
}

/// One entry in an asset's history. Never updated after insertion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct AssetEvent {
    pub id: Uuid,
    pub asset_id: Uuid,
    pub event_type: AssetEventType,
    pub description: String,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub performed_by: Option<String>,
    pub event_date: DateTime<Utc>,
}

impl AssetEvent {
    pub fn new(asset_id: Uuid, event_type: AssetEventType, description: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            asset_id,
            event_type,
            description: description.into(),
            old_value: None,
            new_value: None,
            performed_by: None,
            event_date: Utc::now(),
        }
    }

    pub fn with_change(mut self, old_value: Option<String>, new_value: Option<String>) -> Self {
        self.old_value = old_value;
        self.new_value = new_value;
        self
    }

    pub fn performed_by(mut self, actor: Option<&str>) -> Self {
        self.performed_by = actor.map(str::to_string);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type_db_round_trip() {
        let all = [
            AssetEventType::Created,
            AssetEventType::Updated,
            AssetEventType::StatusChanged,
            AssetEventType::OwnerChanged,
            AssetEventType::ServiceChanged,
            AssetEventType::Imported,
            AssetEventType::LeaseAdded,
            AssetEventType::LeaseEnded,
            AssetEventType::Deactivated,
            AssetEventType::Reactivated,
            AssetEventType::Note,
        ];
        for t in all {
            assert_eq!(AssetEventType::from_db_str(t.as_db_str()), Some(t));
        }
    }

    #[test]
    fn test_builder() {
        let asset_id = Uuid::new_v4();
        let event = AssetEvent::new(asset_id, AssetEventType::StatusChanged, "Status changed")
            .with_change(Some("Stock".into()), Some("InUse".into()))
            .performed_by(Some("admin@diepenbeek.be"));
        assert_eq!(event.asset_id, asset_id);
        assert_eq!(event.old_value.as_deref(), Some("Stock"));
        assert_eq!(event.performed_by.as_deref(), Some("admin@diepenbeek.be"));
    }
}
