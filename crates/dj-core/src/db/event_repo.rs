//! Asset event (history) repository. Insert and read only.

use super::{DbError, DbPool};
use crate::models::{AssetEvent, AssetEventType};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

#[async_trait]
pub trait AssetEventRepository: Send + Sync {
    async fn insert(&self, event: &AssetEvent) -> Result<AssetEvent, DbError>;

    /// History of one asset, newest first.
    async fn list_for_asset(&self, asset_id: Uuid) -> Result<Vec<AssetEvent>, DbError>;

    /// Most recent events across all assets.
    async fn list_recent(&self, limit: u32) -> Result<Vec<AssetEvent>, DbError>;
}

#[cfg(feature = "database")]
const EVENT_COLUMNS: &str =
    "id, asset_id, event_type, description, old_value, new_value, performed_by, event_date";

#[cfg(feature = "database")]
pub struct SqliteAssetEventRepository {
    pool: sqlx::SqlitePool,
}

#[cfg(feature = "database")]
impl SqliteAssetEventRepository {
    pub fn new(pool: sqlx::SqlitePool) -> Self {
        Self { pool }
    }
}

#[cfg(feature = "database")]
#[async_trait]
impl AssetEventRepository for SqliteAssetEventRepository {
    async fn insert(&self, event: &AssetEvent) -> Result<AssetEvent, DbError> {
        let query = format!(
            "INSERT INTO asset_events ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            EVENT_COLUMNS
        );
        sqlx::query(&query)
            .bind(event.id.to_string())
            .bind(event.asset_id.to_string())
            .bind(event.event_type.as_db_str())
            .bind(&event.description)
            .bind(&event.old_value)
            .bind(&event.new_value)
            .bind(&event.performed_by)
            .bind(super::convert::timestamp_str(&event.event_date))
            .execute(&self.pool)
            .await?;
        Ok(event.clone())
    }

    async fn list_for_asset(&self, asset_id: Uuid) -> Result<Vec<AssetEvent>, DbError> {
        let query = format!(
            "SELECT {} FROM asset_events WHERE asset_id = ? ORDER BY event_date DESC",
            EVENT_COLUMNS
        );
        let rows: Vec<EventRow> = sqlx::query_as(&query)
            .bind(asset_id.to_string())
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn list_recent(&self, limit: u32) -> Result<Vec<AssetEvent>, DbError> {
        let query = format!(
            "SELECT {} FROM asset_events ORDER BY event_date DESC LIMIT ?",
            EVENT_COLUMNS
        );
        let rows: Vec<EventRow> = sqlx::query_as(&query)
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(TryInto::try_into).collect()
    }
}

#[cfg(feature = "database")]
pub struct PgAssetEventRepository {
    pool: sqlx::PgPool,
}

#[cfg(feature = "database")]
impl PgAssetEventRepository {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[cfg(feature = "database")]
#[async_trait]
impl AssetEventRepository for PgAssetEventRepository {
    async fn insert(&self, event: &AssetEvent) -> Result<AssetEvent, DbError> {
        let query = format!(
            "INSERT INTO asset_events ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
            EVENT_COLUMNS
        );
        sqlx::query(&query)
            .bind(event.id)
            .bind(event.asset_id)
            .bind(event.event_type.as_db_str())
            .bind(&event.description)
            .bind(&event.old_value)
            .bind(&event.new_value)
            .bind(&event.performed_by)
            .bind(event.event_date)
            .execute(&self.pool)
            .await?;
        Ok(event.clone())
    }

    async fn list_for_asset(&self, asset_id: Uuid) -> Result<Vec<AssetEvent>, DbError> {
        let query = format!(
            "SELECT {} FROM asset_events WHERE asset_id = $1 ORDER BY event_date DESC",
            EVENT_COLUMNS
        );
        let rows: Vec<PgEventRow> = sqlx::query_as(&query)
            .bind(asset_id)
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn list_recent(&self, limit: u32) -> Result<Vec<AssetEvent>, DbError> {
        let query = format!(
            "SELECT {} FROM asset_events ORDER BY event_date DESC LIMIT $1",
            EVENT_COLUMNS
        );
        let rows: Vec<PgEventRow> = sqlx::query_as(&query)
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(TryInto::try_into).collect()
    }
}

#[cfg(feature = "database")]
pub fn create_asset_event_repository(pool: &DbPool) -> Box<dyn AssetEventRepository> {
    match pool {
        DbPool::Sqlite(pool) => Box::new(SqliteAssetEventRepository::new(pool.clone())),
        DbPool::Postgres(pool) => Box::new(PgAssetEventRepository::new(pool.clone())),
    }
}

#[cfg(feature = "database")]
fn parse_event_type(value: &str) -> Result<AssetEventType, DbError> {
    AssetEventType::from_db_str(value)
        .ok_or_else(|| DbError::Serialization(format!("Unknown event type: {}", value)))
}

#[cfg(feature = "database")]
#[derive(sqlx::FromRow)]
struct EventRow {
    id: String,
    asset_id: String,
    event_type: String,
    description: String,
    old_value: Option<String>,
    new_value: Option<String>,
    performed_by: Option<String>,
    event_date: String,
}

#[cfg(feature = "database")]
impl TryFrom<EventRow> for AssetEvent {
    type Error = DbError;

    fn try_from(row: EventRow) -> Result<Self, Self::Error> {
        use super::convert::{parse_timestamp, parse_uuid};

        Ok(AssetEvent {
            id: parse_uuid(&row.id)?,
            asset_id: parse_uuid(&row.asset_id)?,
            event_type: parse_event_type(&row.event_type)?,
            description: row.description,
            old_value: row.old_value,
            new_value: row.new_value,
            performed_by: row.performed_by,
            event_date: parse_timestamp(&row.event_date)?,
        })
    }
}

#[cfg(feature = "database")]
#[derive(sqlx::FromRow)]
struct PgEventRow {
    id: Uuid,
    asset_id: Uuid,
    event_type: String,
    description: String,
    old_value: Option<String>,
    new_value: Option<String>,
    performed_by: Option<String>,
    event_date: DateTime<Utc>,
}

#[cfg(feature = "database")]
impl TryFrom<PgEventRow> for AssetEvent {
    type Error = DbError;

    fn try_from(row: PgEventRow) -> Result<Self, Self::Error> {
        Ok(AssetEvent {
            id: row.id,
            asset_id: row.asset_id,
            event_type: parse_event_type(&row.event_type)?,
            description: row.description,
            old_value: row.old_value,
            new_value: row.new_value,
            performed_by: row.performed_by,
            event_date: row.event_date,
        })
    }
}
