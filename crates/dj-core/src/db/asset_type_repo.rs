//! Asset type repository.
//!
//! Deleting a type that is still referenced by assets fails with
//! [`DbError::InUse`]; deactivate it instead.

use super::{DbError, DbPool};
use crate::models::{AssetType, AssetTypeUpdate};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

#[async_trait]
pub trait AssetTypeRepository: Send + Sync {
    async fn list(&self, include_inactive: bool) -> Result<Vec<AssetType>, DbError>;

    async fn list_by_category(&self, category_id: Uuid) -> Result<Vec<AssetType>, DbError>;

    async fn get(&self, id: Uuid) -> Result<Option<AssetType>, DbError>;

    async fn get_by_code(&self, code: &str) -> Result<Option<AssetType>, DbError>;

    async fn code_exists(&self, code: &str, exclude_id: Option<Uuid>) -> Result<bool, DbError>;

    async fn create(&self, asset_type: &AssetType) -> Result<AssetType, DbError>;

    async fn update(&self, id: Uuid, update: AssetTypeUpdate) -> Result<AssetType, DbError>;

    async fn set_active(&self, id: Uuid, active: bool) -> Result<bool, DbError>;

    async fn delete(&self, id: Uuid) -> Result<bool, DbError>;
}

#[cfg(feature = "database")]
const ASSET_TYPE_COLUMNS: &str =
    "id, code, name, description, category_id, sort_order, is_active, created_at, updated_at";

#[cfg(feature = "database")]
pub struct SqliteAssetTypeRepository {
    pool: sqlx::SqlitePool,
}

#[cfg(feature = "database")]
impl SqliteAssetTypeRepository {
    pub fn new(pool: sqlx::SqlitePool) -> Self {
        Self { pool }
    }
}

#[cfg(feature = "database")]
#[async_trait]
impl AssetTypeRepository for SqliteAssetTypeRepository {
    async fn list(&self, include_inactive: bool) -> Result<Vec<AssetType>, DbError> {
        let query = format!(
            "SELECT {} FROM asset_types WHERE (? OR is_active = 1) ORDER BY sort_order, code",
            ASSET_TYPE_COLUMNS
        );
        let rows: Vec<AssetTypeRow> = sqlx::query_as(&query)
            .bind(include_inactive)
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn list_by_category(&self, category_id: Uuid) -> Result<Vec<AssetType>, DbError> {
        let query = format!(
            "SELECT {} FROM asset_types WHERE category_id = ? ORDER BY sort_order, code",
            ASSET_TYPE_COLUMNS
        );
        let rows: Vec<AssetTypeRow> = sqlx::query_as(&query)
            .bind(category_id.to_string())
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn get(&self, id: Uuid) -> Result<Option<AssetType>, DbError> {
        let query = format!("SELECT {} FROM asset_types WHERE id = ?", ASSET_TYPE_COLUMNS);
        let row: Option<AssetTypeRow> = sqlx::query_as(&query)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        row.map(TryInto::try_into).transpose()
    }

    async fn get_by_code(&self, code: &str) -> Result<Option<AssetType>, DbError> {
        let query = format!(
            "SELECT {} FROM asset_types WHERE code = ? COLLATE NOCASE",
            ASSET_TYPE_COLUMNS
        );
        let row: Option<AssetTypeRow> = sqlx::query_as(&query)
            .bind(code)
            .fetch_optional(&self.pool)
            .await?;
        row.map(TryInto::try_into).transpose()
    }

    async fn code_exists(&self, code: &str, exclude_id: Option<Uuid>) -> Result<bool, DbError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM asset_types WHERE code = ? COLLATE NOCASE AND id != ?",
        )
        .bind(code)
        .bind(exclude_id.map(|id| id.to_string()).unwrap_or_default())
        .fetch_one(&self.pool)
        .await?;
        Ok(count > 0)
    }

    async fn create(&self, asset_type: &AssetType) -> Result<AssetType, DbError> {
        use super::convert::{opt_uuid_str, timestamp_str};

        sqlx::query(
            r#"
            INSERT INTO asset_types (id, code, name, description, category_id, sort_order, is_active, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(asset_type.id.to_string())
        .bind(&asset_type.code)
        .bind(&asset_type.name)
        .bind(&asset_type.description)
        .bind(opt_uuid_str(&asset_type.category_id))
        .bind(asset_type.sort_order)
        .bind(asset_type.is_active)
        .bind(timestamp_str(&asset_type.created_at))
        .bind(timestamp_str(&asset_type.updated_at))
        .execute(&self.pool)
        .await?;

        Ok(asset_type.clone())
    }

    async fn update(&self, id: Uuid, update: AssetTypeUpdate) -> Result<AssetType, DbError> {
        use super::convert::{opt_uuid_str, timestamp_str};

        let mut asset_type = self
            .get(id)
            .await?
            .ok_or_else(|| DbError::not_found("AssetType", id))?;
        update.apply_to(&mut asset_type);

        sqlx::query(
            r#"
            UPDATE asset_types
            SET code = ?, name = ?, description = ?, category_id = ?, sort_order = ?, is_active = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&asset_type.code)
        .bind(&asset_type.name)
        .bind(&asset_type.description)
        .bind(opt_uuid_str(&asset_type.category_id))
        .bind(asset_type.sort_order)
        .bind(asset_type.is_active)
        .bind(timestamp_str(&asset_type.updated_at))
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        Ok(asset_type)
    }

    async fn set_active(&self, id: Uuid, active: bool) -> Result<bool, DbError> {
        let result =
            sqlx::query("UPDATE asset_types SET is_active = ?, updated_at = ? WHERE id = ?")
                .bind(active)
                .bind(super::convert::timestamp_str(&Utc::now()))
                .bind(id.to_string())
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM asset_types WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(feature = "database")]
pub struct PgAssetTypeRepository {
    pool: sqlx::PgPool,
}

#[cfg(feature = "database")]
impl PgAssetTypeRepository {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[cfg(feature = "database")]
#[async_trait]
impl AssetTypeRepository for PgAssetTypeRepository {
    async fn list(&self, include_inactive: bool) -> Result<Vec<AssetType>, DbError> {
        let query = format!(
            "SELECT {} FROM asset_types WHERE ($1 OR is_active) ORDER BY sort_order, code",
            ASSET_TYPE_COLUMNS
        );
        let rows: Vec<PgAssetTypeRow> = sqlx::query_as(&query)
            .bind(include_inactive)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_by_category(&self, category_id: Uuid) -> Result<Vec<AssetType>, DbError> {
        let query = format!(
            "SELECT {} FROM asset_types WHERE category_id = $1 ORDER BY sort_order, code",
            ASSET_TYPE_COLUMNS
        );
        let rows: Vec<PgAssetTypeRow> = sqlx::query_as(&query)
            .bind(category_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn get(&self, id: Uuid) -> Result<Option<AssetType>, DbError> {
        let query = format!("SELECT {} FROM asset_types WHERE id = $1", ASSET_TYPE_COLUMNS);
        let row: Option<PgAssetTypeRow> = sqlx::query_as(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Into::into))
    }

    async fn get_by_code(&self, code: &str) -> Result<Option<AssetType>, DbError> {
        let query = format!(
            "SELECT {} FROM asset_types WHERE UPPER(code) = UPPER($1)",
            ASSET_TYPE_COLUMNS
        );
        let row: Option<PgAssetTypeRow> = sqlx::query_as(&query)
            .bind(code)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Into::into))
    }

    async fn code_exists(&self, code: &str, exclude_id: Option<Uuid>) -> Result<bool, DbError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM asset_types WHERE UPPER(code) = UPPER($1) AND ($2::uuid IS NULL OR id <> $2))",
        )
        .bind(code)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn create(&self, asset_type: &AssetType) -> Result<AssetType, DbError> {
        sqlx::query(
            r#"
            INSERT INTO asset_types (id, code, name, description, category_id, sort_order, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(asset_type.id)
        .bind(&asset_type.code)
        .bind(&asset_type.name)
        .bind(&asset_type.description)
        .bind(asset_type.category_id)
        .bind(asset_type.sort_order)
        .bind(asset_type.is_active)
        .bind(asset_type.created_at)
        .bind(asset_type.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(asset_type.clone())
    }

    async fn update(&self, id: Uuid, update: AssetTypeUpdate) -> Result<AssetType, DbError> {
        let mut asset_type = self
            .get(id)
            .await?
            .ok_or_else(|| DbError::not_found("AssetType", id))?;
        update.apply_to(&mut asset_type);

        sqlx::query(
            r#"
            UPDATE asset_types
            SET code = $2, name = $3, description = $4, category_id = $5, sort_order = $6, is_active = $7, updated_at = $8
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&asset_type.code)
        .bind(&asset_type.name)
        .bind(&asset_type.description)
        .bind(asset_type.category_id)
        .bind(asset_type.sort_order)
        .bind(asset_type.is_active)
        .bind(asset_type.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(asset_type)
    }

    async fn set_active(&self, id: Uuid, active: bool) -> Result<bool, DbError> {
        let result =
            sqlx::query("UPDATE asset_types SET is_active = $2, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .bind(active)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM asset_types WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(feature = "database")]
pub fn create_asset_type_repository(pool: &DbPool) -> Box<dyn AssetTypeRepository> {
    match pool {
        DbPool::Sqlite(pool) => Box::new(SqliteAssetTypeRepository::new(pool.clone())),
        DbPool::Postgres(pool) => Box::new(PgAssetTypeRepository::new(pool.clone())),
    }
}

#[cfg(feature = "database")]
#[derive(sqlx::FromRow)]
struct AssetTypeRow {
    id: String,
    code: String,
    name: String,
    description: Option<String>,
    category_id: Option<String>,
    sort_order: i32,
    is_active: bool,
    created_at: String,
    updated_at: String,
}

#[cfg(feature = "database")]
impl TryFrom<AssetTypeRow> for AssetType {
    type Error = DbError;

    fn try_from(row: AssetTypeRow) -> Result<Self, Self::Error> {
        use super::convert::{parse_opt_uuid, parse_timestamp, parse_uuid};

        Ok(AssetType {
            id: parse_uuid(&row.id)?,
            code: row.code,
            name: row.name,
            description: row.description,
            category_id: parse_opt_uuid(row.category_id)?,
            sort_order: row.sort_order,
            is_active: row.is_active,
            created_at: parse_timestamp(&row.created_at)?,
            updated_at: parse_timestamp(&row.updated_at)?,
        })
    }
}

#[cfg(feature = "database")]
#[derive(sqlx::FromRow)]
struct PgAssetTypeRow {
    id: Uuid,
    code: String,
    name: String,
    description: Option<String>,
    category_id: Option<Uuid>,
    sort_order: i32,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[cfg(feature = "database")]
impl From<PgAssetTypeRow> for AssetType {
    fn from(row: PgAssetTypeRow) -> Self {
        AssetType {
            id: row.id,
            code: row.code,
            name: row.name,
            description: row.description,
            category_id: row.category_id,
            sort_order: row.sort_order,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
