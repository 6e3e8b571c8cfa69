//! Building repository.
//!
//! Building codes double as the `LOC` segment of asset codes.

use super::{DbError, DbPool};
use crate::models::{Building, BuildingUpdate};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

#[async_trait]
pub trait BuildingRepository: Send + Sync {
    /// Lists buildings ordered by sort order, then name.
    async fn list(&self, include_inactive: bool) -> Result<Vec<Building>, DbError>;

    async fn get(&self, id: Uuid) -> Result<Option<Building>, DbError>;

    async fn get_by_code(&self, code: &str) -> Result<Option<Building>, DbError>;

    /// Checks whether `code` is taken by a row other than `exclude_id`.
    async fn code_exists(&self, code: &str, exclude_id: Option<Uuid>) -> Result<bool, DbError>;

    async fn create(&self, building: &Building) -> Result<Building, DbError>;

    async fn update(&self, id: Uuid, update: BuildingUpdate) -> Result<Building, DbError>;

    /// Soft-deletes (or restores) a building.
    async fn set_active(&self, id: Uuid, active: bool) -> Result<bool, DbError>;

    async fn delete(&self, id: Uuid) -> Result<bool, DbError>;
}

#[cfg(feature = "database")]
pub struct SqliteBuildingRepository {
    pool: sqlx::SqlitePool,
}

#[cfg(feature = "database")]
impl SqliteBuildingRepository {
    pub fn new(pool: sqlx::SqlitePool) -> Self {
        Self { pool }
    }
}

#[cfg(feature = "database")]
const BUILDING_COLUMNS: &str =
    "id, code, name, address, sort_order, is_active, created_at, updated_at";

#[cfg(feature = "database")]
#[async_trait]
impl BuildingRepository for SqliteBuildingRepository {
    async fn list(&self, include_inactive: bool) -> Result<Vec<Building>, DbError> {
        let query = format!(
            "SELECT {} FROM buildings WHERE (? OR is_active = 1) ORDER BY sort_order, name",
            BUILDING_COLUMNS
        );
        let rows: Vec<BuildingRow> = sqlx::query_as(&query)
            .bind(include_inactive)
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn get(&self, id: Uuid) -> Result<Option<Building>, DbError> {
        let query = format!("SELECT {} FROM buildings WHERE id = ?", BUILDING_COLUMNS);
        let row: Option<BuildingRow> = sqlx::query_as(&query)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        row.map(TryInto::try_into).transpose()
    }

    async fn get_by_code(&self, code: &str) -> Result<Option<Building>, DbError> {
        let query = format!("SELECT {} FROM buildings WHERE code = ?", BUILDING_COLUMNS);
        let row: Option<BuildingRow> = sqlx::query_as(&query)
            .bind(code)
            .fetch_optional(&self.pool)
            .await?;
        row.map(TryInto::try_into).transpose()
    }

    async fn code_exists(&self, code: &str, exclude_id: Option<Uuid>) -> Result<bool, DbError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM buildings WHERE code = ? AND id != ?")
                .bind(code)
                .bind(exclude_id.map(|id| id.to_string()).unwrap_or_default())
                .fetch_one(&self.pool)
                .await?;
        Ok(count > 0)
    }

    async fn create(&self, building: &Building) -> Result<Building, DbError> {
        use super::convert::timestamp_str;

        sqlx::query(
            r#"
            INSERT INTO buildings (id, code, name, address, sort_order, is_active, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(building.id.to_string())
        .bind(&building.code)
        .bind(&building.name)
        .bind(&building.address)
        .bind(building.sort_order)
        .bind(building.is_active)
        .bind(timestamp_str(&building.created_at))
        .bind(timestamp_str(&building.updated_at))
        .execute(&self.pool)
        .await?;

        Ok(building.clone())
    }

    async fn update(&self, id: Uuid, update: BuildingUpdate) -> Result<Building, DbError> {
        use super::convert::timestamp_str;

        let mut building = self
            .get(id)
            .await?
            .ok_or_else(|| DbError::not_found("Building", id))?;
        update.apply_to(&mut building);

        sqlx::query(
            r#"
            UPDATE buildings
            SET code = ?, name = ?, address = ?, sort_order = ?, is_active = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&building.code)
        .bind(&building.name)
        .bind(&building.address)
        .bind(building.sort_order)
        .bind(building.is_active)
        .bind(timestamp_str(&building.updated_at))
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        Ok(building)
    }

    async fn set_active(&self, id: Uuid, active: bool) -> Result<bool, DbError> {
        let result = sqlx::query("UPDATE buildings SET is_active = ?, updated_at = ? WHERE id = ?")
            .bind(active)
            .bind(super::convert::timestamp_str(&Utc::now()))
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM buildings WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(feature = "database")]
pub struct PgBuildingRepository {
    pool: sqlx::PgPool,
}

#[cfg(feature = "database")]
impl PgBuildingRepository {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[cfg(feature = "database")]
#[async_trait]
impl BuildingRepository for PgBuildingRepository {
    async fn list(&self, include_inactive: bool) -> Result<Vec<Building>, DbError> {
        let query = format!(
            "SELECT {} FROM buildings WHERE ($1 OR is_active) ORDER BY sort_order, name",
            BUILDING_COLUMNS
        );
        let rows: Vec<PgBuildingRow> = sqlx::query_as(&query)
            .bind(include_inactive)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Building>, DbError> {
        let query = format!("SELECT {} FROM buildings WHERE id = $1", BUILDING_COLUMNS);
        let row: Option<PgBuildingRow> = sqlx::query_as(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Into::into))
    }

    async fn get_by_code(&self, code: &str) -> Result<Option<Building>, DbError> {
        let query = format!("SELECT {} FROM buildings WHERE code = $1", BUILDING_COLUMNS);
        let row: Option<PgBuildingRow> = sqlx::query_as(&query)
            .bind(code)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Into::into))
    }

    async fn code_exists(&self, code: &str, exclude_id: Option<Uuid>) -> Result<bool, DbError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM buildings WHERE code = $1 AND ($2::uuid IS NULL OR id <> $2))",
        )
        .bind(code)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn create(&self, building: &Building) -> Result<Building, DbError> {
        sqlx::query(
            r#"
            INSERT INTO buildings (id, code, name, address, sort_order, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(building.id)
        .bind(&building.code)
        .bind(&building.name)
        .bind(&building.address)
        .bind(building.sort_order)
        .bind(building.is_active)
        .bind(building.created_at)
        .bind(building.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(building.clone())
    }

    async fn update(&self, id: Uuid, update: BuildingUpdate) -> Result<Building, DbError> {
        let mut building = self
            .get(id)
            .await?
            .ok_or_else(|| DbError::not_found("Building", id))?;
        update.apply_to(&mut building);

        sqlx::query(
            r#"
            UPDATE buildings
            SET code = $2, name = $3, address = $4, sort_order = $5, is_active = $6, updated_at = $7
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&building.code)
        .bind(&building.name)
        .bind(&building.address)
        .bind(building.sort_order)
        .bind(building.is_active)
        .bind(building.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(building)
    }

    async fn set_active(&self, id: Uuid, active: bool) -> Result<bool, DbError> {
        let result =
            sqlx::query("UPDATE buildings SET is_active = $2, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .bind(active)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM buildings WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(feature = "database")]
pub fn create_building_repository(pool: &DbPool) -> Box<dyn BuildingRepository> {
    match pool {
        DbPool::Sqlite(pool) => Box::new(SqliteBuildingRepository::new(pool.clone())),
        DbPool::Postgres(pool) => Box::new(PgBuildingRepository::new(pool.clone())),
    }
}

#[cfg(feature = "database")]
#[derive(sqlx::FromRow)]
struct BuildingRow {
    id: String,
    code: String,
    name: String,
    address: Option<String>,
    sort_order: i32,
    is_active: bool,
    created_at: String,
    updated_at: String,
}

#[cfg(feature = "database")]
impl TryFrom<BuildingRow> for Building {
    type Error = DbError;

    fn try_from(row: BuildingRow) -> Result<Self, Self::Error> {
        use super::convert::{parse_timestamp, parse_uuid};

        Ok(Building {
            id: parse_uuid(&row.id)?,
            code: row.code,
            name: row.name,
            address: row.address,
            sort_order: row.sort_order,
            is_active: row.is_active,
            created_at: parse_timestamp(&row.created_at)?,
            updated_at: parse_timestamp(&row.updated_at)?,
        })
    }
}

#[cfg(feature = "database")]
#[derive(sqlx::FromRow)]
struct PgBuildingRow {
    id: Uuid,
    code: String,
    name: String,
    address: Option<String>,
    sort_order: i32,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[cfg(feature = "database")]
impl From<PgBuildingRow> for Building {
    fn from(row: PgBuildingRow) -> Self {
        Building {
            id: row.id,
            code: row.code,
            name: row.name,
            address: row.address,
            sort_order: row.sort_order,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
