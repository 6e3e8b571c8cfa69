//! Sector repository. Sectors group services.

use super::{DbError, DbPool};
use crate::models::{Sector, SectorUpdate};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

#[async_trait]
pub trait SectorRepository: Send + Sync {
    /// Lists sectors ordered by sort order, then name.
    async fn list(&self, include_inactive: bool) -> Result<Vec<Sector>, DbError>;

    async fn get(&self, id: Uuid) -> Result<Option<Sector>, DbError>;

    async fn get_by_code(&self, code: &str) -> Result<Option<Sector>, DbError>;

    /// Checks whether `code` is taken by a row other than `exclude_id`.
    async fn code_exists(&self, code: &str, exclude_id: Option<Uuid>) -> Result<bool, DbError>;

    async fn create(&self, sector: &Sector) -> Result<Sector, DbError>;

    async fn update(&self, id: Uuid, update: SectorUpdate) -> Result<Sector, DbError>;

    async fn set_active(&self, id: Uuid, active: bool) -> Result<bool, DbError>;

    async fn delete(&self, id: Uuid) -> Result<bool, DbError>;
}

#[cfg(feature = "database")]
pub struct SqliteSectorRepository {
    pool: sqlx::SqlitePool,
}

#[cfg(feature = "database")]
impl SqliteSectorRepository {
    pub fn new(pool: sqlx::SqlitePool) -> Self {
        Self { pool }
    }
}

#[cfg(feature = "database")]
const SECTOR_COLUMNS: &str =
    "id, code, name, sort_order, is_active, created_at, updated_at";

#[cfg(feature = "database")]
#[async_trait]
impl SectorRepository for SqliteSectorRepository {
    async fn list(&self, include_inactive: bool) -> Result<Vec<Sector>, DbError> {
        let query = format!(
            "SELECT {} FROM sectors WHERE (? OR is_active = 1) ORDER BY sort_order, name",
            SECTOR_COLUMNS
        );
        let rows: Vec<SectorRow> = sqlx::query_as(&query)
            .bind(include_inactive)
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn get(&self, id: Uuid) -> Result<Option<Sector>, DbError> {
        let query = format!("SELECT {} FROM sectors WHERE id = ?", SECTOR_COLUMNS);
        let row: Option<SectorRow> = sqlx::query_as(&query)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        row.map(TryInto::try_into).transpose()
    }

    async fn get_by_code(&self, code: &str) -> Result<Option<Sector>, DbError> {
        let query = format!("SELECT {} FROM sectors WHERE code = ?", SECTOR_COLUMNS);
        let row: Option<SectorRow> = sqlx::query_as(&query)
            .bind(code)
            .fetch_optional(&self.pool)
            .await?;
        row.map(TryInto::try_into).transpose()
    }

    async fn code_exists(&self, code: &str, exclude_id: Option<Uuid>) -> Result<bool, DbError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM sectors WHERE code = ? AND id != ?")
                .bind(code)
                .bind(exclude_id.map(|id| id.to_string()).unwrap_or_default())
                .fetch_one(&self.pool)
                .await?;
        Ok(count > 0)
    }

    async fn create(&self, sector: &Sector) -> Result<Sector, DbError> {
        use super::convert::timestamp_str;

        sqlx::query(
            r#"
            INSERT INTO sectors (id, code, name, sort_order, is_active, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(sector.id.to_string())
        .bind(&sector.code)
        .bind(&sector.name)
        .bind(sector.sort_order)
        .bind(sector.is_active)
        .bind(timestamp_str(&sector.created_at))
        .bind(timestamp_str(&sector.updated_at))
        .execute(&self.pool)
        .await?;

        Ok(sector.clone())
    }

    async fn update(&self, id: Uuid, update: SectorUpdate) -> Result<Sector, DbError> {
        use super::convert::timestamp_str;

        let mut sector = self
            .get(id)
            .await?
            .ok_or_else(|| DbError::not_found("Sector", id))?;
        update.apply_to(&mut sector);

        sqlx::query(
            r#"
            UPDATE sectors
            SET code = ?, name = ?, sort_order = ?, is_active = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&sector.code)
        .bind(&sector.name)
        .bind(sector.sort_order)
        .bind(sector.is_active)
        .bind(timestamp_str(&sector.updated_at))
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        Ok(sector)
    }

    async fn set_active(&self, id: Uuid, active: bool) -> Result<bool, DbError> {
        let result = sqlx::query("UPDATE sectors SET is_active = ?, updated_at = ? WHERE id = ?")
            .bind(active)
            .bind(super::convert::timestamp_str(&Utc::now()))
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM sectors WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(feature = "database")]
pub struct PgSectorRepository {
    pool: sqlx::PgPool,
}

#[cfg(feature = "database")]
impl PgSectorRepository {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[cfg(feature = "database")]
#[async_trait]
impl SectorRepository for PgSectorRepository {
    async fn list(&self, include_inactive: bool) -> Result<Vec<Sector>, DbError> {
        let query = format!(
            "SELECT {} FROM sectors WHERE ($1 OR is_active) ORDER BY sort_order, name",
            SECTOR_COLUMNS
        );
        let rows: Vec<PgSectorRow> = sqlx::query_as(&query)
            .bind(include_inactive)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Sector>, DbError> {
        let query = format!("SELECT {} FROM sectors WHERE id = $1", SECTOR_COLUMNS);
        let row: Option<PgSectorRow> = sqlx::query_as(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Into::into))
    }

    async fn get_by_code(&self, code: &str) -> Result<Option<Sector>, DbError> {
        let query = format!("SELECT {} FROM sectors WHERE code = $1", SECTOR_COLUMNS);
        let row: Option<PgSectorRow> = sqlx::query_as(&query)
            .bind(code)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Into::into))
    }

    async fn code_exists(&self, code: &str, exclude_id: Option<Uuid>) -> Result<bool, DbError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM sectors WHERE code = $1 AND ($2::uuid IS NULL OR id <> $2))",
        )
        .bind(code)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn create(&self, sector: &Sector) -> Result<Sector, DbError> {
        sqlx::query(
            r#"
            INSERT INTO sectors (id, code, name, sort_order, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(sector.id)
        .bind(&sector.code)
        .bind(&sector.name)
        .bind(sector.sort_order)
        .bind(sector.is_active)
        .bind(sector.created_at)
        .bind(sector.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(sector.clone())
    }

    async fn update(&self, id: Uuid, update: SectorUpdate) -> Result<Sector, DbError> {
        let mut sector = self
            .get(id)
            .await?
            .ok_or_else(|| DbError::not_found("Sector", id))?;
        update.apply_to(&mut sector);

        sqlx::query(
            r#"
            UPDATE sectors
            SET code = $2, name = $3, sort_order = $4, is_active = $5, updated_at = $6
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&sector.code)
        .bind(&sector.name)
        .bind(sector.sort_order)
        .bind(sector.is_active)
        .bind(sector.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(sector)
    }

    async fn set_active(&self, id: Uuid, active: bool) -> Result<bool, DbError> {
        let result =
            sqlx::query("UPDATE sectors SET is_active = $2, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .bind(active)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM sectors WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(feature = "database")]
pub fn create_sector_repository(pool: &DbPool) -> Box<dyn SectorRepository> {
    match pool {
        DbPool::Sqlite(pool) => Box::new(SqliteSectorRepository::new(pool.clone())),
        DbPool::Postgres(pool) => Box::new(PgSectorRepository::new(pool.clone())),
    }
}

#[cfg(feature = "database")]
#[derive(sqlx::FromRow)]
struct SectorRow {
    id: String,
    code: String,
    name: String,
    sort_order: i32,
    is_active: bool,
    created_at: String,
    updated_at: String,
}

#[cfg(feature = "database")]
impl TryFrom<SectorRow> for Sector {
    type Error = DbError;

    fn try_from(row: SectorRow) -> Result<Self, Self::Error> {
        use super::convert::{parse_timestamp, parse_uuid};

        Ok(Sector {
            id: parse_uuid(&row.id)?,
            code: row.code,
            name: row.name,
            sort_order: row.sort_order,
            is_active: row.is_active,
            created_at: parse_timestamp(&row.created_at)?,
            updated_at: parse_timestamp(&row.updated_at)?,
        })
    }
}

#[cfg(feature = "database")]
#[derive(sqlx::FromRow)]
struct PgSectorRow {
    id: Uuid,
    code: String,
    name: String,
    sort_order: i32,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[cfg(feature = "database")]
impl From<PgSectorRow> for Sector {
    fn from(row: PgSectorRow) -> Self {
        Sector {
            id: row.id,
            code: row.code,
            name: row.name,
            sort_order: row.sort_order,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
