//! Service (department) repository.

use super::{DbError, DbPool};
use crate::models::{Service, ServiceUpdate};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

#[async_trait]
pub trait ServiceRepository: Send + Sync {
    async fn list(&self, include_inactive: bool) -> Result<Vec<Service>, DbError>;

    async fn list_by_sector(&self, sector_id: Uuid) -> Result<Vec<Service>, DbError>;

    async fn get(&self, id: Uuid) -> Result<Option<Service>, DbError>;

    /// Case-insensitive lookup, used by the CSV importer.
    async fn get_by_code(&self, code: &str) -> Result<Option<Service>, DbError>;

    async fn code_exists(&self, code: &str, exclude_id: Option<Uuid>) -> Result<bool, DbError>;

    async fn create(&self, service: &Service) -> Result<Service, DbError>;

    async fn update(&self, id: Uuid, update: ServiceUpdate) -> Result<Service, DbError>;

    async fn set_active(&self, id: Uuid, active: bool) -> Result<bool, DbError>;

    /// Hard delete. Assets pointing at the service keep existing with no service.
    async fn delete(&self, id: Uuid) -> Result<bool, DbError>;
}

#[cfg(feature = "database")]
const SERVICE_COLUMNS: &str =
    "id, code, name, sector_id, building_id, sort_order, is_active, created_at, updated_at";

#[cfg(feature = "database")]
pub struct SqliteServiceRepository {
    pool: sqlx::SqlitePool,
}

#[cfg(feature = "database")]
impl SqliteServiceRepository {
    pub fn new(pool: sqlx::SqlitePool) -> Self {
        Self { pool }
    }
}

#[cfg(feature = "database")]
#[async_trait]
impl ServiceRepository for SqliteServiceRepository {
    async fn list(&self, include_inactive: bool) -> Result<Vec<Service>, DbError> {
        let query = format!(
            "SELECT {} FROM services WHERE (? OR is_active = 1) ORDER BY sort_order, name",
            SERVICE_COLUMNS
        );
        let rows: Vec<ServiceRow> = sqlx::query_as(&query)
            .bind(include_inactive)
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn list_by_sector(&self, sector_id: Uuid) -> Result<Vec<Service>, DbError> {
        let query = format!(
            "SELECT {} FROM services WHERE sector_id = ? ORDER BY sort_order, name",
            SERVICE_COLUMNS
        );
        let rows: Vec<ServiceRow> = sqlx::query_as(&query)
            .bind(sector_id.to_string())
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn get(&self, id: Uuid) -> Result<Option<Service>, DbError> {
        let query = format!("SELECT {} FROM services WHERE id = ?", SERVICE_COLUMNS);
        let row: Option<ServiceRow> = sqlx::query_as(&query)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        row.map(TryInto::try_into).transpose()
    }

    async fn get_by_code(&self, code: &str) -> Result<Option<Service>, DbError> {
        let query = format!(
            "SELECT {} FROM services WHERE code = ? COLLATE NOCASE",
            SERVICE_COLUMNS
        );
        let row: Option<ServiceRow> = sqlx::query_as(&query)
            .bind(code)
            .fetch_optional(&self.pool)
            .await?;
        row.map(TryInto::try_into).transpose()
    }

    async fn code_exists(&self, code: &str, exclude_id: Option<Uuid>) -> Result<bool, DbError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM services WHERE code = ? COLLATE NOCASE AND id != ?",
        )
        .bind(code)
        .bind(exclude_id.map(|id| id.to_string()).unwrap_or_default())
        .fetch_one(&self.pool)
        .await?;
        Ok(count > 0)
    }

    async fn create(&self, service: &Service) -> Result<Service, DbError> {
        use super::convert::{opt_uuid_str, timestamp_str};

        sqlx::query(
            r#"
            INSERT INTO services (id, code, name, sector_id, building_id, sort_order, is_active, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(service.id.to_string())
        .bind(&service.code)
        .bind(&service.name)
        .bind(opt_uuid_str(&service.sector_id))
        .bind(opt_uuid_str(&service.building_id))
        .bind(service.sort_order)
        .bind(service.is_active)
        .bind(timestamp_str(&service.created_at))
        .bind(timestamp_str(&service.updated_at))
        .execute(&self.pool)
        .await?;

        Ok(service.clone())
    }

    async fn update(&self, id: Uuid, update: ServiceUpdate) -> Result<Service, DbError> {
        use super::convert::{opt_uuid_str, timestamp_str};

        let mut service = self
            .get(id)
            .await?
            .ok_or_else(|| DbError::not_found("Service", id))?;
        update.apply_to(&mut service);

        sqlx::query(
            r#"
            UPDATE services
            SET code = ?, name = ?, sector_id = ?, building_id = ?, sort_order = ?, is_active = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&service.code)
        .bind(&service.name)
        .bind(opt_uuid_str(&service.sector_id))
        .bind(opt_uuid_str(&service.building_id))
        .bind(service.sort_order)
        .bind(service.is_active)
        .bind(timestamp_str(&service.updated_at))
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        Ok(service)
    }

    async fn set_active(&self, id: Uuid, active: bool) -> Result<bool, DbError> {
        let result = sqlx::query("UPDATE services SET is_active = ?, updated_at = ? WHERE id = ?")
            .bind(active)
            .bind(super::convert::timestamp_str(&Utc::now()))
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM services WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(feature = "database")]
pub struct PgServiceRepository {
    pool: sqlx::PgPool,
}

#[cfg(feature = "database")]
impl PgServiceRepository {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[cfg(feature = "database")]
#[async_trait]
impl ServiceRepository for PgServiceRepository {
    async fn list(&self, include_inactive: bool) -> Result<Vec<Service>, DbError> {
        let query = format!(
            "SELECT {} FROM services WHERE ($1 OR is_active) ORDER BY sort_order, name",
            SERVICE_COLUMNS
        );
        let rows: Vec<PgServiceRow> = sqlx::query_as(&query)
            .bind(include_inactive)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_by_sector(&self, sector_id: Uuid) -> Result<Vec<Service>, DbError> {
        let query = format!(
            "SELECT {} FROM services WHERE sector_id = $1 ORDER BY sort_order, name",
            SERVICE_COLUMNS
        );
        let rows: Vec<PgServiceRow> = sqlx::query_as(&query)
            .bind(sector_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Service>, DbError> {
        let query = format!("SELECT {} FROM services WHERE id = $1", SERVICE_COLUMNS);
        let row: Option<PgServiceRow> = sqlx::query_as(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Into::into))
    }

    async fn get_by_code(&self, code: &str) -> Result<Option<Service>, DbError> {
        let query = format!(
            "SELECT {} FROM services WHERE UPPER(code) = UPPER($1)",
            SERVICE_COLUMNS
        );
        let row: Option<PgServiceRow> = sqlx::query_as(&query)
            .bind(code)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Into::into))
    }

    async fn code_exists(&self, code: &str, exclude_id: Option<Uuid>) -> Result<bool, DbError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM services WHERE UPPER(code) = UPPER($1) AND ($2::uuid IS NULL OR id <> $2))",
        )
        .bind(code)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn create(&self, service: &Service) -> Result<Service, DbError> {
        sqlx::query(
            r#"
            INSERT INTO services (id, code, name, sector_id, building_id, sort_order, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(service.id)
        .bind(&service.code)
        .bind(&service.name)
        .bind(service.sector_id)
        .bind(service.building_id)
        .bind(service.sort_order)
        .bind(service.is_active)
        .bind(service.created_at)
        .bind(service.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(service.clone())
    }

    async fn update(&self, id: Uuid, update: ServiceUpdate) -> Result<Service, DbError> {
        let mut service = self
            .get(id)
            .await?
            .ok_or_else(|| DbError::not_found("Service", id))?;
        update.apply_to(&mut service);

        sqlx::query(
            r#"
            UPDATE services
            SET code = $2, name = $3, sector_id = $4, building_id = $5, sort_order = $6, is_active = $7, updated_at = $8
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&service.code)
        .bind(&service.name)
        .bind(service.sector_id)
        .bind(service.building_id)
        .bind(service.sort_order)
        .bind(service.is_active)
        .bind(service.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(service)
    }

    async fn set_active(&self, id: Uuid, active: bool) -> Result<bool, DbError> {
        let result =
            sqlx::query("UPDATE services SET is_active = $2, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .bind(active)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM services WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(feature = "database")]
pub fn create_service_repository(pool: &DbPool) -> Box<dyn ServiceRepository> {
    match pool {
        DbPool::Sqlite(pool) => Box::new(SqliteServiceRepository::new(pool.clone())),
        DbPool::Postgres(pool) => Box::new(PgServiceRepository::new(pool.clone())),
    }
}

#[cfg(feature = "database")]
#[derive(sqlx::FromRow)]
struct ServiceRow {
    id: String,
    code: String,
    name: String,
    sector_id: Option<String>,
    building_id: Option<String>,
    sort_order: i32,
    is_active: bool,
    created_at: String,
    updated_at: String,
}

#[cfg(feature = "database")]
impl TryFrom<ServiceRow> for Service {
    type Error = DbError;

    fn try_from(row: ServiceRow) -> Result<Self, Self::Error> {
        use super::convert::{parse_opt_uuid, parse_timestamp, parse_uuid};

        Ok(Service {
            id: parse_uuid(&row.id)?,
            code: row.code,
            name: row.name,
            sector_id: parse_opt_uuid(row.sector_id)?,
            building_id: parse_opt_uuid(row.building_id)?,
            sort_order: row.sort_order,
            is_active: row.is_active,
            created_at: parse_timestamp(&row.created_at)?,
            updated_at: parse_timestamp(&row.updated_at)?,
        })
    }
}

#[cfg(feature = "database")]
#[derive(sqlx::FromRow)]
struct PgServiceRow {
    id: Uuid,
    code: String,
    name: String,
    sector_id: Option<Uuid>,
    building_id: Option<Uuid>,
    sort_order: i32,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[cfg(feature = "database")]
impl From<PgServiceRow> for Service {
    fn from(row: PgServiceRow) -> Self {
        Service {
            id: row.id,
            code: row.code,
            name: row.name,
            sector_id: row.sector_id,
            building_id: row.building_id,
            sort_order: row.sort_order,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
