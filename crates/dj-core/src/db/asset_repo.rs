//! Asset repository.

use super::pagination::{PagedResult, Pagination};
use super::{DbError, DbPool};
use crate::models::{Asset, AssetFilter, AssetStatus, AssetUpdate};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use std::ops::RangeInclusive;
use uuid::Uuid;

#[async_trait]
pub trait AssetRepository: Send + Sync {
    /// Lists one page of assets matching `filter`, ordered by asset code.
    async fn list_filtered(
        &self,
        filter: &AssetFilter,
        pagination: &Pagination,
    ) -> Result<PagedResult<Asset>, DbError>;

    /// Lists every asset matching `filter`. Used by the CSV export.
    async fn list_all(&self, filter: &AssetFilter) -> Result<Vec<Asset>, DbError>;

    async fn count(&self, filter: &AssetFilter) -> Result<u64, DbError>;

    async fn get(&self, id: Uuid) -> Result<Option<Asset>, DbError>;

    async fn get_by_code(&self, asset_code: &str) -> Result<Option<Asset>, DbError>;

    async fn get_by_serial(&self, serial_number: &str) -> Result<Option<Asset>, DbError>;

    async fn code_exists(&self, asset_code: &str) -> Result<bool, DbError>;

    /// Checks whether `serial_number` belongs to an asset other than `exclude_id`.
    async fn serial_exists(
        &self,
        serial_number: &str,
        exclude_id: Option<Uuid>,
    ) -> Result<bool, DbError>;

    /// Returns every asset code starting with `prefix`, for sequence allocation.
    async fn codes_with_prefix(&self, prefix: &str) -> Result<Vec<String>, DbError>;

    /// Highest sequence within `band` among codes of the form `{prefix}{digits}`.
    async fn max_sequence_for_prefix(
        &self,
        prefix: &str,
        band: RangeInclusive<u32>,
    ) -> Result<Option<u32>, DbError> {
        let codes = self.codes_with_prefix(prefix).await?;
        Ok(codes
            .iter()
            .filter_map(|code| code.strip_prefix(prefix))
            .filter(|rest| !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()))
            .filter_map(|digits| digits.parse::<u32>().ok())
            .filter(|n| band.contains(n))
            .max())
    }

    /// Inserts an asset. Duplicate codes or serials fail with [`DbError::Constraint`].
    async fn create(&self, asset: &Asset) -> Result<Asset, DbError>;

    async fn update(&self, id: Uuid, update: AssetUpdate) -> Result<Asset, DbError>;

    async fn set_active(&self, id: Uuid, active: bool) -> Result<bool, DbError>;

    /// Hard delete. Events and lease contracts cascade.
    async fn delete(&self, id: Uuid) -> Result<bool, DbError>;
}

#[cfg(feature = "database")]
const ASSET_COLUMNS: &str = "id, asset_code, asset_name, asset_type_id, status, is_dummy, service_id, building_id, owner, brand, model, serial_number, purchase_date, installation_date, warranty_expiry, notes, is_active, created_at, updated_at";

#[cfg(feature = "database")]
const SQLITE_FILTER: &str = r#"
    WHERE (?1 OR is_active = 1)
      AND (?2 IS NULL OR status = ?2)
      AND (?3 IS NULL OR asset_type_id = ?3)
      AND (?4 IS NULL OR service_id = ?4)
      AND (?5 IS NULL OR building_id = ?5)
      AND (?6 IS NULL OR is_dummy = ?6)
      AND (?7 IS NULL OR owner LIKE ?7 ESCAPE '\')
      AND (?8 IS NULL
           OR asset_code LIKE ?8 ESCAPE '\'
           OR asset_name LIKE ?8 ESCAPE '\'
           OR serial_number LIKE ?8 ESCAPE '\'
           OR owner LIKE ?8 ESCAPE '\'
           OR brand LIKE ?8 ESCAPE '\'
           OR model LIKE ?8 ESCAPE '\')
"#;

#[cfg(feature = "database")]
const PG_FILTER: &str = r#"
    WHERE ($1 OR is_active)
      AND ($2::text IS NULL OR status = $2)
      AND ($3::uuid IS NULL OR asset_type_id = $3)
      AND ($4::uuid IS NULL OR service_id = $4)
      AND ($5::uuid IS NULL OR building_id = $5)
      AND ($6::boolean IS NULL OR is_dummy = $6)
      AND ($7::text IS NULL OR owner ILIKE $7)
      AND ($8::text IS NULL
           OR asset_code ILIKE $8
           OR asset_name ILIKE $8
           OR serial_number ILIKE $8
           OR owner ILIKE $8
           OR brand ILIKE $8
           OR model ILIKE $8)
"#;

/// Filter values in bind order.
#[cfg(feature = "database")]
struct FilterBinds {
    include_inactive: bool,
    status: Option<&'static str>,
    owner: Option<String>,
    search: Option<String>,
}

#[cfg(feature = "database")]
impl FilterBinds {
    fn from_filter(filter: &AssetFilter) -> Self {
        use super::make_like_pattern;

        Self {
            include_inactive: filter.include_inactive,
            status: filter.status.map(|s| s.as_db_str()),
            owner: filter.owner.as_deref().map(make_like_pattern),
            search: filter
                .search
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(make_like_pattern),
        }
    }
}

#[cfg(feature = "database")]
pub struct SqliteAssetRepository {
    pool: sqlx::SqlitePool,
}

#[cfg(feature = "database")]
impl SqliteAssetRepository {
    pub fn new(pool: sqlx::SqlitePool) -> Self {
        Self { pool }
    }

    async fn fetch_page(
        &self,
        filter: &AssetFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Asset>, DbError> {
        use super::convert::opt_uuid_str;

        let binds = FilterBinds::from_filter(filter);
        let query = format!(
            "SELECT {} FROM assets {} ORDER BY asset_code LIMIT ?9 OFFSET ?10",
            ASSET_COLUMNS, SQLITE_FILTER
        );
        let rows: Vec<AssetRow> = sqlx::query_as(&query)
            .bind(binds.include_inactive)
            .bind(binds.status)
            .bind(opt_uuid_str(&filter.asset_type_id))
            .bind(opt_uuid_str(&filter.service_id))
            .bind(opt_uuid_str(&filter.building_id))
            .bind(filter.is_dummy)
            .bind(&binds.owner)
            .bind(&binds.search)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn fetch_one_where(&self, clause: &str, value: &str) -> Result<Option<Asset>, DbError> {
        let query = format!("SELECT {} FROM assets WHERE {}", ASSET_COLUMNS, clause);
        let row: Option<AssetRow> = sqlx::query_as(&query)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;
        row.map(TryInto::try_into).transpose()
    }
}

#[cfg(feature = "database")]
#[async_trait]
impl AssetRepository for SqliteAssetRepository {
    async fn list_filtered(
        &self,
        filter: &AssetFilter,
        pagination: &Pagination,
    ) -> Result<PagedResult<Asset>, DbError> {
        let total = self.count(filter).await?;
        let items = self
            .fetch_page(
                filter,
                pagination.limit() as i64,
                pagination.offset() as i64,
            )
            .await?;
        Ok(PagedResult::new(items, total, pagination))
    }

    async fn list_all(&self, filter: &AssetFilter) -> Result<Vec<Asset>, DbError> {
        self.fetch_page(filter, -1, 0).await
    }

    async fn count(&self, filter: &AssetFilter) -> Result<u64, DbError> {
        use super::convert::opt_uuid_str;

        let binds = FilterBinds::from_filter(filter);
        let query = format!("SELECT COUNT(*) FROM assets {}", SQLITE_FILTER);
        let count: i64 = sqlx::query_scalar(&query)
            .bind(binds.include_inactive)
            .bind(binds.status)
            .bind(opt_uuid_str(&filter.asset_type_id))
            .bind(opt_uuid_str(&filter.service_id))
            .bind(opt_uuid_str(&filter.building_id))
            .bind(filter.is_dummy)
            .bind(&binds.owner)
            .bind(&binds.search)
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Asset>, DbError> {
        self.fetch_one_where("id = ?", &id.to_string()).await
    }

    async fn get_by_code(&self, asset_code: &str) -> Result<Option<Asset>, DbError> {
        self.fetch_one_where("asset_code = ? COLLATE NOCASE", asset_code)
            .await
    }

    async fn get_by_serial(&self, serial_number: &str) -> Result<Option<Asset>, DbError> {
        self.fetch_one_where("serial_number = ? COLLATE NOCASE", serial_number)
            .await
    }

    async fn code_exists(&self, asset_code: &str) -> Result<bool, DbError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM assets WHERE asset_code = ? COLLATE NOCASE")
                .bind(asset_code)
                .fetch_one(&self.pool)
                .await?;
        Ok(count > 0)
    }

    async fn serial_exists(
        &self,
        serial_number: &str,
        exclude_id: Option<Uuid>,
    ) -> Result<bool, DbError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM assets WHERE serial_number = ? COLLATE NOCASE AND id != ?",
        )
        .bind(serial_number)
        .bind(exclude_id.map(|id| id.to_string()).unwrap_or_default())
        .fetch_one(&self.pool)
        .await?;
        Ok(count > 0)
    }

    async fn codes_with_prefix(&self, prefix: &str) -> Result<Vec<String>, DbError> {
        let codes: Vec<String> =
            sqlx::query_scalar(r"SELECT asset_code FROM assets WHERE asset_code LIKE ? ESCAPE '\'")
                .bind(super::make_prefix_pattern(prefix))
                .fetch_all(&self.pool)
                .await?;
        Ok(codes)
    }

    async fn create(&self, asset: &Asset) -> Result<Asset, DbError> {
        use super::convert::{opt_date_str, opt_uuid_str, timestamp_str};

        let query = format!(
            "INSERT INTO assets ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            ASSET_COLUMNS
        );
        sqlx::query(&query)
            .bind(asset.id.to_string())
            .bind(&asset.asset_code)
            .bind(&asset.asset_name)
            .bind(opt_uuid_str(&asset.asset_type_id))
            .bind(asset.status.as_db_str())
            .bind(asset.is_dummy)
            .bind(opt_uuid_str(&asset.service_id))
            .bind(opt_uuid_str(&asset.building_id))
            .bind(&asset.owner)
            .bind(&asset.brand)
            .bind(&asset.model)
            .bind(&asset.serial_number)
            .bind(opt_date_str(&asset.purchase_date))
            .bind(opt_date_str(&asset.installation_date))
            .bind(opt_date_str(&asset.warranty_expiry))
            .bind(&asset.notes)
            .bind(asset.is_active)
            .bind(timestamp_str(&asset.created_at))
            .bind(timestamp_str(&asset.updated_at))
            .execute(&self.pool)
            .await?;

        Ok(asset.clone())
    }

    async fn update(&self, id: Uuid, update: AssetUpdate) -> Result<Asset, DbError> {
        use super::convert::{opt_date_str, opt_uuid_str, timestamp_str};

        let mut asset = self
            .get(id)
            .await?
            .ok_or_else(|| DbError::not_found("Asset", id))?;
        update.apply_to(&mut asset);

        sqlx::query(
            r#"
            UPDATE assets SET
                asset_name = ?, asset_type_id = ?, status = ?, service_id = ?, building_id = ?,
                owner = ?, brand = ?, model = ?, serial_number = ?, purchase_date = ?,
                installation_date = ?, warranty_expiry = ?, notes = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&asset.asset_name)
        .bind(opt_uuid_str(&asset.asset_type_id))
        .bind(asset.status.as_db_str())
        .bind(opt_uuid_str(&asset.service_id))
        .bind(opt_uuid_str(&asset.building_id))
        .bind(&asset.owner)
        .bind(&asset.brand)
        .bind(&asset.model)
        .bind(&asset.serial_number)
        .bind(opt_date_str(&asset.purchase_date))
        .bind(opt_date_str(&asset.installation_date))
        .bind(opt_date_str(&asset.warranty_expiry))
        .bind(&asset.notes)
        .bind(timestamp_str(&asset.updated_at))
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        Ok(asset)
    }

    async fn set_active(&self, id: Uuid, active: bool) -> Result<bool, DbError> {
        let result = sqlx::query("UPDATE assets SET is_active = ?, updated_at = ? WHERE id = ?")
            .bind(active)
            .bind(super::convert::timestamp_str(&Utc::now()))
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM assets WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(feature = "database")]
pub struct PgAssetRepository {
    pool: sqlx::PgPool,
}

#[cfg(feature = "database")]
impl PgAssetRepository {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_page(
        &self,
        filter: &AssetFilter,
        limit: Option<i64>,
        offset: i64,
    ) -> Result<Vec<Asset>, DbError> {
        let binds = FilterBinds::from_filter(filter);
        let query = format!(
            "SELECT {} FROM assets {} ORDER BY asset_code LIMIT $9 OFFSET $10",
            ASSET_COLUMNS, PG_FILTER
        );
        let rows: Vec<PgAssetRow> = sqlx::query_as(&query)
            .bind(binds.include_inactive)
            .bind(binds.status)
            .bind(filter.asset_type_id)
            .bind(filter.service_id)
            .bind(filter.building_id)
            .bind(filter.is_dummy)
            .bind(&binds.owner)
            .bind(&binds.search)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn fetch_one_where(&self, clause: &str, value: &str) -> Result<Option<Asset>, DbError> {
        let query = format!("SELECT {} FROM assets WHERE {}", ASSET_COLUMNS, clause);
        let row: Option<PgAssetRow> = sqlx::query_as(&query)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;
        row.map(TryInto::try_into).transpose()
    }
}

#[cfg(feature = "database")]
#[async_trait]
impl AssetRepository for PgAssetRepository {
    async fn list_filtered(
        &self,
        filter: &AssetFilter,
        pagination: &Pagination,
    ) -> Result<PagedResult<Asset>, DbError> {
        let total = self.count(filter).await?;
        let items = self
            .fetch_page(
                filter,
                Some(pagination.limit() as i64),
                pagination.offset() as i64,
            )
            .await?;
        Ok(PagedResult::new(items, total, pagination))
    }

    async fn list_all(&self, filter: &AssetFilter) -> Result<Vec<Asset>, DbError> {
        self.fetch_page(filter, None, 0).await
    }

    async fn count(&self, filter: &AssetFilter) -> Result<u64, DbError> {
        let binds = FilterBinds::from_filter(filter);
        let query = format!("SELECT COUNT(*) FROM assets {}", PG_FILTER);
        let count: i64 = sqlx::query_scalar(&query)
            .bind(binds.include_inactive)
            .bind(binds.status)
            .bind(filter.asset_type_id)
            .bind(filter.service_id)
            .bind(filter.building_id)
            .bind(filter.is_dummy)
            .bind(&binds.owner)
            .bind(&binds.search)
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Asset>, DbError> {
        let query = format!("SELECT {} FROM assets WHERE id = $1", ASSET_COLUMNS);
        let row: Option<PgAssetRow> = sqlx::query_as(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(TryInto::try_into).transpose()
    }

    async fn get_by_code(&self, asset_code: &str) -> Result<Option<Asset>, DbError> {
        self.fetch_one_where("UPPER(asset_code) = UPPER($1)", asset_code)
            .await
    }

    async fn get_by_serial(&self, serial_number: &str) -> Result<Option<Asset>, DbError> {
        self.fetch_one_where("UPPER(serial_number) = UPPER($1)", serial_number)
            .await
    }

    async fn code_exists(&self, asset_code: &str) -> Result<bool, DbError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM assets WHERE UPPER(asset_code) = UPPER($1))",
        )
        .bind(asset_code)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn serial_exists(
        &self,
        serial_number: &str,
        exclude_id: Option<Uuid>,
    ) -> Result<bool, DbError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM assets WHERE UPPER(serial_number) = UPPER($1) AND ($2::uuid IS NULL OR id <> $2))",
        )
        .bind(serial_number)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn codes_with_prefix(&self, prefix: &str) -> Result<Vec<String>, DbError> {
        let codes: Vec<String> =
            sqlx::query_scalar(r"SELECT asset_code FROM assets WHERE asset_code LIKE $1 ESCAPE '\'")
                .bind(super::make_prefix_pattern(prefix))
                .fetch_all(&self.pool)
                .await?;
        Ok(codes)
    }

    async fn create(&self, asset: &Asset) -> Result<Asset, DbError> {
        let query = format!(
            "INSERT INTO assets ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19)",
            ASSET_COLUMNS
        );
        sqlx::query(&query)
            .bind(asset.id)
            .bind(&asset.asset_code)
            .bind(&asset.asset_name)
            .bind(asset.asset_type_id)
            .bind(asset.status.as_db_str())
            .bind(asset.is_dummy)
            .bind(asset.service_id)
            .bind(asset.building_id)
            .bind(&asset.owner)
            .bind(&asset.brand)
            .bind(&asset.model)
            .bind(&asset.serial_number)
            .bind(asset.purchase_date)
            .bind(asset.installation_date)
            .bind(asset.warranty_expiry)
            .bind(&asset.notes)
            .bind(asset.is_active)
            .bind(asset.created_at)
            .bind(asset.updated_at)
            .execute(&self.pool)
            .await?;

        Ok(asset.clone())
    }

    async fn update(&self, id: Uuid, update: AssetUpdate) -> Result<Asset, DbError> {
        let mut asset = self
            .get(id)
            .await?
            .ok_or_else(|| DbError::not_found("Asset", id))?;
        update.apply_to(&mut asset);

        sqlx::query(
            r#"
            UPDATE assets SET
                asset_name = $2, asset_type_id = $3, status = $4, service_id = $5, building_id = $6,
                owner = $7, brand = $8, model = $9, serial_number = $10, purchase_date = $11,
                installation_date = $12, warranty_expiry = $13, notes = $14, updated_at = $15
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&asset.asset_name)
        .bind(asset.asset_type_id)
        .bind(asset.status.as_db_str())
        .bind(asset.service_id)
        .bind(asset.building_id)
        .bind(&asset.owner)
        .bind(&asset.brand)
        .bind(&asset.model)
        .bind(&asset.serial_number)
        .bind(asset.purchase_date)
        .bind(asset.installation_date)
        .bind(asset.warranty_expiry)
        .bind(&asset.notes)
        .bind(asset.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(asset)
    }

    async fn set_active(&self, id: Uuid, active: bool) -> Result<bool, DbError> {
        let result =
            sqlx::query("UPDATE assets SET is_active = $2, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .bind(active)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM assets WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(feature = "database")]
pub fn create_asset_repository(pool: &DbPool) -> Box<dyn AssetRepository> {
    match pool {
        DbPool::Sqlite(pool) => Box::new(SqliteAssetRepository::new(pool.clone())),
        DbPool::Postgres(pool) => Box::new(PgAssetRepository::new(pool.clone())),
    }
}

#[cfg(feature = "database")]
fn parse_status(value: &str) -> Result<AssetStatus, DbError> {
    AssetStatus::from_db_str(value)
        .ok_or_else(|| DbError::Serialization(format!("Unknown asset status: {}", value)))
}

#[cfg(feature = "database")]
#[derive(sqlx::FromRow)]
struct AssetRow {
    id: String,
    asset_code: String,
    asset_name: String,
    asset_type_id: Option<String>,
    status: String,
    is_dummy: bool,
    service_id: Option<String>,
    building_id: Option<String>,
    owner: Option<String>,
    brand: Option<String>,
    model: Option<String>,
    serial_number: Option<String>,
    purchase_date: Option<String>,
    installation_date: Option<String>,
    warranty_expiry: Option<String>,
    notes: Option<String>,
    is_active: bool,
    created_at: String,
    updated_at: String,
}

#[cfg(feature = "database")]
impl TryFrom<AssetRow> for Asset {
    type Error = DbError;

    fn try_from(row: AssetRow) -> Result<Self, Self::Error> {
        use super::convert::{parse_opt_date, parse_opt_uuid, parse_timestamp, parse_uuid};

        Ok(Asset {
            id: parse_uuid(&row.id)?,
            asset_code: row.asset_code,
            asset_name: row.asset_name,
            asset_type_id: parse_opt_uuid(row.asset_type_id)?,
            status: parse_status(&row.status)?,
            is_dummy: row.is_dummy,
            service_id: parse_opt_uuid(row.service_id)?,
            building_id: parse_opt_uuid(row.building_id)?,
            owner: row.owner,
            brand: row.brand,
            model: row.model,
            serial_number: row.serial_number,
            purchase_date: parse_opt_date(row.purchase_date)?,
            installation_date: parse_opt_date(row.installation_date)?,
            warranty_expiry: parse_opt_date(row.warranty_expiry)?,
            notes: row.notes,
            is_active: row.is_active,
            created_at: parse_timestamp(&row.created_at)?,
            updated_at: parse_timestamp(&row.updated_at)?,
        })
    }
}

#[cfg(feature = "database")]
#[derive(sqlx::FromRow)]
struct PgAssetRow {
    id: Uuid,
    asset_code: String,
    asset_name: String,
    asset_type_id: Option<Uuid>,
    status: String,
    is_dummy: bool,
    service_id: Option<Uuid>,
    building_id: Option<Uuid>,
    owner: Option<String>,
    brand: Option<String>,
    model: Option<String>,
    serial_number: Option<String>,
    purchase_date: Option<NaiveDate>,
    installation_date: Option<NaiveDate>,
    warranty_expiry: Option<NaiveDate>,
    notes: Option<String>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[cfg(feature = "database")]
impl TryFrom<PgAssetRow> for Asset {
    type Error = DbError;

    fn try_from(row: PgAssetRow) -> Result<Self, Self::Error> {
        Ok(Asset {
            id: row.id,
            asset_code: row.asset_code,
            asset_name: row.asset_name,
            asset_type_id: row.asset_type_id,
            status: parse_status(&row.status)?,
            is_dummy: row.is_dummy,
            service_id: row.service_id,
            building_id: row.building_id,
            owner: row.owner,
            brand: row.brand,
            model: row.model,
            serial_number: row.serial_number,
            purchase_date: row.purchase_date,
            installation_date: row.installation_date,
            warranty_expiry: row.warranty_expiry,
            notes: row.notes,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
