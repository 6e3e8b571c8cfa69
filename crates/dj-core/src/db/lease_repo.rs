//! Lease contract repository.

use super::{DbError, DbPool};
use crate::models::{LeaseContract, LeaseUpdate};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

#[async_trait]
pub trait LeaseContractRepository: Send + Sync {
    /// Leases of one asset, latest start date first.
    async fn list_for_asset(&self, asset_id: Uuid) -> Result<Vec<LeaseContract>, DbError>;

    /// Active leases whose end date falls in `from..=until`.
    async fn list_ending_between(
        &self,
        from: NaiveDate,
        until: NaiveDate,
    ) -> Result<Vec<LeaseContract>, DbError>;

    async fn get(&self, id: Uuid) -> Result<Option<LeaseContract>, DbError>;

    async fn create(&self, lease: &LeaseContract) -> Result<LeaseContract, DbError>;

    async fn update(&self, id: Uuid, update: LeaseUpdate) -> Result<LeaseContract, DbError>;

    async fn set_active(&self, id: Uuid, active: bool) -> Result<bool, DbError>;

    async fn delete(&self, id: Uuid) -> Result<bool, DbError>;
}

#[cfg(feature = "database")]
const LEASE_COLUMNS: &str = "id, asset_id, contract_number, vendor, start_date, end_date, monthly_rate_cents, notes, is_active, created_at, updated_at";

#[cfg(feature = "database")]
pub struct SqliteLeaseContractRepository {
    pool: sqlx::SqlitePool,
}

#[cfg(feature = "database")]
impl SqliteLeaseContractRepository {
    pub fn new(pool: sqlx::SqlitePool) -> Self {
        Self { pool }
    }
}

#[cfg(feature = "database")]
#[async_trait]
impl LeaseContractRepository for SqliteLeaseContractRepository {
    async fn list_for_asset(&self, asset_id: Uuid) -> Result<Vec<LeaseContract>, DbError> {
        let query = format!(
            "SELECT {} FROM lease_contracts WHERE asset_id = ? ORDER BY start_date DESC",
            LEASE_COLUMNS
        );
        let rows: Vec<LeaseRow> = sqlx::query_as(&query)
            .bind(asset_id.to_string())
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn list_ending_between(
        &self,
        from: NaiveDate,
        until: NaiveDate,
    ) -> Result<Vec<LeaseContract>, DbError> {
        use super::convert::date_str;

        let query = format!(
            "SELECT {} FROM lease_contracts WHERE is_active = 1 AND end_date >= ? AND end_date <= ? ORDER BY end_date",
            LEASE_COLUMNS
        );
        let rows: Vec<LeaseRow> = sqlx::query_as(&query)
            .bind(date_str(&from))
            .bind(date_str(&until))
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn get(&self, id: Uuid) -> Result<Option<LeaseContract>, DbError> {
        let query = format!("SELECT {} FROM lease_contracts WHERE id = ?", LEASE_COLUMNS);
        let row: Option<LeaseRow> = sqlx::query_as(&query)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        row.map(TryInto::try_into).transpose()
    }

    async fn create(&self, lease: &LeaseContract) -> Result<LeaseContract, DbError> {
        use super::convert::{date_str, timestamp_str};

        let query = format!(
            "INSERT INTO lease_contracts ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            LEASE_COLUMNS
        );
        sqlx::query(&query)
            .bind(lease.id.to_string())
            .bind(lease.asset_id.to_string())
            .bind(&lease.contract_number)
            .bind(&lease.vendor)
            .bind(date_str(&lease.start_date))
            .bind(date_str(&lease.end_date))
            .bind(lease.monthly_rate_cents)
            .bind(&lease.notes)
            .bind(lease.is_active)
            .bind(timestamp_str(&lease.created_at))
            .bind(timestamp_str(&lease.updated_at))
            .execute(&self.pool)
            .await?;
        Ok(lease.clone())
    }

    async fn update(&self, id: Uuid, update: LeaseUpdate) -> Result<LeaseContract, DbError> {
        use super::convert::{date_str, timestamp_str};

        let mut lease = self
            .get(id)
            .await?
            .ok_or_else(|| DbError::not_found("LeaseContract", id))?;
        update.apply_to(&mut lease);

        sqlx::query(
            r#"
            UPDATE lease_contracts
            SET contract_number = ?, vendor = ?, start_date = ?, end_date = ?, monthly_rate_cents = ?, notes = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&lease.contract_number)
        .bind(&lease.vendor)
        .bind(date_str(&lease.start_date))
        .bind(date_str(&lease.end_date))
        .bind(lease.monthly_rate_cents)
        .bind(&lease.notes)
        .bind(timestamp_str(&lease.updated_at))
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        Ok(lease)
    }

    async fn set_active(&self, id: Uuid, active: bool) -> Result<bool, DbError> {
        let result =
            sqlx::query("UPDATE lease_contracts SET is_active = ?, updated_at = ? WHERE id = ?")
                .bind(active)
                .bind(super::convert::timestamp_str(&Utc::now()))
                .bind(id.to_string())
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM lease_contracts WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(feature = "database")]
pub struct PgLeaseContractRepository {
    pool: sqlx::PgPool,
}

#[cfg(feature = "database")]
impl PgLeaseContractRepository {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[cfg(feature = "database")]
#[async_trait]
impl LeaseContractRepository for PgLeaseContractRepository {
    async fn list_for_asset(&self, asset_id: Uuid) -> Result<Vec<LeaseContract>, DbError> {
        let query = format!(
            "SELECT {} FROM lease_contracts WHERE asset_id = $1 ORDER BY start_date DESC",
            LEASE_COLUMNS
        );
        let rows: Vec<PgLeaseRow> = sqlx::query_as(&query)
            .bind(asset_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_ending_between(
        &self,
        from: NaiveDate,
        until: NaiveDate,
    ) -> Result<Vec<LeaseContract>, DbError> {
        let query = format!(
            "SELECT {} FROM lease_contracts WHERE is_active AND end_date BETWEEN $1 AND $2 ORDER BY end_date",
            LEASE_COLUMNS
        );
        let rows: Vec<PgLeaseRow> = sqlx::query_as(&query)
            .bind(from)
            .bind(until)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn get(&self, id: Uuid) -> Result<Option<LeaseContract>, DbError> {
        let query = format!("SELECT {} FROM lease_contracts WHERE id = $1", LEASE_COLUMNS);
        let row: Option<PgLeaseRow> = sqlx::query_as(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Into::into))
    }

    async fn create(&self, lease: &LeaseContract) -> Result<LeaseContract, DbError> {
        let query = format!(
            "INSERT INTO lease_contracts ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
            LEASE_COLUMNS
        );
        sqlx::query(&query)
            .bind(lease.id)
            .bind(lease.asset_id)
            .bind(&lease.contract_number)
            .bind(&lease.vendor)
            .bind(lease.start_date)
            .bind(lease.end_date)
            .bind(lease.monthly_rate_cents)
            .bind(&lease.notes)
            .bind(lease.is_active)
            .bind(lease.created_at)
            .bind(lease.updated_at)
            .execute(&self.pool)
            .await?;
        Ok(lease.clone())
    }

    async fn update(&self, id: Uuid, update: LeaseUpdate) -> Result<LeaseContract, DbError> {
        let mut lease = self
            .get(id)
            .await?
            .ok_or_else(|| DbError::not_found("LeaseContract", id))?;
        update.apply_to(&mut lease);

        sqlx::query(
            r#"
            UPDATE lease_contracts
            SET contract_number = $2, vendor = $3, start_date = $4, end_date = $5, monthly_rate_cents = $6, notes = $7, updated_at = $8
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&lease.contract_number)
        .bind(&lease.vendor)
        .bind(lease.start_date)
        .bind(lease.end_date)
        .bind(lease.monthly_rate_cents)
        .bind(&lease.notes)
        .bind(lease.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(lease)
    }

    async fn set_active(&self, id: Uuid, active: bool) -> Result<bool, DbError> {
        let result = sqlx::query(
            "UPDATE lease_contracts SET is_active = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(active)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM lease_contracts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(feature = "database")]
pub fn create_lease_repository(pool: &DbPool) -> Box<dyn LeaseContractRepository> {
    match pool {
        DbPool::Sqlite(pool) => Box::new(SqliteLeaseContractRepository::new(pool.clone())),
        DbPool::Postgres(pool) => Box::new(PgLeaseContractRepository::new(pool.clone())),
    }
}

#[cfg(feature = "database")]
#[derive(sqlx::FromRow)]
struct LeaseRow {
    id: String,
    asset_id: String,
    contract_number: String,
    vendor: Option<String>,
    start_date: String,
    end_date: String,
    monthly_rate_cents: Option<i64>,
    notes: Option<String>,
    is_active: bool,
    created_at: String,
    updated_at: String,
}

#[cfg(feature = "database")]
impl TryFrom<LeaseRow> for LeaseContract {
    type Error = DbError;

    fn try_from(row: LeaseRow) -> Result<Self, Self::Error> {
        use super::convert::{parse_date, parse_timestamp, parse_uuid};

        Ok(LeaseContract {
            id: parse_uuid(&row.id)?,
            asset_id: parse_uuid(&row.asset_id)?,
            contract_number: row.contract_number,
            vendor: row.vendor,
            start_date: parse_date(&row.start_date)?,
            end_date: parse_date(&row.end_date)?,
            monthly_rate_cents: row.monthly_rate_cents,
            notes: row.notes,
            is_active: row.is_active,
            created_at: parse_timestamp(&row.created_at)?,
            updated_at: parse_timestamp(&row.updated_at)?,
        })
    }
}

#[cfg(feature = "database")]
#[derive(sqlx::FromRow)]
struct PgLeaseRow {
    id: Uuid,
    asset_id: Uuid,
    contract_number: String,
    vendor: Option<String>,
    start_date: NaiveDate,
    end_date: NaiveDate,
    monthly_rate_cents: Option<i64>,
    notes: Option<String>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[cfg(feature = "database")]
impl From<PgLeaseRow> for LeaseContract {
    fn from(row: PgLeaseRow) -> Self {
        LeaseContract {
            id: row.id,
            asset_id: row.asset_id,
            contract_number: row.contract_number,
            vendor: row.vendor,
            start_date: row.start_date,
            end_date: row.end_date,
            monthly_rate_cents: row.monthly_rate_cents,
            notes: row.notes,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
