//! Asset template repository.

use super::{DbError, DbPool};
use crate::models::{AssetTemplate, AssetTemplateUpdate};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

#[async_trait]
pub trait AssetTemplateRepository: Send + Sync {
    async fn list(&self, include_inactive: bool) -> Result<Vec<AssetTemplate>, DbError>;

    async fn get(&self, id: Uuid) -> Result<Option<AssetTemplate>, DbError>;

    /// Checks whether `name` is taken by a template other than `exclude_id`.
    async fn name_exists(&self, name: &str, exclude_id: Option<Uuid>) -> Result<bool, DbError>;

    async fn create(&self, template: &AssetTemplate) -> Result<AssetTemplate, DbError>;

    async fn update(
        &self,
        id: Uuid,
        update: AssetTemplateUpdate,
    ) -> Result<AssetTemplate, DbError>;

    async fn set_active(&self, id: Uuid, active: bool) -> Result<bool, DbError>;

    async fn delete(&self, id: Uuid) -> Result<bool, DbError>;
}

#[cfg(feature = "database")]
const TEMPLATE_COLUMNS: &str = "id, template_name, asset_type_id, asset_name, brand, model, service_id, owner, notes, is_active, created_at, updated_at";

#[cfg(feature = "database")]
pub struct SqliteAssetTemplateRepository {
    pool: sqlx::SqlitePool,
}

#[cfg(feature = "database")]
impl SqliteAssetTemplateRepository {
    pub fn new(pool: sqlx::SqlitePool) -> Self {
        Self { pool }
    }
}

#[cfg(feature = "database")]
#[async_trait]
impl AssetTemplateRepository for SqliteAssetTemplateRepository {
    async fn list(&self, include_inactive: bool) -> Result<Vec<AssetTemplate>, DbError> {
        let query = format!(
            "SELECT {} FROM asset_templates WHERE (? OR is_active = 1) ORDER BY template_name",
            TEMPLATE_COLUMNS
        );
        let rows: Vec<TemplateRow> = sqlx::query_as(&query)
            .bind(include_inactive)
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn get(&self, id: Uuid) -> Result<Option<AssetTemplate>, DbError> {
        let query = format!("SELECT {} FROM asset_templates WHERE id = ?", TEMPLATE_COLUMNS);
        let row: Option<TemplateRow> = sqlx::query_as(&query)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        row.map(TryInto::try_into).transpose()
    }

    async fn name_exists(&self, name: &str, exclude_id: Option<Uuid>) -> Result<bool, DbError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM asset_templates WHERE template_name = ? AND id != ?",
        )
        .bind(name)
        .bind(exclude_id.map(|id| id.to_string()).unwrap_or_default())
        .fetch_one(&self.pool)
        .await?;
        Ok(count > 0)
    }

    async fn create(&self, template: &AssetTemplate) -> Result<AssetTemplate, DbError> {
        use super::convert::{opt_uuid_str, timestamp_str};

        let query = format!(
            "INSERT INTO asset_templates ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            TEMPLATE_COLUMNS
        );
        sqlx::query(&query)
            .bind(template.id.to_string())
            .bind(&template.template_name)
            .bind(opt_uuid_str(&template.asset_type_id))
            .bind(&template.asset_name)
            .bind(&template.brand)
            .bind(&template.model)
            .bind(opt_uuid_str(&template.service_id))
            .bind(&template.owner)
            .bind(&template.notes)
            .bind(template.is_active)
            .bind(timestamp_str(&template.created_at))
            .bind(timestamp_str(&template.updated_at))
            .execute(&self.pool)
            .await?;
        Ok(template.clone())
    }

    async fn update(
        &self,
        id: Uuid,
        update: AssetTemplateUpdate,
    ) -> Result<AssetTemplate, DbError> {
        use super::convert::{opt_uuid_str, timestamp_str};

        let mut template = self
            .get(id)
            .await?
            .ok_or_else(|| DbError::not_found("AssetTemplate", id))?;
        update.apply_to(&mut template);

        sqlx::query(
            r#"
            UPDATE asset_templates
            SET template_name = ?, asset_type_id = ?, asset_name = ?, brand = ?, model = ?,
                service_id = ?, owner = ?, notes = ?, is_active = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&template.template_name)
        .bind(opt_uuid_str(&template.asset_type_id))
        .bind(&template.asset_name)
        .bind(&template.brand)
        .bind(&template.model)
        .bind(opt_uuid_str(&template.service_id))
        .bind(&template.owner)
        .bind(&template.notes)
        .bind(template.is_active)
        .bind(timestamp_str(&template.updated_at))
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        Ok(template)
    }

    async fn set_active(&self, id: Uuid, active: bool) -> Result<bool, DbError> {
        let result =
            sqlx::query("UPDATE asset_templates SET is_active = ?, updated_at = ? WHERE id = ?")
                .bind(active)
                .bind(super::convert::timestamp_str(&Utc::now()))
                .bind(id.to_string())
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM asset_templates WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(feature = "database")]
pub struct PgAssetTemplateRepository {
    pool: sqlx::PgPool,
}

#[cfg(feature = "database")]
impl PgAssetTemplateRepository {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[cfg(feature = "database")]
#[async_trait]
impl AssetTemplateRepository for PgAssetTemplateRepository {
    async fn list(&self, include_inactive: bool) -> Result<Vec<AssetTemplate>, DbError> {
        let query = format!(
            "SELECT {} FROM asset_templates WHERE ($1 OR is_active) ORDER BY template_name",
            TEMPLATE_COLUMNS
        );
        let rows: Vec<PgTemplateRow> = sqlx::query_as(&query)
            .bind(include_inactive)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn get(&self, id: Uuid) -> Result<Option<AssetTemplate>, DbError> {
        let query = format!("SELECT {} FROM asset_templates WHERE id = $1", TEMPLATE_COLUMNS);
        let row: Option<PgTemplateRow> = sqlx::query_as(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Into::into))
    }

    async fn name_exists(&self, name: &str, exclude_id: Option<Uuid>) -> Result<bool, DbError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM asset_templates WHERE template_name = $1 AND ($2::uuid IS NULL OR id <> $2))",
        )
        .bind(name)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn create(&self, template: &AssetTemplate) -> Result<AssetTemplate, DbError> {
        let query = format!(
            "INSERT INTO asset_templates ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
            TEMPLATE_COLUMNS
        );
        sqlx::query(&query)
            .bind(template.id)
            .bind(&template.template_name)
            .bind(template.asset_type_id)
            .bind(&template.asset_name)
            .bind(&template.brand)
            .bind(&template.model)
            .bind(template.service_id)
            .bind(&template.owner)
            .bind(&template.notes)
            .bind(template.is_active)
            .bind(template.created_at)
            .bind(template.updated_at)
            .execute(&self.pool)
            .await?;
        Ok(template.clone())
    }

    async fn update(
        &self,
        id: Uuid,
        update: AssetTemplateUpdate,
    ) -> Result<AssetTemplate, DbError> {
        let mut template = self
            .get(id)
            .await?
            .ok_or_else(|| DbError::not_found("AssetTemplate", id))?;
        update.apply_to(&mut template);

        sqlx::query(
            r#"
            UPDATE asset_templates
            SET template_name = $2, asset_type_id = $3, asset_name = $4, brand = $5, model = $6,
                service_id = $7, owner = $8, notes = $9, is_active = $10, updated_at = $11
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&template.template_name)
        .bind(template.asset_type_id)
        .bind(&template.asset_name)
        .bind(&template.brand)
        .bind(&template.model)
        .bind(template.service_id)
        .bind(&template.owner)
        .bind(&template.notes)
        .bind(template.is_active)
        .bind(template.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(template)
    }

    async fn set_active(&self, id: Uuid, active: bool) -> Result<bool, DbError> {
        let result = sqlx::query(
            "UPDATE asset_templates SET is_active = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(active)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM asset_templates WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(feature = "database")]
pub fn create_template_repository(pool: &DbPool) -> Box<dyn AssetTemplateRepository> {
    match pool {
        DbPool::Sqlite(pool) => Box::new(SqliteAssetTemplateRepository::new(pool.clone())),
        DbPool::Postgres(pool) => Box::new(PgAssetTemplateRepository::new(pool.clone())),
    }
}

#[cfg(feature = "database")]
#[derive(sqlx::FromRow)]
struct TemplateRow {
    id: String,
    template_name: String,
    asset_type_id: Option<String>,
    asset_name: Option<String>,
    brand: Option<String>,
    model: Option<String>,
    service_id: Option<String>,
    owner: Option<String>,
    notes: Option<String>,
    is_active: bool,
    created_at: String,
    updated_at: String,
}

#[cfg(feature = "database")]
impl TryFrom<TemplateRow> for AssetTemplate {
    type Error = DbError;

    fn try_from(row: TemplateRow) -> Result<Self, Self::Error> {
        use super::convert::{parse_opt_uuid, parse_timestamp, parse_uuid};

        Ok(AssetTemplate {
            id: parse_uuid(&row.id)?,
            template_name: row.template_name,
            asset_type_id: parse_opt_uuid(row.asset_type_id)?,
            asset_name: row.asset_name,
            brand: row.brand,
            model: row.model,
            service_id: parse_opt_uuid(row.service_id)?,
            owner: row.owner,
            notes: row.notes,
            is_active: row.is_active,
            created_at: parse_timestamp(&row.created_at)?,
            updated_at: parse_timestamp(&row.updated_at)?,
        })
    }
}

#[cfg(feature = "database")]
#[derive(sqlx::FromRow)]
struct PgTemplateRow {
    id: Uuid,
    template_name: String,
    asset_type_id: Option<Uuid>,
    asset_name: Option<String>,
    brand: Option<String>,
    model: Option<String>,
    service_id: Option<Uuid>,
    owner: Option<String>,
    notes: Option<String>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[cfg(feature = "database")]
impl From<PgTemplateRow> for AssetTemplate {
    fn from(row: PgTemplateRow) -> Self {
        AssetTemplate {
            id: row.id,
            template_name: row.template_name,
            asset_type_id: row.asset_type_id,
            asset_name: row.asset_name,
            brand: row.brand,
            model: row.model,
            service_id: row.service_id,
            owner: row.owner,
            notes: row.notes,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
