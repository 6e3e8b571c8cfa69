//! Category repository.

use super::{DbError, DbPool};
use crate::models::{Category, CategoryUpdate};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// Lists categories ordered by sort order, then name.
    async fn list(&self, include_inactive: bool) -> Result<Vec<Category>, DbError>;

    async fn get(&self, id: Uuid) -> Result<Option<Category>, DbError>;

    async fn get_by_code(&self, code: &str) -> Result<Option<Category>, DbError>;

    /// Checks whether `code` is taken by a row other than `exclude_id`.
    async fn code_exists(&self, code: &str, exclude_id: Option<Uuid>) -> Result<bool, DbError>;

    async fn create(&self, category: &Category) -> Result<Category, DbError>;

    async fn update(&self, id: Uuid, update: CategoryUpdate) -> Result<Category, DbError>;

    /// Soft-deletes (or restores) a category. Returns false when it does not exist.
    async fn set_active(&self, id: Uuid, active: bool) -> Result<bool, DbError>;

    async fn delete(&self, id: Uuid) -> Result<bool, DbError>;
}

#[cfg(feature = "database")]
pub struct SqliteCategoryRepository {
    pool: sqlx::SqlitePool,
}

#[cfg(feature = "database")]
impl SqliteCategoryRepository {
    pub fn new(pool: sqlx::SqlitePool) -> Self {
        Self { pool }
    }
}

#[cfg(feature = "database")]
const CATEGORY_COLUMNS: &str =
    "id, code, name, description, sort_order, is_active, created_at, updated_at";

#[cfg(feature = "database")]
#[async_trait]
impl CategoryRepository for SqliteCategoryRepository {
    async fn list(&self, include_inactive: bool) -> Result<Vec<Category>, DbError> {
        let query = format!(
            "SELECT {} FROM categories WHERE (? OR is_active = 1) ORDER BY sort_order, name",
            CATEGORY_COLUMNS
        );
        let rows: Vec<CategoryRow> = sqlx::query_as(&query)
            .bind(include_inactive)
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn get(&self, id: Uuid) -> Result<Option<Category>, DbError> {
        let query = format!("SELECT {} FROM categories WHERE id = ?", CATEGORY_COLUMNS);
        let row: Option<CategoryRow> = sqlx::query_as(&query)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        row.map(TryInto::try_into).transpose()
    }

    async fn get_by_code(&self, code: &str) -> Result<Option<Category>, DbError> {
        let query = format!("SELECT {} FROM categories WHERE code = ?", CATEGORY_COLUMNS);
        let row: Option<CategoryRow> = sqlx::query_as(&query)
            .bind(code)
            .fetch_optional(&self.pool)
            .await?;
        row.map(TryInto::try_into).transpose()
    }

    async fn code_exists(&self, code: &str, exclude_id: Option<Uuid>) -> Result<bool, DbError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM categories WHERE code = ? AND id != ?")
                .bind(code)
                .bind(exclude_id.map(|id| id.to_string()).unwrap_or_default())
                .fetch_one(&self.pool)
                .await?;
        Ok(count > 0)
    }

    async fn create(&self, category: &Category) -> Result<Category, DbError> {
        use super::convert::timestamp_str;

        sqlx::query(
            r#"
            INSERT INTO categories (id, code, name, description, sort_order, is_active, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(category.id.to_string())
        .bind(&category.code)
        .bind(&category.name)
        .bind(&category.description)
        .bind(category.sort_order)
        .bind(category.is_active)
        .bind(timestamp_str(&category.created_at))
        .bind(timestamp_str(&category.updated_at))
        .execute(&self.pool)
        .await?;

        Ok(category.clone())
    }

    async fn update(&self, id: Uuid, update: CategoryUpdate) -> Result<Category, DbError> {
        use super::convert::timestamp_str;

        let mut category = self
            .get(id)
            .await?
            .ok_or_else(|| DbError::not_found("Category", id))?;
        update.apply_to(&mut category);

        sqlx::query(
            r#"
            UPDATE categories
            SET code = ?, name = ?, description = ?, sort_order = ?, is_active = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&category.code)
        .bind(&category.name)
        .bind(&category.description)
        .bind(category.sort_order)
        .bind(category.is_active)
        .bind(timestamp_str(&category.updated_at))
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        Ok(category)
    }

    async fn set_active(&self, id: Uuid, active: bool) -> Result<bool, DbError> {
        let result = sqlx::query("UPDATE categories SET is_active = ?, updated_at = ? WHERE id = ?")
            .bind(active)
            .bind(super::convert::timestamp_str(&Utc::now()))
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM categories WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(feature = "database")]
pub struct PgCategoryRepository {
    pool: sqlx::PgPool,
}

#[cfg(feature = "database")]
impl PgCategoryRepository {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[cfg(feature = "database")]
#[async_trait]
impl CategoryRepository for PgCategoryRepository {
    async fn list(&self, include_inactive: bool) -> Result<Vec<Category>, DbError> {
        let query = format!(
            "SELECT {} FROM categories WHERE ($1 OR is_active) ORDER BY sort_order, name",
            CATEGORY_COLUMNS
        );
        let rows: Vec<PgCategoryRow> = sqlx::query_as(&query)
            .bind(include_inactive)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Category>, DbError> {
        let query = format!("SELECT {} FROM categories WHERE id = $1", CATEGORY_COLUMNS);
        let row: Option<PgCategoryRow> = sqlx::query_as(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Into::into))
    }

    async fn get_by_code(&self, code: &str) -> Result<Option<Category>, DbError> {
        let query = format!("SELECT {} FROM categories WHERE code = $1", CATEGORY_COLUMNS);
        let row: Option<PgCategoryRow> = sqlx::query_as(&query)
            .bind(code)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Into::into))
    }

    async fn code_exists(&self, code: &str, exclude_id: Option<Uuid>) -> Result<bool, DbError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM categories WHERE code = $1 AND ($2::uuid IS NULL OR id <> $2))",
        )
        .bind(code)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn create(&self, category: &Category) -> Result<Category, DbError> {
        sqlx::query(
            r#"
            INSERT INTO categories (id, code, name, description, sort_order, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(category.id)
        .bind(&category.code)
        .bind(&category.name)
        .bind(&category.description)
        .bind(category.sort_order)
        .bind(category.is_active)
        .bind(category.created_at)
        .bind(category.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(category.clone())
    }

    async fn update(&self, id: Uuid, update: CategoryUpdate) -> Result<Category, DbError> {
        let mut category = self
            .get(id)
            .await?
            .ok_or_else(|| DbError::not_found("Category", id))?;
        update.apply_to(&mut category);

        sqlx::query(
            r#"
            UPDATE categories
            SET code = $2, name = $3, description = $4, sort_order = $5, is_active = $6, updated_at = $7
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&category.code)
        .bind(&category.name)
        .bind(&category.description)
        .bind(category.sort_order)
        .bind(category.is_active)
        .bind(category.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(category)
    }

    async fn set_active(&self, id: Uuid, active: bool) -> Result<bool, DbError> {
        let result =
            sqlx::query("UPDATE categories SET is_active = $2, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .bind(active)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(feature = "database")]
pub fn create_category_repository(pool: &DbPool) -> Box<dyn CategoryRepository> {
    match pool {
        DbPool::Sqlite(pool) => Box::new(SqliteCategoryRepository::new(pool.clone())),
        DbPool::Postgres(pool) => Box::new(PgCategoryRepository::new(pool.clone())),
    }
}

#[cfg(feature = "database")]
#[derive(sqlx::FromRow)]
struct CategoryRow {
    id: String,
    code: String,
    name: String,
    description: Option<String>,
    sort_order: i32,
    is_active: bool,
    created_at: String,
    updated_at: String,
}

#[cfg(feature = "database")]
impl TryFrom<CategoryRow> for Category {
    type Error = DbError;

    fn try_from(row: CategoryRow) -> Result<Self, Self::Error> {
        use super::convert::{parse_timestamp, parse_uuid};

        Ok(Category {
            id: parse_uuid(&row.id)?,
            code: row.code,
            name: row.name,
            description: row.description,
            sort_order: row.sort_order,
            is_active: row.is_active,
            created_at: parse_timestamp(&row.created_at)?,
            updated_at: parse_timestamp(&row.updated_at)?,
        })
    }
}

#[cfg(feature = "database")]
#[derive(sqlx::FromRow)]
struct PgCategoryRow {
    id: Uuid,
    code: String,
    name: String,
    description: Option<String>,
    sort_order: i32,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[cfg(feature = "database")]
impl From<PgCategoryRow> for Category {
    fn from(row: PgCategoryRow) -> Self {
        Category {
            id: row.id,
            code: row.code,
            name: row.name,
            description: row.description,
            sort_order: row.sort_order,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
