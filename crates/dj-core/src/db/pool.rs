//! Database connection pool management.

use super::retry::{with_retry, RetryConfig};
use super::DbError;
use std::time::Duration;

/// Escapes LIKE metacharacters so user input matches literally.
///
/// Queries using the result must declare `ESCAPE '\'`.
///
/// ```
/// use dj_core::db::escape_like_pattern;
///
/// assert_eq!(escape_like_pattern("LAP_24%"), r"LAP\_24\%");
/// ```
pub fn escape_like_pattern(pattern: &str) -> String {
    let mut escaped = String::with_capacity(pattern.len() * 2);
    for c in pattern.chars() {
        match c {
            '%' | '_' | '[' | ']' | '\\' => {
                escaped.push('\\');
                escaped.push(c);
            }
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Builds a "contains" LIKE pattern from a search term.
///
/// ```
/// use dj_core::db::make_like_pattern;
///
/// assert_eq!(make_like_pattern("dell"), "%dell%");
/// ```
pub fn make_like_pattern(search: &str) -> String {
    format!("%{}%", escape_like_pattern(search))
}

/// Builds a "starts with" LIKE pattern, used for asset-code prefix scans.
///
/// ```
/// use dj_core::db::make_prefix_pattern;
///
/// assert_eq!(make_prefix_pattern("LAP-24-"), "LAP-24-%");
/// ```
pub fn make_prefix_pattern(prefix: &str) -> String {
    format!("{}%", escape_like_pattern(prefix))
}

use sqlx::{Pool, Postgres, Sqlite};

/// Connection pool for either supported backend.
pub enum DbPool {
    /// SQLite, used for local development and tests.
    Sqlite(Pool<Sqlite>),
    /// PostgreSQL, used in deployed environments.
    Postgres(Pool<Postgres>),
}

/// Options for creating a database connection pool.
#[derive(Debug, Clone)]
pub struct PoolOptions {
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: Duration,
    pub max_lifetime: Option<Duration>,
    pub idle_timeout: Option<Duration>,
}

impl Default for PoolOptions {
    fn default() -> Self {
        let max_connections = env_u32("DJOPPIE_DB_MAX_CONNECTIONS").unwrap_or(20);
        let min_connections = env_u32("DJOPPIE_DB_MIN_CONNECTIONS").unwrap_or(1);
        let acquire_timeout_secs = env_u32("DJOPPIE_DB_ACQUIRE_TIMEOUT_SECS").unwrap_or(30);

        Self {
            max_connections,
            min_connections,
            acquire_timeout: Duration::from_secs(acquire_timeout_secs as u64),
            max_lifetime: Some(Duration::from_secs(1800)),
            idle_timeout: Some(Duration::from_secs(600)),
        }
    }
}

impl PoolOptions {
    /// A single long-lived connection. Required for `sqlite::memory:` databases,
    /// where every new connection would open an empty database.
    pub fn single_connection() -> Self {
        Self {
            max_connections: 1,
            min_connections: 1,
            acquire_timeout: Duration::from_secs(5),
            max_lifetime: None,
            idle_timeout: None,
        }
    }
}

fn env_u32(key: &str) -> Option<u32> {
    std::env::var(key).ok().and_then(|s| s.parse().ok())
}

/// Creates a pool with default options. The URL scheme picks the backend:
/// `sqlite:` for SQLite, `postgres://` or `postgresql://` for PostgreSQL.
pub async fn create_pool(database_url: &str) -> Result<DbPool, DbError> {
    let options = if database_url.contains(":memory:") || database_url.contains("mode=memory") {
        PoolOptions::single_connection()
    } else {
        PoolOptions::default()
    };
    create_pool_with_options(database_url, options).await
}

/// Creates a pool, retrying while the database refuses connections or the
/// pool times out. Configuration errors fail on the first attempt.
pub async fn create_pool_with_retry(
    database_url: &str,
    retry: RetryConfig,
) -> Result<DbPool, DbError> {
    with_retry(retry, "create_pool", || create_pool(database_url)).await
}

/// Creates a pool with explicit options.
pub async fn create_pool_with_options(
    database_url: &str,
    options: PoolOptions,
) -> Result<DbPool, DbError> {
    use sqlx::sqlite::SqliteConnectOptions;
    use std::str::FromStr;
    use tracing::info;

    if database_url.starts_with("sqlite:") {
        info!("Creating SQLite connection pool");
        let connect_options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = sqlx::sqlite::SqlitePoolOptions::new()
            .max_connections(options.max_connections)
            .min_connections(options.min_connections)
            .acquire_timeout(options.acquire_timeout)
            .max_lifetime(options.max_lifetime)
            .idle_timeout(options.idle_timeout)
            .connect_with(connect_options)
            .await?;
        Ok(DbPool::Sqlite(pool))
    } else if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        info!("Creating PostgreSQL connection pool");
        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(options.max_connections)
            .min_connections(options.min_connections)
            .acquire_timeout(options.acquire_timeout)
            .max_lifetime(options.max_lifetime)
            .idle_timeout(options.idle_timeout)
            .connect(database_url)
            .await?;
        Ok(DbPool::Postgres(pool))
    } else {
        Err(DbError::Configuration(format!(
            "Unsupported database URL scheme. Expected sqlite: or postgres://, got: {}",
            database_url.split(':').next().unwrap_or("unknown")
        )))
    }
}

impl Clone for DbPool {
    fn clone(&self) -> Self {
        match self {
            DbPool::Sqlite(pool) => DbPool::Sqlite(pool.clone()),
            DbPool::Postgres(pool) => DbPool::Postgres(pool.clone()),
        }
    }
}

impl DbPool {
    pub fn db_type(&self) -> &'static str {
        match self {
            DbPool::Sqlite(_) => "sqlite",
            DbPool::Postgres(_) => "postgres",
        }
    }

    /// Round-trips a `SELECT 1`.
    pub async fn is_healthy(&self) -> bool {
        match self {
            DbPool::Sqlite(pool) => sqlx::query("SELECT 1").fetch_one(pool).await.is_ok(),
            DbPool::Postgres(pool) => sqlx::query("SELECT 1").fetch_one(pool).await.is_ok(),
        }
    }

    pub async fn close(&self) {
        match self {
            DbPool::Sqlite(pool) => pool.close().await,
            DbPool::Postgres(pool) => pool.close().await,
        }
    }

    pub fn pool_size(&self) -> u32 {
        match self {
            DbPool::Sqlite(pool) => pool.size(),
            DbPool::Postgres(pool) => pool.size(),
        }
    }

    pub fn idle_connections(&self) -> usize {
        match self {
            DbPool::Sqlite(pool) => pool.num_idle(),
            DbPool::Postgres(pool) => pool.num_idle(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like_pattern_plain() {
        assert_eq!(escape_like_pattern("LAP-24-00001"), "LAP-24-00001");
        assert_eq!(escape_like_pattern(""), "");
    }

    #[test]
    fn test_escape_like_pattern_wildcards() {
        assert_eq!(escape_like_pattern("100%"), r"100\%");
        assert_eq!(escape_like_pattern("SN_01"), r"SN\_01");
        assert_eq!(escape_like_pattern("[x]"), r"\[x\]");
        assert_eq!(escape_like_pattern(r"a\b"), r"a\\b");
    }

    #[test]
    fn test_make_patterns() {
        assert_eq!(make_like_pattern("hp_"), r"%hp\_%");
        assert_eq!(make_prefix_pattern("DUM-LAP-24-"), "DUM-LAP-24-%");
        assert_eq!(make_prefix_pattern("X_"), r"X\_%");
    }

    #[test]
    fn test_single_connection_options() {
        let opts = PoolOptions::single_connection();
        assert_eq!(opts.max_connections, 1);
        assert!(opts.idle_timeout.is_none());
    }

    #[tokio::test]
    async fn test_unsupported_scheme_rejected() {
        let result = create_pool("mysql://localhost/db").await;
        assert!(matches!(result, Err(DbError::Configuration(_))));
    }

    #[tokio::test]
    async fn test_memory_pool_is_healthy() {
        let pool = create_pool("sqlite::memory:").await.unwrap();
        assert_eq!(pool.db_type(), "sqlite");
        assert!(pool.is_healthy().await);
    }

    #[tokio::test]
    async fn test_pool_with_retry_connects() {
        let pool = create_pool_with_retry("sqlite::memory:", RetryConfig::startup())
            .await
            .unwrap();
        assert!(pool.is_healthy().await);
    }

    #[tokio::test]
    async fn test_pool_with_retry_fails_fast_on_bad_url() {
        let started = std::time::Instant::now();
        let result = create_pool_with_retry("mysql://localhost/db", RetryConfig::startup()).await;
        assert!(matches!(result, Err(DbError::Configuration(_))));
        assert!(started.elapsed() < Duration::from_millis(500));
    }
}
