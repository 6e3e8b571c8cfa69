//! Database error types.

use thiserror::Error;

/// Errors raised by the persistence layer.
#[derive(Error, Debug)]
pub enum DbError {
    /// Could not reach the database.
    #[error("Database connection error: {0}")]
    Connection(String),

    /// Query failed to execute.
    #[error("Query error: {0}")]
    Query(String),

    /// Row lookup came back empty.
    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violated (duplicate code, serial number, asset code).
    #[error("Constraint violation: {0}")]
    Constraint(String),

    /// Row is still referenced by another table (restrict-delete foreign key).
    #[error("Record is still referenced: {0}")]
    InUse(String),

    /// A stored value could not be mapped back into a model.
    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Migration error: {0}")]
    Migration(String),

    #[error("Connection pool exhausted")]
    PoolExhausted,

    #[error("Invalid database configuration: {0}")]
    Configuration(String),
}

impl DbError {
    /// Shorthand for a [`DbError::NotFound`] with a displayable id.
    pub fn not_found(entity: &str, id: impl std::fmt::Display) -> Self {
        DbError::NotFound {
            entity: entity.to_string(),
            id: id.to_string(),
        }
    }

    /// Returns true for unique-constraint violations.
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, DbError::Constraint(_))
    }
}

#[cfg(feature = "database")]
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "unknown".to_string(),
                id: "unknown".to_string(),
            },
            sqlx::Error::Database(db_err) => {
                if db_err.is_unique_violation() {
                    DbError::Constraint(db_err.message().to_string())
                } else if db_err.is_foreign_key_violation() {
                    DbError::InUse(db_err.message().to_string())
                } else {
                    DbError::Query(db_err.message().to_string())
                }
            }
            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,
            sqlx::Error::Io(io) => DbError::Connection(io.to_string()),
            sqlx::Error::Configuration(msg) => DbError::Configuration(msg.to_string()),
            _ => DbError::Query(err.to_string()),
        }
    }
}

#[cfg(feature = "database")]
impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::Migration(err.to_string())
    }
}

impl From<serde_json::Error> for DbError {
    fn from(err: serde_json::Error) -> Self {
        DbError::Serialization(err.to_string())
    }
}

impl From<uuid::Error> for DbError {
    fn from(err: uuid::Error) -> Self {
        DbError::Serialization(err.to_string())
    }
}

impl From<chrono::ParseError> for DbError {
    fn from(err: chrono::ParseError) -> Self {
        DbError::Serialization(err.to_string())
    }
}
