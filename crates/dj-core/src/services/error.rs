//! Service-layer errors.

use thiserror::Error;

use crate::asset_code::AssetCodeError;
use crate::csv::CsvError;
use crate::db::DbError;
use crate::validation::ValidationError;

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Input failed field validation.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Input is well-formed but not acceptable (unknown asset type, end date
    /// before start date, quantity out of range).
    #[error("{0}")]
    Invalid(String),

    /// Duplicate asset code, serial number or reference code.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The row is still referenced and cannot be deleted.
    #[error("In use: {0}")]
    InUse(String),

    #[error(transparent)]
    AssetCode(AssetCodeError),

    #[error("Could not allocate a unique asset code after {0} attempts")]
    CodeAllocationFailed(u32),

    #[error("Invalid CSV: {0}")]
    Csv(#[from] CsvError),

    #[error("Database error: {0}")]
    Database(DbError),
}

impl ServiceError {
    pub fn not_found(entity: &str, id: impl std::fmt::Display) -> Self {
        ServiceError::NotFound {
            entity: entity.to_string(),
            id: id.to_string(),
        }
    }
}

impl From<DbError> for ServiceError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ServiceError::NotFound { entity, id },
            DbError::Constraint(msg) => ServiceError::Conflict(msg),
            DbError::InUse(msg) => ServiceError::InUse(msg),
            other => ServiceError::Database(other),
        }
    }
}

impl From<AssetCodeError> for ServiceError {
    fn from(err: AssetCodeError) -> Self {
        match err {
            AssetCodeError::Database(db) => db.into(),
            other => ServiceError::AssetCode(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_errors_map_to_service_errors() {
        assert!(matches!(
            ServiceError::from(DbError::not_found("Asset", "x")),
            ServiceError::NotFound { .. }
        ));
        assert!(matches!(
            ServiceError::from(DbError::Constraint("dup".into())),
            ServiceError::Conflict(_)
        ));
        assert!(matches!(
            ServiceError::from(DbError::InUse("fk".into())),
            ServiceError::InUse(_)
        ));
        assert!(matches!(
            ServiceError::from(DbError::Query("boom".into())),
            ServiceError::Database(_)
        ));
    }

    #[test]
    fn test_code_errors_unwrap_database_cause() {
        let err: ServiceError = AssetCodeError::Database(DbError::PoolExhausted).into();
        assert!(matches!(err, ServiceError::Database(DbError::PoolExhausted)));
        let err: ServiceError = AssetCodeError::InvalidTypeCode("x".into()).into();
        assert!(matches!(err, ServiceError::AssetCode(_)));
    }
}
