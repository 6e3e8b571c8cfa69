//! API error types and handling.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use dj_connectors::ConnectorError;
use dj_core::asset_code::AssetCodeError;
use dj_core::db::DbError;
use dj_core::services::ServiceError;
use dj_core::validation::ValidationError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tracing::{error, warn};
use utoipa::ToSchema;

/// API error type.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    /// Malformed request: bad JSON, bad CSV, unknown references.
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Duplicate code or serial number, or a row still in use.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Validation error with field-level details.
    #[error("Validation failed")]
    ValidationError(ValidationErrorDetails),

    /// An external dependency is not configured (e.g. Graph credentials).
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// An upstream call (Graph, Intune, JWKS) failed.
    #[error("Upstream error: {0}")]
    BadGateway(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Database error: {0}")]
    Database(String),
}

/// Details for field-level validation errors.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ValidationErrorDetails {
    pub message: String,
    pub fields: HashMap<String, Vec<FieldError>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FieldError {
    /// e.g. "required", "length", "invalid_format".
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub params: Option<serde_json::Value>,
}

impl ValidationErrorDetails {
    pub fn field(field: &str, code: &str, message: &str) -> Self {
        let mut fields = HashMap::new();
        fields.insert(
            field.to_string(),
            vec![FieldError {
                code: code.to_string(),
                message: message.to_string(),
                params: None,
            }],
        );
        Self {
            message: format!("Validation failed for field '{}'", field),
            fields,
        }
    }

    pub fn from_fields(errors: HashMap<String, Vec<FieldError>>) -> Self {
        let message = match errors.keys().next() {
            Some(field) if errors.len() == 1 => format!("Validation failed for field '{}'", field),
            _ => format!("Validation failed for {} fields", errors.len()),
        };
        Self {
            message,
            fields: errors,
        }
    }
}

/// JSON error response body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::ValidationError(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) | ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::ValidationError(_) => "VALIDATION_ERROR",
            ApiError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
            ApiError::BadGateway(_) => "BAD_GATEWAY",
            ApiError::Internal(_) => "INTERNAL_ERROR",
            ApiError::Database(_) => "DATABASE_ERROR",
        }
    }

    pub fn validation_field(field: &str, code: &str, message: &str) -> Self {
        ApiError::ValidationError(ValidationErrorDetails::field(field, code, message))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let (message, details) = match &self {
            ApiError::ValidationError(details) => (
                details.message.clone(),
                Some(serde_json::to_value(&details.fields).unwrap_or_default()),
            ),
            // Internal details stay in the log.
            ApiError::Internal(_) | ApiError::Database(_) => {
                error!(error = %self, "Request failed");
                ("An internal error occurred".to_string(), None)
            }
            _ => (self.to_string(), None),
        };

        let body = ErrorResponse {
            code: self.error_code().to_string(),
            message,
            details,
        };

        (status, Json(body)).into_response()
    }
}

fn validation_code(err: &ValidationError) -> &'static str {
    match err {
        ValidationError::Empty { .. } => "required",
        ValidationError::TooLong { .. } | ValidationError::TooShort { .. } => "length",
        ValidationError::InvalidCharacters { .. } => "invalid_characters",
        ValidationError::InvalidFormat { .. } => "invalid_format",
        ValidationError::Markup { .. } => "markup",
        ValidationError::QueryInjection { .. } => "query_syntax",
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation_field(err.field(), validation_code(&err), &err.to_string())
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{} {} not found", entity, id))
            }
            ServiceError::Validation(v) => v.into(),
            ServiceError::Invalid(msg) => ApiError::BadRequest(msg),
            ServiceError::Conflict(msg) | ServiceError::InUse(msg) => ApiError::Conflict(msg),
            ServiceError::AssetCode(AssetCodeError::SequenceExhausted { prefix, max }) => {
                ApiError::Conflict(format!(
                    "No asset codes left for prefix '{}' (maximum {})",
                    prefix, max
                ))
            }
            ServiceError::AssetCode(e) => ApiError::BadRequest(e.to_string()),
            e @ ServiceError::CodeAllocationFailed(_) => ApiError::Conflict(e.to_string()),
            ServiceError::Csv(e) => ApiError::BadRequest(e.to_string()),
            ServiceError::Database(e) => e.into(),
        }
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{} {} not found", entity, id))
            }
            DbError::Constraint(msg) | DbError::InUse(msg) => ApiError::Conflict(msg),
            DbError::Serialization(msg) => ApiError::BadRequest(msg),
            err => ApiError::Database(err.to_string()),
        }
    }
}

impl From<ConnectorError> for ApiError {
    fn from(err: ConnectorError) -> Self {
        match err {
            ConnectorError::NotConfigured(msg) => ApiError::ServiceUnavailable(msg),
            ConnectorError::NotFound(msg) => ApiError::NotFound(msg),
            ConnectorError::InvalidRequest(msg) => ApiError::BadRequest(msg),
            ConnectorError::ConfigError(msg) | ConnectorError::Internal(msg) => {
                ApiError::Internal(msg)
            }
            other => {
                warn!(error = %other, "Upstream lookup failed");
                ApiError::BadGateway(other.to_string())
            }
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        let mut fields: HashMap<String, Vec<FieldError>> = HashMap::new();

        for (field_name, field_errors) in err.field_errors() {
            let errors: Vec<FieldError> = field_errors
                .iter()
                .map(|e| {
                    let code = e.code.to_string();
                    let message = e.message.clone().map(|m| m.to_string()).unwrap_or_else(|| {
                        format!("Field '{}' failed validation: {}", field_name, code)
                    });
                    let params = if e.params.is_empty() {
                        None
                    } else {
                        Some(serde_json::to_value(&e.params).unwrap_or_default())
                    };
                    FieldError {
                        code,
                        message,
                        params,
                    }
                })
                .collect();
            fields.insert(field_name.to_string(), errors);
        }

        ApiError::ValidationError(ValidationErrorDetails::from_fields(fields))
    }
}
