//! Input validation for Djoppie Inventory.
//!
//! - [`InputValidator`] cleans and checks user-supplied text: names, codes,
//!   serial numbers, email addresses and search queries
//! - [`ODataSanitizer`] makes values safe to embed in Microsoft Graph `$filter`
//!   expressions
//!
//! Both reject markup and query-language fragments instead of trying to repair
//! them.

mod input;
mod odata;

pub use input::{InputValidator, MAX_NAME_LENGTH, MAX_NOTES_LENGTH, MAX_SEARCH_LENGTH};
pub use odata::{ODataSanitizer, MAX_ODATA_VALUE_LENGTH};

use thiserror::Error;

/// Errors that can occur during input validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{field} is required")]
    Empty { field: String },

    #[error("{field} exceeds maximum length of {max} characters")]
    TooLong { field: String, max: usize },

    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    #[error("{field} contains invalid characters")]
    InvalidCharacters { field: String },

    #[error("{field} has an invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    #[error("{field} contains markup or script content")]
    Markup { field: String },

    #[error("{field} contains OData query syntax")]
    QueryInjection { field: String },
}

impl ValidationError {
    /// Name of the offending field.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Empty { field }
            | ValidationError::TooLong { field, .. }
            | ValidationError::TooShort { field, .. }
            | ValidationError::InvalidCharacters { field }
            | ValidationError::InvalidFormat { field, .. }
            | ValidationError::Markup { field }
            | ValidationError::QueryInjection { field } => field,
        }
    }
}
