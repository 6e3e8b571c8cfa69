//! Escaping for values embedded in OData `$filter` expressions.

use once_cell::sync::Lazy;
use regex::Regex;

use super::ValidationError;

pub const MAX_ODATA_VALUE_LENGTH: usize = 256;

static QUERY_OPTION_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\$[a-z]+").expect("query option pattern is valid"));

static OPERATOR_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(^|\s|\))(eq|ne|gt|ge|lt|le|and|or|not|has|in)(\s|\(|$)")
        .expect("operator pattern is valid")
});

static FUNCTION_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(startswith|endswith|contains|substringof|tolower|toupper|trim|concat|indexof|substring|length|any|all|cast|isof)\s*\(")
        .expect("function pattern is valid")
});

/// Makes user input safe to place inside an OData string literal.
pub struct ODataSanitizer;

impl ODataSanitizer {
    /// Doubles single quotes, the only escape OData string literals have.
    pub fn escape(value: &str) -> String {
        value.replace('\'', "''")
    }

    /// Validates `value` for use in a filter and returns it escaped.
    ///
    /// Operators, function calls and query options are rejected outright
    /// rather than escaped.
    pub fn sanitize(field: &str, value: &str) -> Result<String, ValidationError> {
        let value = value.trim();
        if value.is_empty() {
            return Err(ValidationError::Empty {
                field: field.to_string(),
            });
        }
        if value.chars().count() > MAX_ODATA_VALUE_LENGTH {
            return Err(ValidationError::TooLong {
                field: field.to_string(),
                max: MAX_ODATA_VALUE_LENGTH,
            });
        }
        if value.chars().any(char::is_control) {
            return Err(ValidationError::InvalidCharacters {
                field: field.to_string(),
            });
        }
        if Self::looks_like_query(value) {
            return Err(ValidationError::QueryInjection {
                field: field.to_string(),
            });
        }
        Ok(Self::escape(value))
    }

    /// Sanitizes and wraps the value in single quotes.
    pub fn quote(field: &str, value: &str) -> Result<String, ValidationError> {
        Ok(format!("'{}'", Self::sanitize(field, value)?))
    }

    fn looks_like_query(value: &str) -> bool {
        QUERY_OPTION_PATTERN.is_match(value)
            || OPERATOR_PATTERN.is_match(value)
            || FUNCTION_PATTERN.is_match(value)
            || value.contains("%27")
    }
}
