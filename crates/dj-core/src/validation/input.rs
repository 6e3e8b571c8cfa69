//! Free-text and identifier validation.

use once_cell::sync::Lazy;
use regex::Regex;

use super::ValidationError;

pub const MAX_NAME_LENGTH: usize = 200;
pub const MAX_NOTES_LENGTH: usize = 2000;
pub const MAX_SEARCH_LENGTH: usize = 100;
const MAX_SERIAL_LENGTH: usize = 100;
const MAX_EMAIL_LENGTH: usize = 254;
const MAX_REFERENCE_CODE_LENGTH: usize = 20;

static MARKUP_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(<\s*/?\s*[a-z!][^>]*>|javascript\s*:|vbscript\s*:|data\s*:\s*text/html|\bon[a-z]+\s*=)")
        .expect("markup pattern is valid")
});

static SERIAL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9\-_./ ]*$").expect("serial pattern is valid"));

static TYPE_CODE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z0-9]{2,10}$").expect("type code pattern is valid"));

static REFERENCE_CODE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z0-9][A-Z0-9_\-]*$").expect("reference code pattern is valid"));

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~\-]+@[A-Za-z0-9](?:[A-Za-z0-9\-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9\-]*[A-Za-z0-9])?)+$")
        .expect("email pattern is valid")
});

/// Stateless validator for user input.
pub struct InputValidator;

impl InputValidator {
    /// Trims, strips control characters (newlines and tabs survive) and caps
    /// the length in characters.
    pub fn sanitize_text(input: &str, max_len: usize) -> String {
        input
            .trim()
            .chars()
            .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
            .take(max_len)
            .collect::<String>()
            .trim_end()
            .to_string()
    }

    /// A required display name. Rejects markup.
    pub fn validate_name(field: &str, input: &str) -> Result<String, ValidationError> {
        let value = Self::sanitize_single_line(input);
        if value.is_empty() {
            return Err(ValidationError::Empty {
                field: field.to_string(),
            });
        }
        if value.chars().count() > MAX_NAME_LENGTH {
            return Err(ValidationError::TooLong {
                field: field.to_string(),
                max: MAX_NAME_LENGTH,
            });
        }
        Self::reject_markup(field, &value)?;
        Ok(value)
    }

    /// An optional free-text field. Blank input becomes `None`.
    pub fn validate_optional_text(
        field: &str,
        input: Option<&str>,
        max_len: usize,
    ) -> Result<Option<String>, ValidationError> {
        let Some(raw) = input else {
            return Ok(None);
        };
        let value = Self::sanitize_text(raw, usize::MAX);
        if value.is_empty() {
            return Ok(None);
        }
        if value.chars().count() > max_len {
            return Err(ValidationError::TooLong {
                field: field.to_string(),
                max: max_len,
            });
        }
        Self::reject_markup(field, &value)?;
        Ok(Some(value))
    }

    pub fn validate_serial_number(input: &str) -> Result<String, ValidationError> {
        let field = "serialNumber";
        let value = input.trim();
        if value.is_empty() {
            return Err(ValidationError::Empty {
                field: field.to_string(),
            });
        }
        if value.len() > MAX_SERIAL_LENGTH {
            return Err(ValidationError::TooLong {
                field: field.to_string(),
                max: MAX_SERIAL_LENGTH,
            });
        }
        if !SERIAL_PATTERN.is_match(value) {
            return Err(ValidationError::InvalidCharacters {
                field: field.to_string(),
            });
        }
        Ok(value.to_string())
    }

    /// Asset-type codes appear inside asset codes, so they are restricted to
    /// 2-10 uppercase letters and digits. Input is upper-cased.
    pub fn validate_type_code(input: &str) -> Result<String, ValidationError> {
        let value = input.trim().to_uppercase();
        if value.is_empty() {
            return Err(ValidationError::Empty {
                field: "code".to_string(),
            });
        }
        if !TYPE_CODE_PATTERN.is_match(&value) {
            return Err(ValidationError::InvalidFormat {
                field: "code".to_string(),
                reason: "expected 2-10 uppercase letters or digits".to_string(),
            });
        }
        Ok(value)
    }

    /// Codes of categories, buildings, sectors and services. Upper-cased.
    pub fn validate_reference_code(field: &str, input: &str) -> Result<String, ValidationError> {
        let value = input.trim().to_uppercase();
        if value.is_empty() {
            return Err(ValidationError::Empty {
                field: field.to_string(),
            });
        }
        if value.len() > MAX_REFERENCE_CODE_LENGTH {
            return Err(ValidationError::TooLong {
                field: field.to_string(),
                max: MAX_REFERENCE_CODE_LENGTH,
            });
        }
        if !REFERENCE_CODE_PATTERN.is_match(&value) {
            return Err(ValidationError::InvalidCharacters {
                field: field.to_string(),
            });
        }
        Ok(value)
    }

    /// Email address or user principal name. Returned lower-cased.
    pub fn validate_email(field: &str, input: &str) -> Result<String, ValidationError> {
        let value = input.trim().to_lowercase();
        if value.is_empty() {
            return Err(ValidationError::Empty {
                field: field.to_string(),
            });
        }
        if value.len() > MAX_EMAIL_LENGTH {
            return Err(ValidationError::TooLong {
                field: field.to_string(),
                max: MAX_EMAIL_LENGTH,
            });
        }
        if !EMAIL_PATTERN.is_match(&value) || value.contains("..") {
            return Err(ValidationError::InvalidFormat {
                field: field.to_string(),
                reason: "expected name@domain".to_string(),
            });
        }
        Ok(value)
    }

    /// Owners are usually a UPN but may be a plain name ("Balie", "Stock IT").
    pub fn validate_owner(input: Option<&str>) -> Result<Option<String>, ValidationError> {
        match input.map(str::trim) {
            None | Some("") => Ok(None),
            Some(value) if value.contains('@') => Self::validate_email("owner", value).map(Some),
            Some(value) => Self::validate_name("owner", value).map(Some),
        }
    }

    /// Free-text search. Markup is rejected, LIKE wildcards are left to the
    /// repository to escape.
    pub fn validate_search_query(input: &str) -> Result<String, ValidationError> {
        let field = "search";
        let value = Self::sanitize_single_line(input);
        if value.is_empty() {
            return Err(ValidationError::Empty {
                field: field.to_string(),
            });
        }
        if value.chars().count() > MAX_SEARCH_LENGTH {
            return Err(ValidationError::TooLong {
                field: field.to_string(),
                max: MAX_SEARCH_LENGTH,
            });
        }
        Self::reject_markup(field, &value)?;
        Ok(value)
    }

    fn sanitize_single_line(input: &str) -> String {
        input
            .trim()
            .chars()
            .filter(|c| !c.is_control())
            .collect()
    }

    fn reject_markup(field: &str, value: &str) -> Result<(), ValidationError> {
        if MARKUP_PATTERN.is_match(value) {
            return Err(ValidationError::Markup {
                field: field.to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_text_strips_controls_and_caps() {
        assert_eq!(InputValidator::sanitize_text("  a\u{0007}b\nc  ", 100), "ab\nc");
        assert_eq!(InputValidator::sanitize_text("abcdef", 3), "abc");
        assert_eq!(InputValidator::sanitize_text("   ", 10), "");
    }

    #[test]
    fn test_validate_name() {
        assert_eq!(
            InputValidator::validate_name("assetName", "  Laptop Jan ").unwrap(),
            "Laptop Jan"
        );
        assert!(matches!(
            InputValidator::validate_name("assetName", " "),
            Err(ValidationError::Empty { .. })
        ));
        assert!(matches!(
            InputValidator::validate_name("assetName", &"x".repeat(MAX_NAME_LENGTH + 1)),
            Err(ValidationError::TooLong { .. })
        ));
    }

    #[test]
    fn test_markup_rejected() {
        for input in [
            "<script>alert(1)</script>",
            "Laptop <b>bold</b>",
            "javascript:alert(1)",
            "x\" onerror=alert(1)",
        ] {
            assert!(
                matches!(
                    InputValidator::validate_name("assetName", input),
                    Err(ValidationError::Markup { .. })
                ),
                "{input} should be rejected"
            );
        }
        // Comparison operators are not markup.
        assert!(InputValidator::validate_name("assetName", "Monitor < 24 inch").is_ok());
    }

    #[test]
    fn test_validate_serial_number() {
        assert_eq!(
            InputValidator::validate_serial_number(" 5CD1234XYZ ").unwrap(),
            "5CD1234XYZ"
        );
        assert!(InputValidator::validate_serial_number("SN-01/A.b_2").is_ok());
        assert!(InputValidator::validate_serial_number("").is_err());
        assert!(InputValidator::validate_serial_number("SN;DROP").is_err());
        assert!(InputValidator::validate_serial_number("-leading").is_err());
    }

    #[test]
    fn test_validate_type_code() {
        assert_eq!(InputValidator::validate_type_code("lap").unwrap(), "LAP");
        assert!(InputValidator::validate_type_code("L").is_err());
        assert!(InputValidator::validate_type_code("LAPTOPSTAND1").is_err());
        assert!(InputValidator::validate_type_code("LA-P").is_err());
    }

    #[test]
    fn test_validate_reference_code() {
        assert_eq!(
            InputValidator::validate_reference_code("code", "ict-dienst").unwrap(),
            "ICT-DIENST"
        );
        assert!(InputValidator::validate_reference_code("code", "a b").is_err());
        assert!(InputValidator::validate_reference_code("code", "").is_err());
    }

    #[test]
    fn test_validate_email() {
        assert_eq!(
            InputValidator::validate_email("owner", "Jan.Peeters@Diepenbeek.be").unwrap(),
            "jan.peeters@diepenbeek.be"
        );
        for bad in ["jan", "jan@", "@diepenbeek.be", "jan@localhost", "jan..p@x.be", "a b@x.be"] {
            assert!(InputValidator::validate_email("owner", bad).is_err(), "{bad}");
        }
    }

    #[test]
    fn test_validate_owner_accepts_names_and_upns() {
        assert_eq!(InputValidator::validate_owner(None).unwrap(), None);
        assert_eq!(InputValidator::validate_owner(Some("  ")).unwrap(), None);
        assert_eq!(
            InputValidator::validate_owner(Some("Balie")).unwrap().as_deref(),
            Some("Balie")
        );
        assert!(InputValidator::validate_owner(Some("bad@")).is_err());
    }

    #[test]
    fn test_optional_text() {
        assert_eq!(
            InputValidator::validate_optional_text("notes", Some("  "), 10).unwrap(),
            None
        );
        assert_eq!(
            InputValidator::validate_optional_text("notes", Some(" line1\nline2 "), 20)
                .unwrap()
                .as_deref(),
            Some("line1\nline2")
        );
        assert!(InputValidator::validate_optional_text("notes", Some("0123456789x"), 10).is_err());
    }

    #[test]
    fn test_search_query() {
        assert_eq!(InputValidator::validate_search_query(" lap 24 ").unwrap(), "lap 24");
        assert!(InputValidator::validate_search_query("").is_err());
        assert!(InputValidator::validate_search_query(&"a".repeat(101)).is_err());
    }
}
