//! Asset-code generation and parsing.
//!
//! Codes have the shape `[DUM-]TYPE-YY-[LOC-]NNNNN`:
//!
//! - `DUM-` marks a dummy (placeholder) asset
//! - `TYPE` is the asset-type code, e.g. `LAP`
//! - `YY` is the two-digit purchase year, or the current year when unknown
//! - `LOC-` is an optional building code
//! - `NNNNN` is a zero-padded sequence, unique per prefix
//!
//! Normal and dummy assets draw from separate sequence bands so a dummy can be
//! spotted from its number alone. Codes issued before the switch to five
//! digits use four digits and narrower bands; both shapes parse.

use chrono::{Datelike, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;
use thiserror::Error;

#[cfg(feature = "database")]
use crate::db::{AssetRepository, DbError};

/// Marker segment for dummy assets.
pub const DUMMY_PREFIX: &str = "DUM";

static CODE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:(DUM)-)?([A-Z0-9]{2,10})-(\d{2})-(?:([A-Z0-9]{1,10})-)?(\d{4,5})$")
        .expect("asset code pattern is valid")
});

static SEGMENT_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z0-9]+$").expect("segment pattern is valid"));

/// Errors from asset-code formatting, parsing and allocation.
#[derive(Error, Debug)]
pub enum AssetCodeError {
    #[error("Invalid asset code format: '{0}'")]
    InvalidFormat(String),

    #[error("Invalid asset type code '{0}': expected 2-10 uppercase letters or digits")]
    InvalidTypeCode(String),

    #[error("Invalid location code '{0}': expected 1-10 uppercase letters or digits")]
    InvalidLocation(String),

    #[error("Sequence exhausted for prefix '{prefix}' (maximum {max})")]
    SequenceExhausted { prefix: String, max: u32 },

    #[cfg(feature = "database")]
    #[error("Database error: {0}")]
    Database(#[from] DbError),
}

/// Sequence width and band layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodeVersion {
    /// Four digits. Normal `1..=8999`, dummy `9000..=9999`.
    Legacy,
    /// Five digits. Normal `1..=90000`, dummy `90001..=99999`.
    #[default]
    Current,
}

impl CodeVersion {
    pub fn digits(&self) -> usize {
        match self {
            CodeVersion::Legacy => 4,
            CodeVersion::Current => 5,
        }
    }

    pub fn band(&self, is_dummy: bool) -> RangeInclusive<u32> {
        match (self, is_dummy) {
            (CodeVersion::Legacy, false) => 1..=8999,
            (CodeVersion::Legacy, true) => 9000..=9999,
            (CodeVersion::Current, false) => 1..=90000,
            (CodeVersion::Current, true) => 90001..=99999,
        }
    }

    fn from_digits(digits: usize) -> Option<Self> {
        match digits {
            4 => Some(CodeVersion::Legacy),
            5 => Some(CodeVersion::Current),
            _ => None,
        }
    }
}

impl fmt::Display for CodeVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodeVersion::Legacy => f.write_str("legacy"),
            CodeVersion::Current => f.write_str("current"),
        }
    }
}

/// The segments of an asset code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetCodeParts {
    pub is_dummy: bool,
    pub type_code: String,
    /// Two-digit year, `0..=99`.
    pub year: u8,
    pub location: Option<String>,
    pub sequence: u32,
}

impl AssetCodeParts {
    /// Parts for a new code. The sequence is filled in at allocation.
    pub fn new(type_code: impl Into<String>, year: u8) -> Self {
        Self {
            is_dummy: false,
            type_code: type_code.into().trim().to_uppercase(),
            year: year % 100,
            location: None,
            sequence: 0,
        }
    }

    pub fn dummy(mut self, is_dummy: bool) -> Self {
        self.is_dummy = is_dummy;
        self
    }

    /// Sets the building segment. Blank locations are dropped.
    pub fn at_location(mut self, location: Option<&str>) -> Self {
        self.location = location
            .map(|l| l.trim().to_uppercase())
            .filter(|l| !l.is_empty());
        self
    }

    /// Checks the type and location segments.
    pub fn validate(&self) -> Result<(), AssetCodeError> {
        if !(2..=10).contains(&self.type_code.len()) || !SEGMENT_PATTERN.is_match(&self.type_code)
        {
            return Err(AssetCodeError::InvalidTypeCode(self.type_code.clone()));
        }
        if let Some(location) = &self.location {
            if location.len() > 10 || !SEGMENT_PATTERN.is_match(location) {
                return Err(AssetCodeError::InvalidLocation(location.clone()));
            }
        }
        Ok(())
    }

    /// The code up to and including the dash before the sequence.
    pub fn prefix(&self) -> String {
        let mut prefix = String::new();
        if self.is_dummy {
            prefix.push_str(DUMMY_PREFIX);
            prefix.push('-');
        }
        prefix.push_str(&self.type_code);
        prefix.push_str(&format!("-{:02}-", self.year));
        if let Some(location) = &self.location {
            prefix.push_str(location);
            prefix.push('-');
        }
        prefix
    }

    pub fn format(&self, version: CodeVersion) -> String {
        format!(
            "{}{:0width$}",
            self.prefix(),
            self.sequence,
            width = version.digits()
        )
    }
}

/// A parsed code together with the version its sequence width implies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedAssetCode {
    pub parts: AssetCodeParts,
    pub version: CodeVersion,
}

/// Parses an asset code. Input is trimmed and upper-cased first.
pub fn parse(code: &str) -> Result<ParsedAssetCode, AssetCodeError> {
    let normalized = code.trim().to_uppercase();
    let caps = CODE_PATTERN
        .captures(&normalized)
        .ok_or_else(|| AssetCodeError::InvalidFormat(code.to_string()))?;

    let invalid = || AssetCodeError::InvalidFormat(code.to_string());
    let digits = &caps[5];
    let version = CodeVersion::from_digits(digits.len()).ok_or_else(invalid)?;

    Ok(ParsedAssetCode {
        parts: AssetCodeParts {
            is_dummy: caps.get(1).is_some(),
            type_code: caps[2].to_string(),
            year: caps[3].parse().map_err(|_| invalid())?,
            location: caps.get(4).map(|m| m.as_str().to_string()),
            sequence: digits.parse().map_err(|_| invalid())?,
        },
        version,
    })
}

pub fn is_valid(code: &str) -> bool {
    parse(code).is_ok()
}

/// Next free sequence given the highest one already used in the band.
///
/// A `current_max` outside the band (for example a legacy number under a
/// current prefix) restarts at the band start.
pub fn next_number(
    current_max: Option<u32>,
    is_dummy: bool,
    version: CodeVersion,
) -> Result<u32, AssetCodeError> {
    let band = version.band(is_dummy);
    match current_max {
        Some(max) if band.contains(&max) => {
            if max >= *band.end() {
                Err(AssetCodeError::SequenceExhausted {
                    prefix: String::new(),
                    max: *band.end(),
                })
            } else {
                Ok(max + 1)
            }
        }
        _ => Ok(*band.start()),
    }
}

/// Two-digit year for a code: the purchase year when known, else this year.
pub fn year_for(purchase_date: Option<NaiveDate>) -> u8 {
    let year = purchase_date
        .map(|d| d.year())
        .unwrap_or_else(|| Utc::now().year());
    year.rem_euclid(100) as u8
}

/// Allocates codes by scanning existing codes with the same prefix.
///
/// The generator itself does not serialize callers; two concurrent calls for
/// the same prefix can return the same code. The asset service holds a lock
/// around generate-and-insert and retries on unique violations.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssetCodeGenerator {
    version: CodeVersion,
}

impl AssetCodeGenerator {
    pub fn new(version: CodeVersion) -> Self {
        Self { version }
    }

    pub fn version(&self) -> CodeVersion {
        self.version
    }

    /// Returns the next free code for `parts`. `parts.sequence` is ignored.
    #[cfg(feature = "database")]
    pub async fn generate(
        &self,
        repo: &dyn AssetRepository,
        parts: &AssetCodeParts,
    ) -> Result<String, AssetCodeError> {
        parts.validate()?;
        let prefix = parts.prefix();
        let band = self.version.band(parts.is_dummy);
        let current_max = repo.max_sequence_for_prefix(&prefix, band).await?;

        let sequence = next_number(current_max, parts.is_dummy, self.version).map_err(|e| {
            match e {
                AssetCodeError::SequenceExhausted { max, .. } => AssetCodeError::SequenceExhausted {
                    prefix: prefix.clone(),
                    max,
                },
                other => other,
            }
        })?;

        let code = AssetCodeParts {
            sequence,
            ..parts.clone()
        }
        .format(self.version);
        tracing::debug!(%prefix, sequence, %code, "Allocated asset code");
        Ok(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_normal_and_dummy() {
        let parts = AssetCodeParts {
            sequence: 42,
            ..AssetCodeParts::new("lap", 24)
        };
        assert_eq!(parts.format(CodeVersion::Current), "LAP-24-00042");
        assert_eq!(parts.format(CodeVersion::Legacy), "LAP-24-0042");

        let dummy = AssetCodeParts {
            sequence: 90001,
            ..AssetCodeParts::new("MON", 5).dummy(true).at_location(Some("gem"))
        };
        assert_eq!(dummy.format(CodeVersion::Current), "DUM-MON-05-GEM-90001");
    }

    #[test]
    fn test_prefix() {
        let parts = AssetCodeParts::new("LAP", 24).at_location(Some(" "));
        assert_eq!(parts.prefix(), "LAP-24-");
        let parts = AssetCodeParts::new("LAP", 24).dummy(true).at_location(Some("ADM"));
        assert_eq!(parts.prefix(), "DUM-LAP-24-ADM-");
    }

    #[test]
    fn test_parse_current_code() {
        let parsed = parse("DUM-LAP-24-GEM-90003").unwrap();
        assert_eq!(parsed.version, CodeVersion::Current);
        assert!(parsed.parts.is_dummy);
        assert_eq!(parsed.parts.type_code, "LAP");
        assert_eq!(parsed.parts.year, 24);
        assert_eq!(parsed.parts.location.as_deref(), Some("GEM"));
        assert_eq!(parsed.parts.sequence, 90003);
    }

    #[test]
    fn test_parse_legacy_code() {
        let parsed = parse("mon-23-0012").unwrap();
        assert_eq!(parsed.version, CodeVersion::Legacy);
        assert!(!parsed.parts.is_dummy);
        assert_eq!(parsed.parts.type_code, "MON");
        assert_eq!(parsed.parts.location, None);
        assert_eq!(parsed.parts.sequence, 12);
    }

    #[test]
    fn test_parse_round_trips_format() {
        for code in ["LAP-24-00001", "DUM-PRN-19-9000", "DOCK-25-ADM-00310"] {
            let parsed = parse(code).unwrap();
            assert_eq!(parsed.parts.format(parsed.version), code);
        }
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for code in ["", "LAP", "LAP-2024-00001", "LAP-24-001", "LAP-24-000001", "LAP_24_00001"] {
            assert!(
                matches!(parse(code), Err(AssetCodeError::InvalidFormat(_))),
                "{code} should be rejected"
            );
        }
    }

    #[test]
    fn test_next_number_bands() {
        assert_eq!(next_number(None, false, CodeVersion::Current).unwrap(), 1);
        assert_eq!(next_number(Some(41), false, CodeVersion::Current).unwrap(), 42);
        assert_eq!(next_number(None, true, CodeVersion::Current).unwrap(), 90001);
        assert_eq!(next_number(Some(90001), true, CodeVersion::Current).unwrap(), 90002);
        assert_eq!(next_number(None, false, CodeVersion::Legacy).unwrap(), 1);
        assert_eq!(next_number(None, true, CodeVersion::Legacy).unwrap(), 9000);
        assert_eq!(next_number(Some(9000), true, CodeVersion::Legacy).unwrap(), 9001);
    }

    #[test]
    fn test_next_number_ignores_out_of_band_max() {
        // A dummy number under a normal lookup starts the band over.
        assert_eq!(next_number(Some(95000), false, CodeVersion::Current).unwrap(), 1);
        assert_eq!(next_number(Some(12), true, CodeVersion::Current).unwrap(), 90001);
    }

    #[test]
    fn test_next_number_exhaustion() {
        assert!(matches!(
            next_number(Some(90000), false, CodeVersion::Current),
            Err(AssetCodeError::SequenceExhausted { max: 90000, .. })
        ));
        assert!(matches!(
            next_number(Some(99999), true, CodeVersion::Current),
            Err(AssetCodeError::SequenceExhausted { .. })
        ));
        assert!(matches!(
            next_number(Some(8999), false, CodeVersion::Legacy),
            Err(AssetCodeError::SequenceExhausted { .. })
        ));
    }

    #[test]
    fn test_validate_segments() {
        assert!(AssetCodeParts::new("LAP", 24).validate().is_ok());
        assert!(matches!(
            AssetCodeParts::new("L", 24).validate(),
            Err(AssetCodeError::InvalidTypeCode(_))
        ));
        assert!(matches!(
            AssetCodeParts::new("LAP-TOP", 24).validate(),
            Err(AssetCodeError::InvalidTypeCode(_))
        ));
        assert!(matches!(
            AssetCodeParts::new("LAP", 24)
                .at_location(Some("GEMEENTEHUIS"))
                .validate(),
            Err(AssetCodeError::InvalidLocation(_))
        ));
    }

    #[test]
    fn test_year_for() {
        let date = NaiveDate::from_ymd_opt(2019, 6, 1).unwrap();
        assert_eq!(year_for(Some(date)), 19);
        assert_eq!(year_for(None), (Utc::now().year() % 100) as u8);
    }

    #[cfg(feature = "database")]
    mod generator {
        use super::*;
        use crate::db::mocks::MockAssetRepository;
        use crate::models::{Asset, NewAsset};
        use uuid::Uuid;

        fn existing(code: &str) -> Asset {
            Asset::from_new(
                NewAsset {
                    asset_name: code.to_string(),
                    asset_type_id: Uuid::new_v4(),
                    ..Default::default()
                },
                code.to_string(),
            )
        }

        #[tokio::test]
        async fn test_generate_first_code() {
            let repo = MockAssetRepository::new();
            let generator = AssetCodeGenerator::default();
            let code = generator
                .generate(&repo, &AssetCodeParts::new("LAP", 24))
                .await
                .unwrap();
            assert_eq!(code, "LAP-24-00001");
        }

        #[tokio::test]
        async fn test_generate_increments_within_band() {
            let repo = MockAssetRepository::with_assets(vec![
                existing("LAP-24-00001"),
                existing("LAP-24-00009"),
                existing("DUM-LAP-24-90004"),
                existing("LAP-23-00500"),
            ]);
            let generator = AssetCodeGenerator::new(CodeVersion::Current);

            let normal = generator
                .generate(&repo, &AssetCodeParts::new("LAP", 24))
                .await
                .unwrap();
            assert_eq!(normal, "LAP-24-00010");

            let dummy = generator
                .generate(&repo, &AssetCodeParts::new("LAP", 24).dummy(true))
                .await
                .unwrap();
            assert_eq!(dummy, "DUM-LAP-24-90005");
        }

        #[tokio::test]
        async fn test_generate_reports_exhausted_prefix() {
            let repo = MockAssetRepository::with_assets(vec![existing("TAB-24-8999")]);
            let generator = AssetCodeGenerator::new(CodeVersion::Legacy);
            let err = generator
                .generate(&repo, &AssetCodeParts::new("TAB", 24))
                .await
                .unwrap_err();
            match err {
                AssetCodeError::SequenceExhausted { prefix, max } => {
                    assert_eq!(prefix, "TAB-24-");
                    assert_eq!(max, 8999);
                }
                other => panic!("unexpected error: {other}"),
            }
        }
    }
}
