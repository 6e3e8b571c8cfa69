//! CSV import: per-row validation, dry runs and writing through the asset
//! service.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::asset_service::{AssetService, CreateSource};
use super::ServiceResult;
use crate::asset_code;
use crate::csv::{parse_bool, parse_date, parse_import_rows, RawImportRow};
use crate::models::{AssetStatus, AssetType, NewAsset};
use crate::validation::{InputValidator, MAX_NAME_LENGTH, MAX_NOTES_LENGTH};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ImportOptions {
    /// Write nothing when any row fails validation.
    #[serde(default)]
    pub stop_on_error: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum RowStatus {
    /// Passed validation in a dry run.
    Valid,
    Imported,
    Invalid,
    /// Valid but not written because another row was invalid.
    Skipped,
    /// Valid but rejected when written.
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct RowOutcome {
    pub line: usize,
    pub serial_number: Option<String>,
    pub status: RowStatus,
    pub asset_code: Option<String>,
    pub asset_id: Option<Uuid>,
    pub errors: Vec<String>,
}

impl RowOutcome {
    fn new(line: usize, serial_number: Option<String>) -> Self {
        Self {
            line,
            serial_number,
            status: RowStatus::Valid,
            asset_code: None,
            asset_id: None,
            errors: Vec::new(),
        }
    }

    fn invalid(line: usize, error: impl Into<String>) -> Self {
        Self {
            status: RowStatus::Invalid,
            errors: vec![error.into()],
            ..Self::new(line, None)
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub dry_run: bool,
    pub total_rows: usize,
    pub valid_rows: usize,
    pub imported_rows: usize,
    pub failed_rows: usize,
    pub rows: Vec<RowOutcome>,
}

impl ImportReport {
    fn from_rows(dry_run: bool, rows: Vec<RowOutcome>) -> Self {
        let count = |status: RowStatus| rows.iter().filter(|r| r.status == status).count();
        let valid_rows = rows
            .iter()
            .filter(|r| !matches!(r.status, RowStatus::Invalid))
            .count();
        Self {
            dry_run,
            total_rows: rows.len(),
            valid_rows,
            imported_rows: count(RowStatus::Imported),
            failed_rows: count(RowStatus::Invalid) + count(RowStatus::Failed),
            rows,
        }
    }

    pub fn has_errors(&self) -> bool {
        self.failed_rows > 0
    }
}

/// A validated row ready to be written.
struct PreparedRow {
    outcome: RowOutcome,
    asset: Option<NewAsset>,
}

pub struct CsvImportService {
    assets: Arc<AssetService>,
}

impl CsvImportService {
    pub fn new(assets: Arc<AssetService>) -> Self {
        Self { assets }
    }

    /// Dry run: validates every row without writing.
    #[instrument(skip(self, input), fields(bytes = input.len()))]
    pub async fn validate(&self, input: &str) -> ServiceResult<ImportReport> {
        let rows = self.prepare(input).await?;
        Ok(ImportReport::from_rows(
            true,
            rows.into_iter().map(|r| r.outcome).collect(),
        ))
    }

    /// Validates and writes valid rows. Each created asset gets an `Imported`
    /// event.
    #[instrument(skip(self, input, actor), fields(bytes = input.len()))]
    pub async fn import(
        &self,
        input: &str,
        options: ImportOptions,
        actor: Option<&str>,
    ) -> ServiceResult<ImportReport> {
        let rows = self.prepare(input).await?;
        let any_invalid = rows.iter().any(|r| r.asset.is_none());

        if options.stop_on_error && any_invalid {
            let outcomes = rows
                .into_iter()
                .map(|mut r| {
                    if r.asset.is_some() {
                        r.outcome.status = RowStatus::Skipped;
                    }
                    r.outcome
                })
                .collect();
            let report = ImportReport::from_rows(false, outcomes);
            warn!(
                invalid = report.failed_rows,
                "Import aborted, file has invalid rows"
            );
            return Ok(report);
        }

        let mut outcomes = Vec::with_capacity(rows.len());
        for PreparedRow { mut outcome, asset } in rows {
            if let Some(new) = asset {
                match self
                    .assets
                    .create_from(new, actor, CreateSource::Import)
                    .await
                {
                    Ok(created) => {
                        outcome.status = RowStatus::Imported;
                        outcome.asset_code = Some(created.asset_code);
                        outcome.asset_id = Some(created.id);
                    }
                    Err(e) => {
                        outcome.status = RowStatus::Failed;
                        outcome.errors.push(e.to_string());
                    }
                }
            }
            outcomes.push(outcome);
        }

        let report = ImportReport::from_rows(false, outcomes);
        metrics::counter!("csv_rows_imported_total", "outcome" => "imported")
            .increment(report.imported_rows as u64);
        metrics::counter!("csv_rows_imported_total", "outcome" => "failed")
            .increment(report.failed_rows as u64);
        info!(
            total = report.total_rows,
            imported = report.imported_rows,
            failed = report.failed_rows,
            "CSV import finished"
        );
        Ok(report)
    }

    async fn prepare(&self, input: &str) -> ServiceResult<Vec<PreparedRow>> {
        let raw_rows = parse_import_rows(input)?;
        let mut context = RowContext::default();
        let mut prepared = Vec::with_capacity(raw_rows.len());

        for raw in raw_rows {
            let row = match raw {
                Ok(raw) => self.prepare_row(&raw, &mut context).await?,
                Err(e) => PreparedRow {
                    outcome: RowOutcome::invalid(line_of(&e), e.to_string()),
                    asset: None,
                },
            };
            prepared.push(row);
        }
        Ok(prepared)
    }

    /// Row-level problems become outcome errors; only storage failures abort.
    async fn prepare_row(
        &self,
        raw: &RawImportRow,
        context: &mut RowContext,
    ) -> ServiceResult<PreparedRow> {
        let stores = self.assets.stores();
        let serial = non_empty(&raw.serial_number);
        let mut outcome = RowOutcome::new(raw.line, serial.map(str::to_string));
        let mut errors = Vec::new();

        let is_dummy = parse_bool(&raw.is_dummy).unwrap_or_else(|e| {
            errors.push(format!("IsDummy: {}", e));
            false
        });

        let serial_number = match serial {
            None if !is_dummy => {
                errors.push("SerialNumber is required for non-dummy assets".to_string());
                None
            }
            None => None,
            Some(serial) => match InputValidator::validate_serial_number(serial) {
                Ok(serial) => {
                    if !context.serials.insert(serial.to_lowercase()) {
                        errors.push(format!("SerialNumber '{}' appears more than once", serial));
                    } else if stores.assets.serial_exists(&serial, None).await? {
                        errors.push(format!("SerialNumber '{}' already exists", serial));
                    }
                    Some(serial)
                }
                Err(e) => {
                    errors.push(e.to_string());
                    None
                }
            },
        };

        let asset_type = match non_empty(&raw.asset_type_code) {
            None => {
                errors.push("AssetTypeCode is required".to_string());
                None
            }
            Some(code) => {
                let code = code.to_uppercase();
                let found = match context.types.get(&code) {
                    Some(cached) => cached.clone(),
                    None => {
                        let found = stores.asset_types.get_by_code(&code).await?;
                        context.types.insert(code.clone(), found.clone());
                        found
                    }
                };
                match found {
                    Some(t) if t.is_active => Some(t),
                    Some(_) => {
                        errors.push(format!("AssetTypeCode '{}' is inactive", code));
                        None
                    }
                    None => {
                        errors.push(format!("AssetTypeCode '{}' does not exist", code));
                        None
                    }
                }
            }
        };

        let status = match non_empty(&raw.status) {
            None => AssetStatus::Stock,
            Some(s) => AssetStatus::parse_lenient(s).unwrap_or_else(|| {
                errors.push(format!("Status '{}' is not recognized", s));
                AssetStatus::Stock
            }),
        };

        let mut date = |column: &str, value: &str| {
            parse_date(value).unwrap_or_else(|e| {
                errors.push(format!("{}: {}", column, e));
                None
            })
        };
        let purchase_date = date("PurchaseDate", &raw.purchase_date);
        let installation_date = date("InstallationDate", &raw.installation_date);
        let warranty_expiry = date("WarrantyExpiry", &raw.warranty_expiry);

        let service_id = match non_empty(&raw.service_code) {
            None => None,
            Some(code) => match stores.services.get_by_code(code).await? {
                Some(service) => Some(service.id),
                None => {
                    errors.push(format!("ServiceCode '{}' does not exist", code));
                    None
                }
            },
        };

        let owner = InputValidator::validate_owner(non_empty(&raw.owner)).unwrap_or_else(|e| {
            errors.push(e.to_string());
            None
        });
        let mut text = |field: &str, value: &str, max: usize| {
            InputValidator::validate_optional_text(field, non_empty(value), max).unwrap_or_else(
                |e| {
                    errors.push(e.to_string());
                    None
                },
            )
        };
        let brand = text("Brand", &raw.brand, MAX_NAME_LENGTH);
        let model = text("Model", &raw.model, MAX_NAME_LENGTH);
        let notes = text("Notes", &raw.notes, MAX_NOTES_LENGTH);
        let asset_name = text("AssetName", &raw.asset_name, MAX_NAME_LENGTH);

        let asset_code = match non_empty(&raw.asset_code) {
            None => None,
            Some(code) => {
                let code = code.to_uppercase();
                if !asset_code::is_valid(&code) {
                    errors.push(format!("AssetCode '{}' is not a valid asset code", code));
                } else if !context.codes.insert(code.clone())
                    || stores.assets.code_exists(&code).await?
                {
                    errors.push(format!("AssetCode '{}' already exists", code));
                }
                Some(code)
            }
        };

        let asset = match asset_type {
            Some(asset_type) if errors.is_empty() => Some(NewAsset {
                asset_code,
                asset_name: asset_name
                    .unwrap_or_else(|| default_name(&asset_type, serial_number.as_deref())),
                asset_type_id: asset_type.id,
                status,
                is_dummy,
                service_id,
                building_id: None,
                owner,
                brand,
                model,
                serial_number,
                purchase_date,
                installation_date,
                warranty_expiry,
                notes,
            }),
            _ => None,
        };

        if asset.is_none() {
            outcome.status = RowStatus::Invalid;
            outcome.errors = errors;
        }
        Ok(PreparedRow { outcome, asset })
    }
}

#[derive(Default)]
struct RowContext {
    serials: HashSet<String>,
    codes: HashSet<String>,
    types: HashMap<String, Option<AssetType>>,
}

fn non_empty(value: &str) -> Option<&str> {
    let value = value.trim();
    (!value.is_empty()).then_some(value)
}

fn default_name(asset_type: &AssetType, serial: Option<&str>) -> String {
    match serial {
        Some(serial) => format!("{} {}", asset_type.name, serial),
        None => asset_type.name.clone(),
    }
}

fn line_of(error: &crate::csv::CsvError) -> usize {
    match error {
        crate::csv::CsvError::TooManyColumns { line, .. }
        | crate::csv::CsvError::UnterminatedQuote { line } => *line,
        crate::csv::CsvError::NoRows => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset_code::AssetCodeGenerator;
    use crate::db::mocks::{
        MockAssetEventRepository, MockAssetRepository, MockAssetTypeRepository,
        MockServiceRepository,
    };
    use crate::models::{AssetEventType, Service};
    use crate::services::{ServiceError, Stores};

    struct Fixture {
        importer: CsvImportService,
        assets: Arc<MockAssetRepository>,
        events: Arc<MockAssetEventRepository>,
    }

    fn fixture() -> Fixture {
        let mut retired = AssetType::new("OLD", "Retired type");
        retired.is_active = false;

        let assets = Arc::new(MockAssetRepository::new());
        let events = Arc::new(MockAssetEventRepository::new());
        let mut stores = Stores::in_memory();
        stores.assets = assets.clone();
        stores.events = events.clone();
        stores.asset_types = Arc::new(MockAssetTypeRepository::with_types(vec![
            AssetType::new("LAP", "Laptop"),
            AssetType::new("MON", "Monitor"),
            retired,
        ]));
        stores.services = Arc::new(MockServiceRepository::with_services(vec![Service::new(
            "ICT", "ICT-dienst",
        )]));

        let service = Arc::new(AssetService::new(stores, AssetCodeGenerator::default()));
        Fixture {
            importer: CsvImportService::new(service),
            assets,
            events,
        }
    }

    const GOOD: &str = "\
# Djoppie import
SerialNumber,AssetTypeCode,Status,PurchaseDate,IsDummy,AssetName,ServiceCode,Owner,Brand,Model,InstallationDate,WarrantyExpiry,Notes
5CD1234XYZ,LAP,InUse,2024-03-15,false,Laptop Jan,ICT,jan.peeters@diepenbeek.be,HP,\"EliteBook 840, G10\",,15/03/2027,
CN0ABC123,mon,,01-02-2023,nee,,,,Dell,P2422H,,,
";

    #[tokio::test]
    async fn test_dry_run_writes_nothing() {
        let fx = fixture();
        let report = fx.importer.validate(GOOD).await.unwrap();
        assert!(report.dry_run);
        assert_eq!(report.total_rows, 2);
        assert_eq!(report.valid_rows, 2);
        assert!(!report.has_errors());
        assert!(report.rows.iter().all(|r| r.status == RowStatus::Valid));
        assert!(fx.assets.snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn test_import_creates_assets_with_events() {
        let fx = fixture();
        let report = fx
            .importer
            .import(GOOD, ImportOptions::default(), Some("admin"))
            .await
            .unwrap();
        assert_eq!(report.imported_rows, 2);
        assert_eq!(report.rows[0].asset_code.as_deref(), Some("LAP-24-00001"));
        assert_eq!(report.rows[1].asset_code.as_deref(), Some("MON-23-00001"));

        let assets = fx.assets.snapshot().await;
        let laptop = assets
            .iter()
            .find(|a| a.asset_code == "LAP-24-00001")
            .unwrap();
        assert_eq!(laptop.model.as_deref(), Some("EliteBook 840, G10"));
        assert_eq!(laptop.status, AssetStatus::InUse);
        let monitor = assets
            .iter()
            .find(|a| a.asset_code == "MON-23-00001")
            .unwrap();
        assert_eq!(monitor.status, AssetStatus::Stock);
        assert_eq!(monitor.asset_name, "Monitor CN0ABC123");

        let events = fx.events.snapshot().await;
        assert!(events
            .iter()
            .all(|e| e.event_type == AssetEventType::Imported));
    }

    #[tokio::test]
    async fn test_row_errors_are_collected() {
        let fx = fixture();
        let input = "\
,LAP,,,,,,,,,,,
SN-1,XXX,Broken?,2024-13-01,maybe,,NOPE,,,,,,
SN-2,OLD,,,,,,,,,,,
SN-3,LAP,,,,,,,,,,,
sn-3,LAP,,,,,,,,,,,
";
        let report = fx.importer.validate(input).await.unwrap();
        let statuses: Vec<RowStatus> = report.rows.iter().map(|r| r.status).collect();
        assert_eq!(
            statuses,
            vec![
                RowStatus::Invalid,
                RowStatus::Invalid,
                RowStatus::Invalid,
                RowStatus::Valid,
                RowStatus::Invalid
            ]
        );
        assert!(report.rows[0].errors[0].contains("required"));
        // Type, status, date, bool and service all reported for one row.
        assert_eq!(report.rows[1].errors.len(), 5);
        assert!(report.rows[2].errors[0].contains("inactive"));
        assert!(report.rows[4].errors[0].contains("more than once"));
    }

    #[tokio::test]
    async fn test_dummy_rows_need_no_serial() {
        let fx = fixture();
        let report = fx
            .importer
            .import(",LAP,,2024-01-01,ja,Reserve,,,,,,,\n", ImportOptions::default(), None)
            .await
            .unwrap();
        assert_eq!(report.imported_rows, 1);
        assert_eq!(report.rows[0].asset_code.as_deref(), Some("DUM-LAP-24-90001"));
    }

    #[tokio::test]
    async fn test_stop_on_error_writes_nothing() {
        let fx = fixture();
        let input = "SN-1,LAP,,,,,,,,,,,\nSN-2,XXX,,,,,,,,,,,\n";
        let report = fx
            .importer
            .import(input, ImportOptions { stop_on_error: true }, None)
            .await
            .unwrap();
        assert_eq!(report.rows[0].status, RowStatus::Skipped);
        assert_eq!(report.rows[1].status, RowStatus::Invalid);
        assert_eq!(report.imported_rows, 0);
        assert!(fx.assets.snapshot().await.is_empty());

        let partial = fx
            .importer
            .import(input, ImportOptions::default(), None)
            .await
            .unwrap();
        assert_eq!(partial.imported_rows, 1);
        assert_eq!(partial.failed_rows, 1);
    }

    #[tokio::test]
    async fn test_existing_serial_and_semicolons() {
        let fx = fixture();
        fx.importer
            .import("SN-1;LAP;;;;;;;;;;;\n", ImportOptions::default(), None)
            .await
            .unwrap();
        let report = fx
            .importer
            .validate("SerialNumber;AssetTypeCode\nSN-1;LAP\n")
            .await
            .unwrap();
        assert_eq!(report.rows[0].status, RowStatus::Invalid);
        assert!(report.rows[0].errors[0].contains("already exists"));
    }

    #[tokio::test]
    async fn test_explicit_codes_round_trip() {
        let fx = fixture();
        let input = "SN-9,LAP,,,,,,,,,,,,LAP-19-0042\n";
        let report = fx
            .importer
            .import(input, ImportOptions::default(), None)
            .await
            .unwrap();
        assert_eq!(report.rows[0].asset_code.as_deref(), Some("LAP-19-0042"));

        let again = fx.importer.validate("SN-10,LAP,,,,,,,,,,,,LAP-19-0042\n").await.unwrap();
        assert!(again.rows[0].errors[0].contains("already exists"));
    }

    #[tokio::test]
    async fn test_empty_file_is_an_error() {
        let fx = fixture();
        let err = fx.importer.validate("# only comments\n\n").await.unwrap_err();
        assert!(matches!(err, ServiceError::Csv(_)));
    }
}
