//! Export and template writers.

use chrono::NaiveDate;

use super::{ASSET_CODE_COLUMN, IMPORT_COLUMNS};
use crate::models::Asset;

/// An asset with its reference codes resolved for export.
#[derive(Debug, Clone, Copy)]
pub struct ExportRecord<'a> {
    pub asset: &'a Asset,
    pub asset_type_code: &'a str,
    pub service_code: Option<&'a str>,
}

/// Quotes a field when it contains a delimiter, quote or line break.
pub fn escape_field(field: &str) -> String {
    if field.contains([',', ';', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn header() -> String {
    let mut columns: Vec<&str> = IMPORT_COLUMNS.to_vec();
    columns.push(ASSET_CODE_COLUMN);
    columns.join(",")
}

fn date(value: Option<NaiveDate>) -> String {
    value.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default()
}

/// Writes assets in import column order with `AssetCode` appended.
pub fn export_assets(records: &[ExportRecord<'_>]) -> String {
    let mut csv = header();
    csv.push('\n');

    for record in records {
        let asset = record.asset;
        let row = [
            asset.serial_number.clone().unwrap_or_default(),
            record.asset_type_code.to_string(),
            asset.status.to_string(),
            date(asset.purchase_date),
            asset.is_dummy.to_string(),
            asset.asset_name.clone(),
            record.service_code.unwrap_or_default().to_string(),
            asset.owner.clone().unwrap_or_default(),
            asset.brand.clone().unwrap_or_default(),
            asset.model.clone().unwrap_or_default(),
            date(asset.installation_date),
            date(asset.warranty_expiry),
            asset.notes.clone().unwrap_or_default(),
            asset.asset_code.clone(),
        ];
        let line: Vec<String> = row.iter().map(|f| escape_field(f)).collect();
        csv.push_str(&line.join(","));
        csv.push('\n');
    }
    csv
}

/// An empty import file: comment lines describing the format, the header and
/// one example row.
pub fn import_template() -> String {
    let mut csv = String::new();
    for comment in [
        "# Djoppie Inventory asset import",
        "# Lines starting with # are ignored. The header row is optional.",
        "# Delimiter: comma or semicolon. Quote values containing the delimiter with \".",
        "# SerialNumber: required unless IsDummy is true; must be unique",
        "# AssetTypeCode: code of an active asset type (e.g. LAP, DESK, MON)",
        "# Status: InUse, Stock, Repair, Defective, Decommissioned or New (Dutch labels accepted); empty = Stock",
        "# Dates: YYYY-MM-DD, DD/MM/YYYY or DD-MM-YYYY",
        "# IsDummy: true/false, 1/0, yes/no or ja/nee",
        "# ServiceCode: optional, must exist",
        "# Asset codes are generated on import.",
    ] {
        csv.push_str(comment);
        csv.push('\n');
    }
    csv.push_str(&IMPORT_COLUMNS.join(","));
    csv.push('\n');
    csv.push_str(
        "5CD1234XYZ,LAP,InUse,2024-03-15,false,Laptop Jan Peeters,ICT,jan.peeters@diepenbeek.be,HP,EliteBook 840,2024-03-20,2027-03-15,\n",
    );
    csv
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csv::{parse_import_rows, parse_records};
    use crate::models::{AssetStatus, NewAsset};
    use uuid::Uuid;

    #[test]
    fn test_escape_field() {
        assert_eq!(escape_field("simple"), "simple");
        assert_eq!(escape_field("with,comma"), "\"with,comma\"");
        assert_eq!(escape_field("with;semicolon"), "\"with;semicolon\"");
        assert_eq!(escape_field("with\"quote"), "\"with\"\"quote\"");
        assert_eq!(escape_field("with\nnewline"), "\"with\nnewline\"");
    }

    #[test]
    fn test_export_columns_and_values() {
        let asset = Asset::from_new(
            NewAsset {
                asset_name: "Laptop, reserve".into(),
                asset_type_id: Uuid::new_v4(),
                status: AssetStatus::InUse,
                serial_number: Some("SN1".into()),
                purchase_date: NaiveDate::from_ymd_opt(2024, 1, 31),
                notes: Some("said \"ok\"".into()),
                ..Default::default()
            },
            "LAP-24-00001".into(),
        );
        let csv = export_assets(&[ExportRecord {
            asset: &asset,
            asset_type_code: "LAP",
            service_code: Some("ICT"),
        }]);

        let records = parse_records(&csv, ',').unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].fields.len(), 14);
        assert_eq!(records[0].fields[13], "AssetCode");
        let row = &records[1].fields;
        assert_eq!(row[0], "SN1");
        assert_eq!(row[2], "InUse");
        assert_eq!(row[3], "2024-01-31");
        assert_eq!(row[4], "false");
        assert_eq!(row[5], "Laptop, reserve");
        assert_eq!(row[6], "ICT");
        assert_eq!(row[12], "said \"ok\"");
        assert_eq!(row[13], "LAP-24-00001");
    }

    #[test]
    fn test_template_parses_to_example_row() {
        let rows = parse_import_rows(&import_template()).unwrap();
        assert_eq!(rows.len(), 1);
        let row = rows[0].as_ref().unwrap();
        assert_eq!(row.serial_number, "5CD1234XYZ");
        assert_eq!(row.asset_type_code, "LAP");
        assert_eq!(row.asset_code, "");
    }
}
