//! CSV codec for asset import and export.
//!
//! The column order is fixed. Import files may use `,` or `;` as delimiter,
//! quote fields with `"` and contain `#` comment lines. Exports append an
//! `AssetCode` column, which the importer accepts as an explicit code so an
//! export can be loaded back into another installation.

mod parser;
mod writer;

pub use parser::{
    detect_delimiter, parse_bool, parse_date, parse_import_rows, parse_records, CsvRecord,
    RawImportRow,
};
pub use writer::{escape_field, export_assets, import_template, ExportRecord};

use thiserror::Error;

/// Columns of an import file, in order.
pub const IMPORT_COLUMNS: [&str; 13] = [
    "SerialNumber",
    "AssetTypeCode",
    "Status",
    "PurchaseDate",
    "IsDummy",
    "AssetName",
    "ServiceCode",
    "Owner",
    "Brand",
    "Model",
    "InstallationDate",
    "WarrantyExpiry",
    "Notes",
];

/// Extra trailing column written by exports.
pub const ASSET_CODE_COLUMN: &str = "AssetCode";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CsvError {
    #[error("Unterminated quoted field starting on line {line}")]
    UnterminatedQuote { line: usize },

    #[error("Line {line}: expected at most {expected} columns, found {found}")]
    TooManyColumns {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("File contains no data rows")]
    NoRows,
}
