//! Tokenizer and row mapping for import files.

use chrono::NaiveDate;

use super::{CsvError, IMPORT_COLUMNS};

/// One logical record with the (1-based) line it starts on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvRecord {
    pub line: usize,
    pub fields: Vec<String>,
}

/// Picks `;` when the first data line has more unquoted semicolons than
/// commas, `,` otherwise. Spreadsheet exports in Belgian locales use `;`.
pub fn detect_delimiter(input: &str) -> char {
    let input = input.strip_prefix('\u{feff}').unwrap_or(input);
    let first = input
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty() && !l.starts_with('#'))
        .unwrap_or("");

    let (mut commas, mut semicolons, mut quoted) = (0usize, 0usize, false);
    for c in first.chars() {
        match c {
            '"' => quoted = !quoted,
            ',' if !quoted => commas += 1,
            ';' if !quoted => semicolons += 1,
            _ => {}
        }
    }
    if semicolons > commas {
        ';'
    } else {
        ','
    }
}

/// Splits `input` into records.
///
/// Comment lines (`#` at the start of a record) and blank lines are dropped.
/// Quoted fields may contain the delimiter, doubled quotes and line breaks.
/// CRLF and LF line endings are both accepted. A leading UTF-8 BOM is ignored.
pub fn parse_records(input: &str, delimiter: char) -> Result<Vec<CsvRecord>, CsvError> {
    let input = input.strip_prefix('\u{feff}').unwrap_or(input);
    let mut records = Vec::new();
    let mut chars = input.chars().peekable();

    let mut line = 1usize;
    let mut record_line = 1usize;
    let mut fields: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut quote_line = 0usize;
    let mut at_record_start = true;

    while let Some(c) = chars.next() {
        if at_record_start {
            record_line = line;
            at_record_start = false;
            if c == '#' {
                // Skip the comment up to and including its line break.
                for skipped in chars.by_ref() {
                    if skipped == '\n' {
                        break;
                    }
                }
                line += 1;
                at_record_start = true;
                continue;
            }
        }

        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                '\r' if chars.peek() == Some(&'\n') => {}
                '\n' => {
                    line += 1;
                    field.push('\n');
                }
                _ => field.push(c),
            }
            continue;
        }

        match c {
            '"' if field.trim().is_empty() => {
                field.clear();
                in_quotes = true;
                quote_line = line;
            }
            c if c == delimiter => fields.push(std::mem::take(&mut field)),
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' | '\r' => {
                push_record(&mut fields, &mut field, &mut records, record_line);
                line += 1;
                at_record_start = true;
            }
            _ => field.push(c),
        }
    }

    if in_quotes {
        return Err(CsvError::UnterminatedQuote { line: quote_line });
    }
    if !at_record_start {
        push_record(&mut fields, &mut field, &mut records, record_line);
    }
    Ok(records)
}

fn push_record(
    fields: &mut Vec<String>,
    field: &mut String,
    records: &mut Vec<CsvRecord>,
    line: usize,
) {
    fields.push(std::mem::take(field));
    let record = std::mem::take(fields);
    if !record.iter().all(|f| f.trim().is_empty()) {
        records.push(CsvRecord {
            line,
            fields: record,
        });
    }
}

/// An import row as text, before any lookups.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawImportRow {
    pub line: usize,
    pub serial_number: String,
    pub asset_type_code: String,
    pub status: String,
    pub purchase_date: String,
    pub is_dummy: String,
    pub asset_name: String,
    pub service_code: String,
    pub owner: String,
    pub brand: String,
    pub model: String,
    pub installation_date: String,
    pub warranty_expiry: String,
    pub notes: String,
    /// Present in files produced by the exporter.
    pub asset_code: String,
}

impl RawImportRow {
    /// Maps a record positionally. Missing trailing columns are empty.
    pub fn from_record(record: &CsvRecord) -> Result<Self, CsvError> {
        let expected = IMPORT_COLUMNS.len() + 1;
        if record.fields.len() > expected {
            return Err(CsvError::TooManyColumns {
                line: record.line,
                expected,
                found: record.fields.len(),
            });
        }
        let col = |i: usize| {
            record
                .fields
                .get(i)
                .map(|f| f.trim().to_string())
                .unwrap_or_default()
        };
        Ok(Self {
            line: record.line,
            serial_number: col(0),
            asset_type_code: col(1),
            status: col(2),
            purchase_date: col(3),
            is_dummy: col(4),
            asset_name: col(5),
            service_code: col(6),
            owner: col(7),
            brand: col(8),
            model: col(9),
            installation_date: col(10),
            warranty_expiry: col(11),
            notes: col(12),
            asset_code: col(13),
        })
    }
}

fn is_header(record: &CsvRecord) -> bool {
    record
        .fields
        .first()
        .is_some_and(|f| f.trim().eq_ignore_ascii_case(IMPORT_COLUMNS[0]))
}

/// Detects the delimiter, tokenizes, skips an optional header and maps each
/// record to a [`RawImportRow`]. Rows with too many columns are returned as
/// errors next to the rows that mapped.
pub fn parse_import_rows(
    input: &str,
) -> Result<Vec<Result<RawImportRow, CsvError>>, CsvError> {
    let delimiter = detect_delimiter(input);
    let mut records = parse_records(input, delimiter)?;
    if records.first().is_some_and(is_header) {
        records.remove(0);
    }
    if records.is_empty() {
        return Err(CsvError::NoRows);
    }
    Ok(records.iter().map(RawImportRow::from_record).collect())
}

/// Accepts `YYYY-MM-DD`, `DD/MM/YYYY` and `DD-MM-YYYY`. Blank is `None`.
pub fn parse_date(value: &str) -> Result<Option<NaiveDate>, String> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    ["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        .map(Some)
        .ok_or_else(|| {
            format!(
                "Invalid date '{}': use YYYY-MM-DD, DD/MM/YYYY or DD-MM-YYYY",
                value
            )
        })
}

/// Accepts `true/false`, `1/0`, `yes/no` and `ja/nee`. Blank is `false`.
pub fn parse_bool(value: &str) -> Result<bool, String> {
    match value.trim().to_lowercase().as_str() {
        "" | "false" | "0" | "no" | "nee" | "n" => Ok(false),
        "true" | "1" | "yes" | "ja" | "y" | "j" => Ok(true),
        other => Err(format!("Invalid boolean '{}'", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(records: &[CsvRecord]) -> Vec<Vec<&str>> {
        records
            .iter()
            .map(|r| r.fields.iter().map(String::as_str).collect())
            .collect()
    }

    #[test]
    fn test_simple_records() {
        let records = parse_records("a,b,c\n1,2,3\n", ',').unwrap();
        assert_eq!(fields(&records), vec![vec!["a", "b", "c"], vec!["1", "2", "3"]]);
        assert_eq!(records[1].line, 2);
    }

    #[test]
    fn test_comments_and_blank_lines_skipped() {
        let input = "# template\n\n#another, with comma\nSN1,LAP\n   \nSN2,MON";
        let records = parse_records(input, ',').unwrap();
        assert_eq!(fields(&records), vec![vec!["SN1", "LAP"], vec!["SN2", "MON"]]);
        assert_eq!(records[0].line, 4);
        assert_eq!(records[1].line, 6);
    }

    #[test]
    fn test_quoted_fields() {
        let input = "\"a, b\",\"say \"\"hi\"\"\",plain\r\n\"multi\nline\",x,y\r\n";
        let records = parse_records(input, ',').unwrap();
        assert_eq!(
            fields(&records),
            vec![
                vec!["a, b", "say \"hi\"", "plain"],
                vec!["multi\nline", "x", "y"]
            ]
        );
        assert_eq!(records[1].line, 2);
    }

    #[test]
    fn test_hash_inside_data_is_kept() {
        let records = parse_records("SN#1,#LAP", ',').unwrap();
        assert_eq!(fields(&records), vec![vec!["SN#1", "#LAP"]]);
    }

    #[test]
    fn test_unterminated_quote() {
        assert_eq!(
            parse_records("ok\n\"broken,1\n", ','),
            Err(CsvError::UnterminatedQuote { line: 2 })
        );
    }

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(detect_delimiter("# c;o;m;m;e;n;t\nA,B,C"), ',');
        assert_eq!(detect_delimiter("A;B;C\n"), ';');
        assert_eq!(detect_delimiter("\"x;y;z\",b,c"), ',');
        assert_eq!(detect_delimiter(""), ',');
    }

    #[test]
    fn test_parse_import_rows_skips_header_and_pads() {
        let input = "\u{feff}SerialNumber;AssetTypeCode;Status\nSN1;lap;InGebruik\n";
        let rows = parse_import_rows(input).unwrap();
        assert_eq!(rows.len(), 1);
        let row = rows[0].as_ref().unwrap();
        assert_eq!(row.line, 2);
        assert_eq!(row.serial_number, "SN1");
        assert_eq!(row.asset_type_code, "lap");
        assert_eq!(row.status, "InGebruik");
        assert_eq!(row.notes, "");
    }

    #[test]
    fn test_parse_import_rows_flags_wide_rows() {
        let wide = vec!["x"; 15].join(",");
        let rows = parse_import_rows(&format!("SN1,LAP\n{}\n", wide)).unwrap();
        assert!(rows[0].is_ok());
        assert!(matches!(
            rows[1],
            Err(CsvError::TooManyColumns { line: 2, found: 15, .. })
        ));
    }

    #[test]
    fn test_parse_import_rows_requires_data() {
        assert_eq!(
            parse_import_rows("# only comments\nSerialNumber,AssetTypeCode\n"),
            Err(CsvError::NoRows)
        );
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 15);
        assert_eq!(parse_date("2024-03-15").unwrap(), expected);
        assert_eq!(parse_date("15/03/2024").unwrap(), expected);
        assert_eq!(parse_date("15-03-2024").unwrap(), expected);
        assert_eq!(parse_date("  ").unwrap(), None);
        assert!(parse_date("03/15/2024").is_err());
        assert!(parse_date("2024-02-30").is_err());
    }

    #[test]
    fn test_parse_bool() {
        for t in ["true", "TRUE", "1", "yes", "Ja"] {
            assert!(parse_bool(t).unwrap(), "{t}");
        }
        for f in ["", "false", "0", "no", "NEE"] {
            assert!(!parse_bool(f).unwrap(), "{f}");
        }
        assert!(parse_bool("maybe").is_err());
    }
}
