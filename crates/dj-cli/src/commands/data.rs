//! Offline data commands: migrations, CSV import and export, templates.

use anyhow::{bail, Context, Result};
use colored::Colorize;
use std::path::{Path, PathBuf};

use dj_api::AppState;
use dj_core::csv::import_template;
use dj_core::models::{AssetFilter, AssetStatus};
use dj_core::services::csv_import::{ImportOptions, ImportReport, RowStatus};
use dj_core::AssetCodeGenerator;

use super::open_database;
use crate::config::AppConfig;

fn offline_state(config: &AppConfig, pool: dj_core::db::DbPool) -> AppState {
    AppState::with_location_codes(
        pool,
        AssetCodeGenerator::new(config.asset_codes.version),
        config.asset_codes.include_location,
    )
}

pub async fn run_migrate(config: &AppConfig) -> Result<()> {
    println!("{}", "Running database migrations...".cyan());
    open_database(config, false).await?;
    println!("{}", "Database is up to date.".green().bold());
    Ok(())
}

#[derive(Debug, Clone)]
pub struct ImportArgs {
    pub file: PathBuf,
    pub dry_run: bool,
    pub stop_on_error: bool,
    /// Recorded as `performed_by` on the created assets' events.
    pub actor: Option<String>,
}

/// Imports (or validates) a CSV file. Fails when any row failed.
pub async fn run_import(config: &AppConfig, args: ImportArgs, json: bool) -> Result<()> {
    let input = std::fs::read_to_string(&args.file)
        .with_context(|| format!("Failed to read {}", args.file.display()))?;
    let pool = open_database(config, json).await?;
    let state = offline_state(config, pool);

    let report = if args.dry_run {
        state.importer.validate(&input).await
    } else {
        state
            .importer
            .import(
                &input,
                ImportOptions {
                    stop_on_error: args.stop_on_error,
                },
                args.actor.as_deref(),
            )
            .await
    }
    .context("Import failed")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    if report.has_errors() {
        bail!("{} of {} rows failed", report.failed_rows, report.total_rows);
    }
    Ok(())
}

fn print_report(report: &ImportReport) {
    let title = if report.dry_run {
        "Import validation"
    } else {
        "Import"
    };
    println!();
    println!("{}", title.bold());
    println!("─────────────────────");
    println!("  Rows:     {}", report.total_rows);
    println!("  Valid:    {}", report.valid_rows);
    if !report.dry_run {
        println!("  Imported: {}", report.imported_rows.to_string().green());
    }
    if report.failed_rows > 0 {
        println!("  Failed:   {}", report.failed_rows.to_string().red());
    }

    for row in &report.rows {
        match row.status {
            RowStatus::Imported => println!(
                "  {} line {}: {}",
                "✓".green(),
                row.line,
                row.asset_code.as_deref().unwrap_or("-")
            ),
            RowStatus::Valid => {}
            RowStatus::Skipped => println!("  {} line {}: skipped", "-".yellow(), row.line),
            RowStatus::Invalid | RowStatus::Failed => {
                for error in &row.errors {
                    println!("  {} line {}: {}", "✗".red(), row.line, error);
                }
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ExportOptions {
    /// Written to stdout when unset.
    pub output: Option<PathBuf>,
    pub status: Option<String>,
    pub search: Option<String>,
    pub include_inactive: bool,
}

impl ExportOptions {
    pub fn filter(&self) -> Result<AssetFilter> {
        let status = match &self.status {
            Some(s) => Some(s.parse::<AssetStatus>().map_err(anyhow::Error::msg)?),
            None => None,
        };
        Ok(AssetFilter {
            status,
            search: self.search.clone(),
            include_inactive: self.include_inactive,
            ..Default::default()
        })
    }
}

pub async fn run_export(config: &AppConfig, options: ExportOptions) -> Result<()> {
    let filter = options.filter()?;
    let quiet = options.output.is_none();
    let pool = open_database(config, quiet).await?;
    let state = offline_state(config, pool);

    let csv = state
        .exporter
        .export(&filter)
        .await
        .context("Export failed")?;
    write_output(options.output.as_deref(), &csv)?;

    if let Some(path) = &options.output {
        let rows = csv.lines().count().saturating_sub(1);
        println!(
            "{} Exported {} assets to {}",
            "✓".green(),
            rows,
            path.display()
        );
    }
    Ok(())
}

/// Writes the import template to `output` or stdout.
pub fn write_template(output: Option<&Path>) -> Result<()> {
    write_output(output, &import_template())
}

fn write_output(output: Option<&Path>, contents: &str) -> Result<()> {
    match output {
        Some(path) => std::fs::write(path, contents)
            .with_context(|| format!("Failed to write {}", path.display())),
        None => {
            print!("{}", contents);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.database.url = "sqlite::memory:".to_string();
        config
    }

    #[test]
    fn test_export_filter() {
        let filter = ExportOptions {
            status: Some("in gebruik".to_string()),
            search: Some("HP".to_string()),
            ..Default::default()
        }
        .filter()
        .unwrap();
        assert_eq!(filter.status, Some(AssetStatus::InUse));
        assert_eq!(filter.search.as_deref(), Some("HP"));
        assert!(!filter.include_inactive);

        assert!(ExportOptions {
            status: Some("lost".to_string()),
            ..Default::default()
        }
        .filter()
        .is_err());
    }

    #[test]
    fn test_write_template() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("template.csv");
        write_template(Some(&path)).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with('#'));
        assert!(contents.contains("SerialNumber"));
    }

    #[tokio::test]
    async fn test_import_dry_run() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("assets.csv");
        std::fs::write(
            &file,
            "SerialNumber,AssetTypeCode\nCLI-001,LAP\nCLI-002,MON\n",
        )
        .unwrap();

        run_import(
            &memory_config(),
            ImportArgs {
                file,
                dry_run: true,
                stop_on_error: false,
                actor: None,
            },
            true,
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_import_reports_failures() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("assets.csv");
        std::fs::write(&file, "SerialNumber,AssetTypeCode\nCLI-001,NOPE\n").unwrap();

        let result = run_import(
            &memory_config(),
            ImportArgs {
                file,
                dry_run: false,
                stop_on_error: false,
                actor: Some("cli".to_string()),
            },
            true,
        )
        .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_import_missing_file() {
        let result = run_import(
            &memory_config(),
            ImportArgs {
                file: PathBuf::from("/nonexistent/assets.csv"),
                dry_run: true,
                stop_on_error: false,
                actor: None,
            },
            true,
        )
        .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_export_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.csv");

        run_export(
            &memory_config(),
            ExportOptions {
                output: Some(path.clone()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 1);
        assert!(contents.starts_with("SerialNumber"));
    }
}
