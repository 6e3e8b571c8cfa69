//! Subcommand implementations.

mod data;
mod serve;

pub use data::{run_export, run_import, run_migrate, write_template, ExportOptions, ImportArgs};
pub use serve::{run_server, ServeOverrides};

use anyhow::{Context, Result};
use colored::Colorize;
use dj_core::db::{
    create_pool_with_retry, run_migrations, seed_reference_data, DbPool, RetryConfig,
};

use crate::config::{redact_url_password, AppConfig};

/// Connects (waiting for a database that is still starting), migrates and,
/// unless disabled, seeds reference data.
pub(crate) async fn open_database(config: &AppConfig, quiet: bool) -> Result<DbPool> {
    let url = &config.database.url;
    if !quiet {
        eprintln!("  {} Database: {}", "→".green(), redact_url_password(url));
    }
    let pool = create_pool_with_retry(url, RetryConfig::startup())
        .await
        .context("Failed to create database connection pool")?;
    run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;

    if config.database.seed_reference_data {
        let summary = seed_reference_data(&pool)
            .await
            .context("Failed to seed reference data")?;
        if !quiet && (summary.categories > 0 || summary.asset_types > 0) {
            eprintln!(
                "  {} Seeded {} categories and {} asset types",
                "✓".green(),
                summary.categories,
                summary.asset_types
            );
        }
    }
    Ok(pool)
}
