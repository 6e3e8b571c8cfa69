//! Djoppie Inventory CLI
//!
//! Runs the API server and offline maintenance tasks for the asset inventory.

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

mod commands;
mod config;
mod validator;

use commands::{ExportOptions, ImportArgs, ServeOverrides};
use config::{log_overrides, redact_url_password, AppConfig};
use dj_observability::{LogFormat, LoggingConfig};
use validator::ConfigValidator;

#[derive(Parser)]
#[command(name = "djoppie-inventory")]
#[command(version)]
#[command(about = "IT asset inventory for Gemeente Diepenbeek", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE", env = "DJOPPIE_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Output format (text, json)
    #[arg(long, default_value = "text")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Invalid output format: {}", s)),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server
    Serve {
        /// Port to listen on (overrides server.port)
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to (overrides server.host)
        #[arg(long)]
        host: Option<String>,

        /// Disable Swagger UI
        #[arg(long)]
        no_swagger: bool,

        /// Validate configuration and exit without starting the server
        #[arg(long)]
        validate_only: bool,
    },

    /// Create or upgrade the database schema and seed reference data
    Migrate,

    /// Import assets from a CSV file
    Import {
        /// CSV file in import template layout
        file: PathBuf,

        /// Validate only, write nothing
        #[arg(long)]
        dry_run: bool,

        /// Write nothing when any row is invalid
        #[arg(long)]
        stop_on_error: bool,

        /// Name recorded on the import events
        #[arg(long)]
        actor: Option<String>,
    },

    /// Export assets as CSV
    Export {
        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Only assets with this status
        #[arg(short, long)]
        status: Option<String>,

        /// Free-text filter on code, name, serial, owner, brand and model
        #[arg(long)]
        search: Option<String>,

        /// Include deactivated assets
        #[arg(long)]
        include_inactive: bool,
    },

    /// Write the CSV import template
    Template {
        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate configuration
    Validate,

    /// Show the effective configuration
    Config {
        /// Show secrets (redacted by default)
        #[arg(long)]
        show_secrets: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let json = cli.format == OutputFormat::Json;

    let explicit = cli.config.is_some();
    let config_path = cli.config.clone().unwrap_or_else(default_config_path);
    let mut config = AppConfig::load_or_default(&config_path, explicit)?;
    let env_paths = config.apply_env_overrides(std::env::vars())?;

    init_logging(&config.logging, cli.verbose, json);
    if !explicit && !config_path.exists() && cli.verbose {
        eprintln!("Using default configuration (no config file found)");
    }
    log_overrides("environment", &env_paths);

    config.apply_key_vault().await?;

    match cli.command {
        Commands::Serve {
            port,
            host,
            no_swagger,
            validate_only,
        } => {
            ServeOverrides {
                host,
                port,
                no_swagger,
            }
            .apply(&mut config);
            cmd_serve(config, validate_only).await
        }
        Commands::Migrate => commands::run_migrate(&config).await,
        Commands::Import {
            file,
            dry_run,
            stop_on_error,
            actor,
        } => {
            commands::run_import(
                &config,
                ImportArgs {
                    file,
                    dry_run,
                    stop_on_error,
                    actor,
                },
                json,
            )
            .await
        }
        Commands::Export {
            output,
            status,
            search,
            include_inactive,
        } => {
            commands::run_export(
                &config,
                ExportOptions {
                    output,
                    status,
                    search,
                    include_inactive,
                },
            )
            .await
        }
        Commands::Template { output } => commands::write_template(output.as_deref()),
        Commands::Validate => cmd_validate(&config, &config_path),
        Commands::Config { show_secrets } => cmd_config(&config, show_secrets, json),
    }
}

fn default_config_path() -> PathBuf {
    if let Some(dirs) = directories::ProjectDirs::from("be", "diepenbeek", "djoppie-inventory") {
        dirs.config_dir().join("config.yaml")
    } else {
        PathBuf::from("config/default.yaml")
    }
}

fn init_logging(logging: &LoggingConfig, verbose: bool, json: bool) {
    let mut logging = logging.clone();
    if verbose {
        logging.level = "debug".to_string();
    }
    if json {
        logging.format = LogFormat::Json;
    }
    dj_observability::init_logging_with_config(&logging);
}

async fn cmd_serve(config: AppConfig, validate_only: bool) -> Result<()> {
    println!("{}", "Validating configuration...".cyan());
    let validation = ConfigValidator::validate(&config);
    validation.print();

    if validation.has_errors() {
        println!();
        let message = if validate_only {
            "Configuration validation failed. Fix the errors above before starting the server."
        } else {
            "Server startup aborted due to configuration errors. Fix the errors above and try again."
        };
        println!("{}", message.red().bold());
        std::process::exit(1);
    }

    if validate_only {
        println!();
        println!(
            "{}",
            "Configuration is valid. Server can be started."
                .green()
                .bold()
        );
        return Ok(());
    }

    println!();
    commands::run_server(config).await
}

fn cmd_validate(config: &AppConfig, config_path: &std::path::Path) -> Result<()> {
    println!(
        "Validating configuration: {}",
        config_path.display().to_string().cyan()
    );

    let validation = ConfigValidator::validate(config);
    validation.print();

    println!();
    println!("{}", "Configuration Summary".bold());
    println!("─────────────────────");
    println!("  Environment: {}", config.environment);
    println!(
        "  Database: {}",
        redact_url_password(&config.database.url)
    );
    println!(
        "  Auth: {}",
        if config.auth.enabled {
            "Entra ID"
        } else {
            "disabled"
        }
    );
    println!(
        "  Graph: {}",
        if config.graph.is_configured() {
            "configured"
        } else {
            "not configured"
        }
    );
    println!("  Asset codes: {:?}", config.asset_codes.version);

    if validation.has_errors() {
        println!();
        println!(
            "{}",
            "Configuration validation failed. Fix the errors above."
                .red()
                .bold()
        );
        std::process::exit(1);
    } else if validation.has_warnings() {
        println!();
        println!(
            "{}",
            "Configuration is valid with warnings. Review the warnings above."
                .yellow()
                .bold()
        );
    } else {
        println!();
        println!("{}", "Configuration is valid.".green().bold());
    }
    Ok(())
}

fn cmd_config(config: &AppConfig, show_secrets: bool, json: bool) -> Result<()> {
    let display = if show_secrets {
        config.clone()
    } else {
        config.redact_secrets()
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&display)?);
    } else {
        println!("{}", "Current Configuration".bold());
        println!("─────────────────────────");
        print!("{}", serde_yaml::to_string(&display)?);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_import() {
        let cli = Cli::try_parse_from([
            "djoppie-inventory",
            "--format",
            "json",
            "import",
            "assets.csv",
            "--dry-run",
        ])
        .unwrap();
        assert!(cli.format == OutputFormat::Json);
        match cli.command {
            Commands::Import { file, dry_run, .. } => {
                assert_eq!(file, PathBuf::from("assets.csv"));
                assert!(dry_run);
            }
            _ => panic!("expected import"),
        }
    }

    #[test]
    fn test_parse_serve_overrides() {
        let cli =
            Cli::try_parse_from(["djoppie-inventory", "serve", "--port", "9000", "--no-swagger"])
                .unwrap();
        match cli.command {
            Commands::Serve {
                port, no_swagger, ..
            } => {
                assert_eq!(port, Some(9000));
                assert!(no_swagger);
            }
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn test_invalid_format() {
        assert!(Cli::try_parse_from(["djoppie-inventory", "--format", "xml", "validate"]).is_err());
    }
}
