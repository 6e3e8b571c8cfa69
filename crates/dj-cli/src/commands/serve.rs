//! Serve command: starts the API server.

use anyhow::{Context, Result};
use colored::Colorize;
use std::sync::Arc;

use dj_api::{ApiServer, AppState, JwtValidator};
use dj_connectors::{GraphUserConnector, IntuneConnector};
use dj_core::AssetCodeGenerator;

use super::open_database;
use crate::config::{redact_url_password, AppConfig};

/// Command-line flags that win over the config file.
#[derive(Debug, Clone, Default)]
pub struct ServeOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub no_swagger: bool,
}

impl ServeOverrides {
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if self.no_swagger {
            config.server.enable_swagger = false;
        }
    }
}

pub async fn run_server(config: AppConfig) -> Result<()> {
    println!("{} Starting Djoppie Inventory API...", "[server]".cyan());

    let server_config = config.server_config()?;
    let pool = open_database(&config, false).await?;
    println!("  {} Migrations complete", "✓".green());

    let generator = AssetCodeGenerator::new(config.asset_codes.version);
    let mut state =
        AppState::with_location_codes(pool, generator, config.asset_codes.include_location);

    match dj_observability::install_prometheus_recorder() {
        Ok(handle) => state = state.with_prometheus_handle(handle),
        Err(e) => tracing::warn!(error = %e, "Metrics exporter not installed"),
    }

    if config.auth.enabled {
        let validator =
            JwtValidator::new(config.auth.clone()).context("Invalid auth configuration")?;
        state = state.with_auth(validator);
    } else {
        println!(
            "  {} Authentication disabled, requests run as a development admin",
            "!".yellow()
        );
    }

    if config.graph.is_configured() {
        let users = GraphUserConnector::new(&config.graph)
            .context("Failed to create Microsoft Graph client")?;
        let devices =
            IntuneConnector::new(&config.graph).context("Failed to create Intune client")?;
        state = state
            .with_user_directory(Arc::new(users))
            .with_device_management(Arc::new(devices));
    }

    let bind_address = server_config.bind_address;
    let enable_swagger = server_config.enable_swagger;

    println!();
    println!("{}", "Djoppie Inventory API".bold());
    println!("{}", "═".repeat(40));
    println!("  {} {}", "Environment:".cyan(), config.environment);
    println!("  {} http://{}", "Address:".cyan(), bind_address);
    println!(
        "  {} {}",
        "Database:".cyan(),
        redact_url_password(&config.database.url)
    );
    println!(
        "  {} {}",
        "Graph:".cyan(),
        if config.graph.is_configured() {
            "configured"
        } else {
            "not configured"
        }
    );
    if enable_swagger {
        println!(
            "  {} http://{}/swagger-ui",
            "Swagger UI:".cyan(),
            bind_address
        );
    }
    println!();
    println!("{}", "Endpoints:".bold());
    println!("  GET  /health                      - Health check");
    println!("  GET  /health/ready                - Readiness probe");
    println!("  GET  /api/v1/assets               - List assets");
    println!("  POST /api/v1/assets/bulk          - Bulk create");
    println!("  POST /api/v1/import/csv           - Import CSV");
    println!("  GET  /api/v1/export/csv           - Export CSV");
    println!("  GET  /metrics                     - Prometheus metrics");
    println!();
    println!("Press {} to stop", "Ctrl+C".yellow());
    println!();

    ApiServer::new(state, server_config)
        .run()
        .await
        .context("Server error")?;

    println!();
    println!("{} Server stopped", "[server]".cyan());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_win() {
        let mut config = AppConfig::default();
        ServeOverrides {
            host: Some("127.0.0.1".to_string()),
            port: Some(9999),
            no_swagger: true,
        }
        .apply(&mut config);

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 9999);
        assert!(!config.server.enable_swagger);
    }

    #[test]
    fn test_no_overrides_keep_config() {
        let mut config = AppConfig::default();
        config.server.port = 7000;
        ServeOverrides::default().apply(&mut config);
        assert_eq!(config.server.port, 7000);
        assert!(config.server.enable_swagger);
    }
}
