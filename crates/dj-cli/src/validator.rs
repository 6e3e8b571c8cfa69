//! Startup validation of the effective configuration.

use crate::config::{AppConfig, Environment};
use colored::Colorize;

/// Result of configuration validation.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// Problems that prevent startup.
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    pub fn add_warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Prints the validation result to the console.
    pub fn print(&self) {
        if !self.warnings.is_empty() {
            println!();
            println!("{}", "Configuration Warnings:".yellow().bold());
            for warning in &self.warnings {
                println!("  {} {}", "⚠".yellow(), warning);
            }
        }

        if !self.errors.is_empty() {
            println!();
            println!("{}", "Configuration Errors:".red().bold());
            for error in &self.errors {
                println!("  {} {}", "✗".red(), error);
            }
        }

        if self.errors.is_empty() && self.warnings.is_empty() {
            println!("  {} Configuration OK", "✓".green());
        }
    }
}

pub struct ConfigValidator;

impl ConfigValidator {
    pub fn validate(config: &AppConfig) -> ValidationResult {
        let mut result = ValidationResult::new();
        Self::validate_database(config, &mut result);
        Self::validate_auth(config, &mut result);
        Self::validate_cors(config, &mut result);
        Self::validate_graph(config, &mut result);
        Self::validate_key_vault(config, &mut result);
        Self::validate_server(config, &mut result);
        Self::validate_logging(config, &mut result);
        result
    }

    fn validate_database(config: &AppConfig, result: &mut ValidationResult) {
        let url = &config.database.url;
        if !url.starts_with("sqlite:")
            && !url.starts_with("postgres://")
            && !url.starts_with("postgresql://")
        {
            result.add_error(format!(
                "Invalid database URL '{}'. Must start with sqlite: or postgres://",
                crate::config::redact_url_password(url)
            ));
        }
        if url.contains(":memory:") {
            result.add_warning("In-memory database: all data is lost when the server stops");
        }
        if url.starts_with("sqlite:") && config.environment == Environment::Production {
            result.add_warning(
                "Using SQLite in production. Consider PostgreSQL for concurrent access.",
            );
        }
    }

    fn validate_auth(config: &AppConfig, result: &mut ValidationResult) {
        let auth = &config.auth;
        if !auth.enabled {
            if config.environment == Environment::Production {
                result.add_error(
                    "auth.enabled is false in production. Every request would run as administrator.",
                );
            } else {
                result.add_warning(
                    "Authentication is disabled. All requests run as a development administrator.",
                );
            }
            return;
        }
        if auth.tenant_id.trim().is_empty() {
            result.add_error("Missing required config: auth.tenant_id (Entra ID tenant)");
        }
        if auth.client_id.trim().is_empty() {
            result.add_error("Missing required config: auth.client_id (API app registration)");
        }
        if !auth.authority_host.starts_with("https://") {
            result.add_error(format!(
                "auth.authority_host '{}' must use https",
                auth.authority_host
            ));
        }
    }

    fn validate_cors(config: &AppConfig, result: &mut ValidationResult) {
        let origins = &config.cors.allowed_origins;
        if origins.is_empty() && config.environment == Environment::Production {
            result.add_warning(
                "cors.allowed_origins is empty. Browsers on other origins cannot call the API.",
            );
        }
        for origin in origins {
            if origin == "*" {
                result.add_error("cors.allowed_origins must list origins explicitly, not '*'");
            } else if !origin.starts_with("http://") && !origin.starts_with("https://") {
                result.add_error(format!("Invalid CORS origin '{}'", origin));
            } else if origin.starts_with("http://") && config.environment == Environment::Production
            {
                result.add_warning(format!("CORS origin '{}' is not https", origin));
            }
        }
    }

    fn validate_graph(config: &AppConfig, result: &mut ValidationResult) {
        let graph = &config.graph;
        let any_set = !graph.tenant_id.trim().is_empty()
            || !graph.client_id.trim().is_empty()
            || !graph.client_secret.is_empty();
        if any_set && !graph.is_configured() {
            result.add_error(
                "graph is partially configured: tenant_id, client_id and client_secret are all required",
            );
        } else if !any_set {
            result.add_warning(
                "Microsoft Graph is not configured. User search and Intune lookups return 503.",
            );
        }
    }

    fn validate_key_vault(config: &AppConfig, result: &mut ValidationResult) {
        let vault = &config.key_vault;
        if !vault.is_enabled() {
            return;
        }
        if !vault.url.starts_with("https://") {
            result.add_error(format!("key_vault.url '{}' must use https", vault.url));
        }
        if vault.tenant_id.trim().is_empty()
            || vault.client_id.trim().is_empty()
            || vault.client_secret.is_empty()
        {
            result.add_error(
                "key_vault requires tenant_id, client_id and client_secret when url is set",
            );
        }
    }

    fn validate_server(config: &AppConfig, result: &mut ValidationResult) {
        if let Err(e) = config.server_config() {
            result.add_error(e.to_string());
        }
        if config.server.request_timeout_secs == 0 {
            result.add_error("server.request_timeout_secs must be greater than 0");
        }
        if config.server.enable_swagger && config.environment == Environment::Production {
            result.add_warning("Swagger UI is enabled in production");
        }
    }

    fn validate_logging(config: &AppConfig, result: &mut ValidationResult) {
        let valid = ["trace", "debug", "info", "warn", "error"];
        if !valid.contains(&config.logging.level.to_lowercase().as_str()) {
            result.add_error(format!(
                "Invalid logging.level '{}'. Must be one of: {}",
                config.logging.level,
                valid.join(", ")
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured() -> AppConfig {
        let mut config = AppConfig::default();
        config.auth.tenant_id = "tenant".to_string();
        config.auth.client_id = "client".to_string();
        config.graph.tenant_id = "tenant".to_string();
        config.graph.client_id = "client".to_string();
        config.graph.client_secret = "secret".into();
        config
    }

    #[test]
    fn test_validation_result_operations() {
        let mut result = ValidationResult::new();
        assert!(!result.has_errors());
        assert!(!result.has_warnings());

        result.add_error("error");
        result.add_warning("warning");
        assert!(result.has_errors());
        assert!(result.has_warnings());
    }

    #[test]
    fn test_configured_development_is_clean() {
        let result = ConfigValidator::validate(&configured());
        assert!(!result.has_errors(), "{:?}", result.errors);
        assert!(!result.has_warnings(), "{:?}", result.warnings);
    }

    #[test]
    fn test_default_needs_auth_ids() {
        let result = ConfigValidator::validate(&AppConfig::default());
        assert!(result.errors.iter().any(|e| e.contains("auth.tenant_id")));
        assert!(result.errors.iter().any(|e| e.contains("auth.client_id")));
    }

    #[test]
    fn test_auth_disabled_in_production_is_an_error() {
        let mut config = configured();
        config.auth.enabled = false;
        assert!(!ConfigValidator::validate(&config).has_errors());

        config.environment = Environment::Production;
        assert!(ConfigValidator::validate(&config).has_errors());
    }

    #[test]
    fn test_database_url() {
        let mut config = configured();
        config.database.url = "mysql://localhost/inventory".to_string();
        assert!(ConfigValidator::validate(&config)
            .errors
            .iter()
            .any(|e| e.contains("database URL")));

        config.database.url = "postgres://u:p@db/inventory".to_string();
        assert!(!ConfigValidator::validate(&config).has_errors());
    }

    #[test]
    fn test_cors_wildcard_rejected() {
        let mut config = configured();
        config.cors.allowed_origins = vec!["*".to_string()];
        assert!(ConfigValidator::validate(&config).has_errors());
    }

    #[test]
    fn test_partial_graph_config() {
        let mut config = configured();
        config.graph.client_secret = "".into();
        assert!(ConfigValidator::validate(&config)
            .errors
            .iter()
            .any(|e| e.contains("graph")));
    }

    #[test]
    fn test_key_vault_needs_credentials() {
        let mut config = configured();
        config.key_vault.url = "https://djoppie-kv.vault.azure.net".to_string();
        assert!(ConfigValidator::validate(&config)
            .errors
            .iter()
            .any(|e| e.contains("key_vault")));
    }

    #[test]
    fn test_invalid_log_level() {
        let mut config = configured();
        config.logging.level = "loud".to_string();
        assert!(ConfigValidator::validate(&config).has_errors());
    }
}
