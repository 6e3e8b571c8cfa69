//! Logging infrastructure.

use serde::{Deserialize, Serialize};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// Crates whose events are shown at the configured level by default.
const WORKSPACE_TARGETS: &[&str] = &[
    "dj_core",
    "dj_connectors",
    "dj_observability",
    "dj_api",
    "djoppie_inventory",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Logging configuration, also the `logging` section of the config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Level for workspace crates (`trace`..`error`).
    pub level: String,
    pub format: LogFormat,
    /// Emit span open/close events.
    pub include_spans: bool,
    /// Include file and line of the call site.
    pub include_location: bool,
    pub include_thread_ids: bool,
    pub include_target: bool,
    /// Extra `EnvFilter` directives appended to the defaults, e.g. `sqlx=warn`.
    pub directives: Vec<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
            include_spans: false,
            include_location: true,
            include_thread_ids: false,
            include_target: true,
            directives: Vec::new(),
        }
    }
}

impl LoggingConfig {
    /// Verbose text output for local work.
    pub fn development() -> Self {
        Self {
            level: "debug".to_string(),
            format: LogFormat::Text,
            include_spans: true,
            include_location: true,
            include_thread_ids: true,
            include_target: true,
            directives: vec!["sqlx=warn".to_string(), "tower_http=debug".to_string()],
        }
    }

    /// JSON lines for log aggregation.
    pub fn production() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Json,
            include_spans: false,
            include_location: false,
            include_thread_ids: false,
            include_target: true,
            directives: vec!["sqlx=warn".to_string()],
        }
    }

    /// Filter used when `RUST_LOG` is not set.
    pub fn default_directives(&self) -> String {
        let level = normalize_level(&self.level);
        let mut parts: Vec<String> = WORKSPACE_TARGETS
            .iter()
            .map(|target| format!("{}={}", target, level))
            .collect();
        parts.extend(self.directives.iter().cloned());
        parts.join(",")
    }
}

fn normalize_level(level: &str) -> &'static str {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => "trace",
        "debug" => "debug",
        "warn" | "warning" => "warn",
        "error" => "error",
        _ => "info",
    }
}

/// Initializes the logging system with default configuration.
pub fn init_logging() {
    init_logging_with_config(&LoggingConfig::default());
}

/// Initializes the logging system. `RUST_LOG` takes precedence over the
/// configured level. Calling it a second time is a no-op.
pub fn init_logging_with_config(config: &LoggingConfig) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.default_directives()));

    let span_events = if config.include_spans {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let result = match config.format {
        LogFormat::Json => {
            let fmt_layer = fmt::layer()
                .json()
                .with_span_events(span_events)
                .with_file(config.include_location)
                .with_line_number(config.include_location)
                .with_thread_ids(config.include_thread_ids)
                .with_target(config.include_target);

            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt_layer)
                .try_init()
        }
        LogFormat::Text => {
            let fmt_layer = fmt::layer()
                .with_span_events(span_events)
                .with_file(config.include_location)
                .with_line_number(config.include_location)
                .with_thread_ids(config.include_thread_ids)
                .with_target(config.include_target);

            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt_layer)
                .try_init()
        }
    };

    if result.is_err() {
        tracing::debug!("Global subscriber already set, keeping it");
    }
}

/// Span for work on one asset.
#[macro_export]
macro_rules! asset_span {
    ($asset_id:expr) => {
        tracing::info_span!("asset", asset_id = %$asset_id)
    };
    ($asset_id:expr, $($field:tt)*) => {
        tracing::info_span!("asset", asset_id = %$asset_id, $($field)*)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, "info");
        assert_eq!(config.format, LogFormat::Text);
    }

    #[test]
    fn test_production_config() {
        let config = LoggingConfig::production();
        assert_eq!(config.format, LogFormat::Json);
        assert!(!config.include_location);
    }

    #[test]
    fn test_development_config() {
        let config = LoggingConfig::development();
        assert_eq!(config.level, "debug");
        assert!(config.include_spans);
    }

    #[test]
    fn test_default_directives() {
        let mut config = LoggingConfig::default();
        config.level = "WARNING".to_string();
        config.directives = vec!["sqlx=error".to_string()];
        let directives = config.default_directives();
        assert!(directives.starts_with("dj_core=warn,"));
        assert!(directives.contains("djoppie_inventory=warn"));
        assert!(directives.ends_with(",sqlx=error"));
    }

    #[test]
    fn test_unknown_level_falls_back_to_info() {
        assert_eq!(normalize_level("loud"), "info");
        assert_eq!(normalize_level(" Trace "), "trace");
    }

    #[test]
    fn test_format_from_yaml_style_value() {
        let config: LoggingConfig =
            serde_json::from_str(r#"{"level":"debug","format":"json"}"#).unwrap();
        assert_eq!(config.format, LogFormat::Json);
        assert!(config.include_target);
    }

    #[test]
    fn test_init_twice_does_not_panic() {
        init_logging();
        init_logging_with_config(&LoggingConfig::production());
    }
}
