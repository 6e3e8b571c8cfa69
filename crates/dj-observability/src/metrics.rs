//! Prometheus metrics.
//!
//! Counters are recorded where the work happens (`dj-core` services and
//! `dj-connectors`) through the `metrics` facade. This module describes them
//! and installs the recorder whose handle renders `/metrics`.

use metrics::{describe_counter, describe_histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use thiserror::Error;

pub const ASSETS_CREATED_TOTAL: &str = "assets_created_total";
pub const CSV_ROWS_IMPORTED_TOTAL: &str = "csv_rows_imported_total";
pub const GRAPH_LOOKUPS_TOTAL: &str = "graph_lookups_total";
pub const HTTP_REQUESTS_TOTAL: &str = "http_requests_total";
pub const HTTP_REQUEST_DURATION_SECONDS: &str = "http_request_duration_seconds";

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("failed to install Prometheus recorder: {0}")]
    Install(#[from] BuildError),
}

/// Registers metric descriptions.
pub fn register_metrics() {
    describe_counter!(
        ASSETS_CREATED_TOTAL,
        "Assets created, labelled by source (api, bulk, import)"
    );
    describe_counter!(
        CSV_ROWS_IMPORTED_TOTAL,
        "CSV rows processed by the importer, labelled by outcome"
    );
    describe_counter!(
        GRAPH_LOOKUPS_TOTAL,
        "Microsoft Graph and Intune lookups, labelled by operation and outcome"
    );
    describe_counter!(
        HTTP_REQUESTS_TOTAL,
        "HTTP requests served, labelled by method and status"
    );
    describe_histogram!(
        HTTP_REQUEST_DURATION_SECONDS,
        "HTTP request latency in seconds"
    );
}

/// Installs the global Prometheus recorder and registers descriptions.
///
/// Only one recorder can be installed per process; a second call fails.
pub fn install_prometheus_recorder() -> Result<PrometheusHandle, MetricsError> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    register_metrics();
    Ok(handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use metrics::counter;

    #[test]
    fn test_recorder_renders_counters() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();
        metrics::with_local_recorder(&recorder, || {
            register_metrics();
            counter!(ASSETS_CREATED_TOTAL, "source" => "api").increment(2);
            counter!(GRAPH_LOOKUPS_TOTAL, "operation" => "search_users", "outcome" => "ok")
                .increment(1);
        });

        let rendered = handle.render();
        assert!(rendered.contains("assets_created_total{source=\"api\"} 2"));
        assert!(rendered.contains("# HELP assets_created_total"));
        assert!(rendered.contains("graph_lookups_total"));
    }
}
