//! # dj-observability
//!
//! Logging and metrics setup for Djoppie Inventory.
//!
//! Logging goes through `tracing` with a `tracing-subscriber` registry;
//! metrics are recorded with the `metrics` facade and rendered in the
//! Prometheus text format.

pub mod logging;
pub mod metrics;

pub use logging::{init_logging, init_logging_with_config, LogFormat, LoggingConfig};
pub use metrics::{install_prometheus_recorder, register_metrics, MetricsError};
