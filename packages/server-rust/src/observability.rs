//! Logging and metrics setup.
//!
//! Logging goes through `tracing` with an `EnvFilter` (`RUST_LOG`, default
//! `info`). Metrics go through the `metrics` facade; without an installed
//! recorder they are no-ops, so tests and embedders pay nothing.

use std::net::SocketAddr;
use std::sync::Once;

use metrics::{describe_counter, describe_histogram, Unit};
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static INIT: Once = Once::new();

/// Deliveries resolved, labelled by terminal `outcome` state.
pub const DELIVERIES_TOTAL: &str = "taskpush_deliveries_total";

/// Routine run time, labelled by `operation` and `outcome`.
pub const PROCESSING_DURATION: &str = "taskpush_processing_seconds";

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// JSON structured logs (for production).
    Json,
    /// Pretty-printed logs (for development).
    #[default]
    Pretty,
}

/// Initializes the logging subsystem.
///
/// Safe to call multiple times; subsequent calls are no-ops.
pub fn init_logging(format: LogFormat) {
    INIT.call_once(|| {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        match format {
            LogFormat::Json => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(fmt::layer().json())
                    .init();
            }
            LogFormat::Pretty => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(fmt::layer().pretty())
                    .init();
            }
        }
    });
}

/// Installs the Prometheus recorder and its scrape listener on `addr`.
///
/// # Errors
///
/// Returns an error if a recorder is already installed or the listener
/// cannot be bound.
pub fn install_metrics_exporter(addr: SocketAddr) -> anyhow::Result<()> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;
    describe_metrics();
    Ok(())
}

fn describe_metrics() {
    describe_counter!(DELIVERIES_TOTAL, "Task deliveries resolved, by outcome");
    describe_histogram!(
        PROCESSING_DURATION,
        Unit::Seconds,
        "Time spent in a processing routine"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_logging_is_idempotent() {
        init_logging(LogFormat::Pretty);
        init_logging(LogFormat::Json);
    }

    #[test]
    fn log_format_parses_from_cli_values() {
        use clap::ValueEnum;

        assert_eq!(LogFormat::from_str("json", true).unwrap(), LogFormat::Json);
        assert_eq!(LogFormat::from_str("pretty", true).unwrap(), LogFormat::Pretty);
        assert!(LogFormat::from_str("xml", true).is_err());
    }
}
