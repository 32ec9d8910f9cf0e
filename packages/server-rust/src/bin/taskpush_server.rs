//! `taskpush-server` binary: parses configuration, wires the task handler
//! into the network module, and serves until Ctrl-C or SIGTERM.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tokio::signal;
use tracing::{info, warn};

use taskpush_server::observability::{init_logging, install_metrics_exporter, LogFormat};
use taskpush_server::{NetworkConfig, NetworkModule, ProcessingConfig, TaskHandler};

#[derive(Debug, Parser)]
#[command(name = "taskpush-server")]
#[command(about = "Consumes push deliveries from a task queue over HTTP")]
#[command(version)]
struct Args {
    /// Bind address.
    #[arg(long, env = "TASKPUSH_HOST", default_value = "0.0.0.0")]
    host: String,

    /// Listen port. 0 picks an ephemeral port.
    #[arg(long, env = "PORT", default_value = "8080")]
    port: u16,

    #[arg(long, env = "TASKPUSH_LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,

    /// Serve Prometheus metrics on this port. Disabled when unset.
    #[arg(long, env = "TASKPUSH_METRICS_PORT")]
    metrics_port: Option<u16>,

    /// Simulated work for `resize`, in milliseconds.
    #[arg(long, default_value = "1000")]
    resize_ms: u64,

    /// Simulated work for `thumbnail`, in milliseconds.
    #[arg(long, default_value = "500")]
    thumbnail_ms: u64,

    /// Simulated work for any other operation, in milliseconds.
    #[arg(long, default_value = "500")]
    generic_ms: u64,

    /// How long shutdown waits for in-flight deliveries.
    #[arg(long, default_value = "30")]
    drain_timeout_secs: u64,

    #[arg(long, default_value = "1048576")]
    max_body_bytes: usize,
}

impl Args {
    fn network_config(&self) -> NetworkConfig {
        NetworkConfig {
            host: self.host.clone(),
            port: self.port,
            max_body_bytes: self.max_body_bytes,
            drain_timeout: Duration::from_secs(self.drain_timeout_secs),
        }
    }

    fn processing_config(&self) -> ProcessingConfig {
        ProcessingConfig {
            resize_work: Duration::from_millis(self.resize_ms),
            thumbnail_work: Duration::from_millis(self.thumbnail_ms),
            generic_work: Duration::from_millis(self.generic_ms),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_format);

    if let Some(port) = args.metrics_port {
        let addr = SocketAddr::from(([0, 0, 0, 0], port));
        install_metrics_exporter(addr)?;
        info!(%addr, "prometheus exporter listening");
    }

    let processing = args.processing_config();
    info!(?processing, "starting taskpush-server");

    let mut module = NetworkModule::new(args.network_config(), TaskHandler::from_config(&processing));
    let port = module.start().await?;
    info!(port, "task endpoint ready");

    module.serve(shutdown_signal()).await?;

    info!("taskpush-server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl-C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("received Ctrl-C"),
        () = terminate => info!("received SIGTERM"),
    }
}
