//! Network module with deferred startup lifecycle.
//!
//! `new()` creates resources, `start()` binds the TCP listener, and `serve()`
//! starts accepting deliveries. The caller can read the bound port or grab
//! the shutdown controller between `start()` and `serve()`.

use std::future::{Future, IntoFuture};
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use taskpush_core::{ClockSource, SystemClock};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tracing::{info, warn};

use super::config::NetworkConfig;
use super::handlers::{
    health_handler, liveness_handler, readiness_handler, scheduler_handler, task_handler,
    workflow_routes, AppState,
};
use super::middleware::build_http_layers;
use super::shutdown::ShutdownController;
use crate::service::TaskHandler;

/// Manages the HTTP server lifecycle.
///
/// 1. `new()` -- allocates shared state (task handler, shutdown controller)
/// 2. `start()` -- binds the TCP listener to the configured address
/// 3. `serve()` -- accepts deliveries until the shutdown future resolves
pub struct NetworkModule {
    config: NetworkConfig,
    listener: Option<TcpListener>,
    tasks: Arc<TaskHandler>,
    shutdown: Arc<ShutdownController>,
    clock: Arc<dyn ClockSource>,
}

impl NetworkModule {
    /// Creates a new network module without binding any port.
    #[must_use]
    pub fn new(config: NetworkConfig, tasks: TaskHandler) -> Self {
        Self::with_clock(config, tasks, Arc::new(SystemClock))
    }

    /// Like [`NetworkModule::new`] with an explicit time source for the
    /// scheduler and workflow endpoints.
    #[must_use]
    pub fn with_clock(
        config: NetworkConfig,
        tasks: TaskHandler,
        clock: Arc<dyn ClockSource>,
    ) -> Self {
        Self {
            config,
            listener: None,
            tasks: Arc::new(tasks),
            shutdown: Arc::new(ShutdownController::new()),
            clock,
        }
    }

    /// Returns a shared reference to the shutdown controller.
    #[must_use]
    pub fn shutdown_controller(&self) -> Arc<ShutdownController> {
        Arc::clone(&self.shutdown)
    }

    /// Assembles the axum router with all routes and middleware.
    ///
    /// Routes:
    /// - `POST /` and `POST /tasks` -- task delivery
    /// - `GET|POST /scheduler` -- scheduler trigger
    /// - `POST /workflow/{validate,inventory,shipping,tax,payment,notification}`
    /// - `GET /health`, `GET /health/live`, `GET /health/ready`
    pub fn build_router(&self) -> Router {
        let state = AppState {
            tasks: Arc::clone(&self.tasks),
            shutdown: Arc::clone(&self.shutdown),
            clock: Arc::clone(&self.clock),
            start_time: Instant::now(),
        };

        Router::new()
            .route("/", post(task_handler))
            .route("/tasks", post(task_handler))
            .route("/scheduler", get(scheduler_handler).post(scheduler_handler))
            .nest("/workflow", workflow_routes())
            .route("/health", get(health_handler))
            .route("/health/live", get(liveness_handler))
            .route("/health/ready", get(readiness_handler))
            // Body size is capped by `RequestBodyLimitLayer` instead.
            .layer(DefaultBodyLimit::disable())
            .layer(build_http_layers(&self.config))
            .with_state(state)
    }

    /// Binds the TCP listener to the configured host and port.
    ///
    /// Returns the actual bound port, which differs from the configured one
    /// when port 0 is used.
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot be bound (e.g., port in use).
    pub async fn start(&mut self) -> anyhow::Result<u16> {
        let addr = format!("{}:{}", self.config.host, self.config.port);
        let listener = TcpListener::bind(&addr)
            .await
            .with_context(|| format!("failed to bind {addr}"))?;
        let port = listener.local_addr()?.port();

        info!(host = %self.config.host, port, "TCP listener bound");

        self.listener = Some(listener);
        Ok(port)
    }

    /// Serves deliveries until `shutdown` resolves, then drains.
    ///
    /// After the shutdown signal:
    /// 1. Health state transitions to Draining (readiness returns 503)
    /// 2. axum stops accepting and finishes open connections
    /// 3. If that takes longer than `drain_timeout`, `serve` returns anyway
    ///    and the state stays Draining; otherwise it moves to Stopped
    ///
    /// # Errors
    ///
    /// Returns an error if `start()` was not called first or the server hits
    /// a fatal I/O error.
    pub async fn serve(
        mut self,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> anyhow::Result<()> {
        let listener = self
            .listener
            .take()
            .context("start() must be called before serve()")?;
        let router = self.build_router();
        let shutdown_ctrl = Arc::clone(&self.shutdown);
        let drain_timeout = self.config.drain_timeout;

        shutdown_ctrl.set_ready();
        info!("serving task deliveries");

        let (signalled_tx, signalled_rx) = oneshot::channel::<()>();
        let signal_ctrl = Arc::clone(&shutdown_ctrl);
        let server = axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                shutdown.await;
                info!("shutdown signal received, draining");
                signal_ctrl.trigger_shutdown();
                let _ = signalled_tx.send(());
            })
            .into_future();
        tokio::pin!(server);

        let drained = tokio::select! {
            result = &mut server => {
                result?;
                true
            }
            _ = signalled_rx => match tokio::time::timeout(drain_timeout, &mut server).await {
                Ok(result) => {
                    result?;
                    true
                }
                Err(_) => false,
            },
        };

        // Connections have closed, so every guard is already released.
        if drained && shutdown_ctrl.wait_for_drain(drain_timeout).await {
            info!("all in-flight deliveries completed");
        } else {
            warn!(
                remaining = shutdown_ctrl.in_flight_count(),
                ?drain_timeout,
                "drain timeout reached with deliveries still in flight"
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::io::AsyncWriteExt;
    use tokio::net::TcpStream;

    use super::*;
    use crate::network::HealthState;
    use crate::service::ProcessingConfig;

    fn module() -> NetworkModule {
        NetworkModule::new(
            NetworkConfig {
                host: "127.0.0.1".to_string(),
                drain_timeout: Duration::from_secs(1),
                ..NetworkConfig::default()
            },
            TaskHandler::from_config(&ProcessingConfig::default()),
        )
    }

    #[tokio::test]
    async fn start_binds_an_ephemeral_port() {
        let mut module = module();
        let port = module.start().await.unwrap();
        assert_ne!(port, 0);
    }

    #[tokio::test]
    async fn serve_without_start_is_an_error() {
        let err = module().serve(async {}).await.unwrap_err();
        assert!(err.to_string().contains("start()"));
    }

    #[tokio::test]
    async fn serve_stops_when_shutdown_resolves() {
        let mut module = module();
        module.start().await.unwrap();
        let ctrl = module.shutdown_controller();
        assert_eq!(ctrl.health_state(), HealthState::Starting);

        let (tx, rx) = tokio::sync::oneshot::channel::<()>();
        let server = tokio::spawn(module.serve(async move {
            let _ = rx.await;
        }));

        tx.send(()).unwrap();
        server.await.unwrap().unwrap();
        assert_eq!(ctrl.health_state(), HealthState::Stopped);
    }

    #[tokio::test]
    async fn drain_timeout_bounds_shutdown_with_slow_delivery() {
        let mut module = NetworkModule::new(
            NetworkConfig {
                host: "127.0.0.1".to_string(),
                drain_timeout: Duration::from_millis(200),
                ..NetworkConfig::default()
            },
            TaskHandler::from_config(&ProcessingConfig {
                generic_work: Duration::from_secs(5),
                ..ProcessingConfig::default()
            }),
        );
        let port = module.start().await.unwrap();
        let ctrl = module.shutdown_controller();

        let (tx, rx) = tokio::sync::oneshot::channel::<()>();
        let server = tokio::spawn(module.serve(async move {
            let _ = rx.await;
        }));

        let body = r#"{"operation":"slow"}"#;
        let request = format!(
            "POST /tasks HTTP/1.1\r\nHost: localhost\r\nContent-Type: application/json\r\n\
             Content-Length: {}\r\n\r\n{body}",
            body.len()
        );
        let mut stream = TcpStream::connect(("127.0.0.1", port)).await.unwrap();
        stream.write_all(request.as_bytes()).await.unwrap();

        tokio::time::timeout(Duration::from_secs(2), async {
            while ctrl.in_flight_count() == 0 {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap();

        let signalled_at = std::time::Instant::now();
        tx.send(()).unwrap();
        server.await.unwrap().unwrap();

        assert!(signalled_at.elapsed() < Duration::from_secs(2));
        assert_eq!(ctrl.health_state(), HealthState::Draining);
        assert_eq!(ctrl.in_flight_count(), 1);
        drop(stream);
    }
}
