//! Network module with deferred startup lifecycle.
//!
//! `new()` assembles shared state, `start()` binds the TCP listener, and
//! `serve()` accepts requests until shutdown. The bound port is known
//! between `start()` and `serve()`, which the binary logs for the host.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tracing::{info, warn};

use super::config::NetworkConfig;
use super::handlers::{
    health_handler, invoke_handler, liveness_handler, readiness_handler, AppState,
};
use super::middleware::build_http_layers;
use super::shutdown::ShutdownController;
use crate::service::{build_invocation_pipeline, FunctionRouter, InvocationService, ServerConfig};

/// Manages the custom-handler HTTP server lifecycle.
pub struct NetworkModule {
    config: NetworkConfig,
    listener: Option<TcpListener>,
    state: AppState,
}

impl NetworkModule {
    /// Builds the invocation pipeline over `router` without binding any port.
    #[must_use]
    pub fn new(config: NetworkConfig, server: ServerConfig, router: FunctionRouter) -> Self {
        let server = Arc::new(server);
        let functions = Arc::new(router.function_names());
        let state = AppState {
            intake: Arc::new(InvocationService::new(Arc::clone(&server))),
            pipeline: build_invocation_pipeline(router, &server),
            shutdown: Arc::new(ShutdownController::new()),
            functions,
            start_time: Instant::now(),
        };
        Self {
            config,
            listener: None,
            state,
        }
    }

    #[must_use]
    pub fn shutdown_controller(&self) -> Arc<ShutdownController> {
        Arc::clone(&self.state.shutdown)
    }

    /// Assembles the axum router.
    ///
    /// Routes:
    /// - `GET /health` -- detailed health JSON
    /// - `GET /health/live` -- liveness probe
    /// - `GET /health/ready` -- readiness probe
    /// - `POST /{function}` -- one invocation of a registered function
    pub fn build_router(&self) -> Router {
        Router::new()
            .route("/health", get(health_handler))
            .route("/health/live", get(liveness_handler))
            .route("/health/ready", get(readiness_handler))
            .route("/{function}", post(invoke_handler))
            .layer(build_http_layers(&self.config))
            .with_state(self.state.clone())
    }

    /// Binds the TCP listener to the configured host and port.
    ///
    /// Returns the bound port, which differs from the configured one when
    /// port 0 asks the OS for an ephemeral port.
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot be bound.
    pub async fn start(&mut self) -> anyhow::Result<u16> {
        let addr = format!("{}:{}", self.config.host, self.config.port);
        let listener = TcpListener::bind(&addr).await?;
        let port = listener.local_addr()?.port();

        info!("TCP listener bound to {}:{}", self.config.host, port);

        self.listener = Some(listener);
        Ok(port)
    }

    /// Serves requests until `shutdown` resolves, then drains in-flight
    /// invocations for up to `drain_timeout`.
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
            .ok_or_else(|| anyhow::anyhow!("start() must be called before serve()"))?;
        let router = self.build_router();
        let shutdown_ctrl = Arc::clone(&self.state.shutdown);

        shutdown_ctrl.set_ready();
        info!(functions = ?self.state.functions, "accepting invocations");

        let signal_ctrl = Arc::clone(&shutdown_ctrl);
        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                shutdown.await;
                signal_ctrl.trigger_shutdown();
            })
            .await?;

        // Covers the case where the server exited without the signal firing.
        shutdown_ctrl.trigger_shutdown();
        if shutdown_ctrl.wait_for_drain(self.config.drain_timeout).await {
            info!("all invocations drained");
        } else {
            warn!(
                in_flight = shutdown_ctrl.in_flight_count(),
                "drain timeout expired with invocations still running"
            );
        }
        Ok(())
    }
}
