//! HTTP listener, graceful shutdown and draining of background work.

mod error;
mod lifecycle;
mod shutdown;

use std::time::Duration;

use atelier_server::automation::EventBus;
use axum::Router;
use tokio::net::TcpListener;

pub use self::error::{ServerError, ServerResult};
use self::shutdown::shutdown_signal;
use crate::config::ServerConfig;
use crate::{TRACING_TARGET_SERVER_SHUTDOWN, TRACING_TARGET_SERVER_STARTUP};

/// Binds the configured address and serves `app` until a termination signal.
///
/// Returns once the listener is closed and open connections have finished.
pub async fn serve(app: Router, config: &ServerConfig) -> ServerResult<()> {
    let addr = config.server_addr();
    let listener = TcpListener::bind(addr).await.map_err(|source| {
        let err = ServerError::Bind {
            address: addr.to_string(),
            source,
        };
        lifecycle::log_failure(&err);
        err
    })?;

    tracing::info!(
        target: TRACING_TARGET_SERVER_STARTUP,
        addr = %addr,
        "Successfully bound to address"
    );

    lifecycle::serve_with_shutdown(config, || async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
    })
    .await
}

/// Waits up to `timeout` for queued deliveries and action runs.
pub async fn drain(bus: &EventBus, timeout: Duration) {
    if tokio::time::timeout(timeout, bus.shutdown()).await.is_err() {
        tracing::warn!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            in_flight = bus.in_flight(),
            timeout_secs = timeout.as_secs(),
            "Shutdown timeout elapsed with work still in flight"
        );
    }
}
