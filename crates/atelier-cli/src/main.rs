#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod config;
mod server;

use std::process;

use anyhow::Context;
use atelier_server::automation::ScheduleDriver;
use atelier_server::handler::routes;
use atelier_server::middleware::{RecoveryConfig, RouterObservabilityExt, RouterRecoveryExt};
use atelier_server::service::ServiceState;
use axum::Router;
use tokio_util::sync::CancellationToken;

use crate::config::Cli;

pub const TRACING_TARGET_SERVER_STARTUP: &str = "atelier_cli::server::startup";
pub const TRACING_TARGET_SERVER_SHUTDOWN: &str = "atelier_cli::server::shutdown";
pub const TRACING_TARGET_CONFIG: &str = "atelier_cli::config";

#[tokio::main]
async fn main() {
    let Err(error) = run().await else {
        tracing::info!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            "Application terminated successfully"
        );
        process::exit(0);
    };

    if tracing::enabled!(tracing::Level::ERROR) {
        tracing::error!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            error = %error,
            "Application terminated with error"
        );
    } else {
        eprintln!("Error: {error:#}");
    }

    process::exit(1);
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::init();
    Cli::init_tracing();

    cli.validate()?;
    cli.log();

    let state = ServiceState::from_config(&cli.service)
        .await
        .context("failed to create service state")?;

    let cancel = CancellationToken::new();
    let schedule = cli.service.automation.schedule_interval().map(|interval| {
        ScheduleDriver::new(state.bus.clone(), interval).spawn(cancel.child_token())
    });

    let bus = state.bus.clone();
    let router = create_router(state, &cli.middleware.recovery);
    let served = server::serve(router, &cli.server).await;

    cancel.cancel();
    if let Some(handle) = schedule
        && let Err(err) = handle.await
    {
        tracing::warn!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            error = %err,
            "Schedule driver did not stop cleanly"
        );
    }

    server::drain(&bus, cli.server.shutdown_timeout()).await;
    served.context("server terminated abnormally")
}

/// Applies the middleware stack around the API routes.
///
/// Layers added last run first: recovery wraps observability, which wraps
/// the handlers.
fn create_router(state: ServiceState, recovery: &RecoveryConfig) -> Router {
    routes()
        .with_state(state)
        .with_observability()
        .with_recovery(recovery)
}
