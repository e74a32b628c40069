//! Command-line and environment configuration.
//!
//! ```text
//! Cli
//! ├── server: ServerConfig          # Host, port, shutdown timeout
//! ├── middleware: MiddlewareConfig  # Request timeout
//! └── service: ServiceConfig        # Postgres, webhook client, automation, auth
//! ```
//!
//! Every option can be given as a flag or through its environment variable.

mod middleware;
mod server;

use std::process;

use anyhow::Context;
use atelier_server::service::ServiceConfig;
use clap::Parser;
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

pub use self::middleware::MiddlewareConfig;
pub use self::server::ServerConfig;
use crate::{TRACING_TARGET_CONFIG, TRACING_TARGET_SERVER_STARTUP};

/// Complete CLI configuration.
#[derive(Debug, Clone, Parser, Serialize, Deserialize)]
#[command(name = "atelier")]
#[command(about = "Atelier webhook and automation server")]
#[command(version)]
pub struct Cli {
    /// Network binding and shutdown.
    #[clap(flatten)]
    pub server: ServerConfig,

    /// HTTP middleware.
    #[clap(flatten)]
    pub middleware: MiddlewareConfig,

    /// Database, outbound HTTP, automation limits and auth keys.
    #[clap(flatten)]
    pub service: ServiceConfig,
}

impl Cli {
    /// Loads `.env` (when enabled) and parses arguments.
    ///
    /// The file is read first so clap sees its values as environment defaults.
    pub fn init() -> Self {
        Self::load_dotenv();
        Self::parse()
    }

    #[cfg(feature = "dotenv")]
    fn load_dotenv() {
        if let Err(err) = dotenvy::dotenv()
            && !err.not_found()
        {
            eprintln!("Warning: failed to load .env file: {err}");
        }
    }

    #[cfg(not(feature = "dotenv"))]
    fn load_dotenv() {}

    /// Installs the global subscriber, filtered by `RUST_LOG` (default `info`).
    pub fn init_tracing() {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let registry = tracing_subscriber::registry().with(filter);

        if cfg!(feature = "json-logs") {
            registry.with(tracing_subscriber::fmt::layer().json()).init();
        } else {
            registry.with(tracing_subscriber::fmt::layer()).init();
        }
    }

    /// Validates the sections that can be checked without I/O.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.server
            .validate()
            .context("invalid server configuration")?;
        self.service
            .validate()
            .context("invalid service configuration")?;
        Ok(())
    }

    /// Logs the configuration without secrets.
    pub fn log(&self) {
        Self::log_build_info();
        self.server.log();
        self.middleware.log();

        let postgres = &self.service.postgres;
        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            postgres_max_connections = postgres.postgres_max_connections,
            postgres_connection_timeout_secs = ?postgres.postgres_connection_timeout_secs,
            postgres_idle_timeout_secs = ?postgres.postgres_idle_timeout_secs,
            "Database configuration"
        );

        let automation = &self.service.automation;
        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            webhook_timeout_secs = self.service.webhook.http_timeout,
            max_concurrent_deliveries = automation.delivery_permits(),
            max_concurrent_runs = automation.run_permits(),
            schedule_interval_secs = ?automation.schedule_interval().map(|d| d.as_secs()),
            "Automation configuration"
        );
    }

    fn log_build_info() {
        tracing::debug!(
            target: TRACING_TARGET_SERVER_STARTUP,
            version = env!("CARGO_PKG_VERSION"),
            pid = process::id(),
            arch = std::env::consts::ARCH,
            os = std::env::consts::OS,
            features = ?Self::enabled_features(),
            "Build information"
        );
    }

    fn enabled_features() -> Vec<&'static str> {
        [
            cfg!(feature = "dotenv").then_some("dotenv"),
            cfg!(feature = "json-logs").then_some("json-logs"),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}
