//! Router layers.
//!
//! ```rust,no_run
//! use axum::Router;
//! use atelier_server::middleware::{RecoveryConfig, RouterObservabilityExt, RouterRecoveryExt};
//!
//! let app: Router = Router::new()
//!     .with_recovery(&RecoveryConfig::default())
//!     .with_observability();
//! ```

mod observability;
mod recovery;

pub use self::observability::RouterObservabilityExt;
pub use self::recovery::{RecoveryConfig, RouterRecoveryExt};

/// Tracing target for timeouts and layer errors.
pub const TRACING_TARGET_RECOVERY: &str = "atelier_server::middleware::recovery";

/// Tracing target for caught handler panics.
pub const TRACING_TARGET_PANIC: &str = "atelier_server::middleware::panic";
