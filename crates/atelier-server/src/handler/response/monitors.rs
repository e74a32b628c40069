//! Health response types.

use atelier_postgres::PgPoolStatus;
use atelier_webhook::ServiceStatus;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// Connection pool snapshot, only shown to authenticated callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseStatus {
    pub max_size: usize,
    pub size: usize,
    pub available: usize,
    pub waiting: usize,
    pub utilization: f64,
}

impl From<PgPoolStatus> for DatabaseStatus {
    fn from(status: PgPoolStatus) -> Self {
        Self {
            max_size: status.max_size,
            size: status.size,
            available: status.available,
            waiting: status.waiting,
            utilization: status.utilization(),
        }
    }
}

/// Liveness report.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: ServiceStatus,
    pub version: String,
    pub checked_at: Timestamp,
    /// Events or runs still being processed in the background.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub in_flight: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<DatabaseStatus>,
}

impl Default for HealthStatus {
    fn default() -> Self {
        Self {
            status: ServiceStatus::Healthy,
            version: env!("CARGO_PKG_VERSION").to_owned(),
            checked_at: Timestamp::now(),
            in_flight: None,
            database: None,
        }
    }
}
