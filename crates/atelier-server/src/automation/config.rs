//! Fan-out limits and schedule settings.

use std::time::Duration;

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};

/// Default number of webhook deliveries allowed in flight at once.
pub const DEFAULT_MAX_CONCURRENT_DELIVERIES: usize = 64;

/// Default number of action runs allowed in flight at once.
pub const DEFAULT_MAX_CONCURRENT_RUNS: usize = 32;

/// Configuration of the automation core.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "config does nothing unless you use it"]
pub struct AutomationConfig {
    /// Maximum number of webhook deliveries running concurrently
    #[cfg_attr(
        feature = "config",
        arg(
            long = "max-concurrent-deliveries",
            env = "MAX_CONCURRENT_DELIVERIES",
            default_value = "64"
        )
    )]
    pub max_concurrent_deliveries: usize,

    /// Maximum number of action runs executing concurrently
    #[cfg_attr(
        feature = "config",
        arg(
            long = "max-concurrent-runs",
            env = "MAX_CONCURRENT_RUNS",
            default_value = "32"
        )
    )]
    pub max_concurrent_runs: usize,

    /// Interval in seconds between `schedule` events (disabled when unset or zero)
    #[cfg_attr(
        feature = "config",
        arg(long = "schedule-interval-secs", env = "SCHEDULE_INTERVAL_SECS")
    )]
    pub schedule_interval_secs: Option<u64>,
}

impl Default for AutomationConfig {
    fn default() -> Self {
        Self {
            max_concurrent_deliveries: DEFAULT_MAX_CONCURRENT_DELIVERIES,
            max_concurrent_runs: DEFAULT_MAX_CONCURRENT_RUNS,
            schedule_interval_secs: None,
        }
    }
}

impl AutomationConfig {
    /// Sets the delivery concurrency limit.
    pub fn with_max_concurrent_deliveries(mut self, limit: usize) -> Self {
        self.max_concurrent_deliveries = limit;
        self
    }

    /// Sets the run concurrency limit.
    pub fn with_max_concurrent_runs(mut self, limit: usize) -> Self {
        self.max_concurrent_runs = limit;
        self
    }

    /// Enables the schedule driver with the given interval.
    pub fn with_schedule_interval_secs(mut self, secs: u64) -> Self {
        self.schedule_interval_secs = Some(secs);
        self
    }

    /// Delivery permits, never less than one.
    #[inline]
    pub fn delivery_permits(&self) -> usize {
        self.max_concurrent_deliveries.max(1)
    }

    /// Run permits, never less than one.
    #[inline]
    pub fn run_permits(&self) -> usize {
        self.max_concurrent_runs.max(1)
    }

    /// Returns the schedule interval, if the driver is enabled.
    pub fn schedule_interval(&self) -> Option<Duration> {
        self.schedule_interval_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}
