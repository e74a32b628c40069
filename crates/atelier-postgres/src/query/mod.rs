//! Repository traits implemented for [`PgConnection`].
//!
//! [`PgConnection`]: crate::PgConnection
//!
//! # Pagination
//!
//! Subscription listings take a [`Pagination`]. Log listings are
//! recent-first and take a caller-supplied limit, see [`Pagination::recent`].

mod action;
mod action_run;
mod webhook;
mod webhook_delivery;

pub use action::ActionRepository;
pub use action_run::ActionRunRepository;
use serde::{Deserialize, Serialize};
pub use webhook::WebhookRepository;
pub use webhook_delivery::WebhookDeliveryRepository;

/// Default number of log entries returned when the caller gives no limit.
pub const DEFAULT_LOG_LIMIT: i64 = 20;

/// Largest number of log entries returned by a single query.
pub const MAX_LOG_LIMIT: i64 = 100;

/// Pagination parameters for database queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// Maximum number of records to return.
    pub limit: i64,
    /// Number of records to skip.
    pub offset: i64,
}

impl Pagination {
    /// Creates a new pagination instance with the limit clamped to 1..=1000.
    pub fn new(limit: i64, offset: i64) -> Self {
        Self {
            limit: limit.clamp(1, 1000),
            offset: offset.max(0),
        }
    }

    /// Creates pagination from a 1-based page number and page size.
    pub fn from_page(page: i64, page_size: i64) -> Self {
        let page = page.max(1);
        let page_size = page_size.clamp(1, 1000);
        Self::new(page_size, (page - 1) * page_size)
    }

    /// First page of a recent-first log listing.
    ///
    /// Defaults to [`DEFAULT_LOG_LIMIT`] and never exceeds [`MAX_LOG_LIMIT`].
    pub fn recent(limit: Option<i64>) -> Self {
        Self::new(limit.unwrap_or(DEFAULT_LOG_LIMIT).clamp(1, MAX_LOG_LIMIT), 0)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(50, 0)
    }
}
