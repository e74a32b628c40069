//! Reqwest-based HTTP provider for webhook delivery.
//!
//! # Example
//!
//! ```rust,ignore
//! use atelier_webhook::reqwest::{ReqwestClient, ReqwestConfig};
//! use atelier_webhook::WebhookService;
//!
//! let client = ReqwestClient::new(ReqwestConfig::default())?;
//! let service: WebhookService = client.into_service();
//! ```

mod client;
mod config;
mod error;

pub use client::ReqwestClient;
pub use config::{DEFAULT_TIMEOUT_SECS, ReqwestConfig};
pub use error::{Error, Result};

/// Tracing target for reqwest client operations.
pub const TRACING_TARGET: &str = "atelier_webhook::reqwest";
