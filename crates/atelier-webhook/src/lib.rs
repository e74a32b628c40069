#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod error;
mod health;
mod service;

pub mod envelope;
pub mod request;
pub mod response;
pub mod signature;

#[cfg(feature = "reqwest")]
#[cfg_attr(docsrs, doc(cfg(feature = "reqwest")))]
pub mod reqwest;

pub use envelope::WebhookEnvelope;
pub use error::{BoxedError, Error, ErrorKind, Result};
pub use health::{ServiceHealth, ServiceStatus};
pub use request::WebhookRequest;
pub use response::WebhookResponse;
pub use service::WebhookService;
pub use signature::{generate_secret, sign, verify_signature};

/// Tracing target for webhook delivery.
pub const TRACING_TARGET: &str = "atelier_webhook::delivery";

/// Core trait for webhook delivery operations.
///
/// A provider performs exactly one attempt per call. An `Err` means no HTTP
/// status was obtained (connection refused, timeout, invalid request); any
/// status, including non-2xx, is an `Ok` response.
#[async_trait::async_trait]
pub trait WebhookProvider: Send + Sync {
    /// Delivers a signed request to its endpoint.
    async fn deliver(&self, request: &WebhookRequest) -> Result<WebhookResponse>;

    /// Performs a health check on the provider.
    async fn health_check(&self) -> Result<ServiceHealth>;
}
