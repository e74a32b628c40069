//! Webhook service wrapper with observability.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use crate::{
    Result, ServiceHealth, TRACING_TARGET, WebhookProvider, WebhookRequest, WebhookResponse,
};

/// Webhook service wrapper with observability.
///
/// Adds structured logging around any [`WebhookProvider`]. The provider is
/// held in an `Arc`, so cloning is cheap.
#[derive(Clone)]
pub struct WebhookService {
    inner: Arc<dyn WebhookProvider>,
}

impl fmt::Debug for WebhookService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebhookService").finish_non_exhaustive()
    }
}

impl WebhookService {
    /// Wraps a provider.
    pub fn new<P>(provider: P) -> Self
    where
        P: WebhookProvider + 'static,
    {
        Self {
            inner: Arc::new(provider),
        }
    }

    /// Delivers a request through the provider.
    pub async fn deliver(&self, request: &WebhookRequest) -> Result<WebhookResponse> {
        let started_at = Instant::now();

        tracing::debug!(
            target: TRACING_TARGET,
            request_id = %request.request_id,
            url = %request.url,
            event = %request.event,
            signed = request.signature.is_some(),
            "Delivering webhook"
        );

        let result = self.inner.deliver(request).await;
        let elapsed = started_at.elapsed();

        match &result {
            Ok(response) if response.is_success() => {
                tracing::debug!(
                    target: TRACING_TARGET,
                    request_id = %request.request_id,
                    status_code = response.status_code,
                    elapsed_ms = elapsed.as_millis(),
                    "Webhook delivered"
                );
            }
            Ok(response) => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    request_id = %request.request_id,
                    url = %request.url,
                    status_code = response.status_code,
                    elapsed_ms = elapsed.as_millis(),
                    "Webhook endpoint returned non-success status"
                );
            }
            Err(error) => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    request_id = %request.request_id,
                    url = %request.url,
                    error = %error,
                    elapsed_ms = elapsed.as_millis(),
                    "Webhook delivery failed before a response"
                );
            }
        }

        result
    }

    /// Checks the provider's health.
    pub async fn health_check(&self) -> Result<ServiceHealth> {
        self.inner.health_check().await
    }
}
