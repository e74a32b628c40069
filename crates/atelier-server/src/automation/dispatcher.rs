//! Webhook dispatcher: resolves subscribed webhooks and delivers to each.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use atelier_postgres::PgResult;
use atelier_postgres::model::{NewWebhookDelivery, Webhook, WebhookDelivery, response_excerpt};
use atelier_webhook::{WebhookEnvelope, WebhookRequest, WebhookService};
use serde_json::Value;
use tokio::sync::Semaphore;
use tokio_util::task::TaskTracker;
use url::Url;

use super::{Event, SharedStore, TRACING_TARGET_DISPATCHER};

/// Outcome of one attempt before it is written to the log.
struct Attempt {
    status_code: i32,
    response: String,
    duration_ms: i64,
    error: Option<String>,
}

impl Attempt {
    fn failed_before_response(error: String, duration_ms: i64) -> Self {
        Self {
            status_code: 0,
            response: String::new(),
            duration_ms,
            error: Some(error),
        }
    }
}

/// Delivers events to matching webhooks, one task per webhook.
///
/// Every attempt is logged and counted exactly once. Failures never reach
/// the publisher and are never retried.
#[derive(Clone)]
pub struct WebhookDispatcher {
    store: SharedStore,
    webhooks: WebhookService,
    permits: Arc<Semaphore>,
}

impl fmt::Debug for WebhookDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebhookDispatcher")
            .field("available_permits", &self.permits.available_permits())
            .finish_non_exhaustive()
    }
}

impl WebhookDispatcher {
    /// Creates a dispatcher allowing `max_in_flight` concurrent deliveries.
    pub fn new(store: SharedStore, webhooks: WebhookService, max_in_flight: usize) -> Self {
        Self {
            store,
            webhooks,
            permits: Arc::new(Semaphore::new(max_in_flight.max(1))),
        }
    }

    /// Spawns one delivery task per webhook selected for `event`.
    ///
    /// A failed subscription lookup drops the event for webhooks.
    #[tracing::instrument(
        skip_all,
        target = TRACING_TARGET_DISPATCHER,
        fields(event = %event.event_type),
    )]
    pub async fn fan_out(&self, event: &Event, tracker: &TaskTracker) -> usize {
        let webhooks = match self
            .store
            .active_webhooks_for(event.event_type, event.scope.space_id)
            .await
        {
            Ok(webhooks) => webhooks,
            Err(err) => {
                tracing::error!(
                    target: TRACING_TARGET_DISPATCHER,
                    event = %event.event_type,
                    error = %err,
                    "Failed to resolve webhooks, dropping event"
                );
                return 0;
            }
        };

        let matched = webhooks.len();
        for webhook in webhooks {
            tracing::debug!(
                target: TRACING_TARGET_DISPATCHER,
                webhook_id = %webhook.id,
                event = %event.event_type,
                "Dispatching webhook"
            );

            let dispatcher = self.clone();
            let permits = self.permits.clone();
            let event_name = event.name();
            let data = event.payload.clone();

            tracker.spawn(async move {
                let Ok(_permit) = permits.acquire_owned().await else {
                    return;
                };
                // Failures are logged inside `deliver`.
                let _ = dispatcher.deliver(&webhook, event_name, data).await;
            });
        }

        matched
    }

    /// Performs one delivery attempt and records its outcome.
    ///
    /// The delivery row is always written, then the webhook's success or
    /// failure counter is updated. Returns the written row.
    #[tracing::instrument(
        skip_all,
        target = TRACING_TARGET_DISPATCHER,
        fields(webhook_id = %webhook.id, event = %event),
    )]
    pub async fn deliver(
        &self,
        webhook: &Webhook,
        event: &str,
        data: Value,
    ) -> PgResult<WebhookDelivery> {
        let envelope = WebhookEnvelope::new(event, data);
        let attempt = self.attempt(webhook, &envelope).await;

        let payload = envelope.to_value().unwrap_or_else(|err| {
            tracing::error!(
                target: TRACING_TARGET_DISPATCHER,
                webhook_id = %webhook.id,
                error = %err,
                "Failed to encode delivery payload"
            );
            Value::Null
        });

        let success = attempt.error.is_none();
        let logged = self
            .store
            .append_delivery(NewWebhookDelivery {
                webhook_id: webhook.id,
                event: event.to_owned(),
                payload,
                status_code: attempt.status_code,
                response: attempt.response,
                success,
                duration_ms: attempt.duration_ms,
            })
            .await;

        if let Err(err) = &logged {
            tracing::error!(
                target: TRACING_TARGET_DISPATCHER,
                webhook_id = %webhook.id,
                error = %err,
                "Failed to write delivery log"
            );
        }

        let counted = match &attempt.error {
            None => self.store.record_webhook_success(webhook.id).await,
            Some(message) => self.store.record_webhook_failure(webhook.id, message).await,
        };

        if let Err(err) = counted {
            tracing::error!(
                target: TRACING_TARGET_DISPATCHER,
                webhook_id = %webhook.id,
                error = %err,
                "Failed to update webhook counters"
            );
        }

        logged
    }

    async fn attempt(&self, webhook: &Webhook, envelope: &WebhookEnvelope) -> Attempt {
        let request = Url::parse(&webhook.url)
            .map_err(|err| format!("invalid webhook url: {err}"))
            .and_then(|url| {
                WebhookRequest::from_envelope(url, envelope).map_err(|err| err.to_string())
            });

        let request = match request {
            Ok(request) => request.with_secret(&webhook.secret),
            Err(message) => {
                tracing::error!(
                    target: TRACING_TARGET_DISPATCHER,
                    webhook_id = %webhook.id,
                    error = %message,
                    "Failed to build webhook request"
                );
                return Attempt::failed_before_response(message, 0);
            }
        };

        let started_at = Instant::now();
        let result = self.webhooks.deliver(&request).await;
        let duration_ms = i64::try_from(started_at.elapsed().as_millis()).unwrap_or(i64::MAX);

        match result {
            Err(err) => {
                tracing::warn!(
                    target: TRACING_TARGET_DISPATCHER,
                    webhook_id = %webhook.id,
                    error = %err,
                    "Webhook transport failure"
                );
                Attempt::failed_before_response(err.to_string(), duration_ms)
            }
            Ok(response) if response.is_success() => Attempt {
                status_code: i32::from(response.status_code),
                response: String::new(),
                duration_ms,
                error: None,
            },
            Ok(response) => {
                let excerpt = response_excerpt(&response.body);
                tracing::warn!(
                    target: TRACING_TARGET_DISPATCHER,
                    webhook_id = %webhook.id,
                    status_code = response.status_code,
                    "Webhook returned non-success status"
                );
                Attempt {
                    status_code: i32::from(response.status_code),
                    error: Some(format!("HTTP {}: {}", response.status_code, excerpt)),
                    response: excerpt,
                    duration_ms,
                }
            }
        }
    }
}
