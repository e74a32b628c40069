//! `send_webhook` step: posts a signed envelope to a URL from the step config.

use atelier_postgres::model::response_excerpt;
use atelier_webhook::{WebhookEnvelope, WebhookRequest, WebhookService};
use serde::Deserialize;
use serde_json::{Value, json};
use url::Url;

use super::{StepError, StepExecutor};

/// Event name put in the envelope when the step config names none.
pub const DEFAULT_STEP_EVENT: &str = "action.webhook";

#[derive(Debug, Deserialize)]
struct SendWebhookConfig {
    url: String,
    #[serde(default)]
    secret: Option<String>,
    #[serde(default)]
    event: Option<String>,
}

/// Delivers the triggering payload as the envelope's `data`.
///
/// Config: `{"url": "...", "secret"?: "whsec_...", "event"?: "..."}`. The
/// request is signed only when a secret is given.
#[derive(Debug, Clone)]
pub struct SendWebhookStep {
    webhooks: WebhookService,
}

impl SendWebhookStep {
    pub fn new(webhooks: WebhookService) -> Self {
        Self { webhooks }
    }

    fn parse_config(config: &Value) -> Result<(SendWebhookConfig, Url), StepError> {
        let config: SendWebhookConfig = serde_json::from_value(config.clone())
            .map_err(|err| StepError::InvalidConfig(err.to_string()))?;

        let url = Url::parse(&config.url)
            .map_err(|err| StepError::InvalidConfig(format!("url: {err}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(StepError::InvalidConfig(format!(
                "url: unsupported scheme '{}'",
                url.scheme()
            )));
        }

        Ok((config, url))
    }
}

#[async_trait::async_trait]
impl StepExecutor for SendWebhookStep {
    async fn execute(&self, config: &Value, payload: &Value) -> Result<Value, StepError> {
        let (config, url) = Self::parse_config(config)?;

        let event = config.event.as_deref().unwrap_or(DEFAULT_STEP_EVENT);
        let envelope = WebhookEnvelope::new(event, payload.clone());
        let mut request = WebhookRequest::from_envelope(url, &envelope)
            .map_err(|err| StepError::failed(err.to_string()))?;
        if let Some(secret) = config.secret.as_deref() {
            request = request.with_secret(secret);
        }

        let response = self
            .webhooks
            .deliver(&request)
            .await
            .map_err(|err| StepError::failed(err.to_string()))?;

        let result = json!({
            "status_code": response.status_code,
            "delivery_id": envelope.id,
        });

        if response.is_success() {
            Ok(result)
        } else {
            let excerpt = response_excerpt(&response.body);
            Err(StepError::with_result(
                format!("HTTP {}: {}", response.status_code, excerpt),
                result,
            ))
        }
    }
}
