//! Webhook response types.

use atelier_postgres::model;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// A webhook as shown to its owner. The secret is never included.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Webhook {
    pub id: Uuid,
    pub name: String,
    pub url: String,
    /// Subscribed event names.
    pub events: Vec<String>,
    pub active: bool,
    /// Space the webhook is restricted to, if any.
    pub scope_space_id: Option<Uuid>,
    /// Empty until a delivery fails.
    pub last_error: String,
    pub last_error_at: Option<Timestamp>,
    pub success_count: i64,
    pub failure_count: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<model::Webhook> for Webhook {
    fn from(webhook: model::Webhook) -> Self {
        Self {
            events: webhook.subscribed_events(),
            id: webhook.id,
            name: webhook.name,
            url: webhook.url,
            active: webhook.active,
            scope_space_id: webhook.scope_space_id,
            last_error: webhook.last_error,
            last_error_at: webhook.last_error_at.map(Into::into),
            success_count: webhook.success_count,
            failure_count: webhook.failure_count,
            created_at: webhook.created_at.into(),
            updated_at: webhook.updated_at.into(),
        }
    }
}

/// Returned once, right after creation.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookWithSecret {
    #[serde(flatten)]
    pub webhook: Webhook,
    /// Signing secret, `whsec_` followed by 64 hex characters.
    pub secret: String,
}

impl From<model::Webhook> for WebhookWithSecret {
    fn from(mut webhook: model::Webhook) -> Self {
        let secret = std::mem::take(&mut webhook.secret);
        Self {
            webhook: webhook.into(),
            secret,
        }
    }
}

pub type Webhooks = Vec<Webhook>;

/// One recorded delivery attempt.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookDelivery {
    pub id: Uuid,
    pub webhook_id: Uuid,
    pub event: String,
    /// The envelope that was sent.
    pub payload: Value,
    /// Zero when no response was received.
    pub status_code: i32,
    /// First 500 characters of the response body.
    pub response: String,
    pub success: bool,
    pub duration_ms: i64,
    pub created_at: Timestamp,
}

impl From<model::WebhookDelivery> for WebhookDelivery {
    fn from(delivery: model::WebhookDelivery) -> Self {
        Self {
            id: delivery.id,
            webhook_id: delivery.webhook_id,
            event: delivery.event,
            payload: delivery.payload,
            status_code: delivery.status_code,
            response: delivery.response,
            success: delivery.success,
            duration_ms: delivery.duration_ms,
            created_at: delivery.created_at.into(),
        }
    }
}

pub type WebhookDeliveries = Vec<WebhookDelivery>;
