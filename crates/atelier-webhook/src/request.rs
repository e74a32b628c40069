//! Webhook delivery request.

use std::time::Duration;

use bytes::Bytes;
use url::Url;
use uuid::Uuid;

use crate::{Result, WebhookEnvelope, sign};

/// Header carrying the hex HMAC-SHA256 of the body.
pub const HEADER_SIGNATURE: &str = "X-Webhook-Signature";
/// Header carrying the event name.
pub const HEADER_EVENT: &str = "X-Webhook-Event";
/// Header carrying the envelope id.
pub const HEADER_DELIVERY: &str = "X-Webhook-Delivery";

/// A ready-to-send webhook delivery.
///
/// Built from a [`WebhookEnvelope`]; `body` holds the serialized envelope and
/// `signature`, when present, was computed over exactly those bytes.
#[derive(Debug, Clone)]
pub struct WebhookRequest {
    /// Envelope id, sent as `X-Webhook-Delivery`.
    pub request_id: Uuid,
    /// The endpoint URL.
    pub url: Url,
    /// Event name, sent as `X-Webhook-Event`.
    pub event: String,
    /// Serialized envelope.
    pub body: Bytes,
    /// Hex signature, sent as `X-Webhook-Signature`.
    pub signature: Option<String>,
    /// Per-request timeout (the client default applies if unset).
    pub timeout: Option<Duration>,
}

impl WebhookRequest {
    /// Serializes `envelope` into an unsigned request to `url`.
    pub fn from_envelope(url: Url, envelope: &WebhookEnvelope) -> Result<Self> {
        Ok(Self {
            request_id: envelope.id,
            url,
            event: envelope.event.clone(),
            body: envelope.to_bytes()?,
            signature: None,
            timeout: None,
        })
    }

    /// Signs the body with `secret`.
    pub fn with_secret(mut self, secret: &str) -> Self {
        self.signature = Some(sign(secret, &self.body));
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}
