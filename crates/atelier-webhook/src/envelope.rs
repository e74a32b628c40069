//! The JSON envelope POSTed to webhook endpoints.

use bytes::Bytes;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::Result;

/// Canonical envelope wrapping an event payload.
///
/// The envelope is serialized exactly once; those bytes are both signed and
/// sent as the request body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookEnvelope {
    /// Unique delivery identifier, echoed in `X-Webhook-Delivery`.
    pub id: Uuid,
    /// Event name, for example `document.created`.
    pub event: String,
    /// Creation time in RFC 3339, UTC.
    pub timestamp: Timestamp,
    /// The event payload as published.
    pub data: Value,
}

impl WebhookEnvelope {
    /// Wraps `data` in a fresh envelope stamped with the current time.
    pub fn new(event: impl Into<String>, data: Value) -> Self {
        Self {
            id: Uuid::new_v4(),
            event: event.into(),
            timestamp: Timestamp::now(),
            data,
        }
    }

    /// Serializes the envelope into the bytes that are signed and sent.
    pub fn to_bytes(&self) -> Result<Bytes> {
        let bytes = serde_json::to_vec(self)?;
        Ok(Bytes::from(bytes))
    }

    /// Serializes the envelope into a JSON value, as stored in the delivery log.
    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }
}
