//! Path parameters.

use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct WebhookPathParams {
    pub webhook_id: Uuid,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ActionPathParams {
    pub action_id: Uuid,
}
