//! Event publication response.

use atelier_postgres::types::EventType;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Acknowledges an event handed to the bus. Delivery happens afterwards.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventAccepted {
    pub event: EventType,
    pub space_id: Option<Uuid>,
    pub database_id: Option<Uuid>,
    pub accepted_at: Timestamp,
}
