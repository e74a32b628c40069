//! Event publication body.

use atelier_postgres::types::EventType;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;
use validator::Validate;

use super::validations::validate_published_event;
use crate::automation::{Event, EventScope};

/// Body of `POST /events`.
#[must_use]
#[derive(Debug, Default, Serialize, Deserialize, Validate)]
pub struct PublishEvent {
    #[validate(custom(function = "validate_published_event"))]
    pub event: String,
    pub space_id: Option<Uuid>,
    pub database_id: Option<Uuid>,
    #[serde(default)]
    pub data: Value,
}

impl PublishEvent {
    /// Returns `None` when the event name is not in the catalogue.
    pub fn into_event(self) -> Option<Event> {
        let event_type = EventType::parse(&self.event)?;
        let scope = EventScope {
            space_id: self.space_id,
            database_id: self.database_id,
        };

        Some(Event::new(event_type, self.data).with_scope(scope))
    }
}
