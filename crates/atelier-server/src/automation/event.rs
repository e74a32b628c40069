//! Domain events raised onto the bus.

use atelier_postgres::types::EventType;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Where an event happened.
///
/// Subscriptions with a scope only see events whose scope matches; unscoped
/// subscriptions see every event of their type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventScope {
    /// Space the event belongs to.
    pub space_id: Option<Uuid>,
    /// Database the event belongs to.
    pub database_id: Option<Uuid>,
}

impl EventScope {
    /// An event scoped to a space.
    pub fn space(space_id: Uuid) -> Self {
        Self {
            space_id: Some(space_id),
            database_id: None,
        }
    }

    /// Adds a database to the scope.
    pub fn with_database(mut self, database_id: Uuid) -> Self {
        self.database_id = Some(database_id);
        self
    }
}

/// A typed domain event with its payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub event_type: EventType,
    #[serde(default)]
    pub scope: EventScope,
    pub payload: Value,
}

impl Event {
    /// Creates an unscoped event.
    pub fn new(event_type: EventType, payload: Value) -> Self {
        Self {
            event_type,
            scope: EventScope::default(),
            payload,
        }
    }

    /// Sets the scope.
    pub fn with_scope(mut self, scope: EventScope) -> Self {
        self.scope = scope;
        self
    }

    /// Returns the dotted event name.
    #[inline]
    pub fn name(&self) -> &'static str {
        self.event_type.as_str()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn scope_builders() {
        let space = Uuid::now_v7();
        let database = Uuid::now_v7();
        let scope = EventScope::space(space).with_database(database);

        assert_eq!(scope.space_id, Some(space));
        assert_eq!(scope.database_id, Some(database));
        assert_eq!(EventScope::default().space_id, None);
    }

    #[test]
    fn event_name_is_dotted() {
        let event = Event::new(EventType::CommentResolved, json!({"comment_id": 7}));
        assert_eq!(event.name(), "comment.resolved");
        assert_eq!(event.scope, EventScope::default());
    }
}
