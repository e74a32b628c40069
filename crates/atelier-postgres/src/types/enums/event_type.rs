//! Event-type catalogue shared by webhooks and actions.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

/// Domain events that webhooks and actions can subscribe to.
///
/// Stored as its dotted string form in the `webhooks.events` array, the
/// `webhook_deliveries.event` column and the `actions.trigger_type` column.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[derive(Serialize, Deserialize, Display, EnumIter, EnumString, IntoStaticStr)]
pub enum EventType {
    // Document events
    /// A document was created.
    #[serde(rename = "document.created")]
    #[strum(serialize = "document.created")]
    DocumentCreated,

    /// A document was updated.
    #[serde(rename = "document.updated")]
    #[strum(serialize = "document.updated")]
    DocumentUpdated,

    /// A document was deleted.
    #[serde(rename = "document.deleted")]
    #[strum(serialize = "document.deleted")]
    DocumentDeleted,

    /// A document was moved to another parent or space.
    #[serde(rename = "document.moved")]
    #[strum(serialize = "document.moved")]
    DocumentMoved,

    /// A document was shared with another user or group.
    #[serde(rename = "document.shared")]
    #[strum(serialize = "document.shared")]
    DocumentShared,

    // Database events
    /// A database row was created.
    #[serde(rename = "row.created")]
    #[strum(serialize = "row.created")]
    RowCreated,

    /// A database row was updated.
    #[serde(rename = "row.updated")]
    #[strum(serialize = "row.updated")]
    RowUpdated,

    /// A database row was deleted.
    #[serde(rename = "row.deleted")]
    #[strum(serialize = "row.deleted")]
    RowDeleted,

    /// A database property definition changed.
    #[serde(rename = "property.changed")]
    #[strum(serialize = "property.changed")]
    PropertyChanged,

    // Comment events
    /// A comment was added.
    #[serde(rename = "comment.created")]
    #[strum(serialize = "comment.created")]
    CommentCreated,

    /// A comment thread was resolved.
    #[serde(rename = "comment.resolved")]
    #[strum(serialize = "comment.resolved")]
    CommentResolved,

    // Space events
    /// A space was created.
    #[serde(rename = "space.created")]
    #[strum(serialize = "space.created")]
    SpaceCreated,

    /// A space was updated.
    #[serde(rename = "space.updated")]
    #[strum(serialize = "space.updated")]
    SpaceUpdated,

    // Schedule events
    /// Periodic tick raised by the schedule driver.
    #[serde(rename = "schedule")]
    #[strum(serialize = "schedule")]
    Schedule,
}

/// Grouping used when the catalogue is presented to clients.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
#[derive(Serialize, Deserialize, Display, EnumIter, IntoStaticStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EventCategory {
    Document,
    Database,
    Comment,
    Space,
    Schedule,
}

impl EventType {
    /// Returns the dotted string form, e.g. `document.created`.
    #[inline]
    pub fn as_str(self) -> &'static str {
        self.into()
    }

    /// Returns the catalogue category of this event.
    pub fn category(self) -> EventCategory {
        match self {
            Self::DocumentCreated
            | Self::DocumentUpdated
            | Self::DocumentDeleted
            | Self::DocumentMoved
            | Self::DocumentShared => EventCategory::Document,
            Self::RowCreated | Self::RowUpdated | Self::RowDeleted | Self::PropertyChanged => {
                EventCategory::Database
            }
            Self::CommentCreated | Self::CommentResolved => EventCategory::Comment,
            Self::SpaceCreated | Self::SpaceUpdated => EventCategory::Space,
            Self::Schedule => EventCategory::Schedule,
        }
    }

    /// Returns whether the event is raised by the platform itself rather
    /// than by a user-visible mutation.
    #[inline]
    pub fn is_reserved(self) -> bool {
        matches!(self, Self::Schedule)
    }

    /// Parses a dotted event name, returning `None` for names outside the catalogue.
    pub fn parse(name: &str) -> Option<Self> {
        name.parse().ok()
    }
}

impl EventCategory {
    /// Returns every event in this category, in catalogue order.
    pub fn events(self) -> Vec<EventType> {
        EventType::iter().filter(|e| e.category() == self).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dotted_names_round_trip_through_strum_and_serde() {
        for event in EventType::iter() {
            let name = event.to_string();
            assert_eq!(EventType::parse(&name), Some(event));

            let json = serde_json::to_string(&event).unwrap();
            assert_eq!(json, format!("\"{name}\""));
        }
    }

    #[test]
    fn catalogue_has_fourteen_events() {
        assert_eq!(EventType::iter().count(), 14);
        assert_eq!(EventCategory::Document.events().len(), 5);
        assert_eq!(EventCategory::Database.events().len(), 4);
        assert_eq!(EventCategory::Comment.events().len(), 2);
        assert_eq!(EventCategory::Space.events().len(), 2);
        assert_eq!(EventCategory::Schedule.events(), vec![EventType::Schedule]);
    }

    #[test]
    fn unknown_names_are_rejected() {
        assert_eq!(EventType::parse("document:created"), None);
        assert_eq!(EventType::parse(""), None);
        assert_eq!(EventType::parse("property.changed"), Some(EventType::PropertyChanged));
    }

    #[test]
    fn only_schedule_is_reserved() {
        assert!(EventType::Schedule.is_reserved());
        assert!(!EventType::DocumentCreated.is_reserved());
        assert_eq!(EventType::RowDeleted.as_str(), "row.deleted");
    }
}
