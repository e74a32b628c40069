//! Webhook subscription model.

use diesel::prelude::*;
use jiff_diesel::Timestamp;
use serde_json::Value;
use uuid::Uuid;

use crate::schema::webhooks;
use crate::types::EventType;

/// An outbound HTTP subscription owned by a single user.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = webhooks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Webhook {
    /// Unique webhook identifier.
    pub id: Uuid,
    /// User who created and manages this webhook.
    pub owner_user_id: Uuid,
    /// Restricts delivery to events raised in this space.
    pub scope_space_id: Option<Uuid>,
    /// Human-readable name.
    pub name: String,
    /// Endpoint receiving the POST.
    pub url: String,
    /// HMAC-SHA256 signing secret, `whsec_` followed by 64 hex characters.
    pub secret: String,
    /// JSON array of subscribed event names.
    pub events: Value,
    /// Inactive webhooks are never selected for delivery.
    pub active: bool,
    /// Message of the most recent failed delivery.
    pub last_error: String,
    /// When the most recent failed delivery happened.
    pub last_error_at: Option<Timestamp>,
    /// Number of successful deliveries.
    pub success_count: i64,
    /// Number of failed deliveries.
    pub failure_count: i64,
    /// Timestamp when this webhook was created.
    pub created_at: Timestamp,
    /// Timestamp when this webhook was last modified.
    pub updated_at: Timestamp,
}

/// Data for inserting a webhook.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = webhooks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewWebhook {
    pub owner_user_id: Uuid,
    pub scope_space_id: Option<Uuid>,
    pub name: String,
    pub url: String,
    pub secret: String,
    pub events: Value,
    pub active: bool,
}

/// Changes applied to an existing webhook. The secret is not updatable.
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = webhooks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UpdateWebhook {
    pub name: Option<String>,
    pub url: Option<String>,
    pub events: Option<Value>,
    pub active: Option<bool>,
    pub scope_space_id: Option<Option<Uuid>>,
}

impl Webhook {
    /// Returns the subscribed event names.
    pub fn subscribed_events(&self) -> Vec<String> {
        self.events
            .as_array()
            .map(|events| {
                events
                    .iter()
                    .filter_map(|e| e.as_str().map(str::to_owned))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Returns whether `event` is in the subscribed set.
    pub fn subscribes_to(&self, event: EventType) -> bool {
        self.events
            .as_array()
            .is_some_and(|events| events.iter().any(|e| e.as_str() == Some(event.as_str())))
    }

    /// Returns whether an event raised in `space_id` is within this
    /// webhook's scope. An unscoped webhook matches every space.
    pub fn matches_scope(&self, space_id: Option<Uuid>) -> bool {
        match self.scope_space_id {
            None => true,
            Some(scope) => space_id == Some(scope),
        }
    }

    /// Returns whether this webhook would be selected for `event` in `space_id`.
    pub fn is_selected_for(&self, event: EventType, space_id: Option<Uuid>) -> bool {
        self.active && self.subscribes_to(event) && self.matches_scope(space_id)
    }

    /// Returns the number of recorded delivery outcomes.
    #[inline]
    pub fn total_deliveries(&self) -> i64 {
        self.success_count + self.failure_count
    }
}

impl NewWebhook {
    /// Encodes an event list into the JSON array stored in `webhooks.events`.
    ///
    /// Duplicates are removed and the order is normalized.
    pub fn encode_events(events: &[EventType]) -> Value {
        let mut events = events.to_vec();
        events.sort();
        events.dedup();
        Value::Array(
            events
                .into_iter()
                .map(|e| Value::String(e.as_str().to_owned()))
                .collect(),
        )
    }
}

impl UpdateWebhook {
    /// Returns whether no column would change.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.url.is_none()
            && self.events.is_none()
            && self.active.is_none()
            && self.scope_space_id.is_none()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn webhook(events: Value, scope: Option<Uuid>, active: bool) -> Webhook {
        let now = Timestamp::from(jiff::Timestamp::now());
        Webhook {
            id: Uuid::now_v7(),
            owner_user_id: Uuid::now_v7(),
            scope_space_id: scope,
            name: "hook".into(),
            url: "http://localhost/hook".into(),
            secret: format!("whsec_{}", "0".repeat(64)),
            events,
            active,
            last_error: String::new(),
            last_error_at: None,
            success_count: 0,
            failure_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn selection_requires_active_event_and_scope() {
        let space = Uuid::now_v7();
        let hook = webhook(json!(["document.created"]), Some(space), true);

        assert!(hook.is_selected_for(EventType::DocumentCreated, Some(space)));
        assert!(!hook.is_selected_for(EventType::DocumentUpdated, Some(space)));
        assert!(!hook.is_selected_for(EventType::DocumentCreated, Some(Uuid::now_v7())));
        assert!(!hook.is_selected_for(EventType::DocumentCreated, None));

        let inactive = webhook(json!(["document.created"]), None, false);
        assert!(!inactive.is_selected_for(EventType::DocumentCreated, None));
    }

    #[test]
    fn unscoped_webhook_matches_any_space() {
        let hook = webhook(json!(["row.created"]), None, true);
        assert!(hook.matches_scope(None));
        assert!(hook.matches_scope(Some(Uuid::now_v7())));
    }

    #[test]
    fn events_are_normalized_on_encode() {
        let encoded = NewWebhook::encode_events(&[
            EventType::RowUpdated,
            EventType::DocumentCreated,
            EventType::RowUpdated,
        ]);
        assert_eq!(encoded, json!(["document.created", "row.updated"]));

        let hook = webhook(encoded, None, true);
        assert_eq!(
            hook.subscribed_events(),
            vec!["document.created".to_string(), "row.updated".to_string()]
        );
    }

    #[test]
    fn empty_update_is_detected() {
        assert!(UpdateWebhook::default().is_empty());
        let changes = UpdateWebhook {
            active: Some(false),
            ..Default::default()
        };
        assert!(!changes.is_empty());
    }
}
