//! Action subscription model.

use diesel::prelude::*;
use jiff_diesel::Timestamp;
use serde_json::Value;
use uuid::Uuid;

use crate::schema::actions;
use crate::types::{ActionStep, EventType};

/// A multi-step workflow bound to one trigger event.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = actions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Action {
    /// Unique action identifier.
    pub id: Uuid,
    /// User who created and manages this action.
    pub owner_user_id: Uuid,
    /// Restricts the trigger to events raised in this space.
    pub scope_space_id: Option<Uuid>,
    /// Restricts the trigger to events raised in this database.
    pub scope_database_id: Option<Uuid>,
    /// Human-readable name.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Event name that starts a run.
    pub trigger_type: String,
    /// Opaque JSON object kept for future trigger filtering.
    pub trigger_config: Value,
    /// Ordered JSON array of `{type, config}` steps.
    pub steps: Value,
    /// Inactive actions are never selected.
    pub active: bool,
    /// When the most recent run started.
    pub last_run_at: Option<Timestamp>,
    /// Message of the most recent failed run.
    pub last_error: String,
    /// Number of started runs.
    pub run_count: i64,
    /// Number of successful runs.
    pub success_count: i64,
    /// Number of failed runs.
    pub failure_count: i64,
    /// Timestamp when this action was created.
    pub created_at: Timestamp,
    /// Timestamp when this action was last modified.
    pub updated_at: Timestamp,
}

/// Data for inserting an action.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = actions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewAction {
    pub owner_user_id: Uuid,
    pub scope_space_id: Option<Uuid>,
    pub scope_database_id: Option<Uuid>,
    pub name: String,
    pub description: String,
    pub trigger_type: String,
    pub trigger_config: Value,
    pub steps: Value,
    pub active: bool,
}

/// Changes applied to an existing action.
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = actions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UpdateAction {
    pub name: Option<String>,
    pub description: Option<String>,
    pub trigger_type: Option<String>,
    pub trigger_config: Option<Value>,
    pub steps: Option<Value>,
    pub active: Option<bool>,
    pub scope_space_id: Option<Option<Uuid>>,
    pub scope_database_id: Option<Option<Uuid>>,
}

impl Action {
    /// Decodes the persisted step list.
    pub fn parsed_steps(&self) -> Result<Vec<ActionStep>, serde_json::Error> {
        serde_json::from_value(self.steps.clone())
    }

    /// Returns the trigger as a catalogue event, if it is one.
    pub fn trigger_event(&self) -> Option<EventType> {
        EventType::parse(&self.trigger_type)
    }

    /// Returns whether an event raised in the given space and database is
    /// within scope. Unset scopes match anything.
    pub fn matches_scope(&self, space_id: Option<Uuid>, database_id: Option<Uuid>) -> bool {
        let space_ok = self.scope_space_id.is_none_or(|s| space_id == Some(s));
        let database_ok = self.scope_database_id.is_none_or(|d| database_id == Some(d));
        space_ok && database_ok
    }

    /// Returns whether this action would be selected for `trigger` in the given scope.
    pub fn is_selected_for(
        &self,
        trigger: EventType,
        space_id: Option<Uuid>,
        database_id: Option<Uuid>,
    ) -> bool {
        self.active
            && self.trigger_type == trigger.as_str()
            && self.matches_scope(space_id, database_id)
    }
}

impl NewAction {
    /// Encodes a step list into the JSON array stored in `actions.steps`.
    pub fn encode_steps(steps: &[ActionStep]) -> Value {
        Value::Array(
            steps
                .iter()
                .map(|s| {
                    serde_json::json!({
                        "type": s.step_type,
                        "config": s.config,
                    })
                })
                .collect(),
        )
    }
}

impl UpdateAction {
    /// Returns whether no column would change.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.trigger_type.is_none()
            && self.trigger_config.is_none()
            && self.steps.is_none()
            && self.active.is_none()
            && self.scope_space_id.is_none()
            && self.scope_database_id.is_none()
    }
}
