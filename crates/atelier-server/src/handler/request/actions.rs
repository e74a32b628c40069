//! Action request bodies.

use atelier_postgres::model::{NewAction, UpdateAction as UpdateActionModel};
use atelier_postgres::types::ActionStep;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;
use validator::Validate;

use super::validations::{double_option, validate_steps, validate_trigger};

/// Body of `POST /actions`.
#[must_use]
#[derive(Debug, Default, Serialize, Deserialize, Validate)]
pub struct CreateAction {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub description: String,
    #[validate(custom(function = "validate_trigger"))]
    pub trigger_type: String,
    /// Stored as given, defaults to `{}`.
    pub trigger_config: Option<Value>,
    #[validate(custom(function = "validate_steps"))]
    pub steps: Vec<ActionStep>,
    /// Defaults to `true`.
    pub active: Option<bool>,
    pub scope_space_id: Option<Uuid>,
    pub scope_database_id: Option<Uuid>,
}

impl CreateAction {
    pub fn into_model(self, owner_user_id: Uuid) -> NewAction {
        NewAction {
            owner_user_id,
            scope_space_id: self.scope_space_id,
            scope_database_id: self.scope_database_id,
            name: self.name,
            description: self.description,
            trigger_type: self.trigger_type,
            trigger_config: self
                .trigger_config
                .unwrap_or_else(|| Value::Object(Default::default())),
            steps: NewAction::encode_steps(&self.steps),
            active: self.active.unwrap_or(true),
        }
    }
}

/// Body of `PATCH /actions/{action_id}`.
#[must_use]
#[derive(Debug, Default, Serialize, Deserialize, Validate)]
pub struct UpdateAction {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[validate(custom(function = "validate_trigger"))]
    pub trigger_type: Option<String>,
    pub trigger_config: Option<Value>,
    #[validate(custom(function = "validate_steps"))]
    pub steps: Option<Vec<ActionStep>>,
    pub active: Option<bool>,
    #[serde(default, deserialize_with = "double_option")]
    pub scope_space_id: Option<Option<Uuid>>,
    #[serde(default, deserialize_with = "double_option")]
    pub scope_database_id: Option<Option<Uuid>>,
}

impl UpdateAction {
    pub fn into_model(self) -> UpdateActionModel {
        UpdateActionModel {
            name: self.name,
            description: self.description,
            trigger_type: self.trigger_type,
            trigger_config: self.trigger_config,
            steps: self.steps.map(|steps| NewAction::encode_steps(&steps)),
            active: self.active,
            scope_space_id: self.scope_space_id,
            scope_database_id: self.scope_database_id,
        }
    }
}

/// Optional body of `POST /actions/{action_id}/run`.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct RunAction {
    /// Passed to every step as the trigger payload.
    #[serde(default)]
    pub data: Value,
}
