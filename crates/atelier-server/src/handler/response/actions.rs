//! Action response types.

use atelier_postgres::model;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// An action as shown to its owner.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Action {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub trigger_type: String,
    pub trigger_config: Value,
    /// Ordered `{type, config}` steps.
    pub steps: Value,
    pub active: bool,
    pub scope_space_id: Option<Uuid>,
    pub scope_database_id: Option<Uuid>,
    pub last_run_at: Option<Timestamp>,
    pub last_error: String,
    pub run_count: i64,
    pub success_count: i64,
    pub failure_count: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<model::Action> for Action {
    fn from(action: model::Action) -> Self {
        Self {
            id: action.id,
            name: action.name,
            description: action.description,
            trigger_type: action.trigger_type,
            trigger_config: action.trigger_config,
            steps: action.steps,
            active: action.active,
            scope_space_id: action.scope_space_id,
            scope_database_id: action.scope_database_id,
            last_run_at: action.last_run_at.map(Into::into),
            last_error: action.last_error,
            run_count: action.run_count,
            success_count: action.success_count,
            failure_count: action.failure_count,
            created_at: action.created_at.into(),
            updated_at: action.updated_at.into(),
        }
    }
}

pub type Actions = Vec<Action>;

/// One recorded run.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionRun {
    pub id: Uuid,
    pub action_id: Uuid,
    /// Payload of the event that started the run.
    pub trigger_data: Value,
    /// Per-step outcomes up to and including the first failure.
    pub steps_result: Value,
    pub success: bool,
    pub duration_ms: i64,
    pub error: Option<String>,
    pub created_at: Timestamp,
}

impl From<model::ActionRun> for ActionRun {
    fn from(run: model::ActionRun) -> Self {
        Self {
            id: run.id,
            action_id: run.action_id,
            trigger_data: run.trigger_data,
            steps_result: run.steps_result,
            success: run.success,
            duration_ms: run.duration_ms,
            error: run.error,
            created_at: run.created_at.into(),
        }
    }
}

pub type ActionRuns = Vec<ActionRun>;
