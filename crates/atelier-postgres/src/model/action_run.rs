//! Action run log model.

use diesel::prelude::*;
use jiff_diesel::Timestamp;
use serde_json::Value;
use uuid::Uuid;

use crate::schema::action_runs;
use crate::types::StepResult;

/// One attempted run of an action. Rows are never updated once written.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = action_runs)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ActionRun {
    pub id: Uuid,
    pub action_id: Uuid,
    /// The event payload the run was started with.
    pub trigger_data: Value,
    /// JSON array of step outcomes, ending at the first failed step.
    pub steps_result: Value,
    pub success: bool,
    pub duration_ms: i64,
    pub error: Option<String>,
    pub created_at: Timestamp,
}

/// Data for appending a run to the log.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = action_runs)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewActionRun {
    pub action_id: Uuid,
    pub trigger_data: Value,
    pub steps_result: Value,
    pub success: bool,
    pub duration_ms: i64,
    pub error: Option<String>,
}

impl ActionRun {
    /// Decodes the persisted step outcomes.
    pub fn parsed_steps_result(&self) -> Result<Vec<StepResult>, serde_json::Error> {
        serde_json::from_value(self.steps_result.clone())
    }
}

impl NewActionRun {
    /// Builds a run record from step outcomes.
    ///
    /// The run succeeded when every attempted step did; `error` is the
    /// message of the failing step, if any.
    pub fn from_results(
        action_id: Uuid,
        trigger_data: Value,
        results: &[StepResult],
        duration_ms: i64,
    ) -> Self {
        let error = results.iter().find_map(|r| r.error.clone());
        let success = results.iter().all(|r| r.success);

        Self {
            action_id,
            trigger_data,
            steps_result: serde_json::to_value(results).unwrap_or(Value::Array(Vec::new())),
            success,
            duration_ms,
            error,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn failed_step_sets_run_error() {
        let results = vec![
            StepResult::succeeded(1, "send_email", json!({"status": "ok"})),
            StepResult::failed(2, "send_slack", Value::Null, "boom"),
        ];
        let run = NewActionRun::from_results(Uuid::now_v7(), json!({"x": 1}), &results, 12);

        assert!(!run.success);
        assert_eq!(run.error.as_deref(), Some("boom"));
        assert_eq!(run.steps_result.as_array().map(Vec::len), Some(2));
        assert_eq!(run.trigger_data, json!({"x": 1}));
    }

    #[test]
    fn all_steps_succeeding_means_success() {
        let results = vec![StepResult::succeeded(1, "add_comment", json!({}))];
        let run = NewActionRun::from_results(Uuid::now_v7(), json!({}), &results, 1);
        assert!(run.success);
        assert!(run.error.is_none());
    }
}
