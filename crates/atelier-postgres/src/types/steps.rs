//! JSON shapes stored in `actions.steps` and `action_runs.steps_result`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::StepType;

/// One step of an action as persisted in `actions.steps`.
///
/// `step_type` is kept as a string: unknown names must survive a round
/// trip through the database so that a run can report them as unsupported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionStep {
    #[serde(rename = "type")]
    pub step_type: String,
    #[serde(default)]
    pub config: Value,
}

impl ActionStep {
    /// Creates a step of the given type.
    pub fn new(step_type: impl Into<String>, config: Value) -> Self {
        Self {
            step_type: step_type.into(),
            config,
        }
    }

    /// Returns the parsed step type, if it is one of the advertised names.
    pub fn known_type(&self) -> Option<StepType> {
        self.step_type.parse().ok()
    }
}

/// Outcome of one attempted step, as stored in `action_runs.steps_result`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepResult {
    /// One-based position of the step in the action.
    pub step: u32,
    #[serde(rename = "type")]
    pub step_type: String,
    pub success: bool,
    #[serde(default)]
    pub result: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StepResult {
    /// Records a step that returned a result.
    pub fn succeeded(step: u32, step_type: impl Into<String>, result: Value) -> Self {
        Self {
            step,
            step_type: step_type.into(),
            success: true,
            result,
            error: None,
        }
    }

    /// Records a step that failed.
    pub fn failed(
        step: u32,
        step_type: impl Into<String>,
        result: Value,
        error: impl Into<String>,
    ) -> Self {
        Self {
            step,
            step_type: step_type.into(),
            success: false,
            result,
            error: Some(error.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn step_uses_type_key() {
        let step: ActionStep =
            serde_json::from_value(json!({"type": "send_email", "config": {"to": "a@b.c"}}))
                .unwrap();
        assert_eq!(step.step_type, "send_email");
        assert_eq!(step.known_type(), Some(StepType::SendEmail));
        assert_eq!(step.config["to"], "a@b.c");
    }

    #[test]
    fn unknown_step_type_is_preserved() {
        let step: ActionStep = serde_json::from_value(json!({"type": "teleport"})).unwrap();
        assert_eq!(step.known_type(), None);
        assert_eq!(step.config, Value::Null);
        assert_eq!(serde_json::to_value(&step).unwrap()["type"], "teleport");
    }

    #[test]
    fn error_is_omitted_on_success() {
        let ok = serde_json::to_value(StepResult::succeeded(1, "send_email", json!({}))).unwrap();
        assert!(ok.get("error").is_none());

        let failed =
            serde_json::to_value(StepResult::failed(2, "send_slack", Value::Null, "boom")).unwrap();
        assert_eq!(failed["error"], "boom");
        assert_eq!(failed["success"], false);
        assert_eq!(failed["step"], 2);
    }
}
