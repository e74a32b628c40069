//! Executors for routed steps whose side effect lives outside this service.

use atelier_postgres::types::StepType;
use serde_json::{Value, json};

use super::{StepError, StepExecutor};

/// Acknowledges a step with `{"status": "ok", "step": "<type>"}`.
#[derive(Debug, Clone, Copy)]
pub struct MarkerStep {
    step_type: StepType,
}

impl MarkerStep {
    pub fn new(step_type: StepType) -> Self {
        Self { step_type }
    }
}

#[async_trait::async_trait]
impl StepExecutor for MarkerStep {
    async fn execute(&self, _config: &Value, _payload: &Value) -> Result<Value, StepError> {
        Ok(json!({
            "status": "ok",
            "step": self.step_type.as_str(),
        }))
    }
}
