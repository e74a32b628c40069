//! Step executors and the registry that routes step types to them.
//!
//! An action's steps are dispatched through a [`StepRegistry`] built once at
//! startup. Only routed [`StepType`]s can be registered; reserved and unknown
//! names fail with [`StepError::Unsupported`].

mod marker;
mod webhook;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use atelier_postgres::types::{ActionStep, StepType};
use atelier_webhook::WebhookService;
use serde_json::Value;

pub use self::marker::MarkerStep;
pub use self::webhook::{DEFAULT_STEP_EVENT, SendWebhookStep};

/// Failure of a single step.
#[derive(Debug, thiserror::Error)]
pub enum StepError {
    /// The step type is unknown, reserved or has no executor.
    #[error("unsupported step type: {0}")]
    Unsupported(String),

    /// The step's `config` could not be used.
    #[error("invalid step config: {0}")]
    InvalidConfig(String),

    /// The step ran and failed, possibly with a partial result.
    #[error("{message}")]
    Failed { message: String, result: Value },
}

impl StepError {
    /// Creates a failure without a result.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
            result: Value::Null,
        }
    }

    /// Creates a failure that still produced a result worth recording.
    pub fn with_result(message: impl Into<String>, result: Value) -> Self {
        Self::Failed {
            message: message.into(),
            result,
        }
    }

    /// Returns the partial result recorded next to the error.
    pub fn result(&self) -> Value {
        match self {
            Self::Failed { result, .. } => result.clone(),
            _ => Value::Null,
        }
    }
}

/// A capability that performs one kind of step.
#[async_trait::async_trait]
pub trait StepExecutor: Send + Sync {
    /// Runs the step with its own `config` and the triggering event's payload.
    async fn execute(&self, config: &Value, payload: &Value) -> Result<Value, StepError>;
}

/// Lookup table from step type to executor.
#[derive(Clone, Default)]
pub struct StepRegistry {
    executors: HashMap<StepType, Arc<dyn StepExecutor>>,
}

impl fmt::Debug for StepRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut registered: Vec<_> = self.executors.keys().map(|t| t.as_str()).collect();
        registered.sort_unstable();
        f.debug_struct("StepRegistry")
            .field("registered", &registered)
            .finish()
    }
}

impl StepRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every routed step type.
    ///
    /// `send_webhook` posts through `webhooks`; the remaining routed types
    /// answer with a success marker.
    pub fn with_defaults(webhooks: WebhookService) -> Self {
        let mut registry = Self::new().with_executor(
            StepType::SendWebhook,
            SendWebhookStep::new(webhooks),
        );

        for step_type in StepType::routed() {
            if step_type != StepType::SendWebhook {
                registry.register(step_type, MarkerStep::new(step_type));
            }
        }

        registry
    }

    /// Registers an executor for a routed step type.
    ///
    /// Reserved types are ignored and stay unsupported.
    pub fn register(&mut self, step_type: StepType, executor: impl StepExecutor + 'static) {
        if !step_type.is_routed() {
            return;
        }
        self.executors.insert(step_type, Arc::new(executor));
    }

    /// Builder form of [`register`](Self::register).
    pub fn with_executor(
        mut self,
        step_type: StepType,
        executor: impl StepExecutor + 'static,
    ) -> Self {
        self.register(step_type, executor);
        self
    }

    /// Returns whether a step type has an executor.
    pub fn supports(&self, step_type: StepType) -> bool {
        self.executors.contains_key(&step_type)
    }

    /// Runs one step.
    pub async fn execute(&self, step: &ActionStep, payload: &Value) -> Result<Value, StepError> {
        let executor = step
            .known_type()
            .and_then(|step_type| self.executors.get(&step_type))
            .ok_or_else(|| StepError::Unsupported(step.step_type.clone()))?;

        executor.execute(&step.config, payload).await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    struct Boom;

    #[async_trait::async_trait]
    impl StepExecutor for Boom {
        async fn execute(&self, _config: &Value, _payload: &Value) -> Result<Value, StepError> {
            Err(StepError::failed("boom"))
        }
    }

    #[tokio::test]
    async fn unknown_type_is_unsupported() {
        let registry = StepRegistry::new();
        let step = ActionStep::new("teleport", Value::Null);

        let error = registry.execute(&step, &json!({})).await.unwrap_err();
        assert_eq!(error.to_string(), "unsupported step type: teleport");
    }

    #[tokio::test]
    async fn reserved_type_cannot_be_registered() {
        let registry = StepRegistry::new()
            .with_executor(StepType::CreateRow, MarkerStep::new(StepType::CreateRow));
        assert!(!registry.supports(StepType::CreateRow));

        let step = ActionStep::new("create_row", Value::Null);
        let error = registry.execute(&step, &json!({})).await.unwrap_err();
        assert_eq!(error.to_string(), "unsupported step type: create_row");
    }

    #[tokio::test]
    async fn registered_executor_is_invoked() {
        let registry = StepRegistry::new().with_executor(StepType::SendSlack, Boom);
        let step = ActionStep::new("send_slack", json!({"channel": "#ops"}));

        let error = registry.execute(&step, &json!({})).await.unwrap_err();
        assert_eq!(error.to_string(), "boom");
        assert_eq!(error.result(), Value::Null);
    }

    #[test]
    fn failures_carry_partial_results() {
        let error = StepError::with_result("HTTP 502: bad gateway", json!({"status_code": 502}));
        assert_eq!(error.result()["status_code"], 502);
        assert_eq!(error.to_string(), "HTTP 502: bad gateway");
    }
}
