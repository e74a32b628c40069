//! Action executor: runs an action's steps in order and records the run.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use atelier_postgres::PgResult;
use atelier_postgres::model::{Action, ActionRun, NewActionRun};
use atelier_postgres::types::StepResult;
use serde_json::Value;
use tokio::sync::Semaphore;
use tokio_util::task::TaskTracker;

use super::steps::StepRegistry;
use super::{Event, SharedStore, TRACING_TARGET_EXECUTOR};

/// Step type recorded when the stored step list cannot be decoded.
const INVALID_STEP_TYPE: &str = "<invalid>";

/// Runs actions triggered by events, one task per action.
///
/// Steps within a run are strictly sequential and the first failing step
/// ends the run. Nothing is retried.
#[derive(Clone)]
pub struct ActionExecutor {
    store: SharedStore,
    registry: Arc<StepRegistry>,
    permits: Arc<Semaphore>,
}

impl fmt::Debug for ActionExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionExecutor")
            .field("registry", &self.registry)
            .field("available_permits", &self.permits.available_permits())
            .finish_non_exhaustive()
    }
}

impl ActionExecutor {
    /// Creates an executor allowing `max_in_flight` concurrent runs.
    pub fn new(store: SharedStore, registry: StepRegistry, max_in_flight: usize) -> Self {
        Self {
            store,
            registry: Arc::new(registry),
            permits: Arc::new(Semaphore::new(max_in_flight.max(1))),
        }
    }

    /// Returns the step registry.
    pub fn registry(&self) -> &StepRegistry {
        &self.registry
    }

    /// Spawns one run per action triggered by `event`.
    ///
    /// A failed subscription lookup drops the event for actions.
    #[tracing::instrument(
        skip_all,
        target = TRACING_TARGET_EXECUTOR,
        fields(event = %event.event_type),
    )]
    pub async fn fan_out(&self, event: &Event, tracker: &TaskTracker) -> usize {
        let actions = match self
            .store
            .active_actions_for(
                event.event_type,
                event.scope.space_id,
                event.scope.database_id,
            )
            .await
        {
            Ok(actions) => actions,
            Err(err) => {
                tracing::error!(
                    target: TRACING_TARGET_EXECUTOR,
                    event = %event.event_type,
                    error = %err,
                    "Failed to resolve actions, dropping event"
                );
                return 0;
            }
        };

        let matched = actions.len();
        for action in actions {
            tracing::debug!(
                target: TRACING_TARGET_EXECUTOR,
                action_id = %action.id,
                event = %event.event_type,
                "Starting action run"
            );

            let executor = self.clone();
            let permits = self.permits.clone();
            let trigger_data = event.payload.clone();

            tracker.spawn(async move {
                let Ok(_permit) = permits.acquire_owned().await else {
                    return;
                };
                // Failures are logged inside `run`.
                let _ = executor.run(&action, trigger_data).await;
            });
        }

        matched
    }

    /// Executes `action` once with `trigger_data` and records the run.
    #[tracing::instrument(
        skip_all,
        target = TRACING_TARGET_EXECUTOR,
        fields(action_id = %action.id),
    )]
    pub async fn run(&self, action: &Action, trigger_data: Value) -> PgResult<ActionRun> {
        if let Err(err) = self.store.set_action_last_run(action.id).await {
            tracing::error!(
                target: TRACING_TARGET_EXECUTOR,
                action_id = %action.id,
                error = %err,
                "Failed to set last run time"
            );
        }

        let started_at = Instant::now();
        let (results, first_error) = self.execute_steps(action, &trigger_data).await;
        let duration_ms = i64::try_from(started_at.elapsed().as_millis()).unwrap_or(i64::MAX);

        let counted = match &first_error {
            Some(message) => {
                tracing::warn!(
                    target: TRACING_TARGET_EXECUTOR,
                    action_id = %action.id,
                    error = %message,
                    "Action run failed"
                );
                self.store.record_action_failure(action.id, message).await
            }
            None => {
                tracing::debug!(
                    target: TRACING_TARGET_EXECUTOR,
                    action_id = %action.id,
                    steps = results.len(),
                    duration_ms,
                    "Action run succeeded"
                );
                self.store.increment_action_success(action.id).await
            }
        };

        if let Err(err) = counted {
            tracing::error!(
                target: TRACING_TARGET_EXECUTOR,
                action_id = %action.id,
                error = %err,
                "Failed to update action counters"
            );
        }

        let mut run = NewActionRun::from_results(action.id, trigger_data, &results, duration_ms);
        if let Some(message) = first_error {
            run.success = false;
            run.error = Some(message);
        }

        let logged = self.store.append_run(run).await;
        if let Err(err) = &logged {
            tracing::error!(
                target: TRACING_TARGET_EXECUTOR,
                action_id = %action.id,
                error = %err,
                "Failed to write run log"
            );
        }

        logged
    }

    /// Runs steps until the first failure, returning the per-step outcomes
    /// and the error that ended the run, if any.
    async fn execute_steps(
        &self,
        action: &Action,
        payload: &Value,
    ) -> (Vec<StepResult>, Option<String>) {
        let steps = match action.parsed_steps() {
            Ok(steps) => steps,
            Err(err) => {
                let message = format!("invalid step list: {err}");
                let failed =
                    StepResult::failed(1, INVALID_STEP_TYPE, Value::Null, message.clone());
                return (vec![failed], Some(message));
            }
        };

        let mut results = Vec::with_capacity(steps.len());
        for (index, step) in steps.iter().enumerate() {
            let position = u32::try_from(index + 1).unwrap_or(u32::MAX);

            match self.registry.execute(step, payload).await {
                Ok(result) => {
                    results.push(StepResult::succeeded(position, &step.step_type, result));
                }
                Err(err) => {
                    let message = err.to_string();
                    tracing::debug!(
                        target: TRACING_TARGET_EXECUTOR,
                        action_id = %action.id,
                        step = position,
                        step_type = %step.step_type,
                        error = %message,
                        "Step failed"
                    );
                    results.push(StepResult::failed(
                        position,
                        &step.step_type,
                        err.result(),
                        message.clone(),
                    ));
                    return (results, Some(message));
                }
            }
        }

        (results, None)
    }
}
