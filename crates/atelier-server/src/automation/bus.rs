//! In-process event bus.

use std::sync::Arc;

use atelier_webhook::WebhookService;
use tokio_util::task::TaskTracker;

use super::steps::StepRegistry;
use super::{
    ActionExecutor, AutomationConfig, Event, SharedStore, TRACING_TARGET_BUS, WebhookDispatcher,
};

#[derive(Debug)]
struct EventBusInner {
    dispatcher: WebhookDispatcher,
    executor: ActionExecutor,
    tracker: TaskTracker,
}

/// Fire-and-forget event publication.
///
/// [`publish`](Self::publish) returns immediately; the dispatcher and the
/// executor each resolve their subscriptions on a background task and spawn
/// one task per match. Events are not persisted, so anything still queued
/// when the process exits is lost.
#[derive(Debug, Clone)]
pub struct EventBus {
    inner: Arc<EventBusInner>,
}

impl EventBus {
    /// Wires a dispatcher and an executor over the same store.
    pub fn new(
        store: SharedStore,
        webhooks: WebhookService,
        registry: StepRegistry,
        config: &AutomationConfig,
    ) -> Self {
        let dispatcher =
            WebhookDispatcher::new(store.clone(), webhooks, config.delivery_permits());
        let executor = ActionExecutor::new(store, registry, config.run_permits());

        tracing::info!(
            target: TRACING_TARGET_BUS,
            max_concurrent_deliveries = config.delivery_permits(),
            max_concurrent_runs = config.run_permits(),
            "Event bus initialized"
        );

        Self {
            inner: Arc::new(EventBusInner {
                dispatcher,
                executor,
                tracker: TaskTracker::new(),
            }),
        }
    }

    /// Publishes an event without waiting for any delivery or run.
    ///
    /// Must be called from within a tokio runtime.
    pub fn publish(&self, event: Event) {
        tracing::debug!(
            target: TRACING_TARGET_BUS,
            event = %event.event_type,
            space_id = ?event.scope.space_id,
            database_id = ?event.scope.database_id,
            "Event published"
        );

        let event = Arc::new(event);
        let tracker = self.inner.tracker.clone();

        let dispatcher = self.inner.dispatcher.clone();
        let webhook_event = event.clone();
        let webhook_tracker = tracker.clone();
        tracker.spawn(async move {
            dispatcher.fan_out(&webhook_event, &webhook_tracker).await;
        });

        let executor = self.inner.executor.clone();
        let action_tracker = tracker.clone();
        tracker.spawn(async move {
            executor.fan_out(&event, &action_tracker).await;
        });
    }

    /// Returns the webhook dispatcher.
    pub fn dispatcher(&self) -> &WebhookDispatcher {
        &self.inner.dispatcher
    }

    /// Returns the action executor.
    pub fn executor(&self) -> &ActionExecutor {
        &self.inner.executor
    }

    /// Number of fan-out, delivery and run tasks not yet finished.
    pub fn in_flight(&self) -> usize {
        self.inner.tracker.len()
    }

    /// Waits until every task spawned so far has finished.
    ///
    /// The bus keeps accepting events afterwards.
    pub async fn flush(&self) {
        let tracker = &self.inner.tracker;
        tracker.close();
        tracker.wait().await;
        tracker.reopen();
    }

    /// Waits for in-flight work before the process exits.
    pub async fn shutdown(&self) {
        let tracker = &self.inner.tracker;
        tracing::info!(
            target: TRACING_TARGET_BUS,
            in_flight = tracker.len(),
            "Waiting for in-flight deliveries and runs"
        );

        tracker.close();
        tracker.wait().await;

        tracing::info!(target: TRACING_TARGET_BUS, "Event bus drained");
    }
}
