mod common;

use std::sync::Arc;

use atelier_postgres::types::{ActionStep, EventType, StepType};
use atelier_server::automation::{
    AutomationConfig, Event, EventBus, MemoryStore, StepError, StepExecutor, StepRegistry,
};
use axum::http::StatusCode;
use serde_json::{Value, json};

use crate::common::{Harness, Sink, webhook_service};

/// Fails with a fixed message.
struct Boom;

#[async_trait::async_trait]
impl StepExecutor for Boom {
    async fn execute(&self, _config: &Value, _payload: &Value) -> Result<Value, StepError> {
        Err(StepError::failed("boom"))
    }
}

#[tokio::test]
async fn failing_step_short_circuits() -> anyhow::Result<()> {
    let store = Arc::new(MemoryStore::default());
    let registry =
        StepRegistry::with_defaults(webhook_service()).with_executor(StepType::SendSlack, Boom);
    let bus = EventBus::new(
        store.clone(),
        webhook_service(),
        registry,
        &AutomationConfig::default(),
    );

    let harness = Harness {
        store,
        bus,
        owner: uuid::Uuid::now_v7(),
    };
    let action = harness
        .action(
            EventType::RowUpdated,
            &[
                ActionStep::new("add_comment", json!({})),
                ActionStep::new("send_slack", json!({})),
                ActionStep::new("send_email", json!({})),
            ],
        )
        .await;

    harness
        .bus
        .publish(Event::new(EventType::RowUpdated, json!({"row_id": 3})));
    harness.bus.flush().await;

    let runs = harness.store.runs(action.id).await;
    assert_eq!(runs.len(), 1);

    let run = &runs[0];
    assert!(!run.success);
    assert_eq!(run.error.as_deref(), Some("boom"));
    assert_eq!(run.trigger_data, json!({"row_id": 3}));

    let steps = run.steps_result.as_array().expect("array");
    assert_eq!(steps.len(), 2);
    assert_eq!(steps[0]["success"], true);
    assert_eq!(steps[1]["success"], false);
    assert_eq!(steps[1]["error"], "boom");

    let action = harness.store.action(action.id).await.expect("action");
    assert_eq!(action.run_count, 1);
    assert_eq!(action.failure_count, 1);
    assert_eq!(action.success_count, 0);
    assert_eq!(action.last_error, "boom");
    assert!(action.last_run_at.is_some());
    Ok(())
}

#[tokio::test]
async fn successful_run_records_every_step() -> anyhow::Result<()> {
    let harness = Harness::new();
    let steps = [
        ActionStep::new("send_email", json!({"to": "ops@example.com"})),
        ActionStep::new("update_property", json!({"name": "status"})),
    ];
    let action = harness.action(EventType::CommentResolved, &steps).await;

    harness
        .bus
        .publish(Event::new(EventType::CommentResolved, json!({"comment_id": 5})));
    harness.bus.flush().await;

    let runs = harness.store.runs(action.id).await;
    assert_eq!(runs.len(), 1);
    assert!(runs[0].success);
    assert_eq!(runs[0].trigger_data, json!({"comment_id": 5}));

    let results = runs[0].steps_result.as_array().expect("array");
    assert_eq!(results.len(), 2);
    assert_eq!(
        results[1]["result"],
        json!({"status": "ok", "step": "update_property"})
    );

    let action = harness.store.action(action.id).await.expect("action");
    assert_eq!(action.run_count, 1);
    assert_eq!(action.success_count, 1);
    Ok(())
}

#[tokio::test]
async fn send_webhook_step_posts_to_config_url() -> anyhow::Result<()> {
    let harness = Harness::new();
    let sink = Sink::ok().await;
    let action = harness
        .action(
            EventType::DocumentMoved,
            &[ActionStep::new(
                "send_webhook",
                json!({"url": sink.url, "secret": atelier_webhook::generate_secret()}),
            )],
        )
        .await;

    harness
        .bus
        .publish(Event::new(EventType::DocumentMoved, json!({"doc_id": "d1"})));
    harness.bus.flush().await;

    let received = sink.received().await;
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].json()["data"]["doc_id"], "d1");

    let runs = harness.store.runs(action.id).await;
    assert!(runs[0].success);
    assert_eq!(runs[0].steps_result[0]["result"]["status_code"], 200);
    Ok(())
}

#[tokio::test]
async fn send_webhook_step_fails_on_error_status() -> anyhow::Result<()> {
    let harness = Harness::new();
    let sink = Sink::start(StatusCode::BAD_GATEWAY, "upstream down", Default::default()).await;
    let action = harness
        .action(
            EventType::DocumentDeleted,
            &[
                ActionStep::new("send_webhook", json!({"url": sink.url})),
                ActionStep::new("send_email", json!({})),
            ],
        )
        .await;

    harness
        .bus
        .publish(Event::new(EventType::DocumentDeleted, json!({})));
    harness.bus.flush().await;

    let runs = harness.store.runs(action.id).await;
    assert!(!runs[0].success);
    assert_eq!(runs[0].steps_result.as_array().map(Vec::len), Some(1));
    assert!(
        runs[0]
            .error
            .as_deref()
            .is_some_and(|e| e.starts_with("HTTP 502"))
    );
    Ok(())
}

#[tokio::test]
async fn reserved_step_is_unsupported() -> anyhow::Result<()> {
    let harness = Harness::new();
    let action = harness
        .action(
            EventType::SpaceUpdated,
            &[ActionStep::new("duplicate_document", json!({}))],
        )
        .await;

    harness
        .bus
        .publish(Event::new(EventType::SpaceUpdated, json!({})));
    harness.bus.flush().await;

    let runs = harness.store.runs(action.id).await;
    assert_eq!(
        runs[0].error.as_deref(),
        Some("unsupported step type: duplicate_document")
    );
    Ok(())
}

#[tokio::test]
async fn undecodable_steps_fail_with_one_entry() -> anyhow::Result<()> {
    use atelier_postgres::model::NewAction;
    use atelier_server::automation::SubscriptionStore;

    let harness = Harness::new();
    let action = harness
        .store
        .create_action(NewAction {
            owner_user_id: harness.owner,
            scope_space_id: None,
            scope_database_id: None,
            name: "broken".into(),
            description: String::new(),
            trigger_type: EventType::RowDeleted.as_str().into(),
            trigger_config: json!({}),
            steps: json!({"not": "a list"}),
            active: true,
        })
        .await?;

    let run = harness
        .bus
        .executor()
        .run(&action, json!({"row_id": 3}))
        .await?;

    assert!(!run.success);
    let steps = run.steps_result.as_array().expect("array");
    assert_eq!(steps.len(), 1);
    assert_eq!(steps[0]["step"], 1);
    assert_eq!(steps[0]["success"], false);
    assert!(
        steps[0]["error"]
            .as_str()
            .is_some_and(|e| e.starts_with("invalid step list"))
    );

    let action = harness.store.action(action.id).await.expect("action");
    assert_eq!(action.failure_count, 1);
    assert_eq!(action.run_count, 1);
    Ok(())
}
