mod common;

use std::time::{Duration, Instant};

use atelier_postgres::types::EventType;
use atelier_server::automation::{Event, EventScope};
use axum::http::StatusCode;
use serde_json::json;
use uuid::Uuid;

use crate::common::{Harness, Sink, truncated_response_sink};

#[tokio::test]
async fn delivers_signed_envelope() -> anyhow::Result<()> {
    let harness = Harness::new();
    let sink = Sink::ok().await;
    let webhook = harness
        .webhook(&sink.url, &[EventType::DocumentCreated], None)
        .await;

    harness.bus.publish(Event::new(
        EventType::DocumentCreated,
        json!({"doc_id": "abc"}),
    ));
    harness.bus.flush().await;

    let received = sink.received().await;
    assert_eq!(received.len(), 1);

    let request = &received[0];
    let envelope = request.json();
    assert_eq!(envelope["event"], "document.created");
    assert_eq!(envelope["data"]["doc_id"], "abc");
    assert_eq!(request.header("x-webhook-event"), "document.created");
    assert_eq!(
        request.header("x-webhook-delivery"),
        envelope["id"].as_str().unwrap_or_default()
    );
    assert!(atelier_webhook::verify_signature(
        &webhook.secret,
        &request.body,
        request.header("x-webhook-signature"),
    ));

    let deliveries = harness.store.deliveries(webhook.id).await;
    assert_eq!(deliveries.len(), 1);
    assert!(deliveries[0].success);
    assert_eq!(deliveries[0].status_code, 200);

    let webhook = harness.store.webhook(webhook.id).await.expect("webhook");
    assert_eq!(webhook.success_count, 1);
    assert_eq!(webhook.failure_count, 0);
    Ok(())
}

#[tokio::test]
async fn records_error_status() -> anyhow::Result<()> {
    let harness = Harness::new();
    let sink = Sink::start(
        StatusCode::INTERNAL_SERVER_ERROR,
        "x".repeat(2000),
        Duration::ZERO,
    )
    .await;
    let webhook = harness
        .webhook(&sink.url, &[EventType::DocumentCreated], None)
        .await;

    harness
        .bus
        .publish(Event::new(EventType::DocumentCreated, json!({})));
    harness.bus.flush().await;

    let deliveries = harness.store.deliveries(webhook.id).await;
    assert_eq!(deliveries.len(), 1);
    assert!(!deliveries[0].success);
    assert_eq!(deliveries[0].status_code, 500);
    assert_eq!(deliveries[0].response.len(), 500);

    let webhook = harness.store.webhook(webhook.id).await.expect("webhook");
    assert!(webhook.last_error.starts_with("HTTP 500:"));
    assert!(webhook.last_error_at.is_some());
    assert_eq!(webhook.failure_count, 1);
    assert_eq!(webhook.success_count, 0);
    Ok(())
}

#[tokio::test]
async fn only_subscribed_webhooks_receive() -> anyhow::Result<()> {
    let harness = Harness::new();
    let created_sink = Sink::ok().await;
    let updated_sink = Sink::ok().await;
    let created = harness
        .webhook(&created_sink.url, &[EventType::DocumentCreated], None)
        .await;
    let updated = harness
        .webhook(&updated_sink.url, &[EventType::DocumentUpdated], None)
        .await;

    harness
        .bus
        .publish(Event::new(EventType::DocumentCreated, json!({})));
    harness.bus.flush().await;

    assert_eq!(created_sink.received().await.len(), 1);
    assert!(updated_sink.received().await.is_empty());

    let created = harness.store.webhook(created.id).await.expect("webhook");
    let updated = harness.store.webhook(updated.id).await.expect("webhook");
    assert_eq!(created.total_deliveries(), 1);
    assert_eq!(updated.total_deliveries(), 0);
    Ok(())
}

#[tokio::test]
async fn scoped_webhooks_need_matching_space() -> anyhow::Result<()> {
    let harness = Harness::new();
    let scoped_sink = Sink::ok().await;
    let open_sink = Sink::ok().await;

    let space_one = Uuid::now_v7();
    let space_two = Uuid::now_v7();
    harness
        .webhook(&scoped_sink.url, &[EventType::RowCreated], Some(space_one))
        .await;
    harness
        .webhook(&open_sink.url, &[EventType::RowCreated], None)
        .await;

    harness.bus.publish(
        Event::new(EventType::RowCreated, json!({"row_id": 1}))
            .with_scope(EventScope::space(space_two)),
    );
    harness.bus.flush().await;

    assert!(scoped_sink.received().await.is_empty());
    assert_eq!(open_sink.received().await.len(), 1);
    Ok(())
}

#[tokio::test]
async fn inactive_webhooks_are_skipped() -> anyhow::Result<()> {
    use atelier_postgres::model::UpdateWebhook;
    use atelier_server::automation::SubscriptionStore;

    let harness = Harness::new();
    let sink = Sink::ok().await;
    let webhook = harness
        .webhook(&sink.url, &[EventType::SpaceCreated], None)
        .await;
    harness
        .store
        .update_webhook(
            webhook.id,
            UpdateWebhook {
                active: Some(false),
                ..Default::default()
            },
        )
        .await?;

    harness
        .bus
        .publish(Event::new(EventType::SpaceCreated, json!({})));
    harness.bus.flush().await;

    assert!(sink.received().await.is_empty());
    assert!(harness.store.deliveries(webhook.id).await.is_empty());
    Ok(())
}

#[tokio::test]
async fn unreachable_endpoint_counts_as_failure() -> anyhow::Result<()> {
    let harness = Harness::new();
    let webhook = harness
        .webhook("http://127.0.0.1:9/hook", &[EventType::CommentCreated], None)
        .await;

    harness
        .bus
        .publish(Event::new(EventType::CommentCreated, json!({})));
    harness.bus.flush().await;

    let deliveries = harness.store.deliveries(webhook.id).await;
    assert_eq!(deliveries.len(), 1);
    assert_eq!(deliveries[0].status_code, 0);
    assert!(!deliveries[0].success);

    let webhook = harness.store.webhook(webhook.id).await.expect("webhook");
    assert_eq!(webhook.failure_count, 1);
    assert!(!webhook.last_error.is_empty());
    Ok(())
}

#[tokio::test]
async fn deliveries_run_concurrently() -> anyhow::Result<()> {
    let harness = Harness::new();
    let mut sinks = Vec::new();
    let mut ids = Vec::new();
    for _ in 0..10 {
        let sink = Sink::start(StatusCode::OK, "ok", Duration::from_millis(100)).await;
        let webhook = harness
            .webhook(&sink.url, &[EventType::DocumentShared], None)
            .await;
        ids.push(webhook.id);
        sinks.push(sink);
    }

    let started = Instant::now();
    harness
        .bus
        .publish(Event::new(EventType::DocumentShared, json!({})));
    harness.bus.flush().await;
    let elapsed = started.elapsed();

    for sink in &sinks {
        assert_eq!(sink.received().await.len(), 1);
    }
    assert!(elapsed < Duration::from_millis(500), "took {elapsed:?}");

    for id in ids {
        let webhook = harness.store.webhook(id).await.expect("webhook");
        assert_eq!(webhook.success_count, 1);
    }
    Ok(())
}

#[tokio::test]
async fn status_is_kept_when_body_is_cut_short() -> anyhow::Result<()> {
    let harness = Harness::new();
    let failing_url = truncated_response_sink("500 Internal Server Error").await;
    let passing_url = truncated_response_sink("200 OK").await;
    let failing = harness
        .webhook(&failing_url, &[EventType::PropertyChanged], None)
        .await;
    let passing = harness
        .webhook(&passing_url, &[EventType::PropertyChanged], None)
        .await;

    harness
        .bus
        .publish(Event::new(EventType::PropertyChanged, json!({})));
    harness.bus.flush().await;

    let deliveries = harness.store.deliveries(failing.id).await;
    assert_eq!(deliveries.len(), 1);
    assert_eq!(deliveries[0].status_code, 500);
    assert!(!deliveries[0].success);
    let failing = harness.store.webhook(failing.id).await.expect("webhook");
    assert!(failing.last_error.starts_with("HTTP 500:"));
    assert_eq!(failing.failure_count, 1);

    let deliveries = harness.store.deliveries(passing.id).await;
    assert_eq!(deliveries.len(), 1);
    assert_eq!(deliveries[0].status_code, 200);
    assert!(deliveries[0].success);
    let passing = harness.store.webhook(passing.id).await.expect("webhook");
    assert_eq!(passing.success_count, 1);
    assert_eq!(passing.failure_count, 0);
    Ok(())
}

#[tokio::test]
async fn nul_bytes_are_dropped_from_error_excerpts() -> anyhow::Result<()> {
    let harness = Harness::new();
    let sink = Sink::start(StatusCode::BAD_GATEWAY, "a\0b", Duration::ZERO).await;
    let webhook = harness
        .webhook(&sink.url, &[EventType::CommentResolved], None)
        .await;

    harness
        .bus
        .publish(Event::new(EventType::CommentResolved, json!({})));
    harness.bus.flush().await;

    let deliveries = harness.store.deliveries(webhook.id).await;
    assert_eq!(deliveries.len(), 1);
    assert_eq!(deliveries[0].status_code, 502);
    assert_eq!(deliveries[0].response, "ab");

    let webhook = harness.store.webhook(webhook.id).await.expect("webhook");
    assert_eq!(webhook.last_error, "HTTP 502: ab");
    assert_eq!(webhook.failure_count, 1);
    Ok(())
}
