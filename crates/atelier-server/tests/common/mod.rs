//! Shared fixtures: an in-memory bus and local HTTP sinks.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use atelier_postgres::model::{Action, NewAction, NewWebhook, Webhook};
use atelier_postgres::types::{ActionStep, EventType};
use atelier_server::automation::{
    AutomationConfig, EventBus, MemoryStore, StepRegistry, SubscriptionStore,
};
use atelier_webhook::WebhookService;
use atelier_webhook::reqwest::{ReqwestClient, ReqwestConfig};
use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use uuid::Uuid;

/// One request captured by a [`Sink`].
#[derive(Debug, Clone)]
pub struct Received {
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl Received {
    pub fn header(&self, name: &str) -> &str {
        self.headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).expect("sink received JSON")
    }
}

#[derive(Clone)]
struct SinkState {
    status: StatusCode,
    body: String,
    delay: Duration,
    received: Arc<Mutex<Vec<Received>>>,
}

/// Local endpoint that records every POST and answers with a fixed response.
#[derive(Clone)]
pub struct Sink {
    pub url: String,
    received: Arc<Mutex<Vec<Received>>>,
}

impl Sink {
    pub async fn start(status: StatusCode, body: impl Into<String>, delay: Duration) -> Self {
        let received = Arc::new(Mutex::new(Vec::new()));
        let state = SinkState {
            status,
            body: body.into(),
            delay,
            received: received.clone(),
        };

        let app = Router::new()
            .route("/hook", post(receive))
            .with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind sink");
        let addr = listener.local_addr().expect("sink address");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("sink server");
        });

        Self {
            url: format!("http://{addr}/hook"),
            received,
        }
    }

    pub async fn ok() -> Self {
        Self::start(StatusCode::OK, "ok", Duration::ZERO).await
    }

    pub async fn received(&self) -> Vec<Received> {
        self.received.lock().await.clone()
    }
}

/// Raw TCP endpoint that sends `status_line` with a `Content-Length` larger
/// than the body it writes, then closes the connection.
pub async fn truncated_response_sink(status_line: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind sink");
    let addr = listener.local_addr().expect("sink address");
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let mut request = vec![0u8; 16 * 1024];
            let _ = socket.read(&mut request).await;
            let head = format!("HTTP/1.1 {status_line}\r\nContent-Length: 1000\r\n\r\nshort");
            let _ = socket.write_all(head.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });

    format!("http://{addr}/hook")
}

async fn receive(
    State(state): State<SinkState>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, String) {
    if !state.delay.is_zero() {
        tokio::time::sleep(state.delay).await;
    }
    state.received.lock().await.push(Received { headers, body });
    (state.status, state.body.clone())
}

/// Bus over a fresh in-memory store.
pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub bus: EventBus,
    pub owner: Uuid,
}

impl Harness {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::default());
        let webhook = webhook_service();
        let registry = StepRegistry::with_defaults(webhook.clone());
        let bus = EventBus::new(
            store.clone(),
            webhook,
            registry,
            &AutomationConfig::default(),
        );

        Self {
            store,
            bus,
            owner: Uuid::now_v7(),
        }
    }

    pub async fn webhook(
        &self,
        url: &str,
        events: &[EventType],
        scope_space_id: Option<Uuid>,
    ) -> Webhook {
        self.store
            .create_webhook(NewWebhook {
                owner_user_id: self.owner,
                scope_space_id,
                name: "test".into(),
                url: url.into(),
                secret: atelier_webhook::generate_secret(),
                events: NewWebhook::encode_events(events),
                active: true,
            })
            .await
            .expect("create webhook")
    }

    pub async fn action(&self, trigger: EventType, steps: &[ActionStep]) -> Action {
        self.store
            .create_action(NewAction {
                owner_user_id: self.owner,
                scope_space_id: None,
                scope_database_id: None,
                name: "test".into(),
                description: String::new(),
                trigger_type: trigger.as_str().into(),
                trigger_config: serde_json::json!({}),
                steps: NewAction::encode_steps(steps),
                active: true,
            })
            .await
            .expect("create action")
    }
}

pub fn webhook_service() -> WebhookService {
    ReqwestClient::new(ReqwestConfig::default().with_timeout(5))
        .expect("http client")
        .into_service()
}
