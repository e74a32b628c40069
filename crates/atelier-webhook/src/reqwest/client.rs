//! Reqwest-based HTTP client for webhook delivery.

use std::sync::Arc;
use std::time::Instant;

use bytes::{Bytes, BytesMut};
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;

use super::{Error, ReqwestConfig, TRACING_TARGET};
use crate::request::{HEADER_DELIVERY, HEADER_EVENT, HEADER_SIGNATURE};
use crate::response::MAX_BODY_BYTES;
use crate::{ServiceHealth, WebhookProvider, WebhookRequest, WebhookResponse, WebhookService};

struct ReqwestClientInner {
    http: Client,
    config: ReqwestConfig,
}

/// HTTP provider POSTing signed envelopes to webhook endpoints.
///
/// One attempt per delivery, no redirects followed, bounded by the
/// configured total deadline.
#[derive(Clone)]
pub struct ReqwestClient {
    inner: Arc<ReqwestClientInner>,
}

impl std::fmt::Debug for ReqwestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReqwestClient")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

impl ReqwestClient {
    /// Creates a client with the given configuration.
    pub fn new(config: ReqwestConfig) -> crate::Result<Self> {
        let timeout = config.timeout();

        tracing::debug!(
            target: TRACING_TARGET,
            timeout_ms = timeout.as_millis(),
            "Creating reqwest client"
        );

        let http = Client::builder()
            .timeout(timeout)
            .user_agent(config.user_agent())
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| {
                crate::Error::configuration()
                    .with_message("Failed to build HTTP client")
                    .with_source(e)
            })?;

        Ok(Self {
            inner: Arc::new(ReqwestClientInner { http, config }),
        })
    }

    /// Returns the client configuration.
    pub fn config(&self) -> &ReqwestConfig {
        &self.inner.config
    }

    /// Converts this client into a [`WebhookService`].
    pub fn into_service(self) -> WebhookService {
        WebhookService::new(self)
    }

    /// Reads at most [`MAX_BODY_BYTES`] of the body.
    ///
    /// A failed read keeps whatever arrived before it; the status line has
    /// already been received and stays authoritative.
    async fn read_body_prefix(
        response: &mut reqwest::Response,
        request: &WebhookRequest,
    ) -> Bytes {
        let mut buffer = BytesMut::new();
        while buffer.len() < MAX_BODY_BYTES {
            match response.chunk().await {
                Ok(Some(chunk)) => buffer.extend_from_slice(&chunk),
                Ok(None) => break,
                Err(err) => {
                    tracing::debug!(
                        target: TRACING_TARGET,
                        request_id = %request.request_id,
                        error = %err,
                        read = buffer.len(),
                        "Failed to read response body, keeping partial body"
                    );
                    break;
                }
            }
        }

        buffer.truncate(MAX_BODY_BYTES);
        buffer.freeze()
    }
}

#[async_trait::async_trait]
impl WebhookProvider for ReqwestClient {
    async fn deliver(&self, request: &WebhookRequest) -> crate::Result<WebhookResponse> {
        let started_at = Instant::now();
        let timeout = request.timeout.unwrap_or_else(|| self.config().timeout());

        let mut builder = self
            .inner
            .http
            .post(request.url.as_str())
            .header(CONTENT_TYPE, "application/json")
            .header(HEADER_EVENT, &request.event)
            .header(HEADER_DELIVERY, request.request_id.to_string())
            .timeout(timeout);

        if let Some(signature) = &request.signature {
            builder = builder.header(HEADER_SIGNATURE, signature);
        }

        let mut response = builder
            .body(request.body.clone())
            .send()
            .await
            .map_err(Error::from)?;

        let status = response.status();
        let status_code = status.as_u16();
        let body = if status.is_success() {
            Bytes::new()
        } else {
            Self::read_body_prefix(&mut response, request).await
        };

        tracing::debug!(
            target: TRACING_TARGET,
            request_id = %request.request_id,
            status_code,
            "Endpoint responded"
        );

        Ok(WebhookResponse::new(
            request.request_id,
            status_code,
            body,
            started_at.elapsed(),
        ))
    }

    async fn health_check(&self) -> crate::Result<ServiceHealth> {
        Ok(ServiceHealth::healthy())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::Router;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::sync::mpsc;
    use url::Url;

    use super::*;
    use crate::{ErrorKind, WebhookEnvelope, verify_signature};

    async fn spawn_sink(router: Router) -> Url {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });
        Url::parse(&format!("http://{addr}/hook")).unwrap()
    }

    #[tokio::test]
    async fn sends_signed_envelope_with_headers() {
        let (tx, mut rx) = mpsc::unbounded_channel::<(HeaderMap, Bytes)>();
        let router = Router::new().route(
            "/hook",
            post(move |headers: HeaderMap, body: Bytes| {
                let tx = tx.clone();
                async move {
                    let _ = tx.send((headers, body));
                    StatusCode::OK
                }
            }),
        );
        let url = spawn_sink(router).await;

        let envelope = WebhookEnvelope::new("document.created", json!({"doc_id": "abc"}));
        let request = WebhookRequest::from_envelope(url, &envelope)
            .unwrap()
            .with_secret("whsec_test");

        let client = ReqwestClient::new(ReqwestConfig::default()).unwrap();
        let response = client.deliver(&request).await.unwrap();
        assert_eq!(response.status_code, 200);
        assert!(response.is_success());

        let (headers, body) = rx.recv().await.unwrap();
        assert_eq!(body, request.body);
        assert_eq!(headers["content-type"], "application/json");
        assert_eq!(headers["x-webhook-event"], "document.created");
        assert_eq!(
            headers["x-webhook-delivery"].to_str().unwrap(),
            envelope.id.to_string()
        );
        let signature = headers["x-webhook-signature"].to_str().unwrap();
        assert!(verify_signature("whsec_test", &body, signature));
    }

    #[tokio::test]
    async fn keeps_a_prefix_of_error_bodies() {
        let router = Router::new().route(
            "/hook",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "e".repeat(2000)) }),
        );
        let url = spawn_sink(router).await;

        let envelope = WebhookEnvelope::new("row.deleted", json!({}));
        let request = WebhookRequest::from_envelope(url, &envelope).unwrap();

        let client = ReqwestClient::new(ReqwestConfig::default()).unwrap();
        let response = client.deliver(&request).await.unwrap();
        assert_eq!(response.status_code, 500);
        assert_eq!(response.body.len(), MAX_BODY_BYTES);
    }

    #[tokio::test]
    async fn slow_endpoints_time_out() {
        let router = Router::new().route(
            "/hook",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                StatusCode::OK
            }),
        );
        let url = spawn_sink(router).await;

        let envelope = WebhookEnvelope::new("schedule", json!({}));
        let request = WebhookRequest::from_envelope(url, &envelope)
            .unwrap()
            .with_timeout(Duration::from_millis(100));

        let client = ReqwestClient::new(ReqwestConfig::default()).unwrap();
        let error = client.deliver(&request).await.unwrap_err();
        assert_eq!(error.kind, ErrorKind::Timeout);
    }

    #[tokio::test]
    async fn refused_connections_are_network_errors() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let url = Url::parse(&format!("http://{addr}/hook")).unwrap();
        let envelope = WebhookEnvelope::new("schedule", json!({}));
        let request = WebhookRequest::from_envelope(url, &envelope).unwrap();

        let client = ReqwestClient::new(ReqwestConfig::default()).unwrap();
        let error = client.deliver(&request).await.unwrap_err();
        assert!(error.is_transport());
    }

    #[tokio::test]
    async fn status_survives_a_truncated_body() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 8192];
            let _ = socket.read(&mut buf).await;
            let _ = socket
                .write_all(
                    b"HTTP/1.1 500 Internal Server Error\r\nContent-Length: 1000\r\n\r\nshort",
                )
                .await;
            let _ = socket.shutdown().await;
        });

        let url = Url::parse(&format!("http://{addr}/hook")).unwrap();
        let envelope = WebhookEnvelope::new("row.updated", json!({}));
        let request = WebhookRequest::from_envelope(url, &envelope).unwrap();

        let client = ReqwestClient::new(ReqwestConfig::default()).unwrap();
        let response = client.deliver(&request).await.unwrap();
        assert_eq!(response.status_code, 500);
        assert!(!response.is_success());
        assert!(response.body.len() <= 5);
    }

    #[tokio::test]
    async fn success_body_is_not_read() {
        let router = Router::new().route("/hook", post(|| async { "accepted" }));
        let url = spawn_sink(router).await;

        let envelope = WebhookEnvelope::new("row.created", json!({}));
        let request = WebhookRequest::from_envelope(url, &envelope).unwrap();

        let client = ReqwestClient::new(ReqwestConfig::default()).unwrap();
        let response = client.deliver(&request).await.unwrap();
        assert_eq!(response.status_code, 200);
        assert!(response.body.is_empty());
    }
}
