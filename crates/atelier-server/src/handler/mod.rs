//! All `axum::`[`Router`]s with related `axum::`[`Handler`]s.
//!
//! ```rust,no_run
//! use atelier_server::handler::routes;
//! use atelier_server::service::{ServiceConfig, ServiceState};
//!
//! # async fn example(config: ServiceConfig) -> anyhow::Result<()> {
//! let state = ServiceState::from_config(&config).await?;
//! let app: axum::Router = routes().with_state(state);
//! # Ok(())
//! # }
//! ```
//!
//! [`Router`]: axum::routing::Router
//! [`Handler`]: axum::handler::Handler

mod actions;
mod error;
mod events;
mod monitors;
pub mod request;
pub mod response;
mod webhooks;

use axum::Router;
use axum::response::{IntoResponse, Response};

pub use crate::handler::error::{Error, ErrorKind, Result};
pub use crate::handler::webhooks::TEST_EVENT;
use crate::service::ServiceState;

#[inline]
async fn fallback() -> Response {
    ErrorKind::NotFound.into_response()
}

/// Returns a [`Router`] with every route.
pub fn routes() -> Router<ServiceState> {
    Router::new()
        .merge(webhooks::routes())
        .merge(actions::routes())
        .merge(events::routes())
        .merge(monitors::routes())
        .fallback(fallback)
}

#[cfg(test)]
pub(crate) mod test {
    use std::sync::Arc;

    use atelier_webhook::WebhookService;
    use atelier_webhook::reqwest::{ReqwestClient, ReqwestConfig};
    use axum_test::TestServer;
    use jiff::SignedDuration;
    use uuid::Uuid;

    use super::routes;
    use crate::automation::{AutomationConfig, MemoryStore};
    use crate::extract::AuthClaims;
    use crate::service::{AuthKeys, ServiceState};

    pub const TEST_SECRET: &[u8] = b"an-hmac-secret-of-at-least-32-bytes!";

    /// State over an in-memory store with a real HTTP client.
    pub fn create_test_state() -> anyhow::Result<(ServiceState, Arc<MemoryStore>)> {
        let store = Arc::new(MemoryStore::default());
        let webhook: WebhookService =
            ReqwestClient::new(ReqwestConfig::default().with_timeout(5))?.into_service();
        let state = ServiceState::new(
            store.clone(),
            webhook,
            AuthKeys::from_secret(TEST_SECRET),
            &AutomationConfig::default(),
        );
        Ok((state, store))
    }

    pub fn create_test_server(state: ServiceState) -> anyhow::Result<TestServer> {
        Ok(TestServer::new(routes().with_state(state))?)
    }

    /// Token for `user_id`, valid for an hour.
    pub fn token(user_id: Uuid) -> anyhow::Result<String> {
        let claims = AuthClaims::new(user_id, SignedDuration::from_hours(1));
        Ok(claims.encode(&AuthKeys::from_secret(TEST_SECRET))?)
    }

    #[tokio::test]
    async fn unknown_routes_are_not_found() -> anyhow::Result<()> {
        let (state, _) = create_test_state()?;
        let server = create_test_server(state)?;

        let response = server.get("/nowhere").await;
        response.assert_status_not_found();
        Ok(())
    }
}
