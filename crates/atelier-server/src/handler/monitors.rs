//! Health check handler.

use axum::Router;
use axum::extract::State;
use axum::routing::get;

use crate::automation::{EventBus, SharedStore};
use crate::extract::{AuthState, Json};
use crate::handler::response::{DatabaseStatus, HealthStatus};
use crate::service::ServiceState;

/// Tracing target for monitor operations.
const TRACING_TARGET: &str = "atelier_server::handler::monitors";

/// Liveness is public; pool statistics and in-flight work need a token.
#[tracing::instrument(skip_all, fields(authenticated = auth_state.is_some()))]
async fn health_status(
    State(store): State<SharedStore>,
    State(bus): State<EventBus>,
    auth_state: Option<AuthState>,
) -> Json<HealthStatus> {
    let mut response = HealthStatus::default();

    if auth_state.is_some() {
        response.in_flight = Some(bus.in_flight());
        response.database = store.pool_status().map(DatabaseStatus::from);
    }

    tracing::debug!(
        target: TRACING_TARGET,
        status = ?response.status,
        "Health status prepared"
    );

    Json(response)
}

/// Returns routes for health monitoring.
pub fn routes() -> Router<ServiceState> {
    Router::new().route("/health", get(health_status))
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;
    use crate::handler::test::{create_test_server, create_test_state, token};

    #[tokio::test]
    async fn public_health_has_no_detail() -> anyhow::Result<()> {
        let (state, _) = create_test_state()?;
        let server = create_test_server(state)?;

        let response = server.get("/health").await;
        response.assert_status_ok();

        let health: HealthStatus = response.json();
        assert!(health.in_flight.is_none());
        assert!(health.database.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn authenticated_health_reports_in_flight() -> anyhow::Result<()> {
        let (state, _) = create_test_state()?;
        let server = create_test_server(state)?;

        let response = server
            .get("/health")
            .authorization_bearer(token(Uuid::now_v7())?)
            .await;
        response.assert_status_ok();

        let health: HealthStatus = response.json();
        assert_eq!(health.in_flight, Some(0));
        // The in-memory store has no pool.
        assert!(health.database.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn invalid_token_is_rejected() -> anyhow::Result<()> {
        let (state, _) = create_test_state()?;
        let server = create_test_server(state)?;

        let response = server.get("/health").authorization_bearer("garbage").await;
        response.assert_status_unauthorized();
        Ok(())
    }
}
