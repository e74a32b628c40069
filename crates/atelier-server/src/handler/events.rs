//! Event publication handler.
//!
//! Other parts of the platform call `POST /events` after a mutation; the
//! bus takes it from there.

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use jiff::Timestamp;

use crate::automation::EventBus;
use crate::extract::{AuthState, Json, ValidateJson};
use crate::handler::request::PublishEvent;
use crate::handler::response::EventAccepted;
use crate::handler::{ErrorKind, Result};
use crate::service::ServiceState;

/// Tracing target for event publication.
const TRACING_TARGET: &str = "atelier_server::handler::events";

#[tracing::instrument(skip_all, fields(user_id = %auth_state.user_id, event = %request.event))]
async fn publish_event(
    State(bus): State<EventBus>,
    AuthState(auth_state): AuthState,
    ValidateJson(request): ValidateJson<PublishEvent>,
) -> Result<(StatusCode, Json<EventAccepted>)> {
    let Some(event) = request.into_event() else {
        return Err(ErrorKind::BadRequest
            .with_message("Unknown event")
            .with_resource("event"));
    };

    let accepted = EventAccepted {
        event: event.event_type,
        space_id: event.scope.space_id,
        database_id: event.scope.database_id,
        accepted_at: Timestamp::now(),
    };

    bus.publish(event);

    tracing::debug!(target: TRACING_TARGET, "Event accepted");

    Ok((StatusCode::ACCEPTED, Json(accepted)))
}

/// Returns routes for event publication.
pub fn routes() -> Router<ServiceState> {
    Router::new().route("/events", post(publish_event))
}
