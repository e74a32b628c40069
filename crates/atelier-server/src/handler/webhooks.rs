//! Webhook management handlers.
//!
//! Every route is scoped to the caller: a webhook owned by someone else is
//! reported as not found.

use atelier_postgres::model;
use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use serde_json::json;
use uuid::Uuid;

use crate::automation::{EventBus, SharedStore};
use crate::extract::{AuthState, Json, Path, Query, ValidateJson};
use crate::handler::request::{
    CreateWebhook, LogQuery, PageQuery, UpdateWebhook as UpdateWebhookRequest, WebhookPathParams,
};
use crate::handler::response::{
    EventCatalog, Webhook, WebhookDeliveries, WebhookDelivery, WebhookWithSecret, Webhooks,
};
use crate::handler::{ErrorKind, Result};
use crate::service::ServiceState;

/// Tracing target for webhook operations.
const TRACING_TARGET: &str = "atelier_server::handler::webhooks";

/// Event name of the synthetic delivery sent by the test endpoint.
pub const TEST_EVENT: &str = "webhook.test";

async fn list_events(AuthState(_): AuthState) -> Json<EventCatalog> {
    Json(EventCatalog::subscribable())
}

#[tracing::instrument(skip_all, fields(user_id = %auth_state.user_id))]
async fn create_webhook(
    State(store): State<SharedStore>,
    AuthState(auth_state): AuthState,
    ValidateJson(request): ValidateJson<CreateWebhook>,
) -> Result<(StatusCode, Json<WebhookWithSecret>)> {
    tracing::debug!(target: TRACING_TARGET, "Creating webhook");

    let secret = atelier_webhook::generate_secret();
    let webhook = store
        .create_webhook(request.into_model(auth_state.user_id, secret))
        .await?;

    tracing::info!(target: TRACING_TARGET, webhook_id = %webhook.id, "Webhook created");

    Ok((StatusCode::CREATED, Json(webhook.into())))
}

#[tracing::instrument(skip_all, fields(user_id = %auth_state.user_id))]
async fn list_webhooks(
    State(store): State<SharedStore>,
    AuthState(auth_state): AuthState,
    Query(query): Query<PageQuery>,
) -> Result<Json<Webhooks>> {
    let webhooks = store
        .list_webhooks(auth_state.user_id, query.into_pagination())
        .await?;

    tracing::debug!(
        target: TRACING_TARGET,
        webhook_count = webhooks.len(),
        "Webhooks listed"
    );

    Ok(Json(webhooks.into_iter().map(Into::into).collect()))
}

#[tracing::instrument(
    skip_all,
    fields(user_id = %auth_state.user_id, webhook_id = %path_params.webhook_id)
)]
async fn read_webhook(
    State(store): State<SharedStore>,
    AuthState(auth_state): AuthState,
    Path(path_params): Path<WebhookPathParams>,
) -> Result<Json<Webhook>> {
    let webhook = find_owned_webhook(&store, path_params.webhook_id, auth_state.user_id).await?;
    Ok(Json(webhook.into()))
}

#[tracing::instrument(
    skip_all,
    fields(user_id = %auth_state.user_id, webhook_id = %path_params.webhook_id)
)]
async fn update_webhook(
    State(store): State<SharedStore>,
    AuthState(auth_state): AuthState,
    Path(path_params): Path<WebhookPathParams>,
    ValidateJson(request): ValidateJson<UpdateWebhookRequest>,
) -> Result<Json<Webhook>> {
    let webhook = find_owned_webhook(&store, path_params.webhook_id, auth_state.user_id).await?;

    let changes = request.into_model();
    if changes.is_empty() {
        return Ok(Json(webhook.into()));
    }

    let webhook = store.update_webhook(webhook.id, changes).await?;

    tracing::info!(target: TRACING_TARGET, "Webhook updated");

    Ok(Json(webhook.into()))
}

#[tracing::instrument(
    skip_all,
    fields(user_id = %auth_state.user_id, webhook_id = %path_params.webhook_id)
)]
async fn delete_webhook(
    State(store): State<SharedStore>,
    AuthState(auth_state): AuthState,
    Path(path_params): Path<WebhookPathParams>,
) -> Result<StatusCode> {
    let webhook = find_owned_webhook(&store, path_params.webhook_id, auth_state.user_id).await?;

    if !store.delete_webhook(webhook.id).await? {
        return Err(not_found());
    }

    tracing::info!(target: TRACING_TARGET, "Webhook deleted");

    Ok(StatusCode::NO_CONTENT)
}

#[tracing::instrument(
    skip_all,
    fields(user_id = %auth_state.user_id, webhook_id = %path_params.webhook_id)
)]
async fn list_deliveries(
    State(store): State<SharedStore>,
    AuthState(auth_state): AuthState,
    Path(path_params): Path<WebhookPathParams>,
    Query(query): Query<LogQuery>,
) -> Result<Json<WebhookDeliveries>> {
    let webhook = find_owned_webhook(&store, path_params.webhook_id, auth_state.user_id).await?;
    let deliveries = store
        .recent_deliveries(webhook.id, query.into_pagination())
        .await?;

    Ok(Json(deliveries.into_iter().map(Into::into).collect()))
}

/// Sends a synthetic envelope to this webhook only and returns the delivery.
///
/// The outcome counts towards the webhook's counters like any other delivery.
#[tracing::instrument(
    skip_all,
    fields(user_id = %auth_state.user_id, webhook_id = %path_params.webhook_id)
)]
async fn test_webhook(
    State(store): State<SharedStore>,
    State(bus): State<EventBus>,
    AuthState(auth_state): AuthState,
    Path(path_params): Path<WebhookPathParams>,
) -> Result<Json<WebhookDelivery>> {
    let webhook = find_owned_webhook(&store, path_params.webhook_id, auth_state.user_id).await?;

    let data = json!({ "test": true, "webhook_id": webhook.id });
    let delivery = bus.dispatcher().deliver(&webhook, TEST_EVENT, data).await?;

    tracing::info!(
        target: TRACING_TARGET,
        success = delivery.success,
        status_code = delivery.status_code,
        "Test delivery sent"
    );

    Ok(Json(delivery.into()))
}

fn not_found() -> crate::handler::Error<'static> {
    ErrorKind::NotFound
        .with_message("Webhook not found")
        .with_resource("webhook")
}

async fn find_owned_webhook(
    store: &SharedStore,
    webhook_id: Uuid,
    owner_user_id: Uuid,
) -> Result<model::Webhook> {
    store
        .find_owned_webhook(webhook_id, owner_user_id)
        .await?
        .ok_or_else(not_found)
}

/// Returns routes for webhook management.
pub fn routes() -> Router<ServiceState> {
    Router::new()
        .route("/webhooks/events", get(list_events))
        .route("/webhooks", get(list_webhooks).post(create_webhook))
        .route(
            "/webhooks/{webhook_id}",
            get(read_webhook)
                .patch(update_webhook)
                .delete(delete_webhook),
        )
        .route("/webhooks/{webhook_id}/deliveries", get(list_deliveries))
        .route("/webhooks/{webhook_id}/test", post(test_webhook))
}
