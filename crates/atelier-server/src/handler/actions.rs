//! Action management handlers.

use atelier_postgres::model;
use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use uuid::Uuid;

use crate::automation::{EventBus, SharedStore};
use crate::extract::{AuthState, Json, Path, Query, ValidateJson};
use crate::handler::request::{
    ActionPathParams, CreateAction, LogQuery, PageQuery, RunAction,
    UpdateAction as UpdateActionRequest,
};
use crate::handler::response::{Action, ActionRun, ActionRuns, Actions, TriggerCatalog};
use crate::handler::{ErrorKind, Result};
use crate::service::ServiceState;

/// Tracing target for action operations.
const TRACING_TARGET: &str = "atelier_server::handler::actions";

async fn list_triggers(AuthState(_): AuthState) -> Json<TriggerCatalog> {
    Json(TriggerCatalog::default())
}

#[tracing::instrument(skip_all, fields(user_id = %auth_state.user_id))]
async fn create_action(
    State(store): State<SharedStore>,
    AuthState(auth_state): AuthState,
    ValidateJson(request): ValidateJson<CreateAction>,
) -> Result<(StatusCode, Json<Action>)> {
    tracing::debug!(target: TRACING_TARGET, "Creating action");

    let action = store
        .create_action(request.into_model(auth_state.user_id))
        .await?;

    tracing::info!(
        target: TRACING_TARGET,
        action_id = %action.id,
        trigger = %action.trigger_type,
        "Action created"
    );

    Ok((StatusCode::CREATED, Json(action.into())))
}

#[tracing::instrument(skip_all, fields(user_id = %auth_state.user_id))]
async fn list_actions(
    State(store): State<SharedStore>,
    AuthState(auth_state): AuthState,
    Query(query): Query<PageQuery>,
) -> Result<Json<Actions>> {
    let actions = store
        .list_actions(auth_state.user_id, query.into_pagination())
        .await?;

    Ok(Json(actions.into_iter().map(Into::into).collect()))
}

#[tracing::instrument(
    skip_all,
    fields(user_id = %auth_state.user_id, action_id = %path_params.action_id)
)]
async fn read_action(
    State(store): State<SharedStore>,
    AuthState(auth_state): AuthState,
    Path(path_params): Path<ActionPathParams>,
) -> Result<Json<Action>> {
    let action = find_owned_action(&store, path_params.action_id, auth_state.user_id).await?;
    Ok(Json(action.into()))
}

#[tracing::instrument(
    skip_all,
    fields(user_id = %auth_state.user_id, action_id = %path_params.action_id)
)]
async fn update_action(
    State(store): State<SharedStore>,
    AuthState(auth_state): AuthState,
    Path(path_params): Path<ActionPathParams>,
    ValidateJson(request): ValidateJson<UpdateActionRequest>,
) -> Result<Json<Action>> {
    let action = find_owned_action(&store, path_params.action_id, auth_state.user_id).await?;

    let changes = request.into_model();
    if changes.is_empty() {
        return Ok(Json(action.into()));
    }

    let action = store.update_action(action.id, changes).await?;

    tracing::info!(target: TRACING_TARGET, "Action updated");

    Ok(Json(action.into()))
}

#[tracing::instrument(
    skip_all,
    fields(user_id = %auth_state.user_id, action_id = %path_params.action_id)
)]
async fn delete_action(
    State(store): State<SharedStore>,
    AuthState(auth_state): AuthState,
    Path(path_params): Path<ActionPathParams>,
) -> Result<StatusCode> {
    let action = find_owned_action(&store, path_params.action_id, auth_state.user_id).await?;

    if !store.delete_action(action.id).await? {
        return Err(not_found());
    }

    tracing::info!(target: TRACING_TARGET, "Action deleted");

    Ok(StatusCode::NO_CONTENT)
}

#[tracing::instrument(
    skip_all,
    fields(user_id = %auth_state.user_id, action_id = %path_params.action_id)
)]
async fn list_runs(
    State(store): State<SharedStore>,
    AuthState(auth_state): AuthState,
    Path(path_params): Path<ActionPathParams>,
    Query(query): Query<LogQuery>,
) -> Result<Json<ActionRuns>> {
    let action = find_owned_action(&store, path_params.action_id, auth_state.user_id).await?;
    let runs = store.recent_runs(action.id, query.into_pagination()).await?;

    Ok(Json(runs.into_iter().map(Into::into).collect()))
}

/// Runs the action now with the supplied payload and returns the run.
///
/// Inactive actions can still be run by hand.
#[tracing::instrument(
    skip_all,
    fields(user_id = %auth_state.user_id, action_id = %path_params.action_id)
)]
async fn run_action(
    State(store): State<SharedStore>,
    State(bus): State<EventBus>,
    AuthState(auth_state): AuthState,
    Path(path_params): Path<ActionPathParams>,
    request: Option<Json<RunAction>>,
) -> Result<Json<ActionRun>> {
    let action = find_owned_action(&store, path_params.action_id, auth_state.user_id).await?;
    let Json(request) = request.unwrap_or_default();

    let run = bus.executor().run(&action, request.data).await?;

    tracing::info!(
        target: TRACING_TARGET,
        run_id = %run.id,
        success = run.success,
        "Manual run finished"
    );

    Ok(Json(run.into()))
}

fn not_found() -> crate::handler::Error<'static> {
    ErrorKind::NotFound
        .with_message("Action not found")
        .with_resource("action")
}

async fn find_owned_action(
    store: &SharedStore,
    action_id: Uuid,
    owner_user_id: Uuid,
) -> Result<model::Action> {
    store
        .find_owned_action(action_id, owner_user_id)
        .await?
        .ok_or_else(not_found)
}

/// Returns routes for action management.
pub fn routes() -> Router<ServiceState> {
    Router::new()
        .route("/actions/triggers", get(list_triggers))
        .route("/actions", get(list_actions).post(create_action))
        .route(
            "/actions/{action_id}",
            get(read_action).patch(update_action).delete(delete_action),
        )
        .route("/actions/{action_id}/runs", get(list_runs))
        .route("/actions/{action_id}/run", post(run_action))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::{Value, json};

    use super::*;
    use crate::handler::test::{create_test_server, create_test_state, token};

    #[tokio::test]
    async fn manual_run_stops_at_unsupported_step() -> anyhow::Result<()> {
        let (state, store) = create_test_state()?;
        let server = create_test_server(state)?;
        let token = token(Uuid::now_v7())?;

        let response = server
            .post("/actions")
            .authorization_bearer(&token)
            .json(&json!({
                "name": "Triage",
                "trigger_type": "row.created",
                "steps": [
                    {"type": "add_comment", "config": {"body": "hi"}},
                    {"type": "create_row"},
                    {"type": "send_slack"},
                ],
            }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let action: Action = response.json();

        let response = server
            .post(&format!("/actions/{}/run", action.id))
            .authorization_bearer(&token)
            .json(&json!({"data": {"row_id": 42}}))
            .await;
        response.assert_status_ok();

        let run: ActionRun = response.json();
        assert!(!run.success);
        assert_eq!(run.trigger_data, json!({"row_id": 42}));
        assert_eq!(run.steps_result.as_array().map(Vec::len), Some(2));
        assert_eq!(run.steps_result[0]["success"], true);
        assert_eq!(run.steps_result[1]["success"], false);
        assert_eq!(
            run.error.as_deref(),
            Some("unsupported step type: create_row")
        );

        let stored = store.action(action.id).await.expect("stored");
        assert_eq!(stored.run_count, 1);
        assert_eq!(stored.failure_count, 1);
        assert_eq!(stored.success_count, 0);
        Ok(())
    }

    #[tokio::test]
    async fn run_without_body_uses_null_payload() -> anyhow::Result<()> {
        let (state, _) = create_test_state()?;
        let server = create_test_server(state)?;
        let token = token(Uuid::now_v7())?;

        let action: Action = server
            .post("/actions")
            .authorization_bearer(&token)
            .json(&json!({
                "name": "Marker",
                "trigger_type": "space.created",
                "steps": [{"type": "update_property"}],
            }))
            .await
            .json();

        let response = server
            .post(&format!("/actions/{}/run", action.id))
            .authorization_bearer(&token)
            .await;
        response.assert_status_ok();

        let run: ActionRun = response.json();
        assert!(run.success);
        assert_eq!(run.trigger_data, Value::Null);
        assert_eq!(
            run.steps_result[0]["result"],
            json!({"status": "ok", "step": "update_property"})
        );

        let response = server
            .get(&format!("/actions/{}/runs?limit=5", action.id))
            .authorization_bearer(&token)
            .await;
        let runs: ActionRuns = response.json();
        assert_eq!(runs.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn empty_steps_are_rejected() -> anyhow::Result<()> {
        let (state, _) = create_test_state()?;
        let server = create_test_server(state)?;

        let response = server
            .post("/actions")
            .authorization_bearer(token(Uuid::now_v7())?)
            .json(&json!({"name": "Empty", "trigger_type": "row.created", "steps": []}))
            .await;
        response.assert_status_bad_request();
        Ok(())
    }

    #[tokio::test]
    async fn triggers_include_step_types() -> anyhow::Result<()> {
        let (state, _) = create_test_state()?;
        let server = create_test_server(state)?;

        let response = server
            .get("/actions/triggers")
            .authorization_bearer(token(Uuid::now_v7())?)
            .await;
        response.assert_status_ok();

        let catalog: Value = response.json();
        assert!(catalog["step_types"]["routed"].to_string().contains("send_webhook"));
        assert!(catalog["step_types"]["reserved"].to_string().contains("assign_user"));
        assert!(catalog["categories"].to_string().contains("schedule"));
        Ok(())
    }

    #[tokio::test]
    async fn delete_removes_the_action() -> anyhow::Result<()> {
        let (state, store) = create_test_state()?;
        let server = create_test_server(state)?;
        let token = token(Uuid::now_v7())?;

        let action: Action = server
            .post("/actions")
            .authorization_bearer(&token)
            .json(&json!({
                "name": "Temporary",
                "trigger_type": "row.deleted",
                "steps": [{"type": "add_comment"}],
            }))
            .await
            .json();

        let path = format!("/actions/{}", action.id);
        server
            .delete(&path)
            .authorization_bearer(&token)
            .await
            .assert_status(StatusCode::NO_CONTENT);
        server
            .get(&path)
            .authorization_bearer(&token)
            .await
            .assert_status_not_found();
        assert!(store.action(action.id).await.is_none());
        Ok(())
    }
}
