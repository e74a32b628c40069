//! Persistence seams of the automation core.
//!
//! [`SubscriptionStore`] holds webhook and action definitions together with
//! their health counters; [`DeliveryLog`] is the append-only record of every
//! delivery attempt and action run. Both are object safe so the dispatcher,
//! the executor and the handlers can share one [`SharedStore`].
//!
//! Counter updates and log writes are separate calls and are not atomic with
//! each other.

mod memory;
mod postgres;

use std::sync::Arc;

use atelier_postgres::PgPoolStatus;
use atelier_postgres::PgResult;
use atelier_postgres::model::{
    Action, ActionRun, NewAction, NewActionRun, NewWebhook, NewWebhookDelivery, UpdateAction,
    UpdateWebhook, Webhook, WebhookDelivery,
};
use atelier_postgres::query::Pagination;
use atelier_postgres::types::EventType;
use uuid::Uuid;

pub use self::memory::MemoryStore;
pub use self::postgres::PgAutomationStore;

/// Webhook and action subscriptions.
#[async_trait::async_trait]
pub trait SubscriptionStore: Send + Sync {
    /// Inserts a webhook.
    async fn create_webhook(&self, new_webhook: NewWebhook) -> PgResult<Webhook>;

    /// Finds a webhook owned by `owner_user_id`.
    async fn find_owned_webhook(
        &self,
        webhook_id: Uuid,
        owner_user_id: Uuid,
    ) -> PgResult<Option<Webhook>>;

    /// Lists the webhooks of one owner, newest first.
    async fn list_webhooks(
        &self,
        owner_user_id: Uuid,
        pagination: Pagination,
    ) -> PgResult<Vec<Webhook>>;

    /// Applies changes to a webhook.
    async fn update_webhook(&self, webhook_id: Uuid, changes: UpdateWebhook) -> PgResult<Webhook>;

    /// Deletes a webhook together with its deliveries.
    async fn delete_webhook(&self, webhook_id: Uuid) -> PgResult<bool>;

    /// Active webhooks subscribed to `event` whose scope is unset or equal to `space_id`.
    async fn active_webhooks_for(
        &self,
        event: EventType,
        space_id: Option<Uuid>,
    ) -> PgResult<Vec<Webhook>>;

    /// Increments `success_count`.
    async fn record_webhook_success(&self, webhook_id: Uuid) -> PgResult<()>;

    /// Increments `failure_count` and stores the error with the current time.
    async fn record_webhook_failure(&self, webhook_id: Uuid, error_message: &str) -> PgResult<()>;

    /// Inserts an action.
    async fn create_action(&self, new_action: NewAction) -> PgResult<Action>;

    /// Finds an action owned by `owner_user_id`.
    async fn find_owned_action(
        &self,
        action_id: Uuid,
        owner_user_id: Uuid,
    ) -> PgResult<Option<Action>>;

    /// Lists the actions of one owner, newest first.
    async fn list_actions(
        &self,
        owner_user_id: Uuid,
        pagination: Pagination,
    ) -> PgResult<Vec<Action>>;

    /// Applies changes to an action.
    async fn update_action(&self, action_id: Uuid, changes: UpdateAction) -> PgResult<Action>;

    /// Deletes an action together with its runs.
    async fn delete_action(&self, action_id: Uuid) -> PgResult<bool>;

    /// Active actions triggered by `trigger` whose scopes are unset or equal.
    async fn active_actions_for(
        &self,
        trigger: EventType,
        space_id: Option<Uuid>,
        database_id: Option<Uuid>,
    ) -> PgResult<Vec<Action>>;

    /// Sets `last_run_at` to now.
    async fn set_action_last_run(&self, action_id: Uuid) -> PgResult<()>;

    /// Increments `run_count` and `success_count`.
    async fn increment_action_success(&self, action_id: Uuid) -> PgResult<()>;

    /// Increments `run_count` and `failure_count` and stores the error.
    async fn record_action_failure(&self, action_id: Uuid, error_message: &str) -> PgResult<()>;
}

/// Append-only log of deliveries and runs.
#[async_trait::async_trait]
pub trait DeliveryLog: Send + Sync {
    /// Appends a webhook delivery.
    async fn append_delivery(&self, delivery: NewWebhookDelivery) -> PgResult<WebhookDelivery>;

    /// Most recent deliveries of one webhook first.
    async fn recent_deliveries(
        &self,
        webhook_id: Uuid,
        pagination: Pagination,
    ) -> PgResult<Vec<WebhookDelivery>>;

    /// Appends an action run.
    async fn append_run(&self, run: NewActionRun) -> PgResult<ActionRun>;

    /// Most recent runs of one action first.
    async fn recent_runs(&self, action_id: Uuid, pagination: Pagination)
    -> PgResult<Vec<ActionRun>>;
}

/// Everything the automation core and the handlers need from storage.
pub trait AutomationStore: SubscriptionStore + DeliveryLog {
    /// Connection pool statistics, when backed by a database.
    fn pool_status(&self) -> Option<PgPoolStatus> {
        None
    }
}

/// Store shared between the bus, the dispatcher, the executor and the handlers.
pub type SharedStore = Arc<dyn AutomationStore>;
