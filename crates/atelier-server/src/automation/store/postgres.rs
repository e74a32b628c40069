//! Store backed by the PostgreSQL connection pool.

use atelier_postgres::model::{
    Action, ActionRun, NewAction, NewActionRun, NewWebhook, NewWebhookDelivery, UpdateAction,
    UpdateWebhook, Webhook, WebhookDelivery,
};
use atelier_postgres::query::{
    ActionRepository, ActionRunRepository, Pagination, WebhookDeliveryRepository,
    WebhookRepository,
};
use atelier_postgres::types::EventType;
use atelier_postgres::{PgClient, PgPoolStatus, PgResult};
use uuid::Uuid;

use super::{AutomationStore, DeliveryLog, SubscriptionStore};

/// [`AutomationStore`] over a [`PgClient`].
///
/// Every call checks a connection out of the pool for the duration of one
/// query. Counter updates are single `UPDATE ... SET col = col + 1`
/// statements.
#[derive(Debug, Clone)]
pub struct PgAutomationStore {
    pg_client: PgClient,
}

impl PgAutomationStore {
    /// Wraps a database client.
    pub fn new(pg_client: PgClient) -> Self {
        Self { pg_client }
    }

    /// Returns the underlying client.
    pub fn pg_client(&self) -> &PgClient {
        &self.pg_client
    }
}

#[async_trait::async_trait]
impl SubscriptionStore for PgAutomationStore {
    async fn create_webhook(&self, new_webhook: NewWebhook) -> PgResult<Webhook> {
        let mut conn = self.pg_client.get_connection().await?;
        conn.create_webhook(new_webhook).await
    }

    async fn find_owned_webhook(
        &self,
        webhook_id: Uuid,
        owner_user_id: Uuid,
    ) -> PgResult<Option<Webhook>> {
        let mut conn = self.pg_client.get_connection().await?;
        conn.find_owned_webhook(webhook_id, owner_user_id).await
    }

    async fn list_webhooks(
        &self,
        owner_user_id: Uuid,
        pagination: Pagination,
    ) -> PgResult<Vec<Webhook>> {
        let mut conn = self.pg_client.get_connection().await?;
        conn.list_webhooks_by_owner(owner_user_id, pagination).await
    }

    async fn update_webhook(&self, webhook_id: Uuid, changes: UpdateWebhook) -> PgResult<Webhook> {
        let mut conn = self.pg_client.get_connection().await?;
        conn.update_webhook(webhook_id, changes).await
    }

    async fn delete_webhook(&self, webhook_id: Uuid) -> PgResult<bool> {
        let mut conn = self.pg_client.get_connection().await?;
        conn.delete_webhook(webhook_id).await
    }

    async fn active_webhooks_for(
        &self,
        event: EventType,
        space_id: Option<Uuid>,
    ) -> PgResult<Vec<Webhook>> {
        let mut conn = self.pg_client.get_connection().await?;
        conn.find_active_webhooks_for_event(event, space_id).await
    }

    async fn record_webhook_success(&self, webhook_id: Uuid) -> PgResult<()> {
        let mut conn = self.pg_client.get_connection().await?;
        conn.record_webhook_success(webhook_id).await
    }

    async fn record_webhook_failure(&self, webhook_id: Uuid, error_message: &str) -> PgResult<()> {
        let mut conn = self.pg_client.get_connection().await?;
        conn.record_webhook_failure(webhook_id, error_message).await
    }

    async fn create_action(&self, new_action: NewAction) -> PgResult<Action> {
        let mut conn = self.pg_client.get_connection().await?;
        conn.create_action(new_action).await
    }

    async fn find_owned_action(
        &self,
        action_id: Uuid,
        owner_user_id: Uuid,
    ) -> PgResult<Option<Action>> {
        let mut conn = self.pg_client.get_connection().await?;
        conn.find_owned_action(action_id, owner_user_id).await
    }

    async fn list_actions(
        &self,
        owner_user_id: Uuid,
        pagination: Pagination,
    ) -> PgResult<Vec<Action>> {
        let mut conn = self.pg_client.get_connection().await?;
        conn.list_actions_by_owner(owner_user_id, pagination).await
    }

    async fn update_action(&self, action_id: Uuid, changes: UpdateAction) -> PgResult<Action> {
        let mut conn = self.pg_client.get_connection().await?;
        conn.update_action(action_id, changes).await
    }

    async fn delete_action(&self, action_id: Uuid) -> PgResult<bool> {
        let mut conn = self.pg_client.get_connection().await?;
        conn.delete_action(action_id).await
    }

    async fn active_actions_for(
        &self,
        trigger: EventType,
        space_id: Option<Uuid>,
        database_id: Option<Uuid>,
    ) -> PgResult<Vec<Action>> {
        let mut conn = self.pg_client.get_connection().await?;
        conn.find_active_actions_for_trigger(trigger, space_id, database_id)
            .await
    }

    async fn set_action_last_run(&self, action_id: Uuid) -> PgResult<()> {
        let mut conn = self.pg_client.get_connection().await?;
        conn.set_action_last_run(action_id).await
    }

    async fn increment_action_success(&self, action_id: Uuid) -> PgResult<()> {
        let mut conn = self.pg_client.get_connection().await?;
        conn.increment_action_success(action_id).await
    }

    async fn record_action_failure(&self, action_id: Uuid, error_message: &str) -> PgResult<()> {
        let mut conn = self.pg_client.get_connection().await?;
        conn.record_action_failure(action_id, error_message).await
    }
}

#[async_trait::async_trait]
impl DeliveryLog for PgAutomationStore {
    async fn append_delivery(&self, delivery: NewWebhookDelivery) -> PgResult<WebhookDelivery> {
        let mut conn = self.pg_client.get_connection().await?;
        conn.create_webhook_delivery(delivery).await
    }

    async fn recent_deliveries(
        &self,
        webhook_id: Uuid,
        pagination: Pagination,
    ) -> PgResult<Vec<WebhookDelivery>> {
        let mut conn = self.pg_client.get_connection().await?;
        conn.list_webhook_deliveries(webhook_id, pagination).await
    }

    async fn append_run(&self, run: NewActionRun) -> PgResult<ActionRun> {
        let mut conn = self.pg_client.get_connection().await?;
        conn.create_action_run(run).await
    }

    async fn recent_runs(
        &self,
        action_id: Uuid,
        pagination: Pagination,
    ) -> PgResult<Vec<ActionRun>> {
        let mut conn = self.pg_client.get_connection().await?;
        conn.list_action_runs(action_id, pagination).await
    }
}

impl AutomationStore for PgAutomationStore {
    fn pool_status(&self) -> Option<PgPoolStatus> {
        Some(self.pg_client.pool_status())
    }
}
