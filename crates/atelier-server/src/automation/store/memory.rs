//! In-process store used by tests and database-less local runs.

use atelier_postgres::error::DieselError;
use atelier_postgres::model::{
    Action, ActionRun, NewAction, NewActionRun, NewWebhook, NewWebhookDelivery, UpdateAction,
    UpdateWebhook, Webhook, WebhookDelivery,
};
use atelier_postgres::query::Pagination;
use atelier_postgres::types::EventType;
use atelier_postgres::{PgError, PgResult};
use jiff_diesel::Timestamp;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{AutomationStore, DeliveryLog, SubscriptionStore};

/// Rows in insertion order.
#[derive(Debug, Default)]
struct Tables {
    webhooks: Vec<Webhook>,
    deliveries: Vec<WebhookDelivery>,
    actions: Vec<Action>,
    runs: Vec<ActionRun>,
}

impl Tables {
    fn webhook_mut(&mut self, webhook_id: Uuid) -> PgResult<&mut Webhook> {
        self.webhooks
            .iter_mut()
            .find(|w| w.id == webhook_id)
            .ok_or(PgError::Query(DieselError::NotFound))
    }

    fn action_mut(&mut self, action_id: Uuid) -> PgResult<&mut Action> {
        self.actions
            .iter_mut()
            .find(|a| a.id == action_id)
            .ok_or(PgError::Query(DieselError::NotFound))
    }
}

fn now() -> Timestamp {
    Timestamp::from(jiff::Timestamp::now())
}

/// Newest-first page over rows kept in insertion order.
fn page<'a, T: Clone + 'a>(
    rows: impl DoubleEndedIterator<Item = &'a T>,
    pagination: Pagination,
) -> Vec<T> {
    rows.rev()
        .skip(pagination.offset.max(0) as usize)
        .take(pagination.limit.max(0) as usize)
        .cloned()
        .collect()
}

/// [`AutomationStore`] kept entirely in memory.
///
/// Behaves like the database store: missing rows on update surface as
/// [`DieselError::NotFound`], deleting a subscription removes its log rows,
/// and listings are newest first.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a webhook regardless of owner.
    pub async fn webhook(&self, webhook_id: Uuid) -> Option<Webhook> {
        let tables = self.tables.lock().await;
        tables.webhooks.iter().find(|w| w.id == webhook_id).cloned()
    }

    /// Returns an action regardless of owner.
    pub async fn action(&self, action_id: Uuid) -> Option<Action> {
        let tables = self.tables.lock().await;
        tables.actions.iter().find(|a| a.id == action_id).cloned()
    }

    /// Returns every delivery of one webhook, oldest first.
    pub async fn deliveries(&self, webhook_id: Uuid) -> Vec<WebhookDelivery> {
        let tables = self.tables.lock().await;
        tables
            .deliveries
            .iter()
            .filter(|d| d.webhook_id == webhook_id)
            .cloned()
            .collect()
    }

    /// Returns every run of one action, oldest first.
    pub async fn runs(&self, action_id: Uuid) -> Vec<ActionRun> {
        let tables = self.tables.lock().await;
        tables
            .runs
            .iter()
            .filter(|r| r.action_id == action_id)
            .cloned()
            .collect()
    }
}

#[async_trait::async_trait]
impl SubscriptionStore for MemoryStore {
    async fn create_webhook(&self, new_webhook: NewWebhook) -> PgResult<Webhook> {
        let created_at = now();
        let webhook = Webhook {
            id: Uuid::now_v7(),
            owner_user_id: new_webhook.owner_user_id,
            scope_space_id: new_webhook.scope_space_id,
            name: new_webhook.name,
            url: new_webhook.url,
            secret: new_webhook.secret,
            events: new_webhook.events,
            active: new_webhook.active,
            last_error: String::new(),
            last_error_at: None,
            success_count: 0,
            failure_count: 0,
            created_at,
            updated_at: created_at,
        };

        self.tables.lock().await.webhooks.push(webhook.clone());
        Ok(webhook)
    }

    async fn find_owned_webhook(
        &self,
        webhook_id: Uuid,
        owner_user_id: Uuid,
    ) -> PgResult<Option<Webhook>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .webhooks
            .iter()
            .find(|w| w.id == webhook_id && w.owner_user_id == owner_user_id)
            .cloned())
    }

    async fn list_webhooks(
        &self,
        owner_user_id: Uuid,
        pagination: Pagination,
    ) -> PgResult<Vec<Webhook>> {
        let tables = self.tables.lock().await;
        let owned = tables
            .webhooks
            .iter()
            .filter(|w| w.owner_user_id == owner_user_id);
        Ok(page(owned, pagination))
    }

    async fn update_webhook(&self, webhook_id: Uuid, changes: UpdateWebhook) -> PgResult<Webhook> {
        let mut tables = self.tables.lock().await;
        let webhook = tables.webhook_mut(webhook_id)?;
        if changes.is_empty() {
            return Ok(webhook.clone());
        }

        if let Some(name) = changes.name {
            webhook.name = name;
        }
        if let Some(url) = changes.url {
            webhook.url = url;
        }
        if let Some(events) = changes.events {
            webhook.events = events;
        }
        if let Some(active) = changes.active {
            webhook.active = active;
        }
        if let Some(scope) = changes.scope_space_id {
            webhook.scope_space_id = scope;
        }
        webhook.updated_at = now();

        Ok(webhook.clone())
    }

    async fn delete_webhook(&self, webhook_id: Uuid) -> PgResult<bool> {
        let mut tables = self.tables.lock().await;
        let before = tables.webhooks.len();
        tables.webhooks.retain(|w| w.id != webhook_id);
        tables.deliveries.retain(|d| d.webhook_id != webhook_id);
        Ok(tables.webhooks.len() < before)
    }

    async fn active_webhooks_for(
        &self,
        event: EventType,
        space_id: Option<Uuid>,
    ) -> PgResult<Vec<Webhook>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .webhooks
            .iter()
            .filter(|w| w.is_selected_for(event, space_id))
            .cloned()
            .collect())
    }

    async fn record_webhook_success(&self, webhook_id: Uuid) -> PgResult<()> {
        let mut tables = self.tables.lock().await;
        tables.webhook_mut(webhook_id)?.success_count += 1;
        Ok(())
    }

    async fn record_webhook_failure(&self, webhook_id: Uuid, error_message: &str) -> PgResult<()> {
        let mut tables = self.tables.lock().await;
        let webhook = tables.webhook_mut(webhook_id)?;
        webhook.failure_count += 1;
        webhook.last_error = error_message.to_owned();
        webhook.last_error_at = Some(now());
        Ok(())
    }

    async fn create_action(&self, new_action: NewAction) -> PgResult<Action> {
        let created_at = now();
        let action = Action {
            id: Uuid::now_v7(),
            owner_user_id: new_action.owner_user_id,
            scope_space_id: new_action.scope_space_id,
            scope_database_id: new_action.scope_database_id,
            name: new_action.name,
            description: new_action.description,
            trigger_type: new_action.trigger_type,
            trigger_config: new_action.trigger_config,
            steps: new_action.steps,
            active: new_action.active,
            last_run_at: None,
            last_error: String::new(),
            run_count: 0,
            success_count: 0,
            failure_count: 0,
            created_at,
            updated_at: created_at,
        };

        self.tables.lock().await.actions.push(action.clone());
        Ok(action)
    }

    async fn find_owned_action(
        &self,
        action_id: Uuid,
        owner_user_id: Uuid,
    ) -> PgResult<Option<Action>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .actions
            .iter()
            .find(|a| a.id == action_id && a.owner_user_id == owner_user_id)
            .cloned())
    }

    async fn list_actions(
        &self,
        owner_user_id: Uuid,
        pagination: Pagination,
    ) -> PgResult<Vec<Action>> {
        let tables = self.tables.lock().await;
        let owned = tables
            .actions
            .iter()
            .filter(|a| a.owner_user_id == owner_user_id);
        Ok(page(owned, pagination))
    }

    async fn update_action(&self, action_id: Uuid, changes: UpdateAction) -> PgResult<Action> {
        let mut tables = self.tables.lock().await;
        let action = tables.action_mut(action_id)?;
        if changes.is_empty() {
            return Ok(action.clone());
        }

        if let Some(name) = changes.name {
            action.name = name;
        }
        if let Some(description) = changes.description {
            action.description = description;
        }
        if let Some(trigger_type) = changes.trigger_type {
            action.trigger_type = trigger_type;
        }
        if let Some(trigger_config) = changes.trigger_config {
            action.trigger_config = trigger_config;
        }
        if let Some(steps) = changes.steps {
            action.steps = steps;
        }
        if let Some(active) = changes.active {
            action.active = active;
        }
        if let Some(scope) = changes.scope_space_id {
            action.scope_space_id = scope;
        }
        if let Some(scope) = changes.scope_database_id {
            action.scope_database_id = scope;
        }
        action.updated_at = now();

        Ok(action.clone())
    }

    async fn delete_action(&self, action_id: Uuid) -> PgResult<bool> {
        let mut tables = self.tables.lock().await;
        let before = tables.actions.len();
        tables.actions.retain(|a| a.id != action_id);
        tables.runs.retain(|r| r.action_id != action_id);
        Ok(tables.actions.len() < before)
    }

    async fn active_actions_for(
        &self,
        trigger: EventType,
        space_id: Option<Uuid>,
        database_id: Option<Uuid>,
    ) -> PgResult<Vec<Action>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .actions
            .iter()
            .filter(|a| a.is_selected_for(trigger, space_id, database_id))
            .cloned()
            .collect())
    }

    async fn set_action_last_run(&self, action_id: Uuid) -> PgResult<()> {
        let mut tables = self.tables.lock().await;
        tables.action_mut(action_id)?.last_run_at = Some(now());
        Ok(())
    }

    async fn increment_action_success(&self, action_id: Uuid) -> PgResult<()> {
        let mut tables = self.tables.lock().await;
        let action = tables.action_mut(action_id)?;
        action.run_count += 1;
        action.success_count += 1;
        Ok(())
    }

    async fn record_action_failure(&self, action_id: Uuid, error_message: &str) -> PgResult<()> {
        let mut tables = self.tables.lock().await;
        let action = tables.action_mut(action_id)?;
        action.run_count += 1;
        action.failure_count += 1;
        action.last_error = error_message.to_owned();
        Ok(())
    }
}

#[async_trait::async_trait]
impl DeliveryLog for MemoryStore {
    async fn append_delivery(&self, delivery: NewWebhookDelivery) -> PgResult<WebhookDelivery> {
        let mut tables = self.tables.lock().await;
        if !tables.webhooks.iter().any(|w| w.id == delivery.webhook_id) {
            return Err(PgError::Query(DieselError::NotFound));
        }

        let delivery = WebhookDelivery {
            id: Uuid::now_v7(),
            webhook_id: delivery.webhook_id,
            event: delivery.event,
            payload: delivery.payload,
            status_code: delivery.status_code,
            response: delivery.response,
            success: delivery.success,
            duration_ms: delivery.duration_ms,
            created_at: now(),
        };

        tables.deliveries.push(delivery.clone());
        Ok(delivery)
    }

    async fn recent_deliveries(
        &self,
        webhook_id: Uuid,
        pagination: Pagination,
    ) -> PgResult<Vec<WebhookDelivery>> {
        let tables = self.tables.lock().await;
        let rows = tables
            .deliveries
            .iter()
            .filter(|d| d.webhook_id == webhook_id);
        Ok(page(rows, pagination))
    }

    async fn append_run(&self, run: NewActionRun) -> PgResult<ActionRun> {
        let mut tables = self.tables.lock().await;
        if !tables.actions.iter().any(|a| a.id == run.action_id) {
            return Err(PgError::Query(DieselError::NotFound));
        }

        let run = ActionRun {
            id: Uuid::now_v7(),
            action_id: run.action_id,
            trigger_data: run.trigger_data,
            steps_result: run.steps_result,
            success: run.success,
            duration_ms: run.duration_ms,
            error: run.error,
            created_at: now(),
        };

        tables.runs.push(run.clone());
        Ok(run)
    }

    async fn recent_runs(
        &self,
        action_id: Uuid,
        pagination: Pagination,
    ) -> PgResult<Vec<ActionRun>> {
        let tables = self.tables.lock().await;
        let rows = tables.runs.iter().filter(|r| r.action_id == action_id);
        Ok(page(rows, pagination))
    }
}

impl AutomationStore for MemoryStore {}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn new_webhook(owner: Uuid, name: &str) -> NewWebhook {
        NewWebhook {
            owner_user_id: owner,
            scope_space_id: None,
            name: name.into(),
            url: "http://localhost/hook".into(),
            secret: format!("whsec_{}", "a".repeat(64)),
            events: NewWebhook::encode_events(&[EventType::DocumentCreated]),
            active: true,
        }
    }

    #[tokio::test]
    async fn listing_is_newest_first_and_owner_scoped() {
        let store = MemoryStore::new();
        let owner = Uuid::now_v7();
        store.create_webhook(new_webhook(owner, "first")).await.unwrap();
        store.create_webhook(new_webhook(owner, "second")).await.unwrap();
        store
            .create_webhook(new_webhook(Uuid::now_v7(), "other"))
            .await
            .unwrap();

        let listed = store.list_webhooks(owner, Pagination::default()).await.unwrap();
        let names: Vec<_> = listed.iter().map(|w| w.name.as_str()).collect();
        assert_eq!(names, ["second", "first"]);

        let second_page = store.list_webhooks(owner, Pagination::new(1, 1)).await.unwrap();
        assert_eq!(second_page[0].name, "first");
    }

    #[tokio::test]
    async fn updating_a_missing_row_is_not_found() {
        let store = MemoryStore::new();
        let changes = UpdateWebhook {
            active: Some(false),
            ..Default::default()
        };

        let error = store
            .update_webhook(Uuid::now_v7(), changes)
            .await
            .unwrap_err();
        assert!(error.is_not_found());
    }

    #[tokio::test]
    async fn delete_removes_delivery_log() {
        let store = MemoryStore::new();
        let webhook = store
            .create_webhook(new_webhook(Uuid::now_v7(), "hook"))
            .await
            .unwrap();
        store
            .append_delivery(NewWebhookDelivery {
                webhook_id: webhook.id,
                event: "document.created".into(),
                payload: json!({}),
                status_code: 200,
                response: String::new(),
                success: true,
                duration_ms: 3,
            })
            .await
            .unwrap();

        assert!(store.delete_webhook(webhook.id).await.unwrap());
        assert!(store.deliveries(webhook.id).await.is_empty());
        assert!(!store.delete_webhook(webhook.id).await.unwrap());
    }

    #[tokio::test]
    async fn failure_counters_keep_last_error() {
        let store = MemoryStore::new();
        let webhook = store
            .create_webhook(new_webhook(Uuid::now_v7(), "hook"))
            .await
            .unwrap();

        store.record_webhook_failure(webhook.id, "HTTP 500: nope").await.unwrap();
        store.record_webhook_success(webhook.id).await.unwrap();

        let webhook = store.webhook(webhook.id).await.unwrap();
        assert_eq!(webhook.failure_count, 1);
        assert_eq!(webhook.success_count, 1);
        assert_eq!(webhook.last_error, "HTTP 500: nope");
        assert!(webhook.last_error_at.is_some());
    }
}
