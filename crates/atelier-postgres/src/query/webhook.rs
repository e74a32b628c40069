//! Webhook repository.

use std::future::Future;

use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use jiff::Timestamp;
use uuid::Uuid;

use super::Pagination;
use crate::model::{NewWebhook, UpdateWebhook, Webhook};
use crate::types::EventType;
use crate::{PgConnection, PgError, PgResult, TRACING_TARGET_QUERY, schema};

/// Repository for webhook subscriptions and their health counters.
pub trait WebhookRepository {
    /// Inserts a webhook.
    fn create_webhook(
        &mut self,
        new_webhook: NewWebhook,
    ) -> impl Future<Output = PgResult<Webhook>> + Send;

    /// Finds a webhook by ID.
    fn find_webhook_by_id(
        &mut self,
        webhook_id: Uuid,
    ) -> impl Future<Output = PgResult<Option<Webhook>>> + Send;

    /// Finds a webhook by ID, only if it belongs to `owner_user_id`.
    fn find_owned_webhook(
        &mut self,
        webhook_id: Uuid,
        owner_user_id: Uuid,
    ) -> impl Future<Output = PgResult<Option<Webhook>>> + Send;

    /// Lists the webhooks of one owner, newest first.
    fn list_webhooks_by_owner(
        &mut self,
        owner_user_id: Uuid,
        pagination: Pagination,
    ) -> impl Future<Output = PgResult<Vec<Webhook>>> + Send;

    /// Returns every active webhook subscribed to `event` whose scope is
    /// either unset or equal to `space_id`.
    fn find_active_webhooks_for_event(
        &mut self,
        event: EventType,
        space_id: Option<Uuid>,
    ) -> impl Future<Output = PgResult<Vec<Webhook>>> + Send;

    /// Applies changes to a webhook.
    fn update_webhook(
        &mut self,
        webhook_id: Uuid,
        changes: UpdateWebhook,
    ) -> impl Future<Output = PgResult<Webhook>> + Send;

    /// Deletes a webhook and, by cascade, its delivery log.
    ///
    /// Returns whether a row was deleted.
    fn delete_webhook(&mut self, webhook_id: Uuid) -> impl Future<Output = PgResult<bool>> + Send;

    /// Increments `success_count`.
    fn record_webhook_success(
        &mut self,
        webhook_id: Uuid,
    ) -> impl Future<Output = PgResult<()>> + Send;

    /// Increments `failure_count` and stores the error with the current time.
    fn record_webhook_failure(
        &mut self,
        webhook_id: Uuid,
        error_message: &str,
    ) -> impl Future<Output = PgResult<()>> + Send;
}

impl WebhookRepository for PgConnection {
    async fn create_webhook(&mut self, new_webhook: NewWebhook) -> PgResult<Webhook> {
        use schema::webhooks;

        let webhook = diesel::insert_into(webhooks::table)
            .values(&new_webhook)
            .returning(Webhook::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)?;

        tracing::debug!(
            target: TRACING_TARGET_QUERY,
            webhook_id = %webhook.id,
            owner_user_id = %webhook.owner_user_id,
            "Webhook created"
        );

        Ok(webhook)
    }

    async fn find_webhook_by_id(&mut self, webhook_id: Uuid) -> PgResult<Option<Webhook>> {
        use schema::webhooks::dsl::*;

        let webhook = webhooks
            .filter(id.eq(webhook_id))
            .select(Webhook::as_select())
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)?;

        Ok(webhook)
    }

    async fn find_owned_webhook(
        &mut self,
        webhook_id: Uuid,
        owner: Uuid,
    ) -> PgResult<Option<Webhook>> {
        use schema::webhooks::dsl::*;

        let webhook = webhooks
            .filter(id.eq(webhook_id))
            .filter(owner_user_id.eq(owner))
            .select(Webhook::as_select())
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)?;

        Ok(webhook)
    }

    async fn list_webhooks_by_owner(
        &mut self,
        owner: Uuid,
        pagination: Pagination,
    ) -> PgResult<Vec<Webhook>> {
        use schema::webhooks::dsl::*;

        let rows = webhooks
            .filter(owner_user_id.eq(owner))
            .select(Webhook::as_select())
            .order(created_at.desc())
            .limit(pagination.limit)
            .offset(pagination.offset)
            .load(self)
            .await
            .map_err(PgError::from)?;

        Ok(rows)
    }

    async fn find_active_webhooks_for_event(
        &mut self,
        event: EventType,
        space_id: Option<Uuid>,
    ) -> PgResult<Vec<Webhook>> {
        use schema::webhooks::dsl::*;

        let mut query = webhooks
            .filter(active.eq(true))
            .filter(events.contains(serde_json::json!([event.as_str()])))
            .into_boxed();

        query = match space_id {
            Some(space) => query.filter(scope_space_id.is_null().or(scope_space_id.eq(space))),
            None => query.filter(scope_space_id.is_null()),
        };

        let rows = query
            .select(Webhook::as_select())
            .load(self)
            .await
            .map_err(PgError::from)?;

        tracing::debug!(
            target: TRACING_TARGET_QUERY,
            event = %event,
            space_id = ?space_id,
            matches = rows.len(),
            "Resolved webhooks for event"
        );

        Ok(rows)
    }

    async fn update_webhook(
        &mut self,
        webhook_id: Uuid,
        changes: UpdateWebhook,
    ) -> PgResult<Webhook> {
        use schema::webhooks::dsl::*;

        if changes.is_empty() {
            return webhooks
                .filter(id.eq(webhook_id))
                .select(Webhook::as_select())
                .first(self)
                .await
                .map_err(PgError::from);
        }

        let webhook = diesel::update(webhooks.filter(id.eq(webhook_id)))
            .set(&changes)
            .returning(Webhook::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)?;

        Ok(webhook)
    }

    async fn delete_webhook(&mut self, webhook_id: Uuid) -> PgResult<bool> {
        use schema::webhooks::dsl::*;

        let deleted = diesel::delete(webhooks.filter(id.eq(webhook_id)))
            .execute(self)
            .await
            .map_err(PgError::from)?;

        Ok(deleted > 0)
    }

    async fn record_webhook_success(&mut self, webhook_id: Uuid) -> PgResult<()> {
        use schema::webhooks::dsl::*;

        diesel::update(webhooks.filter(id.eq(webhook_id)))
            .set(success_count.eq(success_count + 1))
            .execute(self)
            .await
            .map_err(PgError::from)?;

        Ok(())
    }

    async fn record_webhook_failure(
        &mut self,
        webhook_id: Uuid,
        error_message: &str,
    ) -> PgResult<()> {
        use schema::webhooks::dsl::*;

        let now = jiff_diesel::Timestamp::from(Timestamp::now());
        diesel::update(webhooks.filter(id.eq(webhook_id)))
            .set((
                failure_count.eq(failure_count + 1),
                last_error.eq(error_message),
                last_error_at.eq(Some(now)),
            ))
            .execute(self)
            .await
            .map_err(PgError::from)?;

        Ok(())
    }
}
