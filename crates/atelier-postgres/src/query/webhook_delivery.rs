//! Webhook delivery log repository.

use std::future::Future;

use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use super::Pagination;
use crate::model::{NewWebhookDelivery, WebhookDelivery};
use crate::{PgConnection, PgError, PgResult, schema};

/// Append-only access to `webhook_deliveries`.
pub trait WebhookDeliveryRepository {
    /// Appends a delivery to the log.
    fn create_webhook_delivery(
        &mut self,
        new_delivery: NewWebhookDelivery,
    ) -> impl Future<Output = PgResult<WebhookDelivery>> + Send;

    /// Lists deliveries of one webhook, most recent first.
    fn list_webhook_deliveries(
        &mut self,
        webhook_id: Uuid,
        pagination: Pagination,
    ) -> impl Future<Output = PgResult<Vec<WebhookDelivery>>> + Send;
}

impl WebhookDeliveryRepository for PgConnection {
    async fn create_webhook_delivery(
        &mut self,
        new_delivery: NewWebhookDelivery,
    ) -> PgResult<WebhookDelivery> {
        use schema::webhook_deliveries;

        let delivery = diesel::insert_into(webhook_deliveries::table)
            .values(&new_delivery)
            .returning(WebhookDelivery::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)?;

        Ok(delivery)
    }

    async fn list_webhook_deliveries(
        &mut self,
        hook_id: Uuid,
        pagination: Pagination,
    ) -> PgResult<Vec<WebhookDelivery>> {
        use schema::webhook_deliveries::dsl::*;

        let deliveries = webhook_deliveries
            .filter(webhook_id.eq(hook_id))
            .select(WebhookDelivery::as_select())
            .order((created_at.desc(), id.desc()))
            .limit(pagination.limit)
            .offset(pagination.offset)
            .load(self)
            .await
            .map_err(PgError::from)?;

        Ok(deliveries)
    }
}
