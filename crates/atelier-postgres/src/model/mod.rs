//! Diesel models for the automation tables.
//!
//! Each table has a queryable model plus `New*` (insert) and, for
//! subscriptions, `Update*` (changeset) structs.

mod action;
mod action_run;
mod webhook;
mod webhook_delivery;

pub use action::{Action, NewAction, UpdateAction};
pub use action_run::{ActionRun, NewActionRun};
pub use webhook::{NewWebhook, UpdateWebhook, Webhook};
pub use webhook_delivery::{
    MAX_RESPONSE_EXCERPT_BYTES, NewWebhookDelivery, WebhookDelivery, response_excerpt,
};
