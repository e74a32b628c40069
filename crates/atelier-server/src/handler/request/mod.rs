//! Request bodies, query strings and path parameters.

mod actions;
mod events;
mod pagination;
mod paths;
mod validations;
mod webhooks;

pub use actions::{CreateAction, RunAction, UpdateAction};
pub use events::PublishEvent;
pub use pagination::{LogQuery, PageQuery};
pub use paths::{ActionPathParams, WebhookPathParams};
pub use webhooks::{CreateWebhook, UpdateWebhook};
