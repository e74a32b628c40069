//! Response bodies.

mod actions;
mod catalog;
mod errors;
mod events;
mod monitors;
mod webhooks;

pub use actions::{Action, ActionRun, ActionRuns, Actions};
pub use catalog::{EventCatalog, EventGroup, StepCatalog, TriggerCatalog};
pub use errors::ErrorResponse;
pub use events::EventAccepted;
pub use monitors::{DatabaseStatus, HealthStatus};
pub use webhooks::{Webhook, WebhookDeliveries, WebhookDelivery, WebhookWithSecret, Webhooks};
