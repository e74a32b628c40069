//! Event-driven automation: the bus, the webhook dispatcher and the action
//! executor.
//!
//! ```text
//! publish(event) ─┬─► WebhookDispatcher ─► one delivery task per webhook
//!                 └─► ActionExecutor    ─► one run task per action
//! ```
//!
//! Outcomes are written to the [`DeliveryLog`] and counted on the
//! subscription. Nothing propagates back to the publisher.

mod bus;
mod config;
mod dispatcher;
mod event;
mod executor;
mod schedule;
pub mod steps;
pub mod store;

pub use self::bus::EventBus;
pub use self::config::{
    AutomationConfig, DEFAULT_MAX_CONCURRENT_DELIVERIES, DEFAULT_MAX_CONCURRENT_RUNS,
};
pub use self::dispatcher::WebhookDispatcher;
pub use self::event::{Event, EventScope};
pub use self::executor::ActionExecutor;
pub use self::schedule::ScheduleDriver;
pub use self::steps::{StepError, StepExecutor, StepRegistry};
pub use self::store::{
    AutomationStore, DeliveryLog, MemoryStore, PgAutomationStore, SharedStore, SubscriptionStore,
};

/// Tracing target for event publication and bus lifecycle.
pub const TRACING_TARGET_BUS: &str = "atelier_server::automation::bus";

/// Tracing target for webhook fan-out and delivery.
pub const TRACING_TARGET_DISPATCHER: &str = "atelier_server::automation::dispatcher";

/// Tracing target for action runs.
pub const TRACING_TARGET_EXECUTOR: &str = "atelier_server::automation::executor";

/// Tracing target for the schedule driver.
pub const TRACING_TARGET_SCHEDULE: &str = "atelier_server::automation::schedule";
