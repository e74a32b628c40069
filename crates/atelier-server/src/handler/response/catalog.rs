//! Event and step catalogues.

use atelier_postgres::types::{EventCategory, EventType, StepType};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

/// Events of one category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventGroup {
    pub category: EventCategory,
    pub events: Vec<EventType>,
}

/// Events grouped by category, in catalogue order.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventCatalog {
    pub categories: Vec<EventGroup>,
}

impl EventCatalog {
    /// Every event, reserved ones included.
    pub fn all() -> Self {
        Self::filtered(|_| true)
    }

    /// Events a webhook may subscribe to.
    pub fn subscribable() -> Self {
        Self::filtered(|event| !event.is_reserved())
    }

    fn filtered(keep: impl Fn(EventType) -> bool) -> Self {
        let categories = EventCategory::iter()
            .map(|category| EventGroup {
                category,
                events: category.events().into_iter().filter(|e| keep(*e)).collect(),
            })
            .filter(|group| !group.events.is_empty())
            .collect();

        Self { categories }
    }
}

/// Step types split by whether an executor is registered for them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepCatalog {
    pub routed: Vec<StepType>,
    /// Accepted when saving an action, fail as unsupported when run.
    pub reserved: Vec<StepType>,
}

/// Triggers and step types available to actions.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerCatalog {
    #[serde(flatten)]
    pub triggers: EventCatalog,
    pub step_types: StepCatalog,
}

impl Default for TriggerCatalog {
    fn default() -> Self {
        Self {
            triggers: EventCatalog::all(),
            step_types: StepCatalog {
                routed: StepType::routed(),
                reserved: StepType::reserved(),
            },
        }
    }
}
