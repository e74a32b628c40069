//! Enumerations persisted as text.

mod event_type;
mod step_type;

pub use event_type::{EventCategory, EventType};
pub use step_type::StepType;
