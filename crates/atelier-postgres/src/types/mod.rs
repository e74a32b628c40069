//! Enumerations, constraint names and JSON column shapes.

mod constraints;
mod enums;
mod steps;

pub use constraints::{
    ActionConstraints, ConstraintCategory, ConstraintViolation, WebhookConstraints,
};
pub use enums::{EventCategory, EventType, StepType};
pub use steps::{ActionStep, StepResult};
