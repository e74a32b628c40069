//! Named database constraints, used to turn violations into client errors.

mod actions;
mod webhooks;

use std::fmt;

pub use actions::ActionConstraints;
use serde::{Deserialize, Serialize};
pub use webhooks::WebhookConstraints;

/// Any constraint declared by the migrations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum ConstraintViolation {
    Webhook(WebhookConstraints),
    Action(ActionConstraints),
}

/// Broad classes of constraints.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConstraintCategory {
    /// Format, length and shape checks on user input.
    Validation,
    /// Domain rules such as counter relationships.
    BusinessLogic,
    /// Foreign keys.
    Reference,
}

impl ConstraintViolation {
    /// Parses a constraint name reported by PostgreSQL.
    ///
    /// ```
    /// use atelier_postgres::types::ConstraintViolation;
    ///
    /// assert!(ConstraintViolation::new("webhooks_url_format").is_some());
    /// assert!(ConstraintViolation::new("no_such_constraint").is_none());
    /// ```
    pub fn new(constraint: &str) -> Option<Self> {
        WebhookConstraints::new(constraint)
            .map(Self::Webhook)
            .or_else(|| ActionConstraints::new(constraint).map(Self::Action))
    }

    /// Returns the category of the violated constraint.
    pub fn categorize(&self) -> ConstraintCategory {
        match self {
            Self::Webhook(c) => c.categorize(),
            Self::Action(c) => c.categorize(),
        }
    }

    /// Returns the table the constraint is declared on.
    pub fn table_name(&self) -> &'static str {
        let name = self.to_string();
        if name.starts_with("webhook_deliveries") {
            "webhook_deliveries"
        } else if name.starts_with("webhooks") {
            "webhooks"
        } else if name.starts_with("action_runs") {
            "action_runs"
        } else {
            "actions"
        }
    }
}

impl fmt::Display for ConstraintViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Webhook(c) => c.fmt(f),
            Self::Action(c) => c.fmt(f),
        }
    }
}

impl From<ConstraintViolation> for String {
    #[inline]
    fn from(val: ConstraintViolation) -> Self {
        val.to_string()
    }
}

impl TryFrom<String> for ConstraintViolation {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value).ok_or(value)
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn every_constraint_name_parses_back() {
        for c in WebhookConstraints::iter() {
            assert_eq!(
                ConstraintViolation::new(&c.to_string()),
                Some(ConstraintViolation::Webhook(c))
            );
        }
        for c in ActionConstraints::iter() {
            assert_eq!(
                ConstraintViolation::new(&c.to_string()),
                Some(ConstraintViolation::Action(c))
            );
        }
    }

    #[test]
    fn tables_and_categories() {
        let v = ConstraintViolation::new("webhooks_events_not_empty").unwrap();
        assert_eq!(v.table_name(), "webhooks");
        assert_eq!(v.categorize(), ConstraintCategory::Validation);

        let v = ConstraintViolation::new("webhook_deliveries_success_status").unwrap();
        assert_eq!(v.table_name(), "webhook_deliveries");
        assert_eq!(v.categorize(), ConstraintCategory::BusinessLogic);

        let v = ConstraintViolation::new("action_runs_action_id_fkey").unwrap();
        assert_eq!(v.table_name(), "action_runs");
        assert_eq!(v.categorize(), ConstraintCategory::Reference);
    }
}
