//! Action table constraint violations.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use super::ConstraintCategory;

/// Constraints declared on `actions` and `action_runs`.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[derive(Serialize, Deserialize, Display, EnumIter, EnumString)]
#[serde(into = "String", try_from = "String")]
pub enum ActionConstraints {
    #[strum(serialize = "actions_name_length")]
    NameLength,
    #[strum(serialize = "actions_trigger_config_object")]
    TriggerConfigObject,
    #[strum(serialize = "actions_steps_array")]
    StepsArray,
    #[strum(serialize = "actions_steps_not_empty")]
    StepsNotEmpty,
    #[strum(serialize = "actions_run_count_covers_outcomes")]
    RunCountCoversOutcomes,

    #[strum(serialize = "action_runs_action_id_fkey")]
    RunActionExists,
}

impl ActionConstraints {
    /// Parses a constraint name.
    pub fn new(constraint: &str) -> Option<Self> {
        constraint.parse().ok()
    }

    /// Returns the category of this constraint.
    pub fn categorize(&self) -> ConstraintCategory {
        match self {
            Self::NameLength | Self::TriggerConfigObject | Self::StepsArray | Self::StepsNotEmpty => {
                ConstraintCategory::Validation
            }
            Self::RunCountCoversOutcomes => ConstraintCategory::BusinessLogic,
            Self::RunActionExists => ConstraintCategory::Reference,
        }
    }
}

impl From<ActionConstraints> for String {
    #[inline]
    fn from(val: ActionConstraints) -> Self {
        val.to_string()
    }
}

impl TryFrom<String> for ActionConstraints {
    type Error = strum::ParseError;

    #[inline]
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
