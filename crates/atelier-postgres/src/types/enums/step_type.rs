//! Step types an action can contain.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

/// Advertised step types.
///
/// The first five are routed to an executor. The rest are reserved: they
/// are accepted when an action is saved and shown to clients, but a run
/// that reaches one fails the step as unsupported.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
#[derive(Serialize, Deserialize, Display, EnumIter, EnumString, IntoStaticStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum StepType {
    SendWebhook,
    SendEmail,
    SendSlack,
    UpdateProperty,
    AddComment,

    // Reserved
    CreateDocument,
    UpdateDocument,
    MoveDocument,
    DuplicateDocument,
    CreateRow,
    UpdateRow,
    DeleteRow,
    AssignUser,
    SetReminder,
}

impl StepType {
    /// Returns the snake_case name stored in the `steps` array.
    #[inline]
    pub fn as_str(self) -> &'static str {
        self.into()
    }

    /// Returns whether this step type has an executor behind it.
    pub fn is_routed(self) -> bool {
        matches!(
            self,
            Self::SendWebhook
                | Self::SendEmail
                | Self::SendSlack
                | Self::UpdateProperty
                | Self::AddComment
        )
    }

    /// Returns the routed step types.
    pub fn routed() -> Vec<Self> {
        Self::iter().filter(|s| s.is_routed()).collect()
    }

    /// Returns the reserved step types.
    pub fn reserved() -> Vec<Self> {
        Self::iter().filter(|s| !s.is_routed()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routed_and_reserved_partition_the_taxonomy() {
        assert_eq!(StepType::routed().len(), 5);
        assert_eq!(StepType::reserved().len(), 9);
        assert_eq!(StepType::iter().count(), 14);
    }

    #[test]
    fn names_are_snake_case() {
        assert_eq!(StepType::SendWebhook.as_str(), "send_webhook");
        assert_eq!(StepType::SetReminder.to_string(), "set_reminder");
        assert_eq!("update_property".parse::<StepType>(), Ok(StepType::UpdateProperty));
        assert!("launch_rocket".parse::<StepType>().is_err());
    }
}
