//! Webhook table constraint violations.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use super::ConstraintCategory;

/// Constraints declared on `webhooks` and `webhook_deliveries`.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[derive(Serialize, Deserialize, Display, EnumIter, EnumString)]
#[serde(into = "String", try_from = "String")]
pub enum WebhookConstraints {
    #[strum(serialize = "webhooks_name_length")]
    NameLength,
    #[strum(serialize = "webhooks_url_length")]
    UrlLength,
    #[strum(serialize = "webhooks_url_format")]
    UrlFormat,
    #[strum(serialize = "webhooks_secret_format")]
    SecretFormat,
    #[strum(serialize = "webhooks_events_array")]
    EventsArray,
    #[strum(serialize = "webhooks_events_not_empty")]
    EventsNotEmpty,
    #[strum(serialize = "webhooks_counters_positive")]
    CountersPositive,

    #[strum(serialize = "webhook_deliveries_response_length")]
    DeliveryResponseLength,
    #[strum(serialize = "webhook_deliveries_success_status")]
    DeliverySuccessStatus,
    #[strum(serialize = "webhook_deliveries_webhook_id_fkey")]
    DeliveryWebhookExists,
}

impl WebhookConstraints {
    /// Parses a constraint name.
    pub fn new(constraint: &str) -> Option<Self> {
        constraint.parse().ok()
    }

    /// Returns the category of this constraint.
    pub fn categorize(&self) -> ConstraintCategory {
        match self {
            Self::NameLength
            | Self::UrlLength
            | Self::UrlFormat
            | Self::SecretFormat
            | Self::EventsArray
            | Self::EventsNotEmpty
            | Self::DeliveryResponseLength => ConstraintCategory::Validation,
            Self::CountersPositive | Self::DeliverySuccessStatus => {
                ConstraintCategory::BusinessLogic
            }
            Self::DeliveryWebhookExists => ConstraintCategory::Reference,
        }
    }
}

impl From<WebhookConstraints> for String {
    #[inline]
    fn from(val: WebhookConstraints) -> Self {
        val.to_string()
    }
}

impl TryFrom<String> for WebhookConstraints {
    type Error = strum::ParseError;

    #[inline]
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
