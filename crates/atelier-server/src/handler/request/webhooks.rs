//! Webhook request bodies.

use atelier_postgres::model::{NewWebhook, UpdateWebhook as UpdateWebhookModel};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::validations::{double_option, parse_events, validate_events, validate_http_url};

/// Body of `POST /webhooks`.
#[must_use]
#[derive(Debug, Default, Serialize, Deserialize, Validate)]
pub struct CreateWebhook {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(custom(function = "validate_http_url"))]
    pub url: String,
    #[validate(custom(function = "validate_events"))]
    pub events: Vec<String>,
    /// Defaults to `true`.
    pub active: Option<bool>,
    pub scope_space_id: Option<Uuid>,
}

impl CreateWebhook {
    /// Builds the row to insert with a freshly generated secret.
    pub fn into_model(self, owner_user_id: Uuid, secret: String) -> NewWebhook {
        NewWebhook {
            owner_user_id,
            scope_space_id: self.scope_space_id,
            name: self.name,
            url: self.url,
            secret,
            events: NewWebhook::encode_events(&parse_events(&self.events)),
            active: self.active.unwrap_or(true),
        }
    }
}

/// Body of `PATCH /webhooks/{webhook_id}`. The secret cannot be changed.
#[must_use]
#[derive(Debug, Default, Serialize, Deserialize, Validate)]
pub struct UpdateWebhook {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    #[validate(custom(function = "validate_http_url"))]
    pub url: Option<String>,
    #[validate(custom(function = "validate_events"))]
    pub events: Option<Vec<String>>,
    pub active: Option<bool>,
    /// `null` clears the scope, absent leaves it unchanged.
    #[serde(default, deserialize_with = "double_option")]
    pub scope_space_id: Option<Option<Uuid>>,
}

impl UpdateWebhook {
    pub fn into_model(self) -> UpdateWebhookModel {
        UpdateWebhookModel {
            name: self.name,
            url: self.url,
            events: self
                .events
                .map(|events| NewWebhook::encode_events(&parse_events(&events))),
            active: self.active,
            scope_space_id: self.scope_space_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn create_defaults_to_active() -> anyhow::Result<()> {
        let request: CreateWebhook = serde_json::from_value(json!({
            "name": "CI",
            "url": "https://ci.example.com/hook",
            "events": ["document.updated", "document.created", "document.created"],
        }))?;
        assert!(request.validate().is_ok());

        let model = request.into_model(Uuid::now_v7(), "whsec_x".into());
        assert!(model.active);
        assert_eq!(model.events, json!(["document.created", "document.updated"]));
        Ok(())
    }

    #[test]
    fn create_rejects_bad_fields() -> anyhow::Result<()> {
        let request: CreateWebhook = serde_json::from_value(json!({
            "name": "",
            "url": "mailto:ops@example.com",
            "events": [],
        }))?;

        let errors = request.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("url"));
        assert!(fields.contains_key("events"));
        Ok(())
    }

    #[test]
    fn update_distinguishes_null_from_absent() -> anyhow::Result<()> {
        let absent: UpdateWebhook = serde_json::from_value(json!({"active": false}))?;
        assert_eq!(absent.scope_space_id, None);

        let cleared: UpdateWebhook = serde_json::from_value(json!({"scope_space_id": null}))?;
        assert_eq!(cleared.scope_space_id, Some(None));

        let model = cleared.into_model();
        assert_eq!(model.scope_space_id, Some(None));
        assert!(!model.is_empty());
        Ok(())
    }
}
