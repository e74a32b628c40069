//! Field validators shared by request bodies.

use atelier_postgres::types::{ActionStep, EventType};
use serde::{Deserialize, Deserializer};
use url::Url;
use validator::ValidationError;

pub fn validation_error(code: &'static str, message: impl Into<String>) -> ValidationError {
    let message: String = message.into();
    let mut error = ValidationError::new(code);
    error.message = Some(message.into());
    error
}

/// Accepts absolute `http` and `https` URLs only.
pub fn validate_http_url(url: &str) -> Result<(), ValidationError> {
    let parsed = Url::parse(url).map_err(|_| validation_error("url", "Must be a valid URL"))?;

    match parsed.scheme() {
        "http" | "https" if parsed.host().is_some() => Ok(()),
        _ => Err(validation_error("url", "Must be an http or https URL")),
    }
}

/// Non-empty list of catalogue events a webhook may subscribe to.
pub fn validate_events(events: &[String]) -> Result<(), ValidationError> {
    if events.is_empty() {
        return Err(validation_error(
            "events",
            "At least one event is required",
        ));
    }

    for name in events {
        match EventType::parse(name) {
            None => {
                return Err(validation_error(
                    "events",
                    format!("Unknown event '{name}'"),
                ));
            }
            Some(event) if event.is_reserved() => {
                return Err(validation_error(
                    "events",
                    format!("Event '{name}' cannot be subscribed to by webhooks"),
                ));
            }
            Some(_) => {}
        }
    }

    Ok(())
}

/// Any catalogue event, reserved ones included.
pub fn validate_trigger(name: &str) -> Result<(), ValidationError> {
    match EventType::parse(name) {
        Some(_) => Ok(()),
        None => Err(validation_error("trigger", format!("Unknown event '{name}'"))),
    }
}

/// A catalogue event that clients may raise themselves.
pub fn validate_published_event(name: &str) -> Result<(), ValidationError> {
    match EventType::parse(name) {
        Some(event) if !event.is_reserved() => Ok(()),
        Some(_) => Err(validation_error(
            "event",
            format!("Event '{name}' is raised by the platform only"),
        )),
        None => Err(validation_error("event", format!("Unknown event '{name}'"))),
    }
}

/// Non-empty list of steps, each with a type.
pub fn validate_steps(steps: &[ActionStep]) -> Result<(), ValidationError> {
    if steps.is_empty() {
        return Err(validation_error("steps", "At least one step is required"));
    }

    if let Some(position) = steps.iter().position(|s| s.step_type.trim().is_empty()) {
        return Err(validation_error(
            "steps",
            format!("Step {} has no type", position + 1),
        ));
    }

    Ok(())
}

/// Distinguishes an absent field from an explicit `null`.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

/// Parses validated event names.
pub fn parse_events(events: &[String]) -> Vec<EventType> {
    events.iter().filter_map(|e| EventType::parse(e)).collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn http_urls_only() {
        assert!(validate_http_url("https://example.com/hook").is_ok());
        assert!(validate_http_url("http://127.0.0.1:8080/").is_ok());
        assert!(validate_http_url("ftp://example.com").is_err());
        assert!(validate_http_url("not a url").is_err());
    }

    #[test]
    fn events_must_be_known_and_subscribable() {
        assert!(validate_events(&["document.created".into()]).is_ok());
        assert!(validate_events(&[]).is_err());
        assert!(validate_events(&["document.exploded".into()]).is_err());
        assert!(validate_events(&["schedule".into()]).is_err());
    }

    #[test]
    fn schedule_is_a_valid_trigger() {
        assert!(validate_trigger("schedule").is_ok());
        assert!(validate_trigger("row.created").is_ok());
        assert!(validate_trigger("row.exploded").is_err());
        assert!(validate_published_event("schedule").is_err());
    }

    #[test]
    fn steps_need_a_type() {
        assert!(validate_steps(&[]).is_err());
        assert!(validate_steps(&[ActionStep::new("", json!({}))]).is_err());
        // Unknown types are accepted and fail at run time.
        assert!(validate_steps(&[ActionStep::new("teleport", json!({}))]).is_ok());
    }
}
