//! JSON body extractor that runs `validator` rules.

use std::borrow::Cow;
use std::collections::HashMap;

use axum::extract::{FromRequest, Request};
use derive_more::{Deref, DerefMut, From};
use serde::de::DeserializeOwned;
use serde_json::Value;
use validator::{Validate, ValidationError, ValidationErrors};

use super::Json;
use crate::handler::{Error, ErrorKind};

/// [`Json`] followed by [`Validate::validate`].
#[must_use]
#[derive(Debug, Clone, Copy, Default, Deref, DerefMut, From)]
pub struct ValidateJson<T>(pub T);

impl<T> ValidateJson<T> {
    #[inline]
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T, S> FromRequest<S> for ValidateJson<T>
where
    T: DeserializeOwned + Validate + 'static,
    S: Send + Sync,
{
    type Rejection = Error<'static>;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(data) = <Json<T> as FromRequest<S>>::from_request(req, state).await?;
        data.validate()?;
        Ok(Self(data))
    }
}

fn param_u64(params: &HashMap<Cow<'static, str>, Value>, key: &str) -> Option<u64> {
    params.get(key).and_then(Value::as_u64)
}

fn format_length_error(field: &str, params: &HashMap<Cow<'static, str>, Value>) -> String {
    let unit = if field.contains("name") || field.contains("url") {
        "characters"
    } else {
        "items"
    };

    match (param_u64(params, "min"), param_u64(params, "max")) {
        (Some(min), Some(max)) => {
            format!("Field '{field}' must be between {min} and {max} {unit} long")
        }
        (Some(min), None) => format!("Field '{field}' must be at least {min} {unit} long"),
        (None, Some(max)) => format!("Field '{field}' must be at most {max} {unit} long"),
        (None, None) => format!("Field '{field}' has invalid length"),
    }
}

fn format_validation_error(field: &str, error: &ValidationError) -> String {
    if let Some(message) = &error.message {
        return format!("Field '{field}': {message}");
    }

    match error.code.as_ref() {
        "length" => format_length_error(field, &error.params),
        "required" => format!("Field '{field}' is required"),
        "url" => format!("Field '{field}' must be a valid URL"),
        code => format!("Field '{field}' failed validation: {code}"),
    }
}

impl From<ValidationErrors> for Error<'static> {
    fn from(errors: ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, field_errors)| {
                field_errors
                    .iter()
                    .map(move |error| format_validation_error(field, error))
            })
            .collect();
        messages.sort();

        tracing::debug!(errors = ?errors.field_errors(), "Request validation failed");

        let message = if messages.is_empty() {
            "Validation failed".to_owned()
        } else {
            messages.join(". ")
        };

        ErrorKind::ValidationError
            .with_message(message)
            .with_resource("request")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_errors_name_the_bounds() {
        let mut error = ValidationError::new("length");
        error.add_param(Cow::Borrowed("min"), &1);
        error.add_param(Cow::Borrowed("max"), &255);

        assert_eq!(
            format_validation_error("name", &error),
            "Field 'name' must be between 1 and 255 characters long"
        );
    }

    #[test]
    fn custom_messages_win() {
        let error = ValidationError::new("event").with_message(Cow::Borrowed("unknown event"));
        assert_eq!(
            format_validation_error("events", &error),
            "Field 'events': unknown event"
        );
    }

    #[test]
    fn errors_become_validation_errors() {
        let mut errors = ValidationErrors::new();
        errors.add("url", ValidationError::new("url"));

        let error: Error = errors.into();
        assert_eq!(error.kind(), ErrorKind::ValidationError);
        assert_eq!(error.message(), Some("Field 'url' must be a valid URL"));
    }
}
