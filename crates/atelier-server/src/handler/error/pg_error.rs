//! Database errors as HTTP errors.
//!
//! Constraint violations declared by the migrations become 400s with a
//! message naming the offending field; every other database failure is
//! logged and hidden behind a 500.

use atelier_postgres::PgError;
use atelier_postgres::types::{ActionConstraints, ConstraintViolation, WebhookConstraints};

use crate::handler::{Error, ErrorKind};

const TRACING_TARGET: &str = "atelier_server::postgres_constraints";

impl From<WebhookConstraints> for Error<'static> {
    fn from(c: WebhookConstraints) -> Self {
        let error = match c {
            WebhookConstraints::NameLength => ErrorKind::BadRequest
                .with_message("Webhook name must be between 1 and 255 characters long"),
            WebhookConstraints::UrlLength => {
                ErrorKind::BadRequest.with_message("Webhook URL is too long")
            }
            WebhookConstraints::UrlFormat => {
                ErrorKind::BadRequest.with_message("Webhook URL must use http or https")
            }
            WebhookConstraints::EventsArray | WebhookConstraints::EventsNotEmpty => {
                ErrorKind::BadRequest.with_message("Webhook must subscribe to at least one event")
            }
            WebhookConstraints::SecretFormat
            | WebhookConstraints::CountersPositive
            | WebhookConstraints::DeliveryResponseLength
            | WebhookConstraints::DeliverySuccessStatus
            | WebhookConstraints::DeliveryWebhookExists => {
                ErrorKind::InternalServerError.into_error()
            }
        };

        error.with_resource("webhook")
    }
}

impl From<ActionConstraints> for Error<'static> {
    fn from(c: ActionConstraints) -> Self {
        let error = match c {
            ActionConstraints::NameLength => ErrorKind::BadRequest
                .with_message("Action name must be between 1 and 255 characters long"),
            ActionConstraints::TriggerConfigObject => {
                ErrorKind::BadRequest.with_message("Trigger config must be a JSON object")
            }
            ActionConstraints::StepsArray | ActionConstraints::StepsNotEmpty => {
                ErrorKind::BadRequest.with_message("Action must have at least one step")
            }
            ActionConstraints::RunCountCoversOutcomes | ActionConstraints::RunActionExists => {
                ErrorKind::InternalServerError.into_error()
            }
        };

        error.with_resource("action")
    }
}

impl From<ConstraintViolation> for Error<'static> {
    fn from(constraint: ConstraintViolation) -> Self {
        match constraint {
            ConstraintViolation::Webhook(c) => c.into(),
            ConstraintViolation::Action(c) => c.into(),
        }
    }
}

impl From<PgError> for Error<'static> {
    fn from(error: PgError) -> Self {
        if let Some(constraint) = error.constraint_violation() {
            tracing::warn!(
                target: TRACING_TARGET,
                constraint = ?constraint,
                error = %error,
                "Constraint violation"
            );
            return constraint.into();
        }

        if error.is_not_found() {
            return ErrorKind::NotFound.into_error();
        }

        match &error {
            PgError::Timeout(timeout) => {
                tracing::error!(target: TRACING_TARGET, timeout = ?timeout, "Database timeout");
            }
            PgError::Connection(err) => {
                tracing::error!(target: TRACING_TARGET, error = %err, "Database connection error");
            }
            other => {
                tracing::error!(target: TRACING_TARGET, error = %other, "Database error");
            }
        }

        ErrorKind::InternalServerError.into_error()
    }
}

#[cfg(test)]
mod tests {
    use atelier_postgres::error::DieselError;

    use super::*;

    #[test]
    fn missing_row_is_not_found() {
        let error: Error = PgError::Query(DieselError::NotFound).into();
        assert_eq!(error.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn constraint_maps_to_bad_request() {
        let error: Error = WebhookConstraints::UrlFormat.into();
        assert_eq!(error.kind(), ErrorKind::BadRequest);
        assert_eq!(error.resource(), Some("webhook"));

        let error: Error = ActionConstraints::StepsNotEmpty.into();
        assert_eq!(error.resource(), Some("action"));
    }

    #[test]
    fn other_failures_are_hidden() {
        let error: Error = PgError::Unexpected("pool exploded".into()).into();
        assert_eq!(error.kind(), ErrorKind::InternalServerError);
        assert!(error.message().is_none());
    }
}
