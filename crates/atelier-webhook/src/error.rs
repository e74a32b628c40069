//! Structured error handling for webhook delivery.

use hipstr::HipStr;
use strum::{AsRefStr, Display, EnumString, IntoStaticStr};
use thiserror::Error;

/// Type alias for boxed dynamic errors that can be sent across threads.
pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Type alias for Results with the webhook [`Error`] type.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Categories of errors raised while building or delivering a webhook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[derive(AsRefStr, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    /// The request could not be built (bad URL, bad header value).
    InvalidInput,
    /// Connecting or talking to the endpoint failed.
    NetworkError,
    /// The endpoint did not answer within the deadline.
    Timeout,
    /// The envelope could not be serialized.
    Serialization,
    /// The HTTP client could not be configured.
    Configuration,
    /// Unknown error occurred.
    #[default]
    Unknown,
}

impl ErrorKind {
    /// Returns whether the error happened on the wire rather than while
    /// preparing the request.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::NetworkError | Self::Timeout)
    }
}

/// Structured error type with classification and context tracking.
#[must_use]
#[derive(Debug, Error)]
#[error("[{kind}]{}", message.as_ref().map(|m| format!(": {m}")).unwrap_or_default())]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Primary error message.
    pub message: Option<HipStr<'static>>,
    /// Underlying source error, if any.
    #[source]
    pub source: Option<BoxedError>,
}

impl Error {
    /// Creates a new error with the given kind.
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            source: None,
        }
    }

    /// Creates a new error from a source error.
    pub fn from_source(kind: ErrorKind, source: impl Into<BoxedError>) -> Self {
        Self {
            kind,
            message: None,
            source: Some(source.into()),
        }
    }

    /// Adds a message to this error.
    pub fn with_message(mut self, message: impl Into<HipStr<'static>>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Sets the source of the error.
    pub fn with_source(mut self, source: impl Into<BoxedError>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Shorthand for [`ErrorKind::InvalidInput`].
    pub fn invalid_input() -> Self {
        Self::new(ErrorKind::InvalidInput)
    }

    /// Shorthand for [`ErrorKind::NetworkError`].
    pub fn network_error() -> Self {
        Self::new(ErrorKind::NetworkError)
    }

    /// Shorthand for [`ErrorKind::Timeout`].
    pub fn timeout() -> Self {
        Self::new(ErrorKind::Timeout)
    }

    /// Shorthand for [`ErrorKind::Serialization`].
    pub fn serialization() -> Self {
        Self::new(ErrorKind::Serialization)
    }

    /// Shorthand for [`ErrorKind::Configuration`].
    pub fn configuration() -> Self {
        Self::new(ErrorKind::Configuration)
    }

    /// Returns whether the error happened on the wire.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        self.kind.is_transport()
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        let message = error.to_string();
        Self::from_source(ErrorKind::Serialization, error).with_message(message)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn builder_sets_message_and_source() {
        let error = Error::network_error()
            .with_message("connection refused")
            .with_source(std::io::Error::other("refused"));

        assert_eq!(error.kind, ErrorKind::NetworkError);
        assert_eq!(error.message.as_deref(), Some("connection refused"));
        assert!(error.source.is_some());
    }

    #[test]
    fn display_includes_kind_and_message() {
        let error = Error::timeout().with_message("operation timed out");
        assert_eq!(error.to_string(), "[timeout]: operation timed out");

        let error = Error::new(ErrorKind::Unknown);
        assert_eq!(error.to_string(), "[unknown]");
    }

    #[test]
    fn transport_kinds() {
        assert!(ErrorKind::NetworkError.is_transport());
        assert!(ErrorKind::Timeout.is_transport());
        assert!(!ErrorKind::InvalidInput.is_transport());
        assert!(!ErrorKind::Serialization.is_transport());
    }

    #[test]
    fn kind_parses_from_snake_case() {
        assert_eq!(
            ErrorKind::from_str("network_error").ok(),
            Some(ErrorKind::NetworkError)
        );
        assert!(ErrorKind::from_str("bogus").is_err());
    }

    #[test]
    fn serde_errors_become_serialization() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error = Error::from(err);
        assert_eq!(error.kind, ErrorKind::Serialization);
        assert!(error.message.is_some());
    }
}
