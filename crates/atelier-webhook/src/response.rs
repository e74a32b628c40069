//! Webhook delivery response.

use std::time::Duration;

use bytes::Bytes;
use uuid::Uuid;

/// Maximum number of body bytes a provider keeps from a response.
pub const MAX_BODY_BYTES: usize = 500;

/// Outcome of a delivery attempt that reached the endpoint.
#[derive(Debug, Clone)]
pub struct WebhookResponse {
    /// Request this response corresponds to.
    pub request_id: Uuid,
    /// HTTP status returned by the endpoint.
    pub status_code: u16,
    /// Leading bytes of the response body, at most [`MAX_BODY_BYTES`].
    /// Providers only read it for non-success statuses.
    pub body: Bytes,
    /// Time from sending the request to reading the body.
    pub duration: Duration,
}

impl WebhookResponse {
    /// Creates a response, truncating `body` to [`MAX_BODY_BYTES`].
    pub fn new(request_id: Uuid, status_code: u16, mut body: Bytes, duration: Duration) -> Self {
        body.truncate(MAX_BODY_BYTES);
        Self {
            request_id,
            status_code,
            body,
            duration,
        }
    }

    /// Returns whether the status is in `[200, 300)`.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    /// Returns the elapsed time in whole milliseconds.
    pub fn duration_ms(&self) -> i64 {
        i64::try_from(self.duration.as_millis()).unwrap_or(i64::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16) -> WebhookResponse {
        WebhookResponse::new(Uuid::new_v4(), status, Bytes::new(), Duration::ZERO)
    }

    #[test]
    fn success_is_2xx_only() {
        assert!(response(200).is_success());
        assert!(response(204).is_success());
        assert!(response(299).is_success());
        assert!(!response(199).is_success());
        assert!(!response(300).is_success());
        assert!(!response(500).is_success());
    }

    #[test]
    fn body_is_truncated() {
        let body = Bytes::from(vec![b'x'; 2000]);
        let response = WebhookResponse::new(Uuid::new_v4(), 500, body, Duration::from_millis(12));
        assert_eq!(response.body.len(), MAX_BODY_BYTES);
        assert_eq!(response.duration_ms(), 12);
    }
}
