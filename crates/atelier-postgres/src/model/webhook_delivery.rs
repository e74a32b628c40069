//! Webhook delivery log model.

use diesel::prelude::*;
use jiff_diesel::Timestamp;
use serde_json::Value;
use uuid::Uuid;

use crate::schema::webhook_deliveries;

/// Maximum number of response body bytes kept on a failed delivery.
pub const MAX_RESPONSE_EXCERPT_BYTES: usize = 500;

/// One attempted delivery. Rows are never updated once written.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = webhook_deliveries)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct WebhookDelivery {
    pub id: Uuid,
    pub webhook_id: Uuid,
    /// Event name carried in the envelope.
    pub event: String,
    /// The full envelope that was sent.
    pub payload: Value,
    /// HTTP status, or 0 when no response was received.
    pub status_code: i32,
    /// First bytes of the response body on non-2xx responses.
    pub response: String,
    pub success: bool,
    pub duration_ms: i64,
    pub created_at: Timestamp,
}

/// Data for appending a delivery to the log.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = webhook_deliveries)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewWebhookDelivery {
    pub webhook_id: Uuid,
    pub event: String,
    pub payload: Value,
    pub status_code: i32,
    pub response: String,
    pub success: bool,
    pub duration_ms: i64,
}

impl WebhookDelivery {
    /// Returns whether the request failed before any HTTP status was received.
    #[inline]
    pub fn is_transport_failure(&self) -> bool {
        self.status_code == 0
    }
}

/// Cuts a response body down to at most [`MAX_RESPONSE_EXCERPT_BYTES`],
/// dropping any trailing partial UTF-8 sequence.
///
/// NUL characters are removed since `TEXT` columns cannot store them.
pub fn response_excerpt(body: &[u8]) -> String {
    let cut = &body[..body.len().min(MAX_RESPONSE_EXCERPT_BYTES)];
    let text = match std::str::from_utf8(cut) {
        Ok(text) => text.to_owned(),
        Err(err) if err.error_len().is_none() => {
            String::from_utf8_lossy(&cut[..err.valid_up_to()]).into_owned()
        }
        Err(_) => {
            let mut text = String::from_utf8_lossy(cut).into_owned();
            while text.len() > MAX_RESPONSE_EXCERPT_BYTES {
                text.pop();
            }
            text
        }
    };

    if text.contains('\0') {
        text.replace('\0', "")
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_ascii_body_is_cut_to_limit() {
        let body = vec![b'x'; 2000];
        assert_eq!(response_excerpt(&body).len(), 500);
    }

    #[test]
    fn nul_bytes_are_removed() {
        assert_eq!(response_excerpt(b"a\0b"), "ab");
        assert_eq!(response_excerpt(&[0u8; 600]), "");
    }

    #[test]
    fn short_body_is_kept() {
        assert_eq!(response_excerpt(b"nope"), "nope");
        assert_eq!(response_excerpt(b""), "");
    }

    #[test]
    fn split_multibyte_character_is_dropped() {
        let mut body = vec![b'a'; 499];
        body.extend_from_slice("é".as_bytes());
        let excerpt = response_excerpt(&body);
        assert_eq!(excerpt.len(), 499);
        assert!(excerpt.chars().all(|c| c == 'a'));
    }

    #[test]
    fn invalid_bytes_stay_within_limit() {
        let body = vec![0xff; 600];
        assert!(response_excerpt(&body).len() <= MAX_RESPONSE_EXCERPT_BYTES);
    }
}
