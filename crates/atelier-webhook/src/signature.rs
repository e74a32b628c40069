//! HMAC-SHA256 signing of webhook bodies and secret generation.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Prefix of every generated webhook secret.
pub const SECRET_PREFIX: &str = "whsec_";

/// Number of random bytes behind a generated secret.
pub const SECRET_BYTES: usize = 32;

/// Generates a new webhook secret: `whsec_` followed by 64 lowercase hex characters.
pub fn generate_secret() -> String {
    let bytes: [u8; SECRET_BYTES] = rand::random();
    format!("{SECRET_PREFIX}{}", hex::encode(bytes))
}

/// Returns whether `secret` has the shape produced by [`generate_secret`].
pub fn is_valid_secret(secret: &str) -> bool {
    secret.strip_prefix(SECRET_PREFIX).is_some_and(|hex| {
        hex.len() == SECRET_BYTES * 2
            && hex.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
    })
}

fn mac_for(secret: &str) -> HmacSha256 {
    match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => unreachable!("HMAC accepts keys of any length"),
    }
}

/// Signs `body` with `secret`, returning the lowercase hex HMAC-SHA256 digest.
///
/// The whole secret string, prefix included, is the key.
pub fn sign(secret: &str, body: &[u8]) -> String {
    let mut mac = mac_for(secret);
    mac.update(body);
    hex::encode(mac.finalize().into_bytes())
}

/// Verifies an `X-Webhook-Signature` header value against `body`.
///
/// The comparison is constant-time. Malformed hex never verifies.
pub fn verify_signature(secret: &str, body: &[u8], header: &str) -> bool {
    let Ok(expected) = hex::decode(header.trim()) else {
        return false;
    };

    let mut mac = mac_for(secret);
    mac.update(body);
    mac.verify_slice(&expected).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_secret_has_expected_shape() {
        let secret = generate_secret();
        assert!(secret.starts_with("whsec_"));
        assert_eq!(secret.len(), 6 + 64);
        assert!(is_valid_secret(&secret));
        assert_ne!(secret, generate_secret());
    }

    #[test]
    fn rejects_malformed_secrets() {
        assert!(!is_valid_secret("whsec_abc"));
        assert!(!is_valid_secret(&format!("sk_{}", "a".repeat(64))));
        assert!(!is_valid_secret(&format!("whsec_{}", "A".repeat(64))));
    }

    #[test]
    fn signature_is_lowercase_hex_sha256() {
        let signature = sign("whsec_test", b"{\"event\":\"x\"}");
        assert_eq!(signature.len(), 64);
        assert!(signature.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')));
    }

    #[test]
    fn matches_known_vector() {
        // RFC 4231 test case 2.
        let signature = sign("Jefe", b"what do ya want for nothing?");
        assert_eq!(
            signature,
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    #[test]
    fn verifies_own_signature() {
        let secret = generate_secret();
        let body = br#"{"id":"1","event":"document.created","data":{}}"#;
        let header = sign(&secret, body);

        assert!(verify_signature(&secret, body, &header));
        assert!(!verify_signature(&secret, b"tampered", &header));
        assert!(!verify_signature("whsec_other", body, &header));
        assert!(!verify_signature(&secret, body, "not-hex"));
    }
}
