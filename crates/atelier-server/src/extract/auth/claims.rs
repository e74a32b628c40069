//! JWT claims carried by the bearer token.

use jiff::{SignedDuration, Timestamp};
use jsonwebtoken::errors::{Error as JwtError, ErrorKind as JwtErrorKind};
use jsonwebtoken::{Algorithm, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::TRACING_TARGET_AUTHENTICATION;
use crate::handler::{Error, ErrorKind, Result};
use crate::service::AuthKeys;

/// Claims of an HS256 access token.
///
/// Tokens are issued elsewhere; this service only needs the subject, which
/// is the id of the calling user and the owner of everything they create.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthClaims {
    #[serde(rename = "jti", default = "Uuid::nil")]
    pub token_id: Uuid,
    #[serde(rename = "sub")]
    pub user_id: Uuid,
    /// Issued at, seconds since the Unix epoch.
    #[serde(rename = "iat", default)]
    pub issued_at: i64,
    /// Expiry, seconds since the Unix epoch.
    #[serde(rename = "exp")]
    pub expires_at: i64,
}

impl AuthClaims {
    /// Claims for `user_id` valid for `ttl` from now.
    pub fn new(user_id: Uuid, ttl: SignedDuration) -> Self {
        let issued_at = Timestamp::now().as_second();
        Self {
            token_id: Uuid::new_v4(),
            user_id,
            issued_at,
            expires_at: issued_at.saturating_add(ttl.as_secs()),
        }
    }

    #[inline]
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Timestamp::now().as_second()
    }

    /// Signs the claims into a compact token.
    pub fn encode(&self, keys: &AuthKeys) -> Result<String> {
        encode(&Header::new(Algorithm::HS256), self, keys.encoding_key()).map_err(|err| {
            tracing::error!(
                target: TRACING_TARGET_AUTHENTICATION,
                error = %err,
                user_id = %self.user_id,
                "Failed to encode JWT"
            );
            ErrorKind::InternalServerError
                .with_message("Authentication token generation failed")
                .with_resource("authentication")
        })
    }

    /// Verifies the signature and expiry of `token`.
    pub fn decode(token: &str, keys: &AuthKeys) -> Result<Self> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["sub", "exp"]);

        let claims = decode::<Self>(token, keys.decoding_key(), &validation)?.claims;

        tracing::debug!(
            target: TRACING_TARGET_AUTHENTICATION,
            token_id = %claims.token_id,
            user_id = %claims.user_id,
            "JWT validated"
        );

        Ok(claims)
    }
}

impl From<JwtError> for Error<'static> {
    fn from(error: JwtError) -> Self {
        let error = match error.kind() {
            JwtErrorKind::ExpiredSignature => {
                ErrorKind::TokenExpired.with_message("Please sign in again to continue")
            }
            JwtErrorKind::InvalidSignature => ErrorKind::Unauthorized
                .with_message("Authentication token verification failed"),
            JwtErrorKind::ImmatureSignature => {
                ErrorKind::Unauthorized.with_message("Authentication token is not valid yet")
            }
            JwtErrorKind::MissingRequiredClaim(claim) => ErrorKind::MalformedAuthToken
                .with_message("Authentication token is incomplete")
                .with_context(format!("missing claim: {claim}")),
            JwtErrorKind::InvalidToken
            | JwtErrorKind::InvalidAlgorithm
            | JwtErrorKind::Base64(_)
            | JwtErrorKind::Json(_) => {
                ErrorKind::MalformedAuthToken.with_message("Authentication token is invalid")
            }
            _ => ErrorKind::Unauthorized.with_message("Authentication failed"),
        };

        error.with_resource("authentication")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys() -> AuthKeys {
        AuthKeys::from_secret(b"an-hmac-secret-that-is-long-enough-for-tests")
    }

    #[test]
    fn token_round_trips() {
        let user_id = Uuid::now_v7();
        let claims = AuthClaims::new(user_id, SignedDuration::from_hours(1));
        let token = claims.encode(&keys()).unwrap();

        let decoded = AuthClaims::decode(&token, &keys()).unwrap();
        assert_eq!(decoded.user_id, user_id);
        assert!(!decoded.is_expired());
    }

    #[test]
    fn expired_token_is_rejected() {
        let claims = AuthClaims::new(Uuid::now_v7(), SignedDuration::from_hours(-2));
        assert!(claims.is_expired());

        let token = claims.encode(&keys()).unwrap();
        let error = AuthClaims::decode(&token, &keys()).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::TokenExpired);
    }

    #[test]
    fn foreign_signature_is_rejected() {
        let claims = AuthClaims::new(Uuid::now_v7(), SignedDuration::from_hours(1));
        let token = claims
            .encode(&AuthKeys::from_secret(b"some-other-secret-of-reasonable-size"))
            .unwrap();

        let error = AuthClaims::decode(&token, &keys()).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Unauthorized);
    }

    #[test]
    fn garbage_is_malformed() {
        let error = AuthClaims::decode("not-a-jwt", &keys()).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::MalformedAuthToken);
    }
}
