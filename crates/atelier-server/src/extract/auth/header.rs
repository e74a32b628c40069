//! Bearer token extraction.

use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use axum_extra::TypedHeader;
use axum_extra::headers::Authorization;
use axum_extra::headers::authorization::Bearer;
use axum_extra::typed_header::TypedHeaderRejectionReason;

use super::{AuthClaims, TRACING_TARGET_AUTHENTICATION};
use crate::handler::{Error, ErrorKind, Result};
use crate::service::AuthKeys;

type AuthBearerHeader = TypedHeader<Authorization<Bearer>>;

/// Verified claims taken from `Authorization: Bearer <jwt>`.
///
/// The result is cached in the request extensions, so extracting it more
/// than once per request decodes the token only once.
#[must_use]
#[derive(Debug, Clone)]
pub struct AuthHeader {
    auth_claims: AuthClaims,
}

impl AuthHeader {
    #[inline]
    pub const fn new(auth_claims: AuthClaims) -> Self {
        Self { auth_claims }
    }

    #[inline]
    pub const fn as_auth_claims(&self) -> &AuthClaims {
        &self.auth_claims
    }

    #[inline]
    pub fn into_auth_claims(self) -> AuthClaims {
        self.auth_claims
    }

    /// Returns whether the request carries an `Authorization` header at all.
    pub(crate) fn is_present(parts: &Parts) -> bool {
        parts
            .headers
            .contains_key(axum::http::header::AUTHORIZATION)
    }
}

impl<S> FromRequestParts<S> for AuthHeader
where
    S: Send + Sync,
    AuthKeys: FromRef<S>,
{
    type Rejection = Error<'static>;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(auth_header) = parts.extensions.get::<Self>() {
            return Ok(auth_header.clone());
        }

        let bearer = AuthBearerHeader::from_request_parts(parts, state)
            .await
            .map_err(|rejection| match rejection.reason() {
                TypedHeaderRejectionReason::Missing => ErrorKind::MissingAuthToken
                    .with_message("Authentication required")
                    .with_resource("authentication"),
                _ => ErrorKind::MalformedAuthToken
                    .with_message("Authorization header must contain a Bearer token")
                    .with_resource("authentication"),
            })?;

        let auth_keys = AuthKeys::from_ref(state);
        let auth_claims = AuthClaims::decode(bearer.token(), &auth_keys).inspect_err(|err| {
            tracing::debug!(
                target: TRACING_TARGET_AUTHENTICATION,
                error = %err,
                "Rejected bearer token"
            );
        })?;

        let auth_header = Self::new(auth_claims);
        parts.extensions.insert(auth_header.clone());
        Ok(auth_header)
    }
}
