//! Authenticated caller.

use axum::extract::{FromRef, FromRequestParts, OptionalFromRequestParts};
use axum::http::request::Parts;
use derive_more::Deref;
use uuid::Uuid;

use super::{AuthClaims, AuthHeader};
use crate::handler::{Error, Result};
use crate::service::AuthKeys;

/// The caller behind a valid bearer token.
///
/// Used as `AuthState` on every protected route and as `Option<AuthState>`
/// where authentication only unlocks extra detail. The optional form yields
/// `None` when no `Authorization` header is sent and still rejects a header
/// that is present but invalid.
#[derive(Debug, Clone, Copy, Deref, PartialEq, Eq)]
pub struct AuthState(pub AuthClaims);

impl AuthState {
    /// Id of the calling user; owner of everything they create.
    #[inline]
    pub fn user_id(&self) -> Uuid {
        self.0.user_id
    }
}

impl<S> FromRequestParts<S> for AuthState
where
    S: Send + Sync,
    AuthKeys: FromRef<S>,
{
    type Rejection = Error<'static>;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth_header = AuthHeader::from_request_parts(parts, state).await?;
        Ok(Self(auth_header.into_auth_claims()))
    }
}

impl<S> OptionalFromRequestParts<S> for AuthState
where
    S: Send + Sync,
    AuthKeys: FromRef<S>,
{
    type Rejection = Error<'static>;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        if !AuthHeader::is_present(parts) {
            return Ok(None);
        }

        <Self as FromRequestParts<S>>::from_request_parts(parts, state)
            .await
            .map(Some)
    }
}
