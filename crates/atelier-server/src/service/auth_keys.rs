//! Shared-secret keys for bearer token validation.

use std::fmt;
use std::sync::Arc;

#[cfg(feature = "config")]
use clap::Args;
use jsonwebtoken::{DecodingKey, EncodingKey};
use serde::{Deserialize, Serialize};

use crate::{Error, Result, TRACING_TARGET_SERVICE};

/// Shortest accepted HMAC secret, in bytes.
pub const MIN_AUTH_SECRET_LEN: usize = 32;

/// Configuration of the token signing secret.
#[derive(Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct AuthKeysConfig {
    /// HMAC secret shared with the token issuer (at least 32 bytes)
    #[cfg_attr(feature = "config", arg(long = "auth-secret", env = "AUTH_SECRET"))]
    pub auth_secret: String,
}

impl fmt::Debug for AuthKeysConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthKeysConfig")
            .field("auth_secret", &"***")
            .finish()
    }
}

impl AuthKeysConfig {
    pub fn new(auth_secret: impl Into<String>) -> Self {
        Self {
            auth_secret: auth_secret.into(),
        }
    }

    /// Rejects secrets too short to resist brute force.
    pub fn validate(&self) -> Result<()> {
        if self.auth_secret.len() < MIN_AUTH_SECRET_LEN {
            return Err(Error::config(format!(
                "AUTH_SECRET must be at least {MIN_AUTH_SECRET_LEN} bytes long"
            )));
        }
        Ok(())
    }
}

/// HS256 keys derived from one secret.
#[derive(Clone)]
pub struct AuthKeys {
    inner: Arc<AuthKeysInner>,
}

struct AuthKeysInner {
    decoding_key: DecodingKey,
    encoding_key: EncodingKey,
}

impl fmt::Debug for AuthKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthKeys").finish_non_exhaustive()
    }
}

impl AuthKeys {
    /// Derives both keys from `secret` without checking its length.
    pub fn from_secret(secret: &[u8]) -> Self {
        Self {
            inner: Arc::new(AuthKeysInner {
                decoding_key: DecodingKey::from_secret(secret),
                encoding_key: EncodingKey::from_secret(secret),
            }),
        }
    }

    /// Validates the configuration and derives the keys.
    pub fn from_config(config: &AuthKeysConfig) -> Result<Self> {
        config.validate()?;
        tracing::debug!(target: TRACING_TARGET_SERVICE, "Authentication keys loaded");
        Ok(Self::from_secret(config.auth_secret.as_bytes()))
    }

    #[inline]
    pub fn decoding_key(&self) -> &DecodingKey {
        &self.inner.decoding_key
    }

    #[inline]
    pub fn encoding_key(&self) -> &EncodingKey {
        &self.inner.encoding_key
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_secret_is_rejected() {
        let config = AuthKeysConfig::new("short");
        assert!(config.validate().is_err());
        assert!(AuthKeys::from_config(&config).is_err());
    }

    #[test]
    fn secret_is_masked_in_debug() {
        let config = AuthKeysConfig::new("s".repeat(40));
        assert!(config.validate().is_ok());
        assert!(!format!("{config:?}").contains("sss"));
    }
}
