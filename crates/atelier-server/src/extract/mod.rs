//! Request extractors.
//!
//! - [`AuthState`]: the authenticated caller, from a bearer JWT.
//! - [`Json`], [`ValidateJson`], [`Path`], [`Query`]: axum extractors whose
//!   rejections render as the service's JSON errors.

pub mod auth;
pub mod reject;

pub use self::auth::{AuthClaims, AuthHeader, AuthState, TRACING_TARGET_AUTHENTICATION};
pub use self::reject::{Json, Path, Query, ValidateJson};
