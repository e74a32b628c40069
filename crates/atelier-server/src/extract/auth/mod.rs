//! Bearer-token authentication.

mod claims;
mod header;
mod state;

pub use self::claims::AuthClaims;
pub use self::header::AuthHeader;
pub use self::state::AuthState;

/// Tracing target for token validation.
pub const TRACING_TARGET_AUTHENTICATION: &str = "atelier_server::extract::authentication";
