//! Errors raised while binding or serving.

use std::io;

use thiserror::Error;

pub type ServerResult<T> = std::result::Result<T, ServerError>;

#[derive(Debug, Error)]
pub enum ServerError {
    /// The listener could not be bound.
    #[error("failed to bind to {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: io::Error,
    },

    /// The server stopped with an I/O error after binding.
    #[error("server runtime error: {0}")]
    Runtime(#[source] io::Error),
}

impl ServerError {
    /// Hint for the operator, when the cause is recognizable.
    pub fn suggestion(&self) -> Option<&'static str> {
        let err = match self {
            Self::Bind { source, .. } => source,
            Self::Runtime(source) => source,
        };

        match err.kind() {
            io::ErrorKind::PermissionDenied => {
                Some("Try using a port above 1024 or run with appropriate privileges")
            }
            io::ErrorKind::AddrInUse => {
                Some("The port is already in use. Try a different port or stop the conflicting service")
            }
            io::ErrorKind::AddrNotAvailable => {
                Some("The address is not available. Check network interface configuration")
            }
            _ => None,
        }
    }
}
