//! Error types for transport operations.

use std::time::Duration;
use thiserror::Error;

/// Result type alias for transport operations.
pub type Result<T> = std::result::Result<T, TransportError>;

/// Errors that can occur while exchanging a request with the daemon.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The daemon socket could not be reached.
    #[error("cannot connect to the daemon at {path}: {source}")]
    Connect {
        /// Socket path that was dialed.
        path: String,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The exchange did not complete in time.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// The caller cancelled the request.
    #[error("request cancelled")]
    Cancelled,

    /// HTTP protocol failure (handshake, send, or body read).
    #[error("HTTP error: {0}")]
    Http(#[from] hyper::Error),

    /// The request could not be turned into a valid HTTP message.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl TransportError {
    /// Returns true if this is a timeout error.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }

    /// Returns true if the caller cancelled the request.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Returns true if the daemon could not be reached at all.
    #[must_use]
    pub const fn is_connect(&self) -> bool {
        matches!(self, Self::Connect { .. })
    }
}
