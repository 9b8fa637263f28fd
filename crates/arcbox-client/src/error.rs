//! Error types for daemon client operations.

use arcbox_transport::TransportError;
use hyper::StatusCode;
use thiserror::Error;

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Prefix of every error reported by the daemon itself.
pub const DAEMON_ERROR_PREFIX: &str = "Error response from daemon: ";

/// Errors returned by [`DaemonClient`](crate::DaemonClient) operations.
///
/// Nothing in the client retries; every variant is handed back to the caller.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The negotiated API version is older than the operation requires.
    ///
    /// Detected locally, the request never reaches the network.
    #[error("{operation:?} requires API version {required}, but the Docker daemon API version is {current}")]
    UnsupportedVersion {
        /// Operation name, e.g. `"secret update"`.
        operation: String,
        /// Minimum API version of the operation.
        required: String,
        /// Version the client is talking.
        current: String,
    },

    /// An API version string is not a dotted list of integers.
    #[error("invalid API version: {0:?}")]
    InvalidVersion(String),

    /// A `filters` value could not be parsed.
    #[error("invalid filters: {0}")]
    InvalidFilters(String),

    /// The object id is empty, so there is nothing to look up.
    #[error("Error: No such {kind}: {id}")]
    ObjectNotFound {
        /// Object kind, e.g. `"secret"`.
        kind: &'static str,
        /// Id that was requested.
        id: String,
    },

    /// A caller-supplied value cannot be sent to the daemon.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Request body could not be encoded.
    #[error("failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),

    /// Connection, timeout or cancellation failure, passed through unchanged.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Non-2xx response carrying a structured `message`.
    #[error("Error response from daemon: {message}")]
    Daemon {
        /// HTTP status returned by the daemon.
        status: StatusCode,
        /// Message from the daemon's JSON error body.
        message: String,
    },

    /// Non-2xx response without a structured message.
    #[error("daemon returned error {status}{}", body_suffix(.body))]
    UnexpectedStatus {
        /// HTTP status returned by the daemon.
        status: StatusCode,
        /// Raw body text, trimmed; may be empty.
        body: String,
    },

    /// 2xx response whose body does not match the expected payload.
    #[error("malformed response from daemon: {0}")]
    MalformedResponse(#[source] serde_json::Error),
}

fn body_suffix(body: &str) -> String {
    if body.is_empty() {
        String::new()
    } else {
        format!(": {body}")
    }
}

impl ClientError {
    /// Returns the HTTP status for errors produced by a daemon response.
    #[must_use]
    pub const fn status_code(&self) -> Option<StatusCode> {
        match self {
            Self::Daemon { status, .. } | Self::UnexpectedStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns true if the object does not exist, locally or per the daemon.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ObjectNotFound { .. })
            || self.status_code() == Some(StatusCode::NOT_FOUND)
    }

    /// Returns true if the operation was rejected by the version gate.
    #[must_use]
    pub const fn is_unsupported_version(&self) -> bool {
        matches!(self, Self::UnsupportedVersion { .. })
    }

    /// Returns true if the failure came from the transport.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}
