//! Response decoding.
//!
//! Both entry points take the [`DaemonResponse`] by value: the body is read
//! once and released on every exit path, including decode failures.

use crate::error::{ClientError, Result};
use arcbox_transport::DaemonResponse;
use bytes::Bytes;
use hyper::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;

/// JSON error body returned by the daemon.
#[derive(Debug, Deserialize)]
struct ErrorMessage {
    #[serde(default)]
    message: String,
}

/// Decodes a 2xx response body into `T`.
///
/// # Errors
///
/// - [`ClientError::Daemon`] / [`ClientError::UnexpectedStatus`] for non-2xx
/// - [`ClientError::MalformedResponse`] if the body does not match `T`
/// - [`ClientError::Transport`] if the body cannot be read
pub async fn decode_json<T: DeserializeOwned>(response: DaemonResponse) -> Result<T> {
    let body = read_success_body(response).await?;
    serde_json::from_slice(&body).map_err(ClientError::MalformedResponse)
}

/// Checks the status of a response that carries no payload.
///
/// # Errors
///
/// Same as [`decode_json`], minus the decode step.
pub async fn ensure_success(response: DaemonResponse) -> Result<()> {
    read_success_body(response).await.map(drop)
}

async fn read_success_body(response: DaemonResponse) -> Result<Bytes> {
    let DaemonResponse { status, body, .. } = response;
    let body = body.read_all().await?;

    if status.is_success() {
        Ok(body)
    } else {
        Err(daemon_error(status, &body))
    }
}

/// Maps a non-2xx status and its body to an error.
fn daemon_error(status: StatusCode, body: &[u8]) -> ClientError {
    match serde_json::from_slice::<ErrorMessage>(body) {
        Ok(err) if !err.message.is_empty() => {
            tracing::debug!(%status, message = %err.message, "daemon returned an error");
            ClientError::Daemon {
                status,
                message: err.message,
            }
        }
        _ => ClientError::UnexpectedStatus {
            status,
            body: String::from_utf8_lossy(body).trim().to_string(),
        },
    }
}
