//! Unix domain socket transport.

use crate::error::{Result, TransportError};
use crate::message::{DaemonRequest, DaemonResponse, FullBody};
use crate::Transport;
use async_trait::async_trait;
use http_body_util::{BodyExt, Full};
use hyper::header::HOST;
use hyper::Request;
use hyper_util::rt::TokioIo;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::net::UnixStream;
use tokio_util::sync::CancellationToken;

/// HTTP/1.1 transport over a Unix socket.
///
/// Every request opens a fresh connection; nothing is pooled, so the
/// transport itself holds no mutable state and can be shared freely.
#[derive(Debug, Clone)]
pub struct UnixTransport {
    path: PathBuf,
    timeout: Option<Duration>,
}

impl UnixTransport {
    /// Creates a new Unix transport for the given socket path.
    #[must_use]
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            timeout: None,
        }
    }

    /// Bounds the whole exchange, response body included, by `timeout`.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Returns the socket path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the configured timeout, if any.
    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    async fn exchange(&self, request: DaemonRequest) -> Result<DaemonResponse> {
        let stream =
            UnixStream::connect(&self.path)
                .await
                .map_err(|source| TransportError::Connect {
                    path: self.path.display().to_string(),
                    source,
                })?;

        let io = TokioIo::new(stream);
        let (mut sender, conn) = hyper::client::conn::http1::handshake(io).await?;

        tokio::spawn(async move {
            if let Err(e) = conn.await {
                tracing::debug!("Daemon connection closed: {}", e);
            }
        });

        let mut builder = Request::builder()
            .method(request.method)
            .uri(format!("http://localhost{}", request.path_and_query))
            .header(HOST, "localhost");
        if let Some(headers) = builder.headers_mut() {
            headers.extend(request.headers);
        }

        let http_request = builder
            .body(Full::new(request.body.unwrap_or_default()))
            .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;

        let response = sender.send_request(http_request).await?;
        let (parts, body) = response.into_parts();
        // Read to the end here so a stalled body stays under the deadline
        // and the cancel token.
        let bytes = body.collect().await?.to_bytes();

        Ok(DaemonResponse::new(parts.status, FullBody::new(bytes)).with_headers(parts.headers))
    }
}

#[async_trait]
impl Transport for UnixTransport {
    async fn send(
        &self,
        request: DaemonRequest,
        cancel: &CancellationToken,
    ) -> Result<DaemonResponse> {
        let exchange = async {
            match self.timeout {
                Some(timeout) => tokio::time::timeout(timeout, self.exchange(request))
                    .await
                    .map_err(|_| TransportError::Timeout(timeout))?,
                None => self.exchange(request).await,
            }
        };

        tokio::select! {
            biased;

            () = cancel.cancelled() => Err(TransportError::Cancelled),
            result = exchange => result,
        }
    }
}
