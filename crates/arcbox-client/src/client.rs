//! Daemon client handle.

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::request::RequestBuilder;
use crate::response::ensure_success;
use crate::types::PingInfo;
use crate::version::{require_min_version, ApiVersion};
use crate::MIN_API_VERSION;
use arcbox_transport::{DaemonRequest, DaemonResponse, Transport, UnixTransport};
use hyper::header::{HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use hyper::Method;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Stateless handle for talking to the daemon.
///
/// Holds an immutable configuration and a shared transport. Cloning is
/// cheap and clones may be used concurrently; every call builds its own
/// request and reads its own response.
#[derive(Clone)]
pub struct DaemonClient {
    config: Arc<ClientConfig>,
    transport: Arc<dyn Transport>,
    headers: HeaderMap,
}

impl DaemonClient {
    /// Creates a client speaking HTTP over `config.socket_path`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidArgument`] if a configured header is
    /// not a valid HTTP header.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let mut transport = UnixTransport::new(&config.socket_path);
        if let Some(timeout) = config.timeout() {
            transport = transport.with_timeout(timeout);
        }
        Self::with_transport(config, Arc::new(transport))
    }

    /// Creates a client on top of an arbitrary transport.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidArgument`] if a configured header is
    /// not a valid HTTP header.
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        let headers = default_headers(&config)?;
        Ok(Self {
            config: Arc::new(config),
            transport,
            headers,
        })
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Returns the API version requests are sent with.
    #[must_use]
    pub fn api_version(&self) -> &str {
        &self.config.api_version
    }

    /// Returns a copy of this client pinned to `version`.
    #[must_use]
    pub fn with_api_version(&self, version: impl Into<String>) -> Self {
        let mut config = (*self.config).clone();
        config.api_version = version.into();
        Self {
            config: Arc::new(config),
            transport: Arc::clone(&self.transport),
            headers: self.headers.clone(),
        }
    }

    /// Checks `operation` against the client's API version.
    pub(crate) fn require_version(&self, operation: &str, min_version: &str) -> Result<()> {
        require_min_version(operation, min_version, &self.config.api_version)
    }

    /// Starts a versioned request carrying the default headers.
    pub(crate) fn request(&self, method: Method, path: impl Into<String>) -> RequestBuilder {
        RequestBuilder::new(method, path)
            .api_version(self.config.api_version.as_str())
            .headers(&self.headers)
    }

    /// Sends `request`; transport failures pass through as
    /// [`ClientError::Transport`] without touching the response decoder.
    pub(crate) async fn send(
        &self,
        request: DaemonRequest,
        cancel: &CancellationToken,
    ) -> Result<DaemonResponse> {
        tracing::debug!(
            method = %request.method,
            target = %request.path_and_query,
            "Sending request to daemon"
        );
        Ok(self.transport.send(request, cancel).await?)
    }

    /// Pings the daemon and returns what it reports about itself.
    ///
    /// The ping is always sent unversioned.
    ///
    /// # Errors
    ///
    /// Returns transport errors unchanged and daemon errors as
    /// [`ClientError::Daemon`] or [`ClientError::UnexpectedStatus`].
    pub async fn ping(&self, cancel: &CancellationToken) -> Result<PingInfo> {
        let request = RequestBuilder::new(Method::GET, "/_ping")
            .headers(&self.headers)
            .build();
        let response = self.send(request, cancel).await?;

        let header = |name: &str| {
            response
                .headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(ToString::to_string)
        };
        let info = PingInfo {
            api_version: header("api-version"),
            os_type: header("ostype"),
            experimental: header("docker-experimental").is_some_and(|v| v == "true"),
            builder_version: header("builder-version"),
        };

        ensure_success(response).await?;
        Ok(info)
    }

    /// Pings the daemon and returns a client pinned to the highest API
    /// version both sides support.
    ///
    /// A daemon that does not report a version is assumed to speak
    /// [`MIN_API_VERSION`]. An unpinned client adopts the daemon's version.
    ///
    /// # Errors
    ///
    /// Returns ping errors, or [`ClientError::InvalidVersion`] if either
    /// version cannot be parsed.
    pub async fn negotiate_api_version(&self, cancel: &CancellationToken) -> Result<Self> {
        let ping = self.ping(cancel).await?;
        let daemon = ping
            .api_version
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| MIN_API_VERSION.to_string());
        let daemon_version: ApiVersion = daemon.parse()?;

        let negotiated = if self.config.api_version.is_empty() {
            daemon_version
        } else {
            let ours: ApiVersion = self.config.api_version.parse()?;
            ours.min(daemon_version)
        };

        tracing::debug!(version = %negotiated, "Negotiated daemon API version");
        Ok(self.with_api_version(negotiated.as_str()))
    }
}

impl std::fmt::Debug for DaemonClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DaemonClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

fn default_headers(config: &ClientConfig) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();

    for (name, value) in &config.http_headers {
        let name = HeaderName::try_from(name.as_str())
            .map_err(|e| ClientError::InvalidArgument(format!("header name {name:?}: {e}")))?;
        let value = HeaderValue::try_from(value.as_str())
            .map_err(|e| ClientError::InvalidArgument(format!("header {name}: {e}")))?;
        headers.insert(name, value);
    }

    if !config.user_agent.is_empty() {
        let agent = HeaderValue::try_from(config.user_agent.as_str())
            .map_err(|e| ClientError::InvalidArgument(format!("user agent: {e}")))?;
        headers.insert(USER_AGENT, agent);
    }

    Ok(headers)
}
