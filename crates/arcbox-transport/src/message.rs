//! Request and response messages exchanged with a [`Transport`](crate::Transport).

use crate::error::Result;
use async_trait::async_trait;
use bytes::Bytes;
use hyper::header::HeaderMap;
use hyper::{Method, StatusCode};
use std::fmt;

/// An outbound request, fully encoded and ready to put on the wire.
#[derive(Debug, Clone)]
pub struct DaemonRequest {
    /// HTTP method.
    pub method: Method,
    /// Origin-form target, e.g. `/v1.25/images/prune?filters=...`.
    pub path_and_query: String,
    /// Request headers.
    pub headers: HeaderMap,
    /// Encoded body. `None` sends zero body bytes.
    pub body: Option<Bytes>,
}

impl DaemonRequest {
    /// Returns the path component without the query string.
    #[must_use]
    pub fn path(&self) -> &str {
        self.path_and_query
            .split_once('?')
            .map_or(self.path_and_query.as_str(), |(path, _)| path)
    }

    /// Returns the raw (still encoded) query string, if any.
    #[must_use]
    pub fn query(&self) -> Option<&str> {
        self.path_and_query.split_once('?').map(|(_, query)| query)
    }
}

/// A response body that can be read once.
///
/// Reading consumes the box, so the underlying stream is released when
/// `read_all` returns, whether it succeeded or not. Dropping an unread body
/// releases it as well.
#[async_trait]
pub trait ResponseBody: Send {
    /// Reads the remaining body to the end.
    async fn read_all(self: Box<Self>) -> Result<Bytes>;
}

/// A response received from the daemon.
pub struct DaemonResponse {
    /// HTTP status code.
    pub status: StatusCode,
    /// Response headers.
    pub headers: HeaderMap,
    /// Unread body.
    pub body: Box<dyn ResponseBody>,
}

impl DaemonResponse {
    /// Creates a response with no headers.
    pub fn new(status: StatusCode, body: impl ResponseBody + 'static) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: Box::new(body),
        }
    }

    /// Replaces the response headers.
    #[must_use]
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }
}

impl fmt::Debug for DaemonResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DaemonResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

/// A body already held in memory.
#[derive(Debug, Clone, Default)]
pub struct FullBody(Bytes);

impl FullBody {
    /// Wraps the given bytes.
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self(bytes.into())
    }
}

#[async_trait]
impl ResponseBody for FullBody {
    async fn read_all(self: Box<Self>) -> Result<Bytes> {
        Ok(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(target: &str) -> DaemonRequest {
        DaemonRequest {
            method: Method::GET,
            path_and_query: target.to_string(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    #[test]
    fn test_path_and_query_split() {
        let req = request("/v1.25/images/prune?filters=%7B%7D");
        assert_eq!(req.path(), "/v1.25/images/prune");
        assert_eq!(req.query(), Some("filters=%7B%7D"));

        let req = request("/_ping");
        assert_eq!(req.path(), "/_ping");
        assert_eq!(req.query(), None);
    }

    #[tokio::test]
    async fn test_full_body_read() {
        let response = DaemonResponse::new(StatusCode::OK, FullBody::new("hello"));
        let body = response.body.read_all().await.unwrap();
        assert_eq!(&body[..], b"hello");
    }
}
