//! Outbound request construction.

use crate::error::{ClientError, Result};
use crate::filters::FilterSet;
use arcbox_transport::DaemonRequest;
use bytes::Bytes;
use hyper::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use hyper::Method;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Serialize;

/// Characters left as-is in query keys, query values and path segments.
const UNRESERVED: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Escapes one path segment, e.g. an object id.
///
/// The dot segments `.` and `..` are escaped in full so they are never
/// normalized away on the daemon side.
#[must_use]
pub fn path_segment(segment: &str) -> String {
    match segment {
        "." => "%2E".to_string(),
        ".." => "%2E%2E".to_string(),
        _ => utf8_percent_encode(segment, UNRESERVED).to_string(),
    }
}

/// Ordered query parameters.
///
/// Setting a key again replaces its value in place, so the position of the
/// first `set` is kept and the last value wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    /// Creates an empty parameter list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `key` to `value`, replacing any earlier value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        let key = key.into();
        let value = value.into();
        match self.pairs.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.pairs.push((key, value)),
        }
        self
    }

    /// Sets `key` to the encoded filters, or removes it if `filters` is empty.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Encode`] if the filters cannot be serialized.
    pub fn set_filters(&mut self, key: &str, filters: &FilterSet) -> Result<&mut Self> {
        let encoded = filters.to_json()?;
        if encoded.is_empty() {
            self.remove(key);
        } else {
            self.set(key, encoded);
        }
        Ok(self)
    }

    /// Removes `key`.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        let index = self.pairs.iter().position(|(k, _)| k == key)?;
        Some(self.pairs.remove(index).1)
    }

    /// Returns the value of `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Returns true if no parameter is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Encodes as `k1=v1&k2=v2`, percent-encoding keys and values once.
    #[must_use]
    pub fn encode(&self) -> String {
        self.pairs
            .iter()
            .map(|(k, v)| {
                format!(
                    "{}={}",
                    utf8_percent_encode(k, UNRESERVED),
                    utf8_percent_encode(v, UNRESERVED)
                )
            })
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// Builds a [`DaemonRequest`] from a method, an API path, query parameters
/// and an optional JSON body.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    method: Method,
    path: String,
    api_version: String,
    query: QueryParams,
    headers: HeaderMap,
    body: Option<Bytes>,
}

impl RequestBuilder {
    /// Starts a request for `path`, which must begin with `/` and is used
    /// verbatim (ids must already be escaped with [`path_segment`]).
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            api_version: String::new(),
            query: QueryParams::new(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    /// Prefixes the path with `/v<version>`. An empty version leaves the
    /// path unversioned.
    #[must_use]
    pub fn api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    /// Replaces the query parameters.
    #[must_use]
    pub fn query(mut self, query: QueryParams) -> Self {
        self.query = query;
        self
    }

    /// Adds one header, replacing an earlier value of the same name.
    #[must_use]
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Adds all `headers`, replacing earlier values of the same names.
    #[must_use]
    pub fn headers(mut self, headers: &HeaderMap) -> Self {
        for (name, value) in headers {
            self.headers.insert(name.clone(), value.clone());
        }
        self
    }

    /// Serializes `body` as the JSON request body.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Encode`] if serialization fails.
    pub fn json_body<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self> {
        let bytes = serde_json::to_vec(body).map_err(ClientError::Encode)?;
        self.body = Some(Bytes::from(bytes));
        Ok(self)
    }

    /// Finishes the request.
    #[must_use]
    pub fn build(mut self) -> DaemonRequest {
        let mut target = if self.api_version.is_empty() {
            self.path
        } else {
            format!("/v{}{}", self.api_version, self.path)
        };

        if !self.query.is_empty() {
            target.push('?');
            target.push_str(&self.query.encode());
        }

        if self.body.is_some() && !self.headers.contains_key(CONTENT_TYPE) {
            self.headers
                .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }

        DaemonRequest {
            method: self.method,
            path_and_query: target,
            headers: self.headers,
            body: self.body,
        }
    }
}
