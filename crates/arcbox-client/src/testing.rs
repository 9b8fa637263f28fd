//! In-process transport doubles for unit tests.

use crate::client::DaemonClient;
use crate::config::ClientConfig;
use arcbox_transport::{
    DaemonRequest, DaemonResponse, FullBody, ResponseBody, Transport, TransportError,
};
use async_trait::async_trait;
use bytes::Bytes;
use hyper::StatusCode;
use percent_encoding::percent_decode_str;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

type Handler =
    Box<dyn Fn(&DaemonRequest) -> Result<DaemonResponse, TransportError> + Send + Sync>;

/// Transport answering every request with `handler` and recording it.
pub(crate) struct MockTransport {
    handler: Handler,
    requests: Mutex<Vec<DaemonRequest>>,
}

impl MockTransport {
    /// Builds a client over a fresh mock.
    pub(crate) fn client<F>(config: ClientConfig, handler: F) -> (DaemonClient, Arc<Self>)
    where
        F: Fn(&DaemonRequest) -> Result<DaemonResponse, TransportError> + Send + Sync + 'static,
    {
        let mock = Arc::new(Self {
            handler: Box::new(handler),
            requests: Mutex::new(Vec::new()),
        });
        let client = DaemonClient::with_transport(config, Arc::clone(&mock) as Arc<dyn Transport>)
            .expect("valid test config");
        (client, mock)
    }

    /// Number of requests that reached the transport.
    pub(crate) fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Most recent request.
    pub(crate) fn last_request(&self) -> DaemonRequest {
        self.requests
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no request was sent")
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(
        &self,
        request: DaemonRequest,
        _cancel: &CancellationToken,
    ) -> Result<DaemonResponse, TransportError> {
        let response = (self.handler)(&request);
        self.requests.lock().unwrap().push(request);
        response
    }
}

/// Counts how many times response bodies were released.
#[derive(Clone, Default)]
pub(crate) struct CloseCounter(Arc<AtomicUsize>);

impl CloseCounter {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

/// Body that bumps its counter when dropped.
struct CountingBody {
    bytes: Bytes,
    closes: CloseCounter,
}

impl Drop for CountingBody {
    fn drop(&mut self) {
        self.closes.0.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl ResponseBody for CountingBody {
    async fn read_all(self: Box<Self>) -> Result<Bytes, TransportError> {
        let mut body = self;
        Ok(std::mem::take(&mut body.bytes))
    }
}

/// Response whose body release is tracked by `closes`.
pub(crate) fn counted_response(
    status: StatusCode,
    body: &'static str,
    closes: &CloseCounter,
) -> DaemonResponse {
    DaemonResponse::new(
        status,
        CountingBody {
            bytes: Bytes::from_static(body.as_bytes()),
            closes: closes.clone(),
        },
    )
}

/// Plain response with `body`.
pub(crate) fn json_response(status: StatusCode, body: impl Into<Bytes>) -> DaemonResponse {
    DaemonResponse::new(status, FullBody::new(body))
}

/// Daemon-style error response carrying `message`.
pub(crate) fn error_response(status: StatusCode, message: &str) -> DaemonResponse {
    json_response(
        status,
        serde_json::json!({ "message": message }).to_string(),
    )
}

/// Decoded query parameters of `request`.
pub(crate) fn query_params(request: &DaemonRequest) -> HashMap<String, String> {
    request
        .query()
        .unwrap_or_default()
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (decode(key), decode(value))
        })
        .collect()
}

fn decode(s: &str) -> String {
    percent_decode_str(s).decode_utf8_lossy().into_owned()
}
