//! # arcbox-transport
//!
//! HTTP transport to the container daemon.
//!
//! The client core never dials sockets itself. It hands a fully built
//! [`DaemonRequest`] to a [`Transport`] and gets back a [`DaemonResponse`]
//! whose body it consumes exactly once.
//!
//! - [`UnixTransport`]: HTTP/1.1 over a Unix domain socket (`/var/run/docker.sock`
//!   style endpoints)
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐  DaemonRequest   ┌───────────────┐   HTTP/1.1   ┌────────┐
//! │ arcbox-client│ ───────────────► │   Transport   │ ───────────► │ daemon │
//! │  operations  │ ◄─────────────── │ (UnixTransport)│ ◄─────────── │        │
//! └──────────────┘  DaemonResponse  └───────────────┘  unix socket └────────┘
//! ```
//!
//! Cancellation is cooperative: every call receives a [`CancellationToken`]
//! and the transport aborts the exchange as soon as it fires.

#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod message;
pub mod unix;

pub use error::{Result, TransportError};
pub use message::{DaemonRequest, DaemonResponse, FullBody, ResponseBody};
pub use tokio_util::sync::CancellationToken;
pub use unix::UnixTransport;

use async_trait::async_trait;

/// Sends one HTTP request to the daemon and returns its response.
///
/// Implementations own connection setup, timeouts and cancellation. They
/// never interpret the status code; a non-2xx response is still `Ok`.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Performs a single round trip.
    async fn send(
        &self,
        request: DaemonRequest,
        cancel: &CancellationToken,
    ) -> Result<DaemonResponse>;
}
