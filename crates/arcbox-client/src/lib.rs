//! # arcbox-client
//!
//! Typed client for the Docker-compatible daemon API.
//!
//! Each operation is a method on [`DaemonClient`] that runs the same fixed
//! pipeline:
//!
//! ```text
//! operation ──► version gate ──► RequestBuilder ──► Transport ──► decoder
//!                   │              (FilterSet)          │            │
//!                   ▼                                   ▼            ▼
//!          UnsupportedVersion                  Transport error   typed result,
//!          (no network I/O)                    (passed through)  Daemon or
//!                                                                Malformed error
//! ```
//!
//! ## Usage
//!
//! ```no_run
//! use arcbox_client::{CancellationToken, ClientConfig, DaemonClient, FilterSet};
//!
//! # async fn run() -> arcbox_client::Result<()> {
//! let client = DaemonClient::new(ClientConfig::with_socket("/var/run/docker.sock"))?;
//! let filters = FilterSet::new().with("dangling", "true");
//!
//! let report = client.images_prune(&filters, &CancellationToken::new()).await?;
//! println!("reclaimed {} bytes", report.space_reclaimed);
//! # Ok(())
//! # }
//! ```

#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod config;
pub mod error;
pub mod filters;
pub mod ops;
pub mod request;
pub mod response;
pub mod types;
pub mod version;

#[cfg(test)]
mod testing;

pub use arcbox_transport::{
    CancellationToken, DaemonRequest, DaemonResponse, Transport, TransportError, UnixTransport,
};
pub use client::DaemonClient;
pub use config::ClientConfig;
pub use error::{ClientError, Result};
pub use filters::FilterSet;
pub use version::{require_min_version, ApiVersion};

/// API version spoken when none is configured.
pub const DEFAULT_API_VERSION: &str = "1.43";

/// Oldest API version; assumed when the daemon does not report one.
pub const MIN_API_VERSION: &str = "1.24";
